pub mod alert;
pub mod portfolio;
pub mod quote;
pub mod watch_item;
pub mod watchlist;

pub use alert::{Alert, AlertCondition};
pub use portfolio::PortfolioItem;
pub use quote::Quote;
pub use watch_item::WatchItem;
pub use watchlist::{StockEntry, Watchlist};
