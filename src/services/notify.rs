use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::Alert;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// In-app notification, rendered by whatever frontend subscribes to the
/// event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Push permission mirrors the browser Notification API: pushes go out only
/// when granted, a single explicit request can move `Unasked` to a decision,
/// and `Denied` is final for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushPermission {
    Unasked,
    Granted,
    Denied,
}

impl PushPermission {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "granted" => Self::Granted,
            "denied" => Self::Denied,
            _ => Self::Unasked,
        }
    }
}

/// A platform notification channel (e.g. a webhook receiver). Errors come
/// back to the caller for logging; the channel itself never retries.
#[async_trait]
pub trait PushChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, title: &str, body: &str) -> Result<(), String>;
}

pub struct WebhookPush {
    http: reqwest::Client,
    url: String,
}

impl WebhookPush {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl PushChannel for WebhookPush {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), String> {
        let payload = serde_json::json!({ "title": title, "body": body });

        let res = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            return Err(format!("webhook returned {}", res.status()));
        }

        Ok(())
    }
}

/// Fans events out to the in-app toast channel (always) and the push channel
/// (permission-gated). The toast path never waits on the push path.
#[derive(Clone)]
pub struct Notifier {
    toasts: broadcast::Sender<Toast>,
    push: Option<Arc<dyn PushChannel>>,
    permission: Arc<Mutex<PushPermission>>,
    push_opt_in: bool,
}

impl Notifier {
    pub fn new(
        toasts: broadcast::Sender<Toast>,
        push: Option<Arc<dyn PushChannel>>,
        permission: PushPermission,
        push_opt_in: bool,
    ) -> Self {
        Self {
            toasts,
            push,
            permission: Arc::new(Mutex::new(permission)),
            push_opt_in,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.toasts.subscribe()
    }

    pub fn toast(&self, level: ToastLevel, message: impl Into<String>) {
        // nobody listening is fine
        let _ = self.toasts.send(Toast {
            level,
            message: message.into(),
        });
    }

    /// Fan out a triggered alert: toast unconditionally, push only with
    /// permission.
    pub async fn alert_triggered(&self, alert: &Alert, price: f64) {
        let message = format!(
            "{} is now {} {:.2} (current: {:.2})",
            alert.symbol,
            alert.condition.as_str(),
            alert.target_price,
            price
        );

        self.toast(ToastLevel::Info, message.clone());
        self.push(&format!("Price alert: {}", alert.symbol), &message)
            .await;
    }

    pub fn permission(&self) -> PushPermission {
        match self.permission.lock() {
            Ok(p) => *p,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    async fn push(&self, title: &str, body: &str) {
        let Some(channel) = self.push.as_ref() else {
            return;
        };

        if !self.permission_granted() {
            return;
        }

        if let Err(e) = channel.send(title, body).await {
            tracing::warn!("push notification via {} failed: {}", channel.name(), e);
        }
    }

    fn permission_granted(&self) -> bool {
        let mut perm = match self.permission.lock() {
            Ok(p) => p,
            Err(poisoned) => poisoned.into_inner(),
        };

        match *perm {
            PushPermission::Granted => true,
            PushPermission::Denied => false,
            PushPermission::Unasked => {
                // one-time request, resolved by configuration
                let granted = self.push_opt_in;
                *perm = if granted {
                    PushPermission::Granted
                } else {
                    PushPermission::Denied
                };
                granted
            }
        }
    }
}
