use std::future::Future;

/// Two-phase optimistic update: apply the patch locally, attempt the
/// persistence write, and on failure apply the inverse patch, so memory never
/// disagrees with the store once the call returns.
pub async fn apply<T, P, R, Fut>(
    target: &mut T,
    patch: P,
    revert: R,
    persist: Fut,
) -> Result<(), String>
where
    P: FnOnce(&mut T),
    R: FnOnce(&mut T),
    Fut: Future<Output = Result<(), String>>,
{
    patch(target);

    match persist.await {
        Ok(()) => Ok(()),
        Err(e) => {
            revert(target);
            Err(e)
        }
    }
}
