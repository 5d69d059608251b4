use crate::error::{Result, SifterError};

/// Runs CPU-bound work on the blocking pool so the request loop stays
/// responsive. A panic in `f` is reported as an internal error.
pub async fn run_on_worker_thread<F, R>(name: &str, f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    let task = name.to_owned();
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        if e.is_panic() {
            SifterError::Other(format!("{task} panicked"))
        } else {
            SifterError::Other(format!("Worker task {task} failed: {e}"))
        }
    })?
}

/// Crate version reported by `sifter --version` and the serve banner.
pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
