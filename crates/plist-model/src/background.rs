//! Off-thread execution for codec + file I/O work.
//!
//! Work runs on tokio's blocking pool when called from inside a runtime and
//! on a plain thread otherwise. The result comes back over a oneshot
//! channel, so whoever awaits it (the caller's task) is where completion
//! code runs. Dropping the receiver detaches the work; it still finishes.

use tokio::sync::oneshot;

pub(crate) fn spawn_io<T, F>(task: F) -> oneshot::Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let run = move || {
        // The receiver may be gone; the work itself has already happened.
        let _ = tx.send(task());
    };
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(run);
        }
        Err(_) => {
            std::thread::spawn(run);
        }
    }
    rx
}
