#[cfg(not(target_os = "windows"))]
use tokio::signal::unix::{SignalKind, signal};

/// Fires `sender` once the process is asked to stop (SIGTERM or Ctrl-C).
#[cfg(not(target_os = "windows"))]
pub fn create_term_signal_handler(sender: tokio::sync::oneshot::Sender<()>) {
    tokio::spawn(async move {
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("signal error: {e}");
                return;
            }
        };

        tracing::info!("register terminate signal handler");

        tokio::select! {
            _ = terminate.recv() => tracing::info!("got terminate signal"),
            _ = tokio::signal::ctrl_c() => tracing::info!("got interrupt signal"),
        }

        let _: Result<(), _> = sender.send(());
    });
}

#[cfg(target_os = "windows")]
pub fn create_term_signal_handler(sender: tokio::sync::oneshot::Sender<()>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("got interrupt signal");
        }

        let _: Result<(), _> = sender.send(());
    });
}
