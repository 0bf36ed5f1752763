//! Termination signal handling for batch runs.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::signal;

/// Set `stop` when the process receives Ctrl+C or SIGTERM.
///
/// The listener runs on its own thread with a small current-thread runtime
/// and lives until the process exits. Workers observe the flag between
/// files and before committing output.
pub fn listen(stop: Arc<AtomicBool>) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("tileforged-signals".to_string())
        .spawn(move || {
            runtime.block_on(wait_for_signal());
            tracing::warn!("Termination requested, finishing in-flight files");
            stop.store(true, Ordering::SeqCst);
        })?;

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            never_fires("Ctrl+C", e).await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => never_fires("SIGTERM", e).await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// A handler that failed to install must not count as a signal; log it and
/// leave the other source in charge.
async fn never_fires(name: &str, error: io::Error) {
    tracing::error!("Failed to install {} handler: {}", name, error);
    std::future::pending::<()>().await
}
