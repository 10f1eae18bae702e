use crate::events::AppEvent;
use async_channel::Sender;
use std::thread;
use tokio::runtime::Runtime;

/// Everything that is not the GTK main loop runs here: the control socket
/// and the config watcher, on one dedicated tokio thread.
pub fn start_background_services(tx: Sender<AppEvent>) {
    thread::Builder::new()
        .name("loopstone-services".into())
        .spawn(move || {
            let rt = Runtime::new().expect("Failed to create Tokio runtime");

            rt.block_on(async {
                let server_tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(server_tx).await;
                });

                let watcher_tx = tx;
                tokio::spawn(async move {
                    crate::config::run_async_watcher(watcher_tx).await;
                });

                log::debug!("Background services started");
                std::future::pending::<()>().await;
            });
        })
        .expect("Failed to spawn background service thread");
}
