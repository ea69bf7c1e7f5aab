//! Process termination requested through the interface.
//!
//! Handlers only fire the trigger; whether and how the process exits is
//! decided by `main`, which folds the listener into its graceful shutdown.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownTrigger {
    pub fn new() -> (Self, ShutdownListener) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, ShutdownListener { rx })
    }

    /// Request shutdown. Repeated calls are harmless.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl ShutdownListener {
    /// Resolves once shutdown has been requested.
    pub async fn wait(mut self) {
        let observed = self.rx.wait_for(|requested| *requested).await.map(|_| ());
        // Err means every trigger was dropped, which can never fire again
        if observed.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
