use tokio::sync::watch;

pub(crate) fn shutdown_signal() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);

    (ShutdownHandle { tx }, ShutdownSignal { rx })
}

/// Signals shutdown when `shutdown()` is called or when it's dropped, whichever comes first.
pub(crate) struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub(crate) fn shutdown(&self) {
        // Only fails if every signal is gone, in which case nobody is left to stop.
        let _ = self.tx.send(true);
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// ShutdownSignal can be cloned into every task that has to stop with the node: the gRPC server,
/// each stream session and each gossip session.
#[derive(Clone)]
pub(crate) struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub(crate) fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been signaled. Resolves immediately if it already was.
    pub(crate) async fn wait(mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Handle dropped. Its drop already sent `true`, but don't rely on observing it.
                return;
            }
        }
    }
}
