#![allow(dead_code)]

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

/// Installs a test-friendly `tracing` subscriber, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A one-shot gate a task can block on until the test opens it.
#[derive(Clone)]
pub struct Gate {
    tx: Sender<()>,
    rx: Arc<parking_lot::Mutex<Receiver<()>>>,
}

impl Gate {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Arc::new(parking_lot::Mutex::new(rx)),
        }
    }

    /// Blocks until [`open`](Self::open) is called.
    pub fn wait(&self) {
        let _ = self.rx.lock().recv();
    }

    pub fn open(&self) {
        let _ = self.tx.send(());
    }
}
