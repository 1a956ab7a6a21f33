//! Broadcast cancellation signal shared by every blocking loop.
//!
//! Nothing is ever sent over the channel. Killing drops the only sender, so
//! every receiver clone observes the disconnect and keeps observing it.
//! Dropping all killers without calling `kill` has the same effect.

use crossbeam::channel::{self, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct Killer {
    kill_tx: Arc<Mutex<Option<channel::Sender<()>>>>,
}

impl Killer {
    /// Trips the signal. Returns `false` if it was already tripped.
    pub fn kill(&self) -> bool {
        self.kill_tx.lock().expect(FAILED_TO_LOCK).take().is_some()
    }

    /// Installs a SIGINT handler that trips this signal.
    pub fn kill_on_ctrlc(&self) -> Result<(), ctrlc::Error> {
        let killer = self.clone();
        ctrlc::set_handler(move || {
            if !killer.kill() {
                log::info!("Node is already shutting down");
            }
        })
    }
}

#[derive(Clone)]
pub struct Receiver {
    pub(crate) kill_rx: channel::Receiver<()>,
}

impl Receiver {
    pub fn is_killed(&self) -> bool {
        matches!(self.kill_rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Blocks for up to `timeout`, returning `true` if the signal tripped.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.kill_rx.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    /// Blocks until the signal trips.
    pub fn wait(&self) {
        while self.kill_rx.recv().is_ok() {}
    }
}

pub fn channel() -> (Killer, Receiver) {
    let (kill_tx, kill_rx) = channel::bounded(0);
    (
        Killer {
            kill_tx: Arc::new(Mutex::new(Some(kill_tx))),
        },
        Receiver { kill_rx },
    )
}

static FAILED_TO_LOCK: &str = "Failed to acquire lock on kill switch";
