use crossbeam::channel::{unbounded, Receiver, Sender, TrySendError};

/// Bounded queue that evicts the oldest entry instead of blocking the sender.
///
/// A `queue_size` of zero leaves the queue unbounded.
pub fn lossy_channel<T>(queue_size: usize) -> (LossySender<T>, Receiver<T>) {
    let (tx, rx) = unbounded();
    let sender = LossySender {
        tx,
        rx: rx.clone(),
        queue_size,
    };
    (sender, rx)
}

#[derive(Clone)]
pub struct LossySender<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    queue_size: usize,
}

impl<T> LossySender<T> {
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        self.tx.try_send(msg)?;
        if self.queue_size == 0 {
            return Ok(());
        }
        while self.rx.len() > self.queue_size {
            if self.rx.try_recv().is_err() {
                break;
            }
        }
        Ok(())
    }
}
