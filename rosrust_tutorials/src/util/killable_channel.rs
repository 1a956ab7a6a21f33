use super::kill;
use crossbeam::channel::{self, select};

/// Iterates over a data channel until the kill signal trips or every sender
/// is gone.
pub struct Killable<'a, T> {
    data_rx: &'a channel::Receiver<T>,
    kill_rx: &'a kill::Receiver,
}

impl<'a, T> Killable<'a, T> {
    pub fn new(data_rx: &'a channel::Receiver<T>, kill_rx: &'a kill::Receiver) -> Self {
        Self { data_rx, kill_rx }
    }
}

impl<'a, T> Iterator for Killable<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.kill_rx.is_killed() {
            return None;
        }
        select! {
            recv(self.data_rx) -> msg => msg.ok(),
            recv(self.kill_rx.kill_rx) -> _ => None,
        }
    }
}
