use crate::error::Result;
use crate::node::{Node, NodeOptions};
use crate::util::kill;
use crate::util::killable_channel::Killable;
use crossbeam::channel::{unbounded, Receiver};
use log::debug;
use tutorial_msgs::std_msgs;

pub const NODE_NAME: &str = "listener";
pub const TOPIC: &str = "chatter";
const QUEUE_SIZE: usize = 100;

/// Anonymous so several listeners can run side by side, verbose logging.
pub fn options() -> NodeOptions {
    NodeOptions::new(NODE_NAME).anonymous().verbose()
}

/// Subscription to `chatter` whose messages are consumed by [`Listener::spin`].
pub struct Listener<N: Node> {
    name: String,
    inbox: Receiver<std_msgs::String>,
    logger: N::Logger,
    _subscriber: N::Subscriber,
}

impl<N: Node> Listener<N> {
    pub fn subscribe(node: &mut N) -> Result<Self> {
        let (inbox_tx, inbox) = unbounded();
        let subscriber =
            node.subscribe::<std_msgs::String, _>(TOPIC, QUEUE_SIZE, move |message| {
                if inbox_tx.send(message).is_err() {
                    debug!("Listener is gone, dropping message");
                }
            })?;
        Ok(Self {
            name: node.name().into(),
            inbox,
            logger: node.logger(),
            _subscriber: subscriber,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logs every received message through the node until `shutdown` trips
    /// or the subscription closes. Returns the number of messages handled.
    pub fn spin(&self, shutdown: &kill::Receiver) -> usize {
        let mut handled = 0;
        for message in Killable::new(&self.inbox, shutdown) {
            node_info!(self.logger, "{}", heard(&self.name, &message.data));
            handled += 1;
        }
        handled
    }
}

pub fn heard(name: &str, data: &str) -> String {
    format!("{}: I heard {}", name, data)
}
