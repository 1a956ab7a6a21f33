use crate::error::Result;
use crate::node::{Node, NodeOptions, Publish};
use crate::util::kill;
use std::time::Duration;
use tutorial_msgs::std_msgs;

pub const NODE_NAME: &str = "talker";
pub const TOPIC: &str = "chatter";
pub const DEFAULT_RATE: f64 = 10.0;
const QUEUE_SIZE: usize = 100;

pub fn options() -> NodeOptions {
    NodeOptions::new(NODE_NAME)
}

pub struct Talker<N: Node> {
    publisher: Box<dyn Publish<std_msgs::String>>,
    logger: N::Logger,
    count: usize,
}

impl<N: Node> Talker<N> {
    pub fn advertise(node: &mut N) -> Result<Self> {
        Ok(Self {
            publisher: node.publish::<std_msgs::String>(TOPIC, QUEUE_SIZE)?,
            logger: node.logger(),
            count: 0,
        })
    }

    /// Publishes one message right away.
    pub fn say(&mut self, data: &str) -> Result<()> {
        node_info!(self.logger, "{}", data);
        self.publisher.send(std_msgs::String::new(data))
    }

    /// Publishes `hello world <n>` once per `period` until `shutdown` trips.
    /// Returns how many greetings were sent in total.
    pub fn spin(&mut self, shutdown: &kill::Receiver, period: Duration) -> Result<usize> {
        while !shutdown.is_killed() {
            let data = greeting(self.count);
            self.say(&data)?;
            self.count += 1;
            if shutdown.wait_timeout(period) {
                break;
            }
        }
        Ok(self.count)
    }
}

pub fn greeting(count: usize) -> String {
    format!("hello world {}", count)
}

pub fn period(rate: f64) -> Duration {
    Duration::from_secs_f64(1.0 / rate)
}
