use crate::error::Result;
use crate::node::{Node, NodeOptions, ServiceResult};
use crate::requester::{Sum, SERVICE};
use crate::util::kill;
use tutorial_msgs::rospy_tutorials::{AddTwoInts, AddTwoIntsRes};

pub const NODE_NAME: &str = "add_two_ints_server";

pub fn options() -> NodeOptions {
    NodeOptions::new(NODE_NAME).verbose()
}

/// Serves `add_two_ints` for as long as it is alive.
pub struct AdditionServer<N: Node> {
    _service: N::Service,
}

impl<N: Node> AdditionServer<N> {
    pub fn advertise(node: &mut N) -> Result<Self> {
        let logger = node.logger();
        let service = node.advertise::<AddTwoInts, _>(SERVICE, move |req| {
            let sum = add(req.a, req.b)?;
            node_info!(logger, "{}", Sum { a: req.a, b: req.b, sum });
            Ok(AddTwoIntsRes { sum })
        })?;
        node_info!(node.logger(), "Ready to add two ints.");
        Ok(Self { _service: service })
    }

    /// Blocks until `shutdown` trips.
    pub fn spin(&self, shutdown: &kill::Receiver) {
        shutdown.wait();
    }
}

pub fn add(a: i64, b: i64) -> ServiceResult<i64> {
    a.checked_add(b)
        .ok_or_else(|| format!("{} + {} overflows int64", a, b))
}
