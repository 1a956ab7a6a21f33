use crate::args;
use crate::error::{ErrorKind, Result};
use crate::node::Node;
use std::fmt;
use std::time::Duration;
use tutorial_msgs::rospy_tutorials::{AddTwoInts, AddTwoIntsReq};

pub const NODE_NAME: &str = "add_two_ints_client";
pub const SERVICE: &str = "add_two_ints";

/// Grace period before exit so the result line reaches the log sinks.
pub const FLUSH_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Operands {
    pub a: i64,
    pub b: i64,
}

impl Operands {
    /// Reads the operands from positions 1 and 2, ignoring remapping arguments.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args = args::unused_args(args);
        Ok(Self {
            a: parse_at(&args, 1)?,
            b: parse_at(&args, 2)?,
        })
    }
}

fn parse_at(args: &[String], position: usize) -> Result<i64> {
    let value = args
        .get(position)
        .ok_or(ErrorKind::MissingArgument(position))?;
    Ok(value.parse()?)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sum {
    pub a: i64,
    pub b: i64,
    pub sum: i64,
}

impl fmt::Display for Sum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} + {} = {}", self.a, self.b, self.sum)
    }
}

/// Calls `add_two_ints` once and logs the outcome through the node.
pub fn request_sum<N: Node>(node: &N, operands: Operands) -> Result<Sum> {
    let Operands { a, b } = operands;
    let response = node.call::<AddTwoInts>(SERVICE, &AddTwoIntsReq { a, b })?;
    let sum = Sum {
        a,
        b,
        sum: response.sum,
    };
    node_info!(node.logger(), "{}", sum);
    Ok(sum)
}
