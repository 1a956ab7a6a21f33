use error_chain::quick_main;
use rosrust_tutorials::backend::RosNode;
use rosrust_tutorials::error::Result;
use rosrust_tutorials::node::{Node, NodeOptions};
use rosrust_tutorials::{logging, requester};
use std::{env, thread};

quick_main!(run);

fn run() -> Result<()> {
    let options = NodeOptions::new(requester::NODE_NAME);
    logging::init(options.is_verbose());

    let operands = requester::Operands::from_args(env::args())?;

    let node = RosNode::new(&options)?;
    requester::request_sum(&node, operands)?;

    thread::sleep(requester::FLUSH_DELAY);
    node.shutdown();
    Ok(())
}
