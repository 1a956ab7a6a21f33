use error_chain::quick_main;
use rosrust_tutorials::backend::RosNode;
use rosrust_tutorials::error::{Result, ResultExt};
use rosrust_tutorials::listener::{self, Listener};
use rosrust_tutorials::logging;
use rosrust_tutorials::node::Node;
use rosrust_tutorials::util::kill;

quick_main!(run);

fn run() -> Result<()> {
    let options = listener::options();
    logging::init(options.is_verbose());

    let (killer, shutdown) = kill::channel();
    killer
        .kill_on_ctrlc()
        .chain_err(|| "Failed to override SIGINT functionality")?;

    let mut node = RosNode::new(&options)?;
    let listener = Listener::subscribe(&mut node)?;

    // Blocks until SIGINT
    let handled = listener.spin(&shutdown);
    log::debug!("Handled {} messages", handled);

    drop(listener);
    node.shutdown();
    Ok(())
}
