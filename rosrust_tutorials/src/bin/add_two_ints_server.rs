use error_chain::quick_main;
use rosrust_tutorials::backend::RosNode;
use rosrust_tutorials::error::{Result, ResultExt};
use rosrust_tutorials::logging;
use rosrust_tutorials::node::Node;
use rosrust_tutorials::server::{self, AdditionServer};
use rosrust_tutorials::util::kill;

quick_main!(run);

fn run() -> Result<()> {
    let options = server::options();
    logging::init(options.is_verbose());

    let (killer, shutdown) = kill::channel();
    killer
        .kill_on_ctrlc()
        .chain_err(|| "Failed to override SIGINT functionality")?;

    let mut node = RosNode::new(&options)?;
    let server = AdditionServer::advertise(&mut node)?;
    server.spin(&shutdown);

    drop(server);
    node.shutdown();
    Ok(())
}
