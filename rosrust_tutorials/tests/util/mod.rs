use crossbeam::channel::{unbounded, Receiver};
use rosrust_tutorials::backend::{MemoryGraph, MemoryNode, MemoryRegistration};
use rosrust_tutorials::listener::Listener;
use rosrust_tutorials::node::{Log, Node, NodeOptions, ROSOUT};
use rosrust_tutorials::util::kill;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[allow(dead_code)]
pub const TIMEOUT: Duration = Duration::from_secs(2);

/// How long a watcher waits before concluding nothing else is coming.
#[allow(dead_code)]
pub const QUIET: Duration = Duration::from_millis(50);

#[allow(dead_code)]
pub type MemoryListener = Listener<MemoryNode>;

#[allow(dead_code)]
pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|&v| String::from(v)).collect()
}

pub fn node(graph: &MemoryGraph, options: NodeOptions) -> MemoryNode {
    graph.node(&options).unwrap()
}

/// Runs the listener loop on its own thread.
#[allow(dead_code)]
pub fn spawn_listener(listener: MemoryListener, shutdown: kill::Receiver) -> JoinHandle<usize> {
    thread::spawn(move || listener.spin(&shutdown))
}

/// Node that collects every record published on `/rosout`.
///
/// Records from other nodes are kept aside until asked for.
pub struct RosoutWatcher {
    records: Receiver<Log>,
    backlog: RefCell<VecDeque<Log>>,
    _subscriber: MemoryRegistration,
    _node: MemoryNode,
}

#[allow(dead_code)]
impl RosoutWatcher {
    pub fn new(graph: &MemoryGraph) -> Self {
        let mut node = node(graph, NodeOptions::new("rosout_watcher").anonymous());
        let (records_tx, records) = unbounded();
        let subscriber = node
            .subscribe::<Log, _>(ROSOUT, 1000, move |record| {
                records_tx.send(record).ok();
            })
            .unwrap();
        Self {
            records,
            backlog: RefCell::new(VecDeque::new()),
            _subscriber: subscriber,
            _node: node,
        }
    }

    /// Messages of the next `count` records logged by `name`.
    pub fn lines_from(&self, name: &str, count: usize) -> Vec<String> {
        let mut lines = self.take_backlog(name, count);
        let deadline = Instant::now() + TIMEOUT;
        while lines.len() < count {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.records.recv_timeout(left) {
                Ok(record) if record.name == name => lines.push(record.msg),
                Ok(record) => self.backlog.borrow_mut().push_back(record),
                Err(_) => panic!(
                    "only {} of {} lines from {} arrived: {:?}",
                    lines.len(),
                    count,
                    name,
                    lines
                ),
            }
        }
        lines
    }

    /// Messages logged by `name` until the graph stays quiet for `QUIET`.
    pub fn remaining_from(&self, name: &str) -> Vec<String> {
        let mut lines = self.take_backlog(name, usize::MAX);
        while let Ok(record) = self.records.recv_timeout(QUIET) {
            if record.name == name {
                lines.push(record.msg);
            } else {
                self.backlog.borrow_mut().push_back(record);
            }
        }
        lines
    }

    fn take_backlog(&self, name: &str, count: usize) -> Vec<String> {
        let mut backlog = self.backlog.borrow_mut();
        let mut lines = vec![];
        let mut kept = VecDeque::with_capacity(backlog.len());
        for record in backlog.drain(..) {
            if record.name == name && lines.len() < count {
                lines.push(record.msg);
            } else {
                kept.push_back(record);
            }
        }
        *backlog = kept;
        lines
    }
}
