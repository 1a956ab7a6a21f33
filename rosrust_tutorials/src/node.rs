//! The seam between the tutorial components and a middleware backend.
//!
//! Components receive an explicitly constructed node instead of touching
//! process-global client state, so the same component code runs against a
//! live ROS master (`backend::RosNode`) and an in-process graph
//! (`backend::MemoryGraph`).

use crate::args;
use crate::error::Result;
use rosrust::{Message, ServicePair};
use std::cmp;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub use rosrust::msg::rosgraph_msgs::Log;

pub type ServiceResult<T> = std::result::Result<T, String>;

pub const ROSOUT: &str = "/rosout";

/// Destination of node-level log lines, normally the `/rosout` aggregator.
///
/// `level` takes the `rosgraph_msgs/Log` severities (`Log::INFO`, ...).
pub trait LogSink: Clone + Send + Sync + 'static {
    fn log(&self, level: i8, msg: String, file: &str, line: u32);
}

pub trait Publish<T: Message> {
    fn send(&mut self, message: T) -> Result<()>;
}

pub trait Node {
    /// Keeps a subscription alive. Dropping it unsubscribes.
    type Subscriber;
    /// Keeps an advertised service alive. Dropping it unadvertises.
    type Service;
    type Logger: LogSink;

    /// Fully qualified name the node was registered under.
    fn name(&self) -> &str;

    /// Handle for logging through the middleware on behalf of this node.
    fn logger(&self) -> Self::Logger;

    /// Calls `service` once and blocks until the response arrives.
    fn call<T: ServicePair>(&self, service: &str, request: &T::Request) -> Result<T::Response>;

    fn subscribe<T, F>(
        &mut self,
        topic: &str,
        queue_size: usize,
        callback: F,
    ) -> Result<Self::Subscriber>
    where
        T: Message,
        F: Fn(T) + Send + 'static;

    fn advertise<T, F>(&mut self, service: &str, handler: F) -> Result<Self::Service>
    where
        T: ServicePair,
        F: Fn(T::Request) -> ServiceResult<T::Response> + Send + Sync + 'static;

    fn publish<T: Message>(
        &mut self,
        topic: &str,
        queue_size: usize,
    ) -> Result<Box<dyn Publish<T>>>;

    /// Tears the node down. Handles created by the node stop working.
    fn shutdown(self)
    where
        Self: Sized,
    {
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeOptions {
    name: String,
    anonymous: bool,
    verbose: bool,
}

impl NodeOptions {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            anonymous: false,
            verbose: false,
        }
    }

    /// Appends a unique suffix to the name so several instances can coexist.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Lowers the default log level to debug.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Name to register, honoring a `__name:=` remapping in `args`.
    ///
    /// An explicit remapping wins over anonymous naming.
    pub fn resolve_name(&self, args: &[String]) -> String {
        if let Some(name) = args::find_with_prefix(args, "__name:=") {
            return name;
        }
        if self.anonymous {
            anonymous_name(&self.name)
        } else {
            self.name.clone()
        }
    }
}

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// `<base>_<pid>_<millis>`, with the stamp forced to increase within the process.
pub fn anonymous_name(base: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|v| v.as_millis() as u64)
        .unwrap_or_default();
    let previous = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(cmp::max(last + 1, now))
        })
        .unwrap_or(now);
    let stamp = cmp::max(previous + 1, now);
    format!("{}_{}_{}", base, process::id(), stamp)
}
