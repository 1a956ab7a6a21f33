//! In-process node graph.
//!
//! Stands in for a ROS master and the TCPROS links between nodes. Messages
//! cross the graph encoded with `RosMsg`, tagged by md5 sum, so type
//! mismatches and serialization bugs surface the same way they would on a
//! live system. Node log lines are published as `rosgraph_msgs/Log` on the
//! in-graph `/rosout` topic.

use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::node::{Log, LogSink, Node, NodeOptions, Publish, ServiceResult, ROSOUT};
use crate::util::lossy_channel::{lossy_channel, LossySender};
use log::{debug, error, log, Level};
use rosrust::{Message, RosMsg, ServicePair};
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::thread;

type RawHandler = Arc<dyn Fn(&[u8]) -> ServiceResult<Vec<u8>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct MemoryGraph {
    state: Arc<Mutex<GraphState>>,
}

#[derive(Default)]
struct GraphState {
    next_id: usize,
    nodes: BTreeMap<String, usize>,
    topics: HashMap<String, TopicState>,
    services: HashMap<String, ServiceState>,
}

struct TopicState {
    msg_type: String,
    md5sum: String,
    publishers: BTreeMap<usize, usize>,
    subscribers: BTreeMap<usize, SubscriberState>,
}

struct SubscriberState {
    node_id: usize,
    data_tx: LossySender<Vec<u8>>,
}

struct ServiceState {
    id: usize,
    node_id: usize,
    msg_type: String,
    md5sum: String,
    handler: RawHandler,
}

impl TopicState {
    fn fan_out(&self, data: &[u8]) {
        for subscriber in self.subscribers.values() {
            if subscriber.data_tx.try_send(data.to_vec()).is_err() {
                debug!("Dropped message for a closed subscription");
            }
        }
    }
}

impl GraphState {
    fn allocate_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn is_alive(&self, node_id: usize) -> bool {
        self.nodes.values().any(|&id| id == node_id)
    }

    fn topic(&mut self, name: &str, msg_type: &str, md5sum: &str) -> Result<&mut TopicState> {
        let topic = self
            .topics
            .entry(name.into())
            .or_insert_with(|| TopicState {
                msg_type: msg_type.into(),
                md5sum: md5sum.into(),
                publishers: BTreeMap::new(),
                subscribers: BTreeMap::new(),
            });
        if topic.md5sum != md5sum {
            bail!(ErrorKind::TypeMismatch(
                name.into(),
                topic.msg_type.clone(),
                msg_type.into(),
            ));
        }
        Ok(topic)
    }

    fn prune_topic(&mut self, name: &str) {
        let unused = self
            .topics
            .get(name)
            .map(|v| v.publishers.is_empty() && v.subscribers.is_empty())
            .unwrap_or(false);
        if unused {
            self.topics.remove(name);
        }
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node. Fails if the resolved name is already taken.
    pub fn node(&self, options: &NodeOptions) -> Result<MemoryNode> {
        let name = resolve("/", &options.resolve_name(&[]));
        let mut state = self.lock();
        if state.nodes.contains_key(&name) {
            bail!(ErrorKind::NameTaken(name));
        }
        let id = state.allocate_id();
        state.nodes.insert(name.clone(), id);
        debug!("Registered node {}", name);
        Ok(MemoryNode {
            graph: self.clone(),
            id,
            name,
        })
    }

    pub fn node_names(&self) -> Vec<String> {
        self.lock().nodes.keys().cloned().collect()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock()
            .topics
            .get(&resolve("/", topic))
            .map(|v| v.subscribers.len())
            .unwrap_or(0)
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.lock().services.contains_key(&resolve("/", service))
    }

    fn lock(&self) -> std::sync::MutexGuard<GraphState> {
        self.state.lock().expect(FAILED_TO_LOCK)
    }

    fn add_subscriber(
        &self,
        node_id: usize,
        topic: &str,
        msg_type: &str,
        md5sum: &str,
        data_tx: LossySender<Vec<u8>>,
    ) -> Result<usize> {
        let mut state = self.lock();
        let id = state.allocate_id();
        state
            .topic(topic, msg_type, md5sum)?
            .subscribers
            .insert(id, SubscriberState { node_id, data_tx });
        Ok(id)
    }

    fn add_publisher(
        &self,
        node_id: usize,
        topic: &str,
        msg_type: &str,
        md5sum: &str,
    ) -> Result<usize> {
        let mut state = self.lock();
        let id = state.allocate_id();
        state
            .topic(topic, msg_type, md5sum)?
            .publishers
            .insert(id, node_id);
        Ok(id)
    }

    fn add_service(
        &self,
        node_id: usize,
        service: &str,
        msg_type: &str,
        md5sum: &str,
        handler: RawHandler,
    ) -> Result<usize> {
        let mut state = self.lock();
        if state.services.contains_key(service) {
            bail!(ErrorKind::Duplicate(service.into()));
        }
        let id = state.allocate_id();
        state.services.insert(
            service.into(),
            ServiceState {
                id,
                node_id,
                msg_type: msg_type.into(),
                md5sum: md5sum.into(),
                handler,
            },
        );
        Ok(id)
    }

    fn lookup_service(&self, service: &str, msg_type: &str, md5sum: &str) -> Result<RawHandler> {
        let state = self.lock();
        let entry = match state.services.get(service) {
            Some(entry) => entry,
            None => {
                return Err(Error::from("no provider"))
                    .chain_err(|| ErrorKind::Communication(service.into()))
            }
        };
        if entry.md5sum != md5sum {
            bail!(ErrorKind::TypeMismatch(
                service.into(),
                entry.msg_type.clone(),
                msg_type.into(),
            ));
        }
        Ok(entry.handler.clone())
    }

    fn deliver(&self, node_id: usize, topic: &str, data: Vec<u8>) -> Result<()> {
        let state = self.lock();
        if !state.is_alive(node_id) {
            bail!(ErrorKind::Closed(topic.into()));
        }
        if let Some(topic) = state.topics.get(topic) {
            topic.fan_out(&data);
        }
        Ok(())
    }

    /// Sends to whoever subscribes to `topic` without holding a publisher.
    ///
    /// Skipped silently for dead nodes and for subscribers of another type.
    fn broadcast(&self, node_id: usize, topic: &str, md5sum: &str, data: &[u8]) {
        let state = self.lock();
        if !state.is_alive(node_id) {
            return;
        }
        if let Some(topic) = state.topics.get(topic) {
            if topic.md5sum == md5sum {
                topic.fan_out(data);
            }
        }
    }

    fn unregister(&self, registration: &Registration) {
        let mut state = self.lock();
        match *registration {
            Registration::Subscriber { ref topic, id } => {
                if let Some(v) = state.topics.get_mut(topic) {
                    v.subscribers.remove(&id);
                }
                state.prune_topic(topic);
            }
            Registration::Publisher { ref topic, id } => {
                if let Some(v) = state.topics.get_mut(topic) {
                    v.publishers.remove(&id);
                }
                state.prune_topic(topic);
            }
            Registration::Service { ref service, id } => {
                if state.services.get(service).map(|v| v.id) == Some(id) {
                    state.services.remove(service);
                }
            }
        }
    }

    fn remove_node(&self, name: &str, node_id: usize) {
        let mut state = self.lock();
        state.nodes.remove(name);
        state.services.retain(|_, v| v.node_id != node_id);
        for topic in state.topics.values_mut() {
            topic.subscribers.retain(|_, v| v.node_id != node_id);
            topic.publishers.retain(|_, &mut v| v != node_id);
        }
        state
            .topics
            .retain(|_, v| !v.publishers.is_empty() || !v.subscribers.is_empty());
        debug!("Unregistered node {}", name);
    }
}

/// Node attached to a `MemoryGraph`. Dropping it unregisters the node along
/// with everything it still has registered.
pub struct MemoryNode {
    graph: MemoryGraph,
    id: usize,
    name: String,
}

impl Drop for MemoryNode {
    fn drop(&mut self) {
        self.graph.remove_node(&self.name, self.id);
    }
}

impl Node for MemoryNode {
    type Subscriber = MemoryRegistration;
    type Service = MemoryRegistration;
    type Logger = MemoryLogger;

    fn name(&self) -> &str {
        &self.name
    }

    fn logger(&self) -> Self::Logger {
        MemoryLogger {
            graph: self.graph.clone(),
            node_id: self.id,
            name: self.name.clone(),
        }
    }

    fn call<T: ServicePair>(&self, service: &str, request: &T::Request) -> Result<T::Response> {
        let service = resolve(&self.name, service);
        let handler = self
            .graph
            .lookup_service(&service, &T::msg_type(), &T::md5sum())?;
        let data = request.encode_vec()?;
        match handler(&data) {
            Ok(response) => Ok(<T::Response as RosMsg>::decode_slice(&response)?),
            Err(message) => bail!(ErrorKind::ServiceFailed(service, message)),
        }
    }

    fn subscribe<T, F>(
        &mut self,
        topic: &str,
        queue_size: usize,
        callback: F,
    ) -> Result<Self::Subscriber>
    where
        T: Message,
        F: Fn(T) + Send + 'static,
    {
        let topic = resolve(&self.name, topic);
        let (data_tx, data_rx) = lossy_channel(queue_size);
        let id = self
            .graph
            .add_subscriber(self.id, &topic, &T::msg_type(), &T::md5sum(), data_tx)?;
        thread::spawn({
            let topic = topic.clone();
            move || {
                for data in data_rx.iter() {
                    match T::decode_slice(&data) {
                        Ok(message) => callback(message),
                        Err(err) => error!("Failed to decode message on {}: {}", topic, err),
                    }
                }
            }
        });
        Ok(MemoryRegistration::new(
            &self.graph,
            Registration::Subscriber { topic, id },
        ))
    }

    fn advertise<T, F>(&mut self, service: &str, handler: F) -> Result<Self::Service>
    where
        T: ServicePair,
        F: Fn(T::Request) -> ServiceResult<T::Response> + Send + Sync + 'static,
    {
        let service = resolve(&self.name, service);
        let raw_handler: RawHandler = Arc::new(move |data: &[u8]| -> ServiceResult<Vec<u8>> {
            let request =
                <T::Request as RosMsg>::decode_slice(data).map_err(|err| err.to_string())?;
            handler(request)?
                .encode_vec()
                .map_err(|err| err.to_string())
        });
        let id = self.graph.add_service(
            self.id,
            &service,
            &T::msg_type(),
            &T::md5sum(),
            raw_handler,
        )?;
        Ok(MemoryRegistration::new(
            &self.graph,
            Registration::Service { service, id },
        ))
    }

    fn publish<T: Message>(
        &mut self,
        topic: &str,
        _queue_size: usize,
    ) -> Result<Box<dyn Publish<T>>> {
        let topic = resolve(&self.name, topic);
        let id = self
            .graph
            .add_publisher(self.id, &topic, &T::msg_type(), &T::md5sum())?;
        Ok(Box::new(MemoryPublisher {
            graph: self.graph.clone(),
            node_id: self.id,
            topic: topic.clone(),
            _raii: MemoryRegistration::new(&self.graph, Registration::Publisher { topic, id }),
            _phantom: PhantomData,
        }))
    }
}

struct MemoryPublisher<T> {
    graph: MemoryGraph,
    node_id: usize,
    topic: String,
    _raii: MemoryRegistration,
    _phantom: PhantomData<fn(T)>,
}

impl<T: Message> Publish<T> for MemoryPublisher<T> {
    fn send(&mut self, message: T) -> Result<()> {
        let data = message.encode_vec()?;
        self.graph.deliver(self.node_id, &self.topic, data)
    }
}

/// Writes through `log` and publishes a `rosgraph_msgs/Log` on `/rosout`.
#[derive(Clone)]
pub struct MemoryLogger {
    graph: MemoryGraph,
    node_id: usize,
    name: String,
}

impl LogSink for MemoryLogger {
    fn log(&self, level: i8, msg: String, file: &str, line: u32) {
        log!(target: self.name.as_str(), log_level(level), "{}", msg);
        let record = Log {
            level,
            name: self.name.clone(),
            msg,
            file: file.into(),
            line,
            ..Default::default()
        };
        match record.encode_vec() {
            Ok(data) => self
                .graph
                .broadcast(self.node_id, ROSOUT, &Log::md5sum(), &data),
            Err(err) => error!("Failed to encode log record: {}", err),
        }
    }
}

fn log_level(level: i8) -> Level {
    if level >= Log::ERROR {
        Level::Error
    } else if level >= Log::WARN {
        Level::Warn
    } else if level >= Log::INFO {
        Level::Info
    } else {
        Level::Debug
    }
}

enum Registration {
    Subscriber { topic: String, id: usize },
    Publisher { topic: String, id: usize },
    Service { service: String, id: usize },
}

/// Handle returned for subscriptions and services. Unregisters on drop.
pub struct MemoryRegistration {
    graph: MemoryGraph,
    registration: Registration,
}

impl MemoryRegistration {
    fn new(graph: &MemoryGraph, registration: Registration) -> Self {
        Self {
            graph: graph.clone(),
            registration,
        }
    }
}

impl Drop for MemoryRegistration {
    fn drop(&mut self) {
        self.graph.unregister(&self.registration);
    }
}

/// Resolves `name` the way ROS does for a node named `node`.
fn resolve(node: &str, name: &str) -> String {
    if name.starts_with('/') {
        name.into()
    } else if let Some(private) = name.strip_prefix('~') {
        format!("{}/{}", node.trim_end_matches('/'), private)
    } else {
        format!("/{}", name)
    }
}

static FAILED_TO_LOCK: &str = "Failed to acquire lock on memory graph";

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::unbounded;
    use std::time::Duration;
    use tutorial_msgs::rospy_tutorials::{AddTwoInts, AddTwoIntsReq, AddTwoIntsRes};
    use tutorial_msgs::std_msgs;

    #[test]
    fn resolves_global_private_and_relative_names() {
        assert_eq!(resolve("/talker", "/chatter"), "/chatter");
        assert_eq!(resolve("/talker", "chatter"), "/chatter");
        assert_eq!(resolve("/talker", "~rate"), "/talker/rate");
    }

    #[test]
    fn rejects_duplicate_node_names_until_dropped() {
        let graph = MemoryGraph::new();
        let node = graph.node(&NodeOptions::new("talker")).unwrap();
        assert_eq!(node.name(), "/talker");
        match graph.node(&NodeOptions::new("talker")) {
            Err(Error(ErrorKind::NameTaken(name), _)) => assert_eq!(name, "/talker"),
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("duplicate node registered"),
        }
        node.shutdown();
        assert!(graph.node_names().is_empty());
        graph.node(&NodeOptions::new("talker")).unwrap();
    }

    #[test]
    fn delivers_published_messages_in_order() {
        let graph = MemoryGraph::new();
        let mut listener = graph.node(&NodeOptions::new("listener")).unwrap();
        let mut talker = graph.node(&NodeOptions::new("talker")).unwrap();
        let (tx, rx) = unbounded();
        let _sub = listener
            .subscribe("chatter", 10, move |msg: std_msgs::String| {
                tx.send(msg.data).unwrap();
            })
            .unwrap();
        let mut publisher = talker.publish::<std_msgs::String>("/chatter", 10).unwrap();
        publisher.send(std_msgs::String::new("a")).unwrap();
        publisher.send(std_msgs::String::new("b")).unwrap();
        let timeout = Duration::from_secs(1);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "a");
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "b");
    }

    #[test]
    fn dropping_subscriber_unregisters_it() {
        let graph = MemoryGraph::new();
        let mut node = graph.node(&NodeOptions::new("listener")).unwrap();
        let sub = node
            .subscribe("chatter", 1, |_: std_msgs::String| {})
            .unwrap();
        assert_eq!(graph.subscriber_count("chatter"), 1);
        drop(sub);
        assert_eq!(graph.subscriber_count("chatter"), 0);
    }

    #[test]
    fn rejects_mismatched_topic_types() {
        let graph = MemoryGraph::new();
        let mut node = graph.node(&NodeOptions::new("mixed")).unwrap();
        let _sub = node
            .subscribe("chatter", 1, |_: std_msgs::String| {})
            .unwrap();
        match node.publish::<AddTwoIntsRes>("chatter", 1) {
            Err(Error(ErrorKind::TypeMismatch(topic, expected, actual), _)) => {
                assert_eq!(topic, "/chatter");
                assert_eq!(expected, "std_msgs/String");
                assert_eq!(actual, "rospy_tutorials/AddTwoIntsResponse");
            }
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("mismatched publisher registered"),
        }
    }

    #[test]
    fn calls_advertised_service() {
        let graph = MemoryGraph::new();
        let mut server = graph.node(&NodeOptions::new("server")).unwrap();
        let client = graph.node(&NodeOptions::new("client")).unwrap();
        let _service = server
            .advertise::<AddTwoInts, _>("add_two_ints", |req| {
                Ok(AddTwoIntsRes { sum: req.a * req.b })
            })
            .unwrap();
        let res = client
            .call::<AddTwoInts>("add_two_ints", &AddTwoIntsReq { a: 6, b: 7 })
            .unwrap();
        assert_eq!(res.sum, 42);
    }

    #[test]
    fn refuses_second_provider_for_service() {
        let graph = MemoryGraph::new();
        let mut first = graph.node(&NodeOptions::new("first")).unwrap();
        let mut second = graph.node(&NodeOptions::new("second")).unwrap();
        let _service = first
            .advertise::<AddTwoInts, _>("add_two_ints", |_| Ok(AddTwoIntsRes::default()))
            .unwrap();
        assert!(second
            .advertise::<AddTwoInts, _>("add_two_ints", |_| Ok(AddTwoIntsRes::default()))
            .is_err());
    }

    #[test]
    fn node_shutdown_withdraws_services_and_closes_publishers() {
        let graph = MemoryGraph::new();
        let mut node = graph.node(&NodeOptions::new("server")).unwrap();
        let service = node
            .advertise::<AddTwoInts, _>("add_two_ints", |_| Ok(AddTwoIntsRes::default()))
            .unwrap();
        let mut publisher = node.publish::<std_msgs::String>("chatter", 1).unwrap();
        node.shutdown();
        assert!(!graph.has_service("add_two_ints"));
        assert!(publisher.send(std_msgs::String::new("late")).is_err());
        drop(service);
    }

    #[test]
    fn logger_publishes_records_on_rosout() {
        let graph = MemoryGraph::new();
        let mut watcher = graph.node(&NodeOptions::new("watcher")).unwrap();
        let talker = graph.node(&NodeOptions::new("talker")).unwrap();
        let (tx, rx) = unbounded();
        let _sub = watcher
            .subscribe(ROSOUT, 10, move |record: Log| {
                tx.send(record).unwrap();
            })
            .unwrap();
        talker.logger().log(Log::INFO, "hello".into(), "src/talker.rs", 7);
        let record = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(record.level, Log::INFO);
        assert_eq!(record.name, "/talker");
        assert_eq!(record.msg, "hello");
        assert_eq!(record.file, "src/talker.rs");
        assert_eq!(record.line, 7);
    }

    #[test]
    fn logger_of_dropped_node_is_silent() {
        let graph = MemoryGraph::new();
        let mut watcher = graph.node(&NodeOptions::new("watcher")).unwrap();
        let talker = graph.node(&NodeOptions::new("talker")).unwrap();
        let (tx, rx) = unbounded();
        let _sub = watcher
            .subscribe(ROSOUT, 10, move |record: Log| {
                tx.send(record.msg).unwrap();
            })
            .unwrap();
        let logger = talker.logger();
        talker.shutdown();
        logger.log(Log::INFO, "late".into(), file!(), line!());
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn missing_service_is_a_communication_error() {
        let graph = MemoryGraph::new();
        let client = graph.node(&NodeOptions::new("client")).unwrap();
        match client.call::<AddTwoInts>("add_two_ints", &AddTwoIntsReq { a: 1, b: 2 }) {
            Err(Error(ErrorKind::Communication(service), _)) => {
                assert_eq!(service, "/add_two_ints")
            }
            Err(err) => panic!("unexpected error: {}", err),
            Ok(res) => panic!("unexpected response: {:?}", res),
        }
    }
}
