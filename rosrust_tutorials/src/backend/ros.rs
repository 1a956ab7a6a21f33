use crate::error::{ErrorKind, Result, ResultExt};
use crate::node::{LogSink, Node, NodeOptions, Publish, ServiceResult};
use log::debug;
use rosrust::api::Ros;
use rosrust::{Message, ServicePair};
use std::env;
use std::sync::{Arc, Mutex};

/// Node registered with a live ROS master through rosrust.
///
/// Master URI, hostname and namespace come from the usual `ROS_*` variables
/// and `__master:=`/`__ns:=` remappings.
pub struct RosNode {
    name: String,
    ros: Arc<Mutex<Ros>>,
}

impl RosNode {
    pub fn new(options: &NodeOptions) -> Result<Self> {
        let args = env::args().collect::<Vec<_>>();
        let name = options.resolve_name(&args);
        let ros = Ros::new(&name).chain_err(|| format!("Failed to initialize node {}", name))?;
        let name = String::from(ros.name());
        debug!("Registered node {}", name);
        Ok(Self {
            name,
            ros: Arc::new(Mutex::new(ros)),
        })
    }
}

impl Node for RosNode {
    type Subscriber = rosrust::Subscriber;
    type Service = rosrust::Service;
    type Logger = RosLogger;

    fn name(&self) -> &str {
        &self.name
    }

    fn logger(&self) -> Self::Logger {
        RosLogger {
            ros: Arc::clone(&self.ros),
        }
    }

    fn call<T: ServicePair>(&self, service: &str, request: &T::Request) -> Result<T::Response> {
        let client = self
            .ros
            .lock()
            .expect(FAILED_TO_LOCK)
            .client::<T>(service)
            .chain_err(|| ErrorKind::Communication(service.into()))?;
        match client
            .req(request)
            .chain_err(|| ErrorKind::Communication(service.into()))?
        {
            Ok(response) => Ok(response),
            Err(message) => bail!(ErrorKind::ServiceFailed(service.into(), message)),
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
        Ok(self
            .ros
            .lock()
            .expect(FAILED_TO_LOCK)
            .subscribe::<T, F>(topic, queue_size, callback)?)
    }

    fn advertise<T, F>(&mut self, service: &str, handler: F) -> Result<Self::Service>
    where
        T: ServicePair,
        F: Fn(T::Request) -> ServiceResult<T::Response> + Send + Sync + 'static,
    {
        Ok(self
            .ros
            .lock()
            .expect(FAILED_TO_LOCK)
            .service::<T, F>(service, handler)?)
    }

    fn publish<T: Message>(
        &mut self,
        topic: &str,
        queue_size: usize,
    ) -> Result<Box<dyn Publish<T>>> {
        let publisher = self
            .ros
            .lock()
            .expect(FAILED_TO_LOCK)
            .publish::<T>(topic, queue_size)?;
        Ok(Box::new(RosPublisher(publisher)))
    }
}

/// Prints the line and publishes it on `/rosout`, as `ros_info!` does.
#[derive(Clone)]
pub struct RosLogger {
    ros: Arc<Mutex<Ros>>,
}

impl LogSink for RosLogger {
    fn log(&self, level: i8, msg: String, file: &str, line: u32) {
        self.ros
            .lock()
            .expect(FAILED_TO_LOCK)
            .log(level, msg, file, line)
    }
}

struct RosPublisher<T: Message>(rosrust::Publisher<T>);

impl<T: Message> Publish<T> for RosPublisher<T> {
    fn send(&mut self, message: T) -> Result<()> {
        self.0.send(message)?;
        Ok(())
    }
}

static FAILED_TO_LOCK: &str = "Failed to acquire lock on ROS instance";
