//! Message and service types spoken by the tutorial nodes.
//!
//! The types are written out by hand instead of generated from a ROS
//! installation, so the tutorials build on machines without one. Definitions
//! and md5 sums match the upstream `std_msgs` and `rospy_tutorials` packages,
//! which keeps the nodes interoperable with `rospy` and `roscpp` peers.

pub mod rospy_tutorials;
pub mod std_msgs;
