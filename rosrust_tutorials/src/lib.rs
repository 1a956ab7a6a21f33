//! Tutorial nodes for rosrust: the `add_two_ints` client and server, and the
//! `chatter` talker and listener.
//!
//! Every component takes an explicitly constructed [`node::Node`], so the
//! binaries run them against a live master through [`backend::RosNode`] while
//! tests wire them together in a [`backend::MemoryGraph`].

#[macro_use]
extern crate error_chain;

#[macro_use]
mod log_macros;

pub mod args;
pub mod backend;
pub mod error;
pub mod listener;
pub mod logging;
pub mod node;
pub mod requester;
pub mod server;
pub mod talker;
pub mod util;
