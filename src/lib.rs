//! This crate provides a way to manage to-do lists stored on a REST server.
//!
//! It provides a client for this API in the [`client`] module, that can be used as a stand-alone module.
//!
//! Tasks can be ordered by chaining comparators (see the [`sort`] module), and labelled with human-readable, relative due dates (see the [`due`] module).
//!
//! A [`Store`](store::Store) keeps what has been fetched from the server, reloads it after every change, and turns it into displayable [`ListView`](store::ListView)s. \
//! It also keeps track of the [`alerts`](alert) that tell the user how their last actions went.

pub mod traits;

pub mod task;
pub use task::Task;
pub use task::TaskId;
pub mod list;
pub use list::List;
pub mod sort;
pub mod due;

pub mod api;
pub mod client;
pub use client::Client;

pub mod alert;
pub mod store;
pub use store::Store;

pub mod config;
pub mod utils;

pub mod mock_behaviour;
pub mod mock;
