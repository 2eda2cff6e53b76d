//! Redlink - thin synchronous Redis adapter for host applications
//!
//! A single shared, lazily-(re)established connection, guarded by one
//! mutex, through which a fixed set of typed commands is dispatched with
//! consistent error handling and optional authentication. Built to be
//! embedded: a host's scripting layer calls the blocking [`Client`]
//! operations, and its lifecycle hooks drive [`ConnectionManager`]
//! connect/reconnect/shutdown.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use redlink::{Client, Config, ConnectionManager};
//!
//! let manager = Arc::new(ConnectionManager::new(Config::default()).unwrap());
//! manager.connect().unwrap();
//!
//! let client = Client::new(manager);
//! client.write_key("key", "value").unwrap();
//! assert_eq!(client.read_key("key").as_deref(), Some("value"));
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod conn;
pub mod error;
pub mod exec;
pub mod resp;

pub use client::Client;
pub use command::{Command, Target};
pub use config::Config;
pub use conn::{Connection, ConnectionManager, Transport};
pub use error::{
    ConfigError, ConnectionError, ExecError, PublishError, UsageError, WriteError,
};
pub use exec::Executor;
pub use resp::Reply;
