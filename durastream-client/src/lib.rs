//! # durastream-client
//!
//! Client library for durastream.
//!
//! This crate provides:
//! - An availability probe run before a client is handed out
//! - Publishing with optimistic-concurrency preconditions
//! - Stream and consumer management
//! - A NATS transport (feature `nats`, enabled by default)
//! - Layered YAML/environment configuration

pub mod client;
pub mod config;
#[cfg(feature = "nats")]
pub mod connection;
pub mod error;
pub mod management;
pub mod publish;
pub mod transport;

#[cfg(test)]
mod mock;

pub use client::{BridgeConfig, Client, DEFAULT_REQUEST_TIMEOUT};
pub use config::{Config, ConfigError};
#[cfg(feature = "nats")]
pub use connection::{Connection, ConnectionConfig, TlsClientConfig};
pub use error::{BridgeError, TransportError};
pub use management::StreamManager;
pub use publish::Publisher;
pub use transport::Transport;
