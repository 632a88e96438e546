//! # stompsub
//!
//! `stompsub` is a minimal, in-memory message broker speaking a subset of
//! the STOMP text protocol. Clients subscribe to destinations by name and
//! every message sent to a destination is delivered at most once to each
//! subscription that exists at publish time.
//!
//! ## Core Modules
//!
//! - `frame`: the `Frame` type and its wire codec.
//! - `broker`: sessions, the subscription index, command handling and fan-out.
//! - `client`: client identity and the outbound channel handle.
//! - `transport`: the `Transport` capability and its WebSocket binding.
//! - `config`: loading server, broker and logging settings.
//! - `utils`: error types, logging setup and id generation.
//!
//! Not supported: transactions, ACK/NACK, heartbeats, persistence,
//! authentication, and escaping of special characters in frames.

pub mod broker;
pub mod client;
pub mod config;
pub mod frame;
pub mod transport;
pub mod utils;

pub use broker::{Broker, FanOut, ObserverId, SharedBroker};
pub use client::ClientId;
pub use frame::{Frame, Headers};
pub use transport::{ChannelTransport, Transport};
