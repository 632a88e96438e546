//! stompsub broker
//!
//! The broker owns all routing state and drives the per-client protocol:
//!
//! - `registry`: one session per connected client (subscription id -> destination)
//! - `index`: destination -> subscribed clients, used for fan-out
//! - `observers`: in-process callbacks invoked on publish
//! - `commands`: handling of CONNECT/SUBSCRIBE/SEND/UNSUBSCRIBE/DISCONNECT
//! - `engine`: lifecycle, fan-out and the programmatic API

pub mod commands;
pub mod engine;
pub mod index;
pub mod message;
pub mod observers;
pub mod registry;

pub use commands::ClientCommand;
pub use engine::{Broker, FanOut, SharedBroker};
pub use observers::ObserverId;
pub use registry::{ClientSession, ConnectionState};
