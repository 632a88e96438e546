//! Client command handling
//!
//! Inbound frames are decoded, their command is matched against the
//! accepted set and the matching handler runs. A handler returns a
//! [`ProtocolError`] for anything it rejects; the engine turns that into an
//! `ERROR` frame for the sender.

use std::str::FromStr;

use tracing::debug;

use super::engine::Broker;
use super::message;
use crate::client::ClientId;
use crate::frame::{self, Frame};
use crate::transport::Transport;
use crate::utils::error::ProtocolError;

/// Commands a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Connect,
    Subscribe,
    Send,
    Unsubscribe,
    Disconnect,
}

impl FromStr for ClientCommand {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            frame::CONNECT => Ok(Self::Connect),
            frame::SUBSCRIBE => Ok(Self::Subscribe),
            frame::SEND => Ok(Self::Send),
            frame::UNSUBSCRIBE => Ok(Self::Unsubscribe),
            frame::DISCONNECT => Ok(Self::Disconnect),
            other => Err(ProtocolError::UnsupportedCommand(other.to_string())),
        }
    }
}

/// A header that is present and non-empty.
fn required<'a>(frame: &'a Frame, key: &str) -> Option<&'a str> {
    frame.header(key).filter(|v| !v.is_empty())
}

impl<T: Transport> Broker<T> {
    pub(super) fn process_frame(&mut self, client: ClientId, text: &str) -> Result<(), ProtocolError> {
        let frame = frame::decode(text)?;
        let command = frame.command.parse::<ClientCommand>()?;
        debug!(%client, ?command, "frame received");

        match command {
            // CONNECTED already went out with the transport connection
            ClientCommand::Connect => Ok(()),
            ClientCommand::Subscribe => self.handle_subscribe(client, &frame),
            ClientCommand::Send => self.handle_send(&frame),
            ClientCommand::Unsubscribe => self.handle_unsubscribe(client, &frame),
            ClientCommand::Disconnect => {
                self.disconnect(client);
                Ok(())
            }
        }
    }

    fn handle_subscribe(&mut self, client: ClientId, frame: &Frame) -> Result<(), ProtocolError> {
        let (Some(destination), Some(id)) = (required(frame, "destination"), required(frame, "id")) else {
            return Err(ProtocolError::validation(
                "Missing required headers: destination and id",
            ));
        };

        self.bind_subscription(client, id, destination);
        debug!(%client, destination, id, "subscribed");

        self.send_receipt(client, frame);
        Ok(())
    }

    fn handle_send(&mut self, frame: &Frame) -> Result<(), ProtocolError> {
        let Some(destination) = required(frame, "destination") else {
            return Err(ProtocolError::validation(
                "Missing required header: destination",
            ));
        };

        if !self.index.contains(destination) {
            debug!(destination, "no subscribers, message dropped");
            return Ok(());
        }

        let message = message::message_frame(
            destination,
            required(frame, "content-type"),
            frame.body.as_str(),
        );
        self.publish_frame(destination, message);
        Ok(())
    }

    fn handle_unsubscribe(&mut self, client: ClientId, frame: &Frame) -> Result<(), ProtocolError> {
        let Some(id) = required(frame, "id") else {
            return Err(ProtocolError::validation("Missing required header: id"));
        };

        let destination = self
            .release_subscription(client, id)
            .ok_or_else(|| ProtocolError::Validation(format!("No subscription found for id: {id}")))?;
        debug!(%client, destination = %destination, id, "unsubscribed");

        self.send_receipt(client, frame);
        Ok(())
    }

    fn send_receipt(&self, client: ClientId, frame: &Frame) {
        if let Some(receipt) = required(frame, "receipt") {
            let _ = self.send_frame(client, &message::receipt_frame(receipt));
        }
    }
}
