//! Message sending, typing indicators, and read receipts

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::supervisor::ConnectionSupervisor;
use crate::protocol::events::{ClientFrame, MarkReadPayload, OutboundMessage, RoomRef};
use crate::protocol::types::MessageType;

/// Issues messaging frames, but only while a session is established
///
/// The controller is fire-and-forget by design: delivery confirmation
/// arrives as a `new_message` event echoed by the server, not as a return
/// value here.
pub struct MessagingController {
    supervisor: Arc<ConnectionSupervisor>,
}

impl MessagingController {
    pub(crate) fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
        Self { supervisor }
    }

    /// Send a chat message to a room
    ///
    /// Returns whether the frame was submitted to the transport. `false`
    /// means the session is down and the message was dropped; it does not
    /// mean the server rejected it.
    pub fn send_message(
        &self,
        room_id: &str,
        content: &str,
        message_type: MessageType,
        metadata: Option<serde_json::Value>,
    ) -> bool {
        if !self.supervisor.is_connected() {
            warn!(room_id, "send_message skipped: not connected");
            return false;
        }

        debug!(room_id, ?message_type, "sending message");
        let frame = ClientFrame::SendMessage(OutboundMessage {
            room_id: room_id.to_string(),
            content: content.to_string(),
            message_type,
            metadata,
        });
        match self.supervisor.send_frame(frame) {
            Ok(()) => true,
            Err(e) => {
                warn!(room_id, "failed to submit message frame: {}", e);
                false
            }
        }
    }

    /// Signal that the user started typing in a room
    pub fn start_typing(&self, room_id: &str) {
        self.send_typing(room_id, true);
    }

    /// Signal that the user stopped typing in a room
    pub fn stop_typing(&self, room_id: &str) {
        self.send_typing(room_id, false);
    }

    fn send_typing(&self, room_id: &str, started: bool) {
        if !self.supervisor.is_connected() {
            debug!(room_id, started, "typing signal skipped: not connected");
            return;
        }

        let room = RoomRef {
            room_id: room_id.to_string(),
        };
        let frame = if started {
            ClientFrame::TypingStart(room)
        } else {
            ClientFrame::TypingStop(room)
        };
        if let Err(e) = self.supervisor.send_frame(frame) {
            warn!(room_id, "failed to submit typing frame: {}", e);
        }
    }

    /// Mark messages in a room as read, optionally only up to a message id
    pub fn mark_read(&self, room_id: &str, message_id: Option<&str>) {
        if !self.supervisor.is_connected() {
            warn!(room_id, "mark_read skipped: not connected");
            return;
        }

        debug!(room_id, ?message_id, "marking messages read");
        let frame = ClientFrame::MarkRead(MarkReadPayload {
            room_id: room_id.to_string(),
            message_id: message_id.map(str::to_string),
        });
        if let Err(e) = self.supervisor.send_frame(frame) {
            warn!(room_id, "failed to submit read receipt: {}", e);
        }
    }
}
