//! Tagged event enums for both directions of the transport
//!
//! The closed variant sets mean the compiler enforces the payload shape for
//! every topic; there is no untyped callback surface anywhere in the client.

use serde::{Deserialize, Serialize};

use super::types::{ConnectionState, Message, MessageType, Room, SessionInfo};

/// Payload of `room_joined`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedPayload {
    pub room_id: String,
    pub room: Room,
    #[serde(default)]
    pub online_users: Vec<String>,
}

/// Payload of `new_message`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    pub message: Message,
}

/// Payload of `user_typing`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub user_id: String,
    pub room_id: String,
    pub is_typing: bool,
}

/// Payload of `user_online` / `user_offline`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub user_id: String,
    pub room_id: String,
}

/// Payload of `messages_read`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesReadPayload {
    pub room_id: String,
    pub read_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to_message_id: Option<String>,
    pub count: u64,
}

/// Payload of a server-pushed `error` frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

/// Events received from (or synthesized about) the transport
///
/// All variants except [`ServerEvent::ConnectionChange`] are forwarded
/// verbatim from the server. `connection_change` is the one event the
/// supervisor synthesizes itself, published when an established session
/// drops or recovers without a fresh `connect()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected(SessionInfo),
    RoomJoined(RoomJoinedPayload),
    NewMessage(NewMessagePayload),
    UserTyping(TypingPayload),
    UserOnline(PresencePayload),
    UserOffline(PresencePayload),
    MessagesRead(MessagesReadPayload),
    Error(ErrorPayload),
    ConnectionChange(ConnectionState),
}

impl ServerEvent {
    /// The topic subscribers register under to receive this event
    pub fn topic(&self) -> Topic {
        match self {
            ServerEvent::Connected(_) => Topic::Connected,
            ServerEvent::RoomJoined(_) => Topic::RoomJoined,
            ServerEvent::NewMessage(_) => Topic::NewMessage,
            ServerEvent::UserTyping(_) => Topic::UserTyping,
            ServerEvent::UserOnline(_) => Topic::UserOnline,
            ServerEvent::UserOffline(_) => Topic::UserOffline,
            ServerEvent::MessagesRead(_) => Topic::MessagesRead,
            ServerEvent::Error(_) => Topic::Error,
            ServerEvent::ConnectionChange(_) => Topic::ConnectionChange,
        }
    }
}

/// Named event categories subscribers can register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Connected,
    RoomJoined,
    NewMessage,
    UserTyping,
    UserOnline,
    UserOffline,
    MessagesRead,
    Error,
    ConnectionChange,
}

/// Reference to a room, the payload of `join_room` / `leave_room` /
/// `typing_start` / `typing_stop`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: String,
}

/// Payload of `send_message`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub room_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Payload of `mark_read`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Frames emitted by the client, all fire-and-forget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    JoinRoom(RoomRef),
    LeaveRoom(RoomRef),
    SendMessage(OutboundMessage),
    TypingStart(RoomRef),
    TypingStop(RoomRef),
    MarkRead(MarkReadPayload),
    /// Application-level heartbeat, sent only when configured
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::UserRole;

    #[test]
    fn connected_frame_deserializes() {
        let raw = r#"{"event":"connected","data":{"userId":"u1","role":"developer","sessionId":"s1"}}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();

        match event {
            ServerEvent::Connected(info) => {
                assert_eq!(info.user_id, "u1");
                assert_eq!(info.role, UserRole::Developer);
                assert_eq!(info.session_id, "s1");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn new_message_frame_deserializes_and_maps_to_topic() {
        let raw = serde_json::json!({
            "event": "new_message",
            "data": {
                "message": {
                    "id": "m1",
                    "roomId": "r1",
                    "senderId": "u2",
                    "senderRole": "recruiter",
                    "content": "hello",
                    "type": "text",
                    "isRead": false,
                    "createdAt": "2026-01-15T10:00:00Z"
                }
            }
        });

        let event: ServerEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.topic(), Topic::NewMessage);
    }

    #[test]
    fn messages_read_tolerates_missing_up_to_message_id() {
        let raw = r#"{"event":"messages_read","data":{"roomId":"r1","readBy":"u2","count":3}}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();

        match event {
            ServerEvent::MessagesRead(payload) => {
                assert_eq!(payload.read_by, "u2");
                assert_eq!(payload.up_to_message_id, None);
                assert_eq!(payload.count, 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn send_message_frame_serializes_with_envelope() {
        let frame = ClientFrame::SendMessage(OutboundMessage {
            room_id: "r1".into(),
            content: "hi there".into(),
            message_type: MessageType::Text,
            metadata: None,
        });

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["event"], "send_message");
        assert_eq!(value["data"]["roomId"], "r1");
        assert_eq!(value["data"]["type"], "text");
        assert!(value["data"].get("metadata").is_none());
    }

    #[test]
    fn mark_read_frame_omits_absent_message_id() {
        let frame = ClientFrame::MarkRead(MarkReadPayload {
            room_id: "r1".into(),
            message_id: None,
        });

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["event"], "mark_read");
        assert!(value["data"].get("messageId").is_none());
    }

    #[test]
    fn unknown_event_name_is_a_parse_error() {
        let raw = r#"{"event":"totally_unknown","data":{}}"#;
        assert!(serde_json::from_str::<ServerEvent>(raw).is_err());
    }
}
