//! Wire protocol for the hirechat messaging backend
//!
//! Every frame on the transport is a JSON envelope of the form
//! `{"event": "<name>", "data": {...}}`. Inbound frames deserialize into
//! [`events::ServerEvent`], outbound frames serialize from
//! [`events::ClientFrame`]. Payload field names are camelCase on the wire.

pub mod events;
pub mod types;

pub use events::{ClientFrame, ServerEvent, Topic};
pub use types::{ConnectionState, Message, MessageType, Room, SessionInfo, UserRole};
