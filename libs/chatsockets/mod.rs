//! # ChatSockets
//!
//! A supervised WebSocket client for the hirechat real-time messaging backend.
//!
//! ## Features
//!
//! - **Supervised connection**: explicit state machine with automatic,
//!   bounded reconnection and a guard-timed `connect()` that always resolves
//! - **Event routing**: topic-based subscriber registry with per-callback
//!   failure isolation
//! - **Guarded operations**: room membership and messaging calls degrade to
//!   logged no-ops while disconnected, never panics or pending futures
//! - **Modular design**: pluggable credential source and reconnection strategy

pub mod core;
pub mod protocol;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use core::{
    builder::{states, ChatClientBuilder},
    client::ChatClient,
    config::{ClientConfig, CONNECT_GUARD},
    connection_state::{AtomicConnectionPhase, AtomicMetrics, ConnectionPhase},
    messaging::MessagingController,
    rooms::RoomController,
    router::{EventRouter, Subscription},
    supervisor::{ConnectionSupervisor, Metrics},
};

// Re-export protocol types
pub use protocol::{
    events::{
        ClientFrame, ErrorPayload, MarkReadPayload, MessagesReadPayload, NewMessagePayload,
        OutboundMessage, PresencePayload, RoomJoinedPayload, RoomRef, ServerEvent, Topic,
        TypingPayload,
    },
    types::{ConnectionState, Message, MessageType, Room, SessionInfo, UserRole},
};

/// Type alias for Result with ChatSocketError
pub type Result<T> = std::result::Result<T, traits::ChatSocketError>;
