//! The client facade: one handle over supervision, routing, rooms, and
//! messaging

use std::sync::Arc;

use crate::core::builder::{states, ChatClientBuilder};
use crate::core::config::ClientConfig;
use crate::core::messaging::MessagingController;
use crate::core::rooms::RoomController;
use crate::core::router::{EventRouter, Subscription};
use crate::core::supervisor::{ConnectionSupervisor, Metrics};
use crate::protocol::events::{ServerEvent, Topic};
use crate::protocol::types::{ConnectionState, MessageType};

/// Facade over the supervised chat connection
///
/// Holds the [`ConnectionSupervisor`], the [`EventRouter`], and the two
/// controllers, and forwards each call to the component that owns it. The
/// facade adds no behavior of its own.
///
/// Cheap to share: wrap in an [`Arc`] and clone the handle across tasks.
pub struct ChatClient {
    supervisor: Arc<ConnectionSupervisor>,
    router: EventRouter,
    rooms: RoomController,
    messaging: MessagingController,
}

impl ChatClient {
    /// Start building a client; URL and credentials are required before
    /// `build()` becomes available
    pub fn builder() -> ChatClientBuilder<states::NoUrl, states::NoCredentials> {
        ChatClientBuilder::new()
    }

    pub(crate) fn from_config(config: ClientConfig) -> Self {
        let router = EventRouter::new();
        let supervisor = Arc::new(ConnectionSupervisor::new(config, router.clone()));
        Self {
            rooms: RoomController::new(Arc::clone(&supervisor)),
            messaging: MessagingController::new(Arc::clone(&supervisor)),
            supervisor,
            router,
        }
    }

    /// Establish the connection; resolves within the configured guard
    /// duration with the resulting [`ConnectionState`]
    pub async fn connect(&self) -> ConnectionState {
        self.supervisor.connect().await
    }

    /// Tear down the connection; idempotent
    pub async fn disconnect(&self) {
        self.supervisor.disconnect().await
    }

    /// Whether a server-acknowledged session is currently established
    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    /// Snapshot of the current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.supervisor.connection_state()
    }

    /// Frame counters plus the connection state
    pub fn metrics(&self) -> Metrics {
        self.supervisor.metrics()
    }

    /// Register a callback for a topic; see [`EventRouter::subscribe`]
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        self.router.subscribe(topic, callback)
    }

    /// Remove a registration by topic and id
    pub fn unsubscribe(&self, topic: Topic, id: u64) -> bool {
        self.router.unsubscribe(topic, id)
    }

    /// Request membership in a room; logged no-op when disconnected
    pub fn join_room(&self, room_id: &str) {
        self.rooms.join_room(room_id)
    }

    /// Leave a room; logged no-op when disconnected
    pub fn leave_room(&self, room_id: &str) {
        self.rooms.leave_room(room_id)
    }

    /// Send a chat message; returns whether the frame was submitted
    pub fn send_message(
        &self,
        room_id: &str,
        content: &str,
        message_type: MessageType,
        metadata: Option<serde_json::Value>,
    ) -> bool {
        self.messaging
            .send_message(room_id, content, message_type, metadata)
    }

    /// Signal typing started in a room
    pub fn start_typing(&self, room_id: &str) {
        self.messaging.start_typing(room_id)
    }

    /// Signal typing stopped in a room
    pub fn stop_typing(&self, room_id: &str) {
        self.messaging.stop_typing(room_id)
    }

    /// Mark messages read in a room, optionally up to a message id
    pub fn mark_read(&self, room_id: &str, message_id: Option<&str>) {
        self.messaging.mark_read(room_id, message_id)
    }

    /// Direct access to the room controller
    pub fn rooms(&self) -> &RoomController {
        &self.rooms
    }

    /// Direct access to the messaging controller
    pub fn messaging(&self) -> &MessagingController {
        &self.messaging
    }
}
