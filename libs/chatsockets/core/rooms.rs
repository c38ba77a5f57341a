//! Room membership: connection-guarded join and leave

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::supervisor::ConnectionSupervisor;
use crate::protocol::events::{ClientFrame, RoomRef};

/// Issues room membership frames, but only while a session is established
///
/// Every operation is a logged no-op when disconnected; room frames sent
/// before the server acknowledged the session would be dropped server-side
/// anyway.
pub struct RoomController {
    supervisor: Arc<ConnectionSupervisor>,
}

impl RoomController {
    pub(crate) fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
        Self { supervisor }
    }

    /// Request membership in a room
    pub fn join_room(&self, room_id: &str) {
        if !self.supervisor.is_connected() {
            warn!(room_id, "join_room skipped: not connected");
            return;
        }

        debug!(room_id, "joining room");
        let frame = ClientFrame::JoinRoom(RoomRef {
            room_id: room_id.to_string(),
        });
        if let Err(e) = self.supervisor.send_frame(frame) {
            warn!(room_id, "failed to submit join frame: {}", e);
        }
    }

    /// Leave a room
    pub fn leave_room(&self, room_id: &str) {
        if !self.supervisor.is_connected() {
            warn!(room_id, "leave_room skipped: not connected");
            return;
        }

        debug!(room_id, "leaving room");
        let frame = ClientFrame::LeaveRoom(RoomRef {
            room_id: room_id.to_string(),
        });
        if let Err(e) = self.supervisor.send_frame(frame) {
            warn!(room_id, "failed to submit leave frame: {}", e);
        }
    }
}
