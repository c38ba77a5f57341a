//! Lock-free connection phase and counters
//!
//! The supervisor is the single writer of the phase; everything else only
//! reads it. All accesses are atomic, no locking required.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle phase of the supervised connection
///
/// Transitions: `Disconnected → Connecting → Connected → Reconnecting →
/// (Connected | Disconnected)`. `ShuttingDown` is entered only by an
/// explicit `disconnect()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionPhase {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Reconnecting = 3,
    ShuttingDown = 4,
}

impl ConnectionPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionPhase::Connecting,
            2 => ConnectionPhase::Connected,
            3 => ConnectionPhase::Reconnecting,
            4 => ConnectionPhase::ShuttingDown,
            _ => ConnectionPhase::Disconnected,
        }
    }
}

/// Atomic wrapper around [`ConnectionPhase`]
pub struct AtomicConnectionPhase(AtomicU8);

impl AtomicConnectionPhase {
    pub fn new(phase: ConnectionPhase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    #[inline]
    pub fn get(&self) -> ConnectionPhase {
        ConnectionPhase::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, phase: ConnectionPhase) {
        self.0.store(phase as u8, Ordering::Release);
    }

    /// Transition only if the phase is still `current`
    ///
    /// Returns the previous phase on failure, so racing callers can tell
    /// who won.
    pub fn compare_exchange(
        &self,
        current: ConnectionPhase,
        new: ConnectionPhase,
    ) -> Result<ConnectionPhase, ConnectionPhase> {
        self.0
            .compare_exchange(
                current as u8,
                new as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(ConnectionPhase::from_u8)
            .map_err(ConnectionPhase::from_u8)
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionPhase::Connected
    }

    /// True while a connection attempt is in flight (initial or retry)
    #[inline]
    pub fn is_connecting(&self) -> bool {
        matches!(
            self.get(),
            ConnectionPhase::Connecting | ConnectionPhase::Reconnecting
        )
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.get() == ConnectionPhase::Disconnected
    }

    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        self.get() == ConnectionPhase::ShuttingDown
    }
}

/// Lock-free counters for frames and reconnections
pub struct AtomicMetrics {
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
    reconnect_count: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self {
            frames_sent: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            reconnect_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_reconnects(&self) {
        self.reconnect_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnect_count.load(Ordering::Relaxed)
    }
}

impl Default for AtomicMetrics {
    fn default() -> Self {
        Self::new()
    }
}
