//! Core client: connection supervision, event routing, and the facade
//!
//! ## Example
//!
//! ```rust,ignore
//! use chatsockets::{ChatClient, Topic};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ChatClient::builder()
//!         .url("wss://chat.example.com/socket")
//!         .token("bearer-token")
//!         .build();
//!
//!     let _sub = client.subscribe(Topic::NewMessage, |event| {
//!         println!("inbound: {:?}", event);
//!     });
//!
//!     let state = client.connect().await;
//!     if state.connected {
//!         client.join_room("room-1");
//!         client.send_message("room-1", "hello", Default::default(), None);
//!     }
//!
//!     client.disconnect().await;
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod messaging;
pub mod rooms;
pub mod router;
pub mod supervisor;

// Re-export main types
pub use builder::{states, ChatClientBuilder};
pub use client::ChatClient;
pub use config::{ClientConfig, CONNECT_GUARD};
pub use connection_state::{AtomicConnectionPhase, AtomicMetrics, ConnectionPhase};
pub use messaging::MessagingController;
pub use rooms::RoomController;
pub use router::{EventRouter, Subscription};
pub use supervisor::{ConnectionSupervisor, Metrics};
