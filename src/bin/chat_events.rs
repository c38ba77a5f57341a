//! Connects to the hirechat backend and tails chat traffic to the log.
//!
//! Environment:
//! - `CHAT_WS_URL`   WebSocket endpoint (required)
//! - `CHAT_TOKEN`    bearer token (required)
//! - `CHAT_ROOM`     room to join after connecting (optional)
//! - `RUST_LOG`      log filter, defaults to `info`

use anyhow::{Context, Result};
use chatsockets::{ChatClient, ServerEvent, Topic};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let url = std::env::var("CHAT_WS_URL").context("CHAT_WS_URL must be set")?;
    let token = std::env::var("CHAT_TOKEN").context("CHAT_TOKEN must be set")?;
    let room = std::env::var("CHAT_ROOM").ok();

    let client = ChatClient::builder().url(url).token(token).build();

    let _messages = client.subscribe(Topic::NewMessage, |event| {
        if let ServerEvent::NewMessage(payload) = event {
            info!(
                room_id = %payload.message.room_id,
                sender = %payload.message.sender_id,
                "{}",
                payload.message.content
            );
        }
    });

    let _changes = client.subscribe(Topic::ConnectionChange, |event| {
        if let ServerEvent::ConnectionChange(state) = event {
            info!(connected = state.connected, "connection state changed");
        }
    });

    print_banner("Hirechat Event Tail");

    let state = client.connect().await;
    if !state.connected {
        warn!("initial connect did not settle; waiting for connection_change");
    }

    if let Some(room_id) = room {
        client.join_room(&room_id);
    }

    tokio::signal::ctrl_c().await?;
    client.disconnect().await;

    print_shutdown("Event tail");
    Ok(())
}

fn print_banner(name: &str) {
    info!("");
    info!("========================================");
    info!("Starting {}", name);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

fn print_shutdown(name: &str) {
    info!("");
    info!("========================================");
    info!("{} stopped gracefully", name);
    info!("========================================");
}
