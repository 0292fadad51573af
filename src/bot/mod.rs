//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `gateway`: Outbound messaging boundary and the Telegram implementation
//! - `message_handler`: Handles incoming text and voice messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `dialogue_manager`: The session state machine behind every event

pub mod callback_handler;
pub mod dialogue_manager;
pub mod gateway;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use dialogue_manager::MusicBot;
pub use gateway::{
    Button, EventKind, IncomingEvent, Keyboard, MessageRef, MessagingGateway, TelegramGateway,
};
