//! # Music Finder Telegram Bot
//!
//! A Telegram bot that searches a video/music catalog, lets users browse
//! paginated results, fetches audio or video for a selected item, and builds
//! playlists from lists of song names.

pub mod action;
pub mod bot;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod in_flight;
pub mod localization;
pub mod media;
pub mod pagination;
pub mod playlist;
pub mod rate_limiter;
pub mod search;
pub mod session;
pub mod speech;
