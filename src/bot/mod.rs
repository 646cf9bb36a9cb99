//! The Telegram transport for the bot.
//!
//! This module contains:
//! - The long-polling update loop and its message and callback handlers
//! - Rendering of composed keyboards into Telegram reply markup

mod core;
mod keyboard;

pub use core::run_bot;
