//! The bridge between chat events and the ledger.
//!
//! This module contains everything between an update arriving and a reply
//! going out:
//! - The [Event] and [Action] types the transport reduces updates to
//! - The [Dispatch] façade that routes them and composes [Reply] values
//! - The reply texts and keyboards

mod core;
mod replies;

pub use core::{Action, Button, Dispatch, Event, Keyboard, KeyboardKind, Reply};
