//! The guided entry dialogue.
//!
//! This module contains:
//! - The per-user dialogue state machine for collecting one entry across
//!   several replies
//! - The registry that stores each user's open dialogue and serializes
//!   access to it

mod registry;
mod state;

pub use registry::DialogueRegistry;
pub use state::{
    EntryDialogue, OTHER_CATEGORY, Outcome, Prompt, SKIP_DESCRIPTION, Step, advance,
};
