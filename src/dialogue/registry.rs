//! Per-user slots holding open dialogues.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::OwnedMutexGuard;

use crate::{database_id::UserId, dialogue::EntryDialogue};

/// The open dialogues of every user the bot has heard from.
///
/// Each user gets one slot. Locking the slot serialises that user's updates
/// for as long as the guard lives, while other users' slots stay free, so two
/// people can talk to the bot at once but one person's rapid-fire messages
/// are handled strictly in order.
#[derive(Debug, Default)]
pub struct DialogueRegistry {
    slots: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<Option<EntryDialogue>>>>>,
}

impl DialogueRegistry {
    /// Create a registry with no open dialogues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive hold of `user_id`'s dialogue slot.
    ///
    /// Waits until any earlier holder for the same user lets go. The guard
    /// dereferences to `Option<EntryDialogue>`: `None` means no entry is in
    /// progress, and assigning through the guard stores the new state.
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<Option<EntryDialogue>> {
        let slot = {
            let mut slots = self.slots.lock().unwrap();
            Arc::clone(slots.entry(user_id).or_default())
        };

        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::dialogue::{DialogueRegistry, EntryDialogue};

    #[tokio::test]
    async fn slot_starts_empty() {
        let registry = DialogueRegistry::new();

        let slot = registry.lock(1).await;

        assert_eq!(*slot, None);
    }

    #[tokio::test]
    async fn stored_dialogue_survives_relocking() {
        let registry = DialogueRegistry::new();
        let state = EntryDialogue::AwaitingCategory { amount: 150.0 };

        {
            let mut slot = registry.lock(1).await;
            *slot = Some(state.clone());
        }

        let slot = registry.lock(1).await;
        assert_eq!(*slot, Some(state));
    }

    #[tokio::test]
    async fn users_have_independent_slots() {
        let registry = DialogueRegistry::new();

        {
            let mut slot = registry.lock(1).await;
            *slot = Some(EntryDialogue::AwaitingAmount { category: None });
        }

        let slot = registry.lock(2).await;
        assert_eq!(*slot, None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn second_lock_waits_for_the_first() {
        let registry = Arc::new(DialogueRegistry::new());
        let guard = registry.lock(1).await;

        let contender = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry.lock(1).await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let registry = DialogueRegistry::new();

        let first = registry.lock(1).await;
        let second = registry.lock(2).await;

        assert_eq!(*first, None);
        assert_eq!(*second, None);
    }
}
