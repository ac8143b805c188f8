//! # Subscription Registry
//!
//! Maps message types to insertion-ordered sets of mailboxes.
//!
//! ## Concurrency
//!
//! Each entry is a copy-on-write list (`Arc<[MailboxRef]>`). Writers build a
//! replacement list while holding the entry's shard lock and swap it in;
//! readers clone the `Arc` and iterate with no lock held. A dispatch therefore
//! always walks a complete list, and a mailbox may subscribe or unsubscribe
//! reentrantly without deadlocking or disturbing the walk in progress.

use crate::mailbox::{same_mailbox, MailboxRef};
use crate::message::MessageType;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Snapshot of the mailboxes registered under one type.
pub type MailboxList = Arc<[MailboxRef]>;

/// Concurrent registry of subscriptions keyed by message type.
///
/// Entries are pruned when their last mailbox is removed, so every key
/// present has at least one mailbox.
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: DashMap<MessageType, MailboxList>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `mailbox` under `ty`, after any mailboxes already there.
    ///
    /// Returns `false` if this exact mailbox was already registered for `ty`.
    pub fn insert(&self, ty: MessageType, mailbox: &MailboxRef) -> bool {
        match self.entries.entry(ty) {
            Entry::Occupied(mut entry) => {
                if entry.get().iter().any(|m| same_mailbox(m, mailbox)) {
                    return false;
                }
                let mut next = entry.get().to_vec();
                next.push(Arc::clone(mailbox));
                entry.insert(next.into());
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::from(vec![Arc::clone(mailbox)]));
            }
        }
        true
    }

    /// Remove `mailbox` from `ty`, pruning the entry if it becomes empty.
    ///
    /// Returns `false` if the mailbox was not registered for `ty`.
    pub fn remove(&self, ty: MessageType, mailbox: &MailboxRef) -> bool {
        let Entry::Occupied(mut entry) = self.entries.entry(ty) else {
            return false;
        };
        let Some(position) = entry.get().iter().position(|m| same_mailbox(m, mailbox)) else {
            return false;
        };

        if entry.get().len() == 1 {
            entry.remove();
        } else {
            let mut next = entry.get().to_vec();
            next.remove(position);
            entry.insert(next.into());
        }
        true
    }

    /// Current mailboxes for exactly `ty`, if any.
    #[must_use]
    pub fn snapshot(&self, ty: MessageType) -> Option<MailboxList> {
        self.entries.get(&ty).map(|list| Arc::clone(list.value()))
    }

    #[must_use]
    pub fn contains(&self, ty: MessageType, mailbox: &MailboxRef) -> bool {
        self.entries
            .get(&ty)
            .is_some_and(|list| list.iter().any(|m| same_mailbox(m, mailbox)))
    }

    /// Number of mailboxes registered for exactly `ty`.
    #[must_use]
    pub fn count(&self, ty: MessageType) -> usize {
        self.entries.get(&ty).map_or(0, |list| list.len())
    }

    /// Subscribed types, in the registry's total order.
    #[must_use]
    pub fn types(&self) -> Vec<MessageType> {
        let mut types: Vec<_> = self.entries.iter().map(|entry| *entry.key()).collect();
        types.sort();
        types
    }

    /// Number of subscribed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
