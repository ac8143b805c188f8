//! # Candidate Types
//!
//! Linearizes a message type's ancestry into the delivery order used by
//! dispatch: the universal root first, then every declared ancestor from most
//! general to most specific, then the runtime type itself.
//!
//! ## Algorithm
//!
//! Depth-first walk over declared supertypes in declaration order, emitting a
//! type only after all of its own supertypes (post-order). A type reachable
//! along several paths is emitted once, at its first completed visit. Cyclic
//! declarations are cut at the first revisit.

use crate::message::MessageType;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Candidate types for `runtime`, ordered from the root to `runtime`.
#[must_use]
pub fn candidate_types(runtime: MessageType) -> Vec<MessageType> {
    let root = MessageType::root();
    let mut order = vec![root];
    let mut seen = HashSet::from([root]);
    visit(runtime, &mut seen, &mut order);
    order
}

fn visit(ty: MessageType, seen: &mut HashSet<MessageType>, order: &mut Vec<MessageType>) {
    if !seen.insert(ty) {
        return;
    }
    for parent in ty.supertypes() {
        visit(parent, seen, order);
    }
    order.push(ty);
}

/// Memoized [`candidate_types`], shared by all dispatches of one bus.
///
/// Lineages are static, so entries never go stale.
#[derive(Default)]
pub struct LineageCache {
    resolved: RwLock<HashMap<MessageType, Arc<[MessageType]>>>,
}

impl LineageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate types for `runtime`, computing them on first use.
    pub fn resolve(&self, runtime: MessageType) -> Arc<[MessageType]> {
        if let Some(hit) = self.resolved.read().get(&runtime) {
            return Arc::clone(hit);
        }

        let computed: Arc<[MessageType]> = candidate_types(runtime).into();
        Arc::clone(
            self.resolved
                .write()
                .entry(runtime)
                .or_insert(computed),
        )
    }

    /// Number of memoized lineages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.read().is_empty()
    }
}
