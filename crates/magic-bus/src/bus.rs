//! # Bus
//!
//! Subscription, synchronous dispatch, and routing of dead letters.
//!
//! ## Dispatch
//!
//! ```text
//! post(message)
//!   │
//!   ├─ candidate types: AnyMessage, ancestors (general → specific), runtime type
//!   ├─ snapshot mailboxes for every candidate type
//!   │
//!   ├─ no mailboxes ──────────► post(ReturnedMessage { bus, message })
//!   │
//!   └─ for each mailbox, in order:
//!        receive(message)
//!          ├─ Ok  ──► next mailbox
//!          └─ Err ──► post(FailedMessage { bus, mailbox, message, failure })
//!                     then next mailbox
//! ```
//!
//! Everything runs on the caller's thread. Synthesized posts carry a nesting
//! depth; a `ReturnedMessage` nobody receives is dropped rather than
//! returned again, and nothing is synthesized past `BusConfig::max_depth`.

use crate::ancestry::LineageCache;
use crate::config::BusConfig;
use crate::dead_letter::{FailedMessage, ReturnedMessage};
use crate::error::BusError;
use crate::mailbox::{MailboxError, MailboxRef};
use crate::message::{Lineage, Message, MessageType};
use crate::metrics::BusMetrics;
use crate::registry::{MailboxList, SubscriptionRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of delivering one posted message.
///
/// Counts cover the posted message itself, not the `ReturnedMessage` or
/// `FailedMessage`s it caused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Mailboxes that accepted the message.
    pub delivered: usize,
    /// Mailboxes that returned an error.
    pub failed: usize,
    /// No mailbox was eligible.
    pub returned: bool,
}

/// An intraprocess message bus.
///
/// Cloning is cheap; clones share one registry. Independent buses are built
/// with [`Bus::new`] and never see each other's subscriptions.
///
/// Delivery order within one `post`:
/// 1. Subscribers to [`AnyMessage`](crate::AnyMessage) first, then ancestors
///    from most general to most specific, then the runtime type.
/// 2. Within one type, in subscription order.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

struct BusInner {
    config: BusConfig,
    registry: SubscriptionRegistry,
    lineages: LineageCache,
    metrics: BusMetrics,
}

impl Bus {
    /// Create a bus with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_validated(BusConfig::default())
    }

    /// Create a bus with the given configuration.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidConfig` if the configuration fails validation.
    pub fn with_config(config: BusConfig) -> Result<Self, BusError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Create a bus configured from `MB_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`BusConfig::from_env`].
    pub fn from_env() -> Result<Self, BusError> {
        Self::with_config(BusConfig::from_env()?)
    }

    fn from_validated(config: BusConfig) -> Self {
        debug!(bus = %config.name, max_depth = config.max_depth, "Bus created");
        Self {
            inner: Arc::new(BusInner {
                config,
                registry: SubscriptionRegistry::new(),
                lineages: LineageCache::new(),
                metrics: BusMetrics::new(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn metrics(&self) -> &BusMetrics {
        &self.inner.metrics
    }

    /// Whether `other` is a handle to this same bus.
    #[must_use]
    pub fn same_bus(&self, other: &Bus) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Subscribe `mailbox` to messages of `message_type` and its subtypes.
    ///
    /// Subscribing the same mailbox to the same type again has no effect;
    /// returns whether the subscription is new.
    pub fn subscribe(&self, message_type: MessageType, mailbox: &MailboxRef) -> bool {
        let added = self.inner.registry.insert(message_type, mailbox);
        debug!(
            bus = %self.name(),
            message_type = %message_type,
            mailbox = ?Arc::as_ptr(mailbox),
            added,
            "Subscribe"
        );
        added
    }

    /// Subscribe `mailbox` to `T` and its subtypes.
    pub fn subscribe_to<T: Lineage>(&self, mailbox: &MailboxRef) -> bool {
        self.subscribe(MessageType::of::<T>(), mailbox)
    }

    /// Unsubscribe `mailbox` from `message_type`.
    ///
    /// A mailbox that was not subscribed is ignored; returns whether a
    /// subscription was removed.
    pub fn unsubscribe(&self, message_type: MessageType, mailbox: &MailboxRef) -> bool {
        let removed = self.inner.registry.remove(message_type, mailbox);
        debug!(
            bus = %self.name(),
            message_type = %message_type,
            mailbox = ?Arc::as_ptr(mailbox),
            removed,
            "Unsubscribe"
        );
        removed
    }

    /// Unsubscribe `mailbox` from `T`.
    pub fn unsubscribe_from<T: Lineage>(&self, mailbox: &MailboxRef) -> bool {
        self.unsubscribe(MessageType::of::<T>(), mailbox)
    }

    #[must_use]
    pub fn is_subscribed(&self, message_type: MessageType, mailbox: &MailboxRef) -> bool {
        self.inner.registry.contains(message_type, mailbox)
    }

    /// Mailboxes subscribed to exactly `message_type` (not its ancestors).
    #[must_use]
    pub fn subscriber_count(&self, message_type: MessageType) -> usize {
        self.inner.registry.count(message_type)
    }

    /// Types with at least one subscriber.
    #[must_use]
    pub fn subscribed_types(&self) -> Vec<MessageType> {
        self.inner.registry.types()
    }

    /// Lookup keys for a message of `message_type`, in delivery order.
    #[must_use]
    pub fn candidate_types(&self, message_type: MessageType) -> Arc<[MessageType]> {
        self.inner.lineages.resolve(message_type)
    }

    /// Post `message` to every eligible mailbox, synchronously.
    ///
    /// Returns once the message and everything it caused to be posted have
    /// been handled. Mailbox errors never reach the caller; a mailbox panic
    /// does, and stops delivery of this message.
    ///
    /// ```
    /// use magic_bus::{typed_mailbox, Bus, ReturnedMessage};
    ///
    /// let bus = Bus::new();
    /// let dead_letters = typed_mailbox::<ReturnedMessage, _>(|returned| {
    ///     assert_eq!(returned.message_as::<&str>(), Some(&"hello"));
    ///     Ok(())
    /// });
    /// bus.subscribe_to::<ReturnedMessage>(&dead_letters);
    ///
    /// let delivery = bus.post("hello");
    /// assert!(delivery.returned);
    /// ```
    pub fn post<M: Message>(&self, message: M) -> Delivery {
        self.post_shared(Arc::new(message))
    }

    /// Post an already shared message, such as one taken from a
    /// [`ReturnedMessage`] or [`FailedMessage`].
    pub fn post_shared(&self, message: Arc<dyn Message>) -> Delivery {
        self.dispatch(message, 0)
    }

    fn dispatch(&self, message: Arc<dyn Message>, depth: usize) -> Delivery {
        let runtime = message.message_type();
        let candidates = self.inner.lineages.resolve(runtime);

        // Taken up front so reentrant (un)subscribes don't affect this post.
        let eligible: Vec<MailboxList> = candidates
            .iter()
            .filter_map(|ty| self.inner.registry.snapshot(*ty))
            .filter(|list| !list.is_empty())
            .collect();

        self.inner.metrics.record_posted();
        trace!(
            bus = %self.name(),
            message_type = %runtime,
            candidates = candidates.len(),
            mailboxes = eligible.iter().map(|list| list.len()).sum::<usize>(),
            depth,
            "Dispatching message"
        );

        let mut delivery = Delivery::default();
        if eligible.is_empty() {
            delivery.returned = true;
            self.route_returned(message, depth);
            return delivery;
        }

        for mailbox in eligible.iter().flat_map(|list| list.iter()) {
            match mailbox.receive(&*message) {
                Ok(()) => {
                    delivery.delivered += 1;
                    self.inner.metrics.record_delivered();
                    if self.inner.config.log_deliveries {
                        trace!(
                            bus = %self.name(),
                            message_type = %runtime,
                            mailbox = ?Arc::as_ptr(mailbox),
                            "Delivered"
                        );
                    }
                }
                Err(failure) => {
                    delivery.failed += 1;
                    self.inner.metrics.record_failed();
                    self.route_failed(Arc::clone(mailbox), Arc::clone(&message), failure, depth);
                }
            }
        }
        delivery
    }

    fn route_returned(&self, message: Arc<dyn Message>, depth: usize) {
        if message.is::<ReturnedMessage>() {
            self.inner.metrics.record_dead_letter_dropped();
            warn!(
                bus = %self.name(),
                dropped = ?message,
                "Dropping unsubscribed ReturnedMessage"
            );
            return;
        }
        let Some(next) = self.nested_depth(depth, &message) else {
            return;
        };

        debug!(
            bus = %self.name(),
            message_type = %message.message_type(),
            "No subscriber; posting ReturnedMessage"
        );
        self.inner.metrics.record_returned();
        let returned = ReturnedMessage::new(self.clone(), message);
        self.dispatch(Arc::new(returned), next);
    }

    fn route_failed(
        &self,
        mailbox: MailboxRef,
        message: Arc<dyn Message>,
        failure: MailboxError,
        depth: usize,
    ) {
        debug!(
            bus = %self.name(),
            message_type = %message.message_type(),
            mailbox = ?Arc::as_ptr(&mailbox),
            error = %failure,
            "Mailbox failed; posting FailedMessage"
        );
        let Some(next) = self.nested_depth(depth, &message) else {
            return;
        };

        let failed = FailedMessage::new(self.clone(), mailbox, message, failure);
        self.dispatch(Arc::new(failed), next);
    }

    fn nested_depth(&self, depth: usize, cause: &Arc<dyn Message>) -> Option<usize> {
        let next = depth + 1;
        if next > self.inner.config.max_depth {
            self.inner.metrics.record_depth_exceeded();
            warn!(
                bus = %self.name(),
                max_depth = self.inner.config.max_depth,
                cause = ?cause,
                "Synthesized message exceeds nesting limit; dropping"
            );
            return None;
        }
        Some(next)
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("name", &self.inner.config.name)
            .field("subscribed_types", &self.inner.registry.len())
            .finish()
    }
}
