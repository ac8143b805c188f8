//! # Magic Bus - Intraprocess Message Bus
//!
//! Subscribers register mailboxes for a message type; senders post messages.
//! Delivery is synchronous, on the posting thread.
//!
//! ## Delivery Order
//!
//! 1. Base type subscribers before subtype subscribers: subscribers to
//!    [`AnyMessage`] before all others, subscribers to the most specific type
//!    last.
//! 2. Earlier subscribers before later subscribers.
//!
//! ## Dead Letters
//!
//! ```text
//! ┌────────┐  post(m)   ┌──────────┐  receive(m)  ┌───────────┐
//! │ Sender │ ─────────► │   Bus    │ ───────────► │ Mailboxes │
//! └────────┘            └──────────┘              └───────────┘
//!                         ▲      │                      │
//!                         │      │ no mailbox           │ Err(e)
//!                         │      ▼                      ▼
//!                         │  ReturnedMessage       FailedMessage
//!                         └──────┴──────────────────────┘
//!                              posted on the same bus
//! ```
//!
//! Observing failures is just subscribing to [`ReturnedMessage`] or
//! [`FailedMessage`].
//!
//! ## Example
//!
//! ```
//! use magic_bus::{lineage, mailbox, Bus, MessageType};
//! use std::sync::{Arc, Mutex};
//!
//! pub enum Number {}
//!
//! #[derive(Debug)]
//! pub struct Integer(pub i64);
//!
//! lineage!(Number; Integer: Number);
//!
//! let bus = Bus::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! for (key, label) in [
//!     (MessageType::of::<Integer>(), "integer"),
//!     (MessageType::of::<Number>(), "number"),
//!     (MessageType::root(), "any"),
//! ] {
//!     let seen = Arc::clone(&seen);
//!     bus.subscribe(key, &mailbox(move |_| {
//!         seen.lock().unwrap().push(label);
//!         Ok(())
//!     }));
//! }
//!
//! bus.post(Integer(42));
//! assert_eq!(*seen.lock().unwrap(), vec!["any", "number", "integer"]);
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod ancestry;
pub mod bus;
pub mod config;
pub mod dead_letter;
pub mod error;
pub mod mailbox;
pub mod message;
pub mod metrics;
pub mod registry;

// Re-export main types
pub use ancestry::{candidate_types, LineageCache};
pub use bus::{Bus, Delivery};
pub use config::BusConfig;
pub use dead_letter::{FailedMessage, ReturnedMessage};
pub use error::BusError;
pub use mailbox::{mailbox, same_mailbox, typed_mailbox, Mailbox, MailboxError, MailboxRef};
pub use message::{AnyMessage, Lineage, Message, MessageType};
pub use metrics::{BusMetrics, MetricsSnapshot};
pub use registry::{MailboxList, SubscriptionRegistry};

/// Default limit on nested `ReturnedMessage`/`FailedMessage` posts.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
