//! # Dead Letters
//!
//! Standard messages the bus posts to itself about its own traffic:
//!
//! - [`ReturnedMessage`]: a posted message reached no mailbox.
//! - [`FailedMessage`]: a mailbox returned an error for a message.
//!
//! Both are ordinary messages. Observe them by subscribing like any other
//! type; nothing else is special about them.

use crate::bus::Bus;
use crate::mailbox::{same_mailbox, MailboxError, MailboxRef};
use crate::message::Message;
use std::fmt;
use std::sync::Arc;

/// A posted message that no mailbox was subscribed to receive.
#[derive(Debug)]
pub struct ReturnedMessage {
    /// The bus the message was posted on.
    pub bus: Bus,
    /// The undelivered message.
    pub message: Arc<dyn Message>,
}

impl ReturnedMessage {
    #[must_use]
    pub fn new(bus: Bus, message: Arc<dyn Message>) -> Self {
        Self { bus, message }
    }

    /// The undelivered message, if it is a `T`.
    #[must_use]
    pub fn message_as<T: Message>(&self) -> Option<&T> {
        self.message.downcast_ref::<T>()
    }
}

/// A message whose mailbox returned an error.
pub struct FailedMessage {
    /// The bus the message was posted on.
    pub bus: Bus,
    /// The mailbox that failed.
    pub mailbox: MailboxRef,
    /// The message being delivered.
    pub message: Arc<dyn Message>,
    /// The error the mailbox returned.
    pub failure: MailboxError,
}

impl FailedMessage {
    #[must_use]
    pub fn new(
        bus: Bus,
        mailbox: MailboxRef,
        message: Arc<dyn Message>,
        failure: MailboxError,
    ) -> Self {
        Self {
            bus,
            mailbox,
            message,
            failure,
        }
    }

    /// Whether `mailbox` is the one that failed.
    #[must_use]
    pub fn is_from(&self, mailbox: &MailboxRef) -> bool {
        same_mailbox(&self.mailbox, mailbox)
    }

    /// The message being delivered, if it is a `T`.
    #[must_use]
    pub fn message_as<T: Message>(&self) -> Option<&T> {
        self.message.downcast_ref::<T>()
    }

    /// The mailbox's error, if it is an `E`.
    #[must_use]
    pub fn failure_as<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.failure.downcast_ref::<E>()
    }
}

impl fmt::Debug for FailedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailedMessage")
            .field("bus", &self.bus)
            .field("mailbox", &Arc::as_ptr(&self.mailbox))
            .field("message", &self.message)
            .field("failure", &format_args!("{}", self.failure))
            .finish()
    }
}

crate::lineage!(ReturnedMessage; FailedMessage);
