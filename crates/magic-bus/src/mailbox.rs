//! # Mailboxes
//!
//! The receiving side of the bus. A mailbox is any `Send + Sync` callback
//! taking a `&dyn Message`; returning `Err` reports a recoverable failure,
//! which the bus turns into a [`FailedMessage`](crate::FailedMessage).
//! Panicking is treated as unrecoverable and unwinds out of `post`.
//!
//! Mailboxes are shared as [`MailboxRef`] and compared by identity: two
//! clones of the same `Arc` are the same mailbox, two separately allocated
//! closures with identical bodies are not.

use crate::message::Message;
use std::sync::Arc;
use tracing::trace;

/// Recoverable failure raised by a mailbox.
pub type MailboxError = anyhow::Error;

/// Receives messages for a subscribed type and its subtypes.
pub trait Mailbox: Send + Sync + 'static {
    /// Receive one message.
    ///
    /// # Errors
    ///
    /// Any error is captured by the bus and re-posted as a
    /// [`FailedMessage`](crate::FailedMessage); delivery to other mailboxes
    /// continues.
    fn receive(&self, message: &dyn Message) -> Result<(), MailboxError>;
}

impl<F> Mailbox for F
where
    F: Fn(&dyn Message) -> Result<(), MailboxError> + Send + Sync + 'static,
{
    fn receive(&self, message: &dyn Message) -> Result<(), MailboxError> {
        self(message)
    }
}

/// Shared handle to a mailbox; the unit of subscription.
pub type MailboxRef = Arc<dyn Mailbox>;

/// Wrap a closure as a mailbox.
pub fn mailbox<F>(receive: F) -> MailboxRef
where
    F: Fn(&dyn Message) -> Result<(), MailboxError> + Send + Sync + 'static,
{
    Arc::new(receive)
}

/// Wrap a closure over a concrete message type as a mailbox.
///
/// Messages that are not a `T` (for example, subtypes delivered through a
/// supertype subscription) are skipped without error.
pub fn typed_mailbox<T, F>(receive: F) -> MailboxRef
where
    T: Message,
    F: Fn(&T) -> Result<(), MailboxError> + Send + Sync + 'static,
{
    Arc::new(move |message: &dyn Message| match message.downcast_ref::<T>() {
        Some(typed) => receive(typed),
        None => {
            trace!(
                expected = std::any::type_name::<T>(),
                actual = %message.message_type(),
                "Typed mailbox skipped message of another type"
            );
            Ok(())
        }
    })
}

/// Identity comparison of two mailbox handles.
#[must_use]
pub fn same_mailbox(a: &MailboxRef, b: &MailboxRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
