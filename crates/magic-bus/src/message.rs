//! # Messages
//!
//! Type identity and declared ancestry for everything posted to the bus.
//!
//! Rust has no class inheritance, so each message type states its direct
//! supertypes through [`Lineage`]. Supertypes may be other message types or
//! uninhabited capability markers that are only ever used as subscription
//! keys:
//!
//! ```
//! use magic_bus::{lineage, MessageType};
//!
//! pub enum Number {}
//!
//! #[derive(Debug)]
//! pub struct Integer(pub i64);
//!
//! lineage!(Number; Integer: Number);
//!
//! let supertypes = MessageType::of::<Integer>().supertypes();
//! assert_eq!(supertypes, vec![MessageType::of::<Number>()]);
//! ```

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Declared ancestry of a type that can key a subscription.
pub trait Lineage: 'static {
    /// Direct supertypes, in declaration order.
    ///
    /// The universal root [`AnyMessage`] is implied and need not be listed.
    fn supertypes() -> Vec<MessageType> {
        Vec::new()
    }
}

/// The universal root type. Subscribers to it receive every message.
pub enum AnyMessage {}

impl Lineage for AnyMessage {}

/// Identifier of a message type, used as the registry key.
///
/// Equality, hashing and ordering use the underlying [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
    supertypes: fn() -> Vec<MessageType>,
}

impl MessageType {
    /// The type identifier for `T`.
    #[must_use]
    pub fn of<T: Lineage>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            supertypes: T::supertypes,
        }
    }

    /// The universal root type.
    #[must_use]
    pub fn root() -> Self {
        Self::of::<AnyMessage>()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id == TypeId::of::<AnyMessage>()
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direct supertypes as declared by the type's [`Lineage`].
    #[must_use]
    pub fn supertypes(&self) -> Vec<MessageType> {
        (self.supertypes)()
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for MessageType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MessageType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageType({})", self.name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value that can be posted to the bus.
///
/// Implemented for every `Send + Sync + Debug` type with a [`Lineage`].
pub trait Message: Any + Send + Sync + fmt::Debug {
    /// Runtime type of this message.
    fn message_type(&self) -> MessageType;

    fn as_any(&self) -> &dyn Any;
}

impl<T> Message for T
where
    T: Lineage + Send + Sync + fmt::Debug,
{
    fn message_type(&self) -> MessageType {
        MessageType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Message {
    /// Whether the concrete message is a `T`.
    #[must_use]
    pub fn is<T: Message>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// The concrete message, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Declares the [`Lineage`] of one or more types.
///
/// ```
/// use magic_bus::lineage;
///
/// pub enum Shape {}
/// pub enum Named {}
///
/// #[derive(Debug)]
/// pub struct Circle;
///
/// lineage!(Shape; Named; Circle: Shape, Named);
/// ```
#[macro_export]
macro_rules! lineage {
    ($($ty:ty $(: $($sup:ty),+)?);+ $(;)?) => {
        $(
            impl $crate::Lineage for $ty {
                fn supertypes() -> ::std::vec::Vec<$crate::MessageType> {
                    ::std::vec![$($($crate::MessageType::of::<$sup>()),+)?]
                }
            }
        )+
    };
}

lineage!(
    String;
    &'static str;
    bool;
    char;
    i8; i16; i32; i64; i128; isize;
    u8; u16; u32; u64; u128; usize;
    f32; f64;
    ()
);
