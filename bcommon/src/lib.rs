//! Shared primitives for the botlink workspace crates.
//!
//! ```rust
//! use bcommon::MessageId;
//!
//! let user = MessageId::new(1_700_000_000_000);
//! let placeholder = user.successor();
//! assert!(placeholder > user);
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use bcommon::BoxFuture;
    //!
    //! fn char_count<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.chars().count() })
    //! }
    //!
    //! let _future = char_count("hola");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod ids {
    //! Message identifier newtype.
    //!
    //! Ids are millisecond-scale integers ordered by creation time. A user
    //! message and its paired response placeholder are created in the same
    //! instant, so the placeholder takes the user id's successor instead of
    //! reading the clock twice.

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct MessageId(u64);

    impl MessageId {
        pub fn new(value: u64) -> Self {
            Self(value)
        }

        pub fn successor(self) -> Self {
            Self(self.0 + 1)
        }

        pub fn as_u64(self) -> u64 {
            self.0
        }
    }

    impl Display for MessageId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl From<u64> for MessageId {
        fn from(value: u64) -> Self {
            Self(value)
        }
    }
}

pub mod clock {
    //! Wall-clock helpers shared by id generation and persona creation.

    use std::time::{SystemTime, UNIX_EPOCH};

    /// Milliseconds since the Unix epoch. A clock set before the epoch
    /// reads as zero rather than panicking.
    pub fn unix_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

pub use clock::unix_millis;
pub use future::BoxFuture;
pub use ids::MessageId;

#[cfg(test)]
mod tests {
    use super::{MessageId, unix_millis};

    #[test]
    fn message_id_orders_by_value() {
        let first = MessageId::new(10);
        let second = first.successor();

        assert_eq!(second.as_u64(), 11);
        assert!(second > first);
        assert_eq!(first.to_string(), "10");
    }

    #[test]
    fn unix_millis_is_past_2020() {
        assert!(unix_millis() > 1_577_836_800_000);
    }
}
