// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Identifier for an actor.
///
/// Unlike a message id, an actor id is chosen by the caller of `actor_of`,
/// not generated by the runtime: spawning twice with the same id is
/// idempotent (the existing actor's `ActorRef` is returned rather than a
/// second instance being created).
///
/// # Example
/// ```rust
/// use swarmrt::util::ActorId;
///
/// let a = ActorId::from("pong");
/// let b = ActorId::from("pong");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Create an actor id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message, generated fresh at construction.
///
/// # Example
/// ```rust
/// use swarmrt::util::MessageId;
///
/// let id = MessageId::new();
/// println!("Message ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a MessageId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_equality_by_value() {
        let a = ActorId::from("pong");
        let b = ActorId::new("pong".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn test_actor_id_distinct_values() {
        assert_ne!(ActorId::from("a"), ActorId::from("b"));
    }

    #[test]
    fn test_actor_id_display() {
        let id = ActorId::from("worker-1");
        assert_eq!(format!("{id}"), "worker-1");
    }

    #[test]
    fn test_message_id_creation() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_message_id_default() {
        let id = MessageId::default();
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }
}
