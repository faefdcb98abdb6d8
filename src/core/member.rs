use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a member of an expense-sharing group.
///
/// # Examples
///
/// ```
/// use balance_engine::core::member::MemberId;
///
/// let alice = MemberId::new("alice");
/// let bob = MemberId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this member ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A participant in a group.
///
/// Only `id` takes part in balance computation. The name fields and the
/// avatar reference are carried through so callers can present results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, first_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: None,
            avatar: None,
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// First and last name joined for display.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_equality() {
        let a = MemberId::new("alice");
        let b = MemberId::new("alice");
        let c = MemberId::new("bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_member_id_display() {
        let id = MemberId::new("m-42");
        assert_eq!(format!("{}", id), "m-42");
    }

    #[test]
    fn test_display_name() {
        let plain = Member::new("a", "Alice");
        assert_eq!(plain.display_name(), "Alice");

        let full = Member::new("b", "Bob").with_last_name("Stone");
        assert_eq!(full.display_name(), "Bob Stone");

        let empty_last = Member::new("c", "Cleo").with_last_name("");
        assert_eq!(empty_last.display_name(), "Cleo");
    }

    #[test]
    fn test_member_deserializes_without_optional_fields() {
        let member: Member = serde_json::from_str(r#"{"id":"a","first_name":"Alice"}"#).unwrap();
        assert_eq!(member.id, MemberId::new("a"));
        assert!(member.last_name.is_none());
        assert!(member.avatar.is_none());
    }
}
