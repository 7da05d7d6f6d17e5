//! User account record.

use crate::model::now_epoch_ms;
use crate::model::validation::{validate_user_name, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a user account.
pub type UserId = Uuid;

/// Account owning a conversion history and a favorites set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Trimmed, 1..=50 characters.
    pub name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Validates `name` and builds a new user with a generated id.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = validate_user_name(name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            created_at: now_epoch_ms(),
        })
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "User #{}: {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::User;
    use crate::model::validation::ValidationError;

    #[test]
    fn new_trims_name_and_assigns_id() {
        let user = User::new("  Alice  ").unwrap();
        assert_eq!(user.name, "Alice");
        assert!(!user.id.is_nil());
        assert!(user.created_at > 0);
    }

    #[test]
    fn new_rejects_empty_name() {
        assert_eq!(User::new(" ").unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn display_shows_id_and_name() {
        let user = User::new("Bob").unwrap();
        assert_eq!(user.to_string(), format!("User #{}: Bob", user.id));
    }
}
