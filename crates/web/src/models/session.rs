//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use crowdfund_core::UserId;

use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub first_name: String,
    pub last_name: String,
    /// User's database ID.
    pub user_id: UserId,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_id: user.id,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let user = CurrentUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            user_id: UserId::new(12),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"firstName": "Ada", "lastName": "Lovelace", "userId": 12})
        );
    }
}
