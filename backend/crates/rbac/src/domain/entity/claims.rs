//! Token Claims
//!
//! Facts attested by a bearer token. Never persisted.

use kernel::id::{RoleId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub email: String,
    pub role_id: RoleId,
    /// Unix seconds
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let claims = Claims {
            user_id: UserId::new(1),
            email: "a@b.io".into(),
            role_id: RoleId::new(2),
            expires_at: 1_700_000_000,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["role_id"], 2);
        assert_eq!(json["exp"], 1_700_000_000_i64);
        assert!(json.get("expires_at").is_none());
    }

    #[test]
    fn test_missing_exp_is_rejected() {
        let result =
            serde_json::from_str::<Claims>(r#"{"user_id":1,"email":"a@b.io","role_id":2}"#);
        assert!(result.is_err());
    }
}
