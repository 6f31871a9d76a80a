//! User roles.
//!
//! Roles are a closed set. Unknown names are rejected when parsed at the
//! boundary; nothing downstream ever compares free-form strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const ROLE_MODERATOR: &str = "moderator";

/// Valid role names, in the order they are reported in validation errors.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER, ROLE_MODERATOR];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Moderator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::User => ROLE_USER,
            Self::Moderator => ROLE_MODERATOR,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }

    /// True for roles allowed on moderator-or-admin routes.
    pub fn is_moderator_or_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_USER => Ok(Self::User),
            ROLE_MODERATOR => Ok(Self::Moderator),
            other => Err(CoreError::Validation(format!(
                "role: unknown role '{other}'. Must be one of: {VALID_ROLES:?}"
            ))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn parses_every_valid_name() {
        for name in VALID_ROLES {
            let role: Role = name.parse().unwrap();
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert_matches!("superuser".parse::<Role>(), Err(CoreError::Validation(_)));
        assert_matches!("Admin".parse::<Role>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn moderator_or_admin_gate() {
        assert!(Role::Admin.is_moderator_or_admin());
        assert!(Role::Moderator.is_moderator_or_admin());
        assert!(!Role::User.is_moderator_or_admin());
        assert!(!Role::Moderator.is_admin());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Moderator).unwrap(), "\"moderator\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }
}
