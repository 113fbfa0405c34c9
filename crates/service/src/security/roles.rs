use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Custom,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Custom => "custom",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "custom" => Ok(Role::Custom),
            _ => Err(ServiceError::validation("user.errors.invalidRole")),
        }
    }
}

/// Parse stored role strings, skipping values that are no longer defined.
pub fn parse_stored(values: impl IntoIterator<Item = String>) -> Vec<Role> {
    values.into_iter().filter_map(|v| v.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Custom.to_string(), "custom");
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn stored_values_skip_unknown() {
        let roles = parse_stored(vec!["custom".to_string(), "legacy".to_string()]);
        assert_eq!(roles, vec![Role::Custom]);
    }
}
