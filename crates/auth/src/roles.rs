use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role label used for coarse-grained access control.
///
/// Roles are intentionally opaque strings at this layer; they are compared by
/// simple membership, never by hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a stored role column into discrete roles.
    ///
    /// The database keeps roles as a comma-delimited string (e.g.
    /// `"admin,user"`); everything past this boundary works on the discrete
    /// set. Whitespace around tokens is dropped, empty tokens are skipped.
    pub fn split_list(raw: &str) -> Vec<Role> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Role::new(s.to_string()))
            .collect()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_skips_empty_tokens() {
        let roles = Role::split_list("admin, user,,  ");
        assert_eq!(roles, vec![Role::new("admin"), Role::new("user")]);
    }

    #[test]
    fn split_list_of_empty_string_is_empty() {
        assert!(Role::split_list("").is_empty());
        assert!(Role::split_list("  ").is_empty());
    }
}
