//! Principal identity.

use std::fmt;

/// Identifies a principal (tenant domain + user) acting as either a
/// resource owner or the calling profile.
///
/// Equality is by value; the type is cheap to clone and usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileId {
    domain_id: String,
    user_id: String,
}

impl ProfileId {
    /// Creates a new profile identity.
    pub fn new(domain_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            user_id: user_id.into(),
        }
    }

    /// The tenant domain this profile belongs to.
    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    /// The user identifier within the domain.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user_id, self.domain_id)
    }
}
