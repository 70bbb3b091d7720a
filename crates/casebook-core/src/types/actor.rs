use serde::{Deserialize, Serialize};

///
/// Actor
///
/// Identity of the user performing a mutation.
/// Resolved by the authentication layer and threaded explicitly into every
/// store and history call; the core never looks it up.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Actor {
    pub user_name: String,
    pub organisation: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

impl Actor {
    #[must_use]
    pub fn new(user_name: impl Into<String>, organisation: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            organisation: organisation.into(),
            full_name: None,
            verified: true,
        }
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub const fn unverified(mut self) -> Self {
        self.verified = false;
        self
    }
}
