use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The identity claims the auth source exposes for the signed-in user.
///
/// All fields are optional: some identity providers withhold names, and the
/// backend accepts a sync payload with any subset of them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct UserIdentity {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserIdentity {
    pub fn new(
        email: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        UserIdentity {
            email,
            first_name,
            last_name,
        }
    }
}
