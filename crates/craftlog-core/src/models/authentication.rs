use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A token session. Dependent aggregate: removed when its user is removed.
/// Token signing and refresh live in the external auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub secret: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl Authentication {
    pub fn new(
        user_id: Uuid,
        secret: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Authentication {
            id: Uuid::new_v4(),
            user_id,
            secret: secret.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}
