use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::image::Image;
use crate::constants::PERMISSION_USER;

/// An account. Owns projects (1:N) and authentications (1:N).
///
/// Credential hashing and token issuance live in the external auth layer;
/// this record only carries the stored credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub permissions: Vec<String>,
    /// Avatar image, at most one. Bound enforced by the write handlers.
    pub avatar: Vec<Image>,
    pub active: bool,
    pub creation_date: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            permissions: vec![PERMISSION_USER.to_string()],
            avatar: Vec::new(),
            active: true,
            creation_date: Utc::now(),
        }
    }
}
