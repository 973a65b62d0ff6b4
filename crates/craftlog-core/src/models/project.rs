use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::image::Image;

/// Material needed for a project. No independent lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub amount: Option<String>,
}

/// A single build step. Holds at most one image; the array bound is
/// enforced by the write handlers, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub description: Option<String>,
    pub complete: bool,
    pub images: Vec<Image>,
}

impl Step {
    pub fn new(title: impl Into<String>) -> Self {
        Step {
            title: title.into(),
            description: None,
            complete: false,
            images: Vec::new(),
        }
    }
}

/// A user-owned project aggregate with nested steps, materials and images.
///
/// `active = false` is a soft-delete visibility flag, distinct from hard
/// removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub steps: Vec<Step>,
    pub materials: Vec<Material>,
    /// Cover image, at most one. Bound enforced by the write handlers.
    pub images: Vec<Image>,
    pub public: bool,
    pub complete: bool,
    pub active: bool,
    pub creation_date: DateTime<Utc>,
}

impl Project {
    pub fn new(user_id: Uuid, title: impl Into<String>) -> Self {
        Project {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: None,
            steps: Vec::new(),
            materials: Vec::new(),
            images: Vec::new(),
            public: false,
            complete: false,
            active: true,
            creation_date: Utc::now(),
        }
    }
}
