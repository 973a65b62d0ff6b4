use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An abuse report against a project. Dependent aggregate: removed when the
/// referenced project is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub project_id: Uuid,
    pub abuse: String,
    pub creation_date: DateTime<Utc>,
}

impl Report {
    pub fn new(reporter_id: Uuid, project_id: Uuid, abuse: impl Into<String>) -> Self {
        Report {
            id: Uuid::new_v4(),
            reporter_id,
            project_id,
            abuse: abuse.into(),
            creation_date: Utc::now(),
        }
    }
}
