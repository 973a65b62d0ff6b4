//! [`Document`] implementations for the craftlog aggregates.
//!
//! Embedded types (Image, Step, Material) live inside their parent document
//! and are not collections of their own.

use craftlog_core::models::{Authentication, Project, Report, User};
use uuid::Uuid;

use crate::document::Document;

impl Document for Project {
    const COLLECTION: &'static str = "projects";
    const DEFAULT_SORT: &'static str = "creation_date";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "user_id",
        "title",
        "description",
        "steps",
        "materials",
        "images",
        "public",
        "complete",
        "active",
        "creation_date",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const DEFAULT_SORT: &'static str = "creation_date";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "password_hash",
        "permissions",
        "avatar",
        "active",
        "creation_date",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Report {
    const COLLECTION: &'static str = "reports";
    const DEFAULT_SORT: &'static str = "creation_date";
    const FIELDS: &'static [&'static str] =
        &["id", "reporter_id", "project_id", "abuse", "creation_date"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Authentication {
    const COLLECTION: &'static str = "authentications";
    const DEFAULT_SORT: &'static str = "id";
    const FIELDS: &'static [&'static str] =
        &["id", "user_id", "secret", "access_token", "refresh_token"];

    fn id(&self) -> Uuid {
        self.id
    }
}
