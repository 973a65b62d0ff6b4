pub mod authentication;
pub mod image;
pub mod project;
pub mod report;
pub mod user;

pub use authentication::Authentication;
pub use image::{Image, ImageVariant};
pub use project::{Material, Project, Step};
pub use report::Report;
pub use user::User;
