//! Cascade coordinator.
//!
//! Removing or deactivating a root aggregate fans out to its owned
//! sub-resources and dependent aggregates. Every branch is attempted; a
//! branch failure never aborts or rolls back the primary operation — it is
//! collected in the [`CascadeReport`] and, on the fire-and-forget path,
//! logged. This trades immediate consistency for responsiveness; a crash
//! between the primary write and a dispatched cascade leaves dependents
//! behind until the next removal attempt.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use uuid::Uuid;

use craftlog_core::models::{Authentication, Image, Project, Report, User};
use craftlog_core::{AppError, AppResult};
use craftlog_media::MediaPipeline;
use craftlog_store::{DocumentStore, Filter, FindOptions};

/// Per-branch results of one cascade. The caller decides logging and retry
/// policy; nothing is swallowed.
#[derive(Debug, Default)]
pub struct CascadeReport {
    outcomes: Vec<(String, AppResult<()>)>,
}

impl CascadeReport {
    fn push(&mut self, branch: impl Into<String>, result: AppResult<()>) {
        self.outcomes.push((branch.into(), result));
    }

    fn absorb(&mut self, prefix: &str, other: CascadeReport) {
        for (branch, result) in other.outcomes {
            self.outcomes.push((format!("{}/{}", prefix, branch), result));
        }
    }

    pub fn outcomes(&self) -> &[(String, AppResult<()>)] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AppError)> {
        self.outcomes
            .iter()
            .filter_map(|(branch, result)| match result {
                Err(err) => Some((branch.as_str(), err)),
                Ok(()) => None,
            })
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    fn log_failures(&self, operation: &str) {
        for (branch, err) in self.failures() {
            tracing::error!(
                operation = %operation,
                branch = %branch,
                error = %err,
                error_code = err.error_code(),
                "cascade branch failed"
            );
        }
    }
}

/// Orchestrates cross-aggregate consistency for removals and state changes.
pub struct CascadeCoordinator<S> {
    store: Arc<S>,
    media: Arc<MediaPipeline>,
}

impl<S> CascadeCoordinator<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, media: Arc<MediaPipeline>) -> Self {
        CascadeCoordinator { store, media }
    }

    async fn remove_image(&self, report: &mut CascadeReport, branch: String, image: &Image) {
        report.push(branch, self.media.remove(image).await);
    }

    /// Cascade for a removed project: step images, project images and all
    /// reports referencing the project. Materials carry no lifecycle hooks.
    pub async fn project_removed(&self, project: &Project) -> CascadeReport {
        let mut report = CascadeReport::default();

        for (index, step) in project.steps.iter().enumerate() {
            for image in &step.images {
                self.remove_image(&mut report, format!("step[{}].image", index), image)
                    .await;
            }
        }
        for image in &project.images {
            self.remove_image(&mut report, "project.image".to_string(), image)
                .await;
        }

        let reports_filter = Filter::new().eq("project_id", project.id);
        report.push(
            "reports",
            self.store
                .delete_many::<Report>(&reports_filter)
                .await
                .map(|removed| {
                    tracing::debug!(project_id = %project.id, removed, "reports removed");
                })
                .map_err(AppError::from),
        );

        report
    }

    /// Cascade for a removed user: avatar files, every owned project (each
    /// triggering the project cascade) and all authentication rows.
    pub async fn user_removed(&self, user: &User) -> CascadeReport {
        let mut report = CascadeReport::default();

        for image in &user.avatar {
            self.remove_image(&mut report, "user.avatar".to_string(), image)
                .await;
        }

        let owned = Filter::new().eq("user_id", user.id);
        match self
            .store
            .find::<Project>(&owned, &FindOptions::default())
            .await
        {
            Ok(projects) => {
                for project in projects {
                    report.push(
                        format!("project[{}]", project.id),
                        self.store
                            .delete::<Project>(project.id)
                            .await
                            .map(|_| ())
                            .map_err(AppError::from),
                    );
                    let sub = self.project_removed(&project).await;
                    report.absorb(&format!("project[{}]", project.id), sub);
                }
            }
            Err(err) => report.push("projects", Err(AppError::from(err))),
        }

        report.push(
            "authentications",
            self.store
                .delete_many::<Authentication>(&owned)
                .await
                .map(|_| ())
                .map_err(AppError::from),
        );

        report
    }

    /// Flip the `active` visibility flag on every project owned by the user.
    /// Never touches other users' data.
    pub async fn user_active_changed(&self, user_id: Uuid, active: bool) -> CascadeReport {
        let mut report = CascadeReport::default();
        let owned = Filter::new().eq("user_id", user_id);
        report.push(
            "projects.active",
            self.store
                .update_many::<Project>(&owned, &json!({ "active": active }))
                .await
                .map(|updated| {
                    tracing::debug!(user_id = %user_id, active, updated, "projects visibility updated");
                })
                .map_err(AppError::from),
        );
        report
    }

    /// Fire-and-forget variant of [`Self::project_removed`]: the cascade runs
    /// detached from the caller; failures are logged.
    pub fn dispatch_project_removed(self: &Arc<Self>, project: Project) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.project_removed(&project)
                .await
                .log_failures("project_removed");
        })
    }

    /// Fire-and-forget variant of [`Self::user_removed`].
    pub fn dispatch_user_removed(self: &Arc<Self>, user: User) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.user_removed(&user).await.log_failures("user_removed");
        })
    }

    /// Fire-and-forget variant of [`Self::user_active_changed`].
    pub fn dispatch_user_active_changed(
        self: &Arc<Self>,
        user_id: Uuid,
        active: bool,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.user_active_changed(user_id, active)
                .await
                .log_failures("user_active_changed");
        })
    }
}
