use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use tempfile::tempdir;
use uuid::Uuid;

use craftlog_core::models::{Authentication, Image, Project, Report, Step, User};
use craftlog_media::{IngestOptions, LocalMediaStore, MediaPipeline, SizeSpec, UploadedFile};
use craftlog_services::CascadeCoordinator;
use craftlog_store::{DocumentStore, Filter, MemoryStore};

struct Fixture {
    _dir: tempfile::TempDir,
    store: Arc<MemoryStore>,
    media: Arc<MediaPipeline>,
    coordinator: Arc<CascadeCoordinator<MemoryStore>>,
}

async fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let media_store = LocalMediaStore::new(dir.path()).await.unwrap();
    let media = Arc::new(MediaPipeline::new(Arc::new(media_store)));
    let store = Arc::new(MemoryStore::new());
    let coordinator = Arc::new(CascadeCoordinator::new(Arc::clone(&store), Arc::clone(&media)));
    Fixture {
        _dir: dir,
        store,
        media,
        coordinator,
    }
}

async fn ingest_image(media: &MediaPipeline, dir: &str, name: &str) -> Image {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        120,
        90,
        image::Rgba([10, 90, 40, 255]),
    ));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();

    let file = UploadedFile {
        fieldname: "image".to_string(),
        filename: format!("{}.png", name),
        data: Bytes::from(buf.into_inner()),
    };
    let options = IngestOptions {
        sizes: vec![SizeSpec::width(60)],
        thumb: true,
        ..Default::default()
    };
    media.ingest(file, dir, &options).await.unwrap().unwrap()
}

async fn all_files_absent(media: &MediaPipeline, image: &Image) -> bool {
    if media.store().exists(&image.path).await.unwrap() {
        return false;
    }
    for variant in &image.variants {
        if media.store().exists(&variant.path).await.unwrap() {
            return false;
        }
    }
    true
}

async fn all_files_present(media: &MediaPipeline, image: &Image) -> bool {
    if !media.store().exists(&image.path).await.unwrap() {
        return false;
    }
    for variant in &image.variants {
        if !media.store().exists(&variant.path).await.unwrap() {
            return false;
        }
    }
    true
}

#[tokio::test]
async fn test_project_removal_cascades_to_steps_images_and_reports() {
    let fx = fixture().await;
    let owner = Uuid::new_v4();

    let mut project = Project::new(owner, "Birdhouse");
    let project_dir = format!("projects/{}", project.id);

    let mut step1 = Step::new("Cut the boards");
    step1
        .images
        .push(ingest_image(&fx.media, &project_dir, "step1").await);
    let mut step2 = Step::new("Assemble");
    step2
        .images
        .push(ingest_image(&fx.media, &project_dir, "step2").await);
    project.steps = vec![step1, step2];
    project
        .images
        .push(ingest_image(&fx.media, &project_dir, "cover").await);
    fx.store.insert(&project).await.unwrap();

    let report = Report::new(Uuid::new_v4(), project.id, "spam");
    fx.store.insert(&report).await.unwrap();

    // Unrelated project with its own image and report stays untouched.
    let mut other = Project::new(Uuid::new_v4(), "Planter");
    let other_dir = format!("projects/{}", other.id);
    other
        .images
        .push(ingest_image(&fx.media, &other_dir, "cover").await);
    fx.store.insert(&other).await.unwrap();
    fx.store
        .insert(&Report::new(Uuid::new_v4(), other.id, "offensive"))
        .await
        .unwrap();

    fx.store.delete::<Project>(project.id).await.unwrap();
    let cascade = fx.coordinator.project_removed(&project).await;
    assert!(cascade.is_clean(), "{:?}", cascade.outcomes());

    for step in &project.steps {
        assert!(all_files_absent(&fx.media, &step.images[0]).await);
    }
    assert!(all_files_absent(&fx.media, &project.images[0]).await);

    let remaining_reports = fx
        .store
        .count::<Report>(&Filter::new().eq("project_id", project.id))
        .await
        .unwrap();
    assert_eq!(remaining_reports, 0);

    // Unrelated data untouched.
    assert!(all_files_present(&fx.media, &other.images[0]).await);
    let other_reports = fx
        .store
        .count::<Report>(&Filter::new().eq("project_id", other.id))
        .await
        .unwrap();
    assert_eq!(other_reports, 1);
}

#[tokio::test]
async fn test_user_removal_cascades_to_avatar_projects_and_authentications() {
    let fx = fixture().await;

    let mut user = User::new("bengt", "bengt@example.com", "hash");
    let avatar_dir = format!("users/{}", user.id);
    user.avatar
        .push(ingest_image(&fx.media, &avatar_dir, "avatar").await);
    fx.store.insert(&user).await.unwrap();

    let mut p1 = Project::new(user.id, "Shelf");
    p1.images
        .push(ingest_image(&fx.media, &format!("projects/{}", p1.id), "cover").await);
    let p2 = Project::new(user.id, "Table");
    fx.store.insert(&p1).await.unwrap();
    fx.store.insert(&p2).await.unwrap();
    fx.store
        .insert(&Report::new(Uuid::new_v4(), p1.id, "spam"))
        .await
        .unwrap();
    fx.store
        .insert(&Authentication::new(user.id, "secret", "access", "refresh"))
        .await
        .unwrap();

    let bystander = User::new("karin", "karin@example.com", "hash");
    let bystander_project = Project::new(bystander.id, "Lamp");
    fx.store.insert(&bystander).await.unwrap();
    fx.store.insert(&bystander_project).await.unwrap();
    fx.store
        .insert(&Authentication::new(bystander.id, "s", "a", "r"))
        .await
        .unwrap();

    fx.store.delete::<User>(user.id).await.unwrap();
    let cascade = fx.coordinator.user_removed(&user).await;
    assert!(cascade.is_clean(), "{:?}", cascade.outcomes());

    assert!(all_files_absent(&fx.media, &user.avatar[0]).await);
    assert!(all_files_absent(&fx.media, &p1.images[0]).await);

    assert!(fx.store.get::<Project>(p1.id).await.unwrap().is_none());
    assert!(fx.store.get::<Project>(p2.id).await.unwrap().is_none());
    assert_eq!(
        fx.store
            .count::<Report>(&Filter::new().eq("project_id", p1.id))
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        fx.store
            .count::<Authentication>(&Filter::new().eq("user_id", user.id))
            .await
            .unwrap(),
        0
    );

    // The bystander keeps everything.
    assert!(fx
        .store
        .get::<Project>(bystander_project.id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        fx.store
            .count::<Authentication>(&Filter::new().eq("user_id", bystander.id))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_deactivation_flips_only_that_users_projects() {
    let fx = fixture().await;
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    let a1 = Project::new(user_a, "A one");
    let a2 = Project::new(user_a, "A two");
    let b1 = Project::new(user_b, "B one");
    for p in [&a1, &a2, &b1] {
        fx.store.insert(p).await.unwrap();
    }

    let cascade = fx.coordinator.user_active_changed(user_a, false).await;
    assert!(cascade.is_clean());

    assert!(!fx.store.get::<Project>(a1.id).await.unwrap().unwrap().active);
    assert!(!fx.store.get::<Project>(a2.id).await.unwrap().unwrap().active);
    assert!(fx.store.get::<Project>(b1.id).await.unwrap().unwrap().active);

    // Reactivation flips them back.
    let cascade = fx.coordinator.user_active_changed(user_a, true).await;
    assert!(cascade.is_clean());
    assert!(fx.store.get::<Project>(a1.id).await.unwrap().unwrap().active);
    assert!(fx.store.get::<Project>(a2.id).await.unwrap().unwrap().active);
}

#[tokio::test]
async fn test_dispatched_cascade_completes_detached() {
    let fx = fixture().await;
    let owner = Uuid::new_v4();

    let mut project = Project::new(owner, "Detached");
    let dir = format!("projects/{}", project.id);
    project.images.push(ingest_image(&fx.media, &dir, "cover").await);
    fx.store.insert(&project).await.unwrap();
    fx.store
        .insert(&Report::new(Uuid::new_v4(), project.id, "spam"))
        .await
        .unwrap();

    fx.store.delete::<Project>(project.id).await.unwrap();
    let handle = fx.coordinator.dispatch_project_removed(project.clone());

    // The caller is free to return immediately; here we join to observe the
    // detached cascade's effects.
    handle.await.unwrap();
    assert!(all_files_absent(&fx.media, &project.images[0]).await);
    assert_eq!(
        fx.store
            .count::<Report>(&Filter::new().eq("project_id", project.id))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_cascade_failure_is_reported_not_fatal() {
    let fx = fixture().await;
    let owner = Uuid::new_v4();

    let mut project = Project::new(owner, "Broken media");
    // A record whose path escapes the storage root fails removal; the
    // cascade still runs the remaining branches.
    project.images.push(Image {
        path: "../outside.png".to_string(),
        width: 10,
        height: 10,
        variants: vec![],
    });
    fx.store.insert(&project).await.unwrap();
    fx.store
        .insert(&Report::new(Uuid::new_v4(), project.id, "spam"))
        .await
        .unwrap();

    fx.store.delete::<Project>(project.id).await.unwrap();
    let cascade = fx.coordinator.project_removed(&project).await;

    assert!(!cascade.is_clean());
    assert_eq!(cascade.failures().count(), 1);
    // Reports were still removed despite the failed media branch.
    assert_eq!(
        fx.store
            .count::<Report>(&Filter::new().eq("project_id", project.id))
            .await
            .unwrap(),
        0
    );
}
