//! Web interface over a local subjects root.

use std::fs;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use scraper::{Html, Selector};
use tempfile::TempDir;
use tower::ServiceExt;

use eduhub::config::Settings;
use eduhub::server::{create_router, AppState};

fn setup() -> (TempDir, Router) {
    let root = TempDir::new().unwrap();

    let algebra = root.path().join("algebra");
    fs::create_dir(&algebra).unwrap();
    fs::write(
        algebra.join("files.json"),
        r#"{
            "notes": [
                {"name": "Groups.pdf", "url": "groups.pdf", "size": 1536, "date": "2024-02-10"},
                {"name": "Rings.pdf", "url": "rings.pdf", "date": "2024-04-02"}
            ],
            "videos": [
                {"name": "Lecture 1.mp4", "url": "https://videos.example.org/l1.mp4"}
            ]
        }"#,
    )
    .unwrap();
    fs::write(algebra.join("groups.pdf"), b"%PDF-1.4").unwrap();

    let physics = root.path().join("physics");
    fs::create_dir(&physics).unwrap();
    fs::write(physics.join("optics.pdf"), b"%PDF-1.4").unwrap();
    fs::create_dir(root.path().join(".git")).unwrap();

    let settings = Settings {
        subjects_root: root.path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    let router = create_router(AppState::new(&settings).unwrap());
    (root, router)
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn texts(html: &str, selector: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(selector).unwrap();
    doc.select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect()
}

#[tokio::test]
async fn test_index_lists_subject_folders() {
    let (_root, router) = setup();
    let (status, body) = get(router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(texts(&body, ".subject-list a"), vec!["algebra/", "physics/"]);
}

#[tokio::test]
async fn test_subject_page_default_category() {
    let (_root, router) = setup();
    let (status, body) = get(router, "/subjects/algebra").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(texts(&body, "#totalFiles"), vec!["3"]);
    assert_eq!(texts(&body, "#lastUpdated"), vec!["2024-04-02"]);
    assert_eq!(texts(&body, ".subcard.active"), vec!["notes"]);

    let doc = Html::parse_document(&body);
    let links = Selector::parse("table.file-listing a").unwrap();
    let hrefs: Vec<&str> = doc
        .select(&links)
        .filter_map(|a| a.value().attr("href"))
        .collect();
    assert_eq!(hrefs, vec!["/files/algebra/groups.pdf", "/files/algebra/rings.pdf"]);
}

#[tokio::test]
async fn test_subject_page_category_and_search() {
    let (_root, router) = setup();
    let (_, body) = get(router.clone(), "/subjects/algebra?category=videos").await;
    assert_eq!(texts(&body, ".subcard.active"), vec!["videos"]);
    assert!(body.contains("https://videos.example.org/l1.mp4"));

    let (_, body) = get(router.clone(), "/subjects/algebra?category=notes&q=RING").await;
    let rows = texts(&body, "table.file-listing tbody tr td:first-child");
    assert_eq!(rows, vec!["Rings.pdf"]);

    let (_, body) = get(router, "/subjects/algebra?category=notes&q=topology").await;
    assert_eq!(texts(&body, ".listing-empty"), vec!["No files found."]);
}

#[tokio::test]
async fn test_subject_without_manifest_uses_directory() {
    let (_root, router) = setup();
    let (status, body) = get(router, "/subjects/physics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(texts(&body, "#totalFiles"), vec!["1"]);
    let rows = texts(&body, "table.file-listing tbody tr td:first-child");
    assert_eq!(rows, vec!["optics.pdf"]);
}

#[tokio::test]
async fn test_unknown_subject_is_not_found() {
    let (_root, router) = setup();
    let (status, body) = get(router.clone(), "/subjects/chemistry").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("not found"));

    let (status, _) = get(router, "/subjects/..").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_files_and_stylesheet_are_served() {
    let (_root, router) = setup();
    let (status, body) = get(router.clone(), "/files/algebra/groups.pdf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "%PDF-1.4");

    let (status, body) = get(router, "/static/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-theme=\"dark\""));
}
