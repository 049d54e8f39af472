use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tokio::task::JoinSet;
use tower::ServiceExt;

use pagewiki::{build_router, AppState, Config, PageStore, TemplateSet};

fn setup() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let templates =
        TemplateSet::from_dir(&Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")).unwrap();
    let state = AppState {
        store: PageStore::new(dir.path().to_path_buf()),
        templates: Arc::new(templates),
        config: Arc::new(Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::new()
        }),
    };
    (dir, build_router(state))
}

async fn save(app: Router, body: String) -> StatusCode {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/save/Busy")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("body={body}")))
            .unwrap(),
    )
    .await
    .unwrap()
    .status()
}

// the text between <pre> and </pre> in the view template
async fn viewed_body(app: Router) -> String {
    let response = app
        .oneshot(Request::builder().uri("/view/Busy").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    let start = html.find("<pre>").unwrap() + "<pre>".len();
    let end = html.find("</pre>").unwrap();
    html[start..end].to_string()
}

// readers racing writers only ever see one whole body or the other
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_see_a_partial_save() {
    let short = "a".repeat(20_000);
    let long = "b".repeat(60_000);

    let (dir, app) = setup();
    assert_eq!(save(app.clone(), short.clone()).await, StatusCode::FOUND);

    let mut set = JoinSet::new();
    for i in 0..40 {
        let body = if i % 2 == 0 { long.clone() } else { short.clone() };
        let app = app.clone();
        set.spawn(async move {
            assert_eq!(save(app, body).await, StatusCode::FOUND);
        });
    }
    for _ in 0..200 {
        let app = app.clone();
        let (short, long) = (short.clone(), long.clone());
        set.spawn(async move {
            let seen = viewed_body(app).await;
            assert!(seen == short || seen == long, "saw a {}-byte body", seen.len());
        });
    }

    while let Some(joined) = set.join_next().await {
        joined.unwrap();
    }

    // only the page file remains, no leftover temporaries
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["Busy.txt".to_string()]);
}
