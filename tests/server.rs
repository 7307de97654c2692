use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, StatusCode};
use tempfile::TempDir;

use gameden::cache::PathCache;
use gameden::fs::Resolver;
use gameden::patch::PatchSet;
use gameden::server::response::HttpResponse;
use gameden::server::saves::{SAVE_FILE, SaveStore};
use gameden::server::{AppState, respond};

const MAIN_JS: &[u8] = b"PluginManager.setup($plugins);\nSceneManager.run(Scene_Boot);\n";

/// Minimal game folder: index.html, a nested image, and a main.js.
async fn game_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let base = dir.path();

    tokio::fs::write(base.join("index.html"), b"<html>game</html>")
        .await
        .unwrap();
    tokio::fs::create_dir_all(base.join("img/Enemies")).await.unwrap();
    tokio::fs::write(base.join("img/Enemies/Slime.png"), b"png bytes")
        .await
        .unwrap();
    tokio::fs::create_dir(base.join("js")).await.unwrap();
    tokio::fs::write(base.join("js/main.js"), MAIN_JS).await.unwrap();

    dir
}

async fn get(state: &AppState, path: &str) -> HttpResponse {
    respond(state, &Method::GET, path, Bytes::new()).await.unwrap()
}

async fn post(state: &AppState, path: &str, body: &[u8]) -> HttpResponse {
    respond(state, &Method::POST, path, Bytes::copy_from_slice(body))
        .await
        .unwrap()
}

async fn body_bytes(response: HttpResponse) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn content_type(response: &HttpResponse) -> &str {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn serves_assets_with_mismatched_case() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    let response = get(&state, "/IMG/enemies/slime.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/png");
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"png bytes"));
}

#[tokio::test]
async fn serves_percent_encoded_asset_paths() {
    let dir = game_dir().await;
    tokio::fs::write(dir.path().join("img/Title Screen.png"), b"title")
        .await
        .unwrap();
    let state = AppState::new(dir.path().to_path_buf());

    let response = get(&state, "/img/title%20screen.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"title"));
}

#[tokio::test]
async fn directory_requests_fall_back_to_index() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    let response = get(&state, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
    assert_eq!(
        body_bytes(response).await,
        Bytes::from_static(b"<html>game</html>")
    );
}

#[tokio::test]
async fn unknown_paths_get_404() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    let response = get(&state, "/img/enemies/dragon.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_get_asset_requests_get_405() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    let response = post(&state, "/img/Enemies/Slime.png", b"").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn requests_cannot_escape_the_game_directory() {
    let outer = TempDir::new().unwrap();
    let root = outer.path().join("game");
    tokio::fs::create_dir(&root).await.unwrap();
    tokio::fs::write(root.join("index.html"), b"<html>").await.unwrap();
    tokio::fs::write(outer.path().join("secret.txt"), b"secret")
        .await
        .unwrap();

    let state = AppState::new(root);
    let response = get(&state, "/../secret.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());
    let blob = br#"{"gameden:current":"Test Game","save1":"data"}"#;

    let response = post(&state, "/gameden/save", blob).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(dir.path().join(SAVE_FILE).exists());

    let response = post(&state, "/gameden/load", b"").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");
    assert_eq!(body_bytes(response).await, Bytes::copy_from_slice(blob));
}

#[tokio::test]
async fn empty_save_bodies_are_ignored() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    let response = post(&state, "/gameden/save", b"").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!dir.path().join(SAVE_FILE).exists());
}

#[tokio::test]
async fn load_without_save_returns_null() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    let response = post(&state, "/gameden/load", b"").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"null"));
}

#[tokio::test]
async fn status_endpoint_reports_the_server() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    let response = get(&state, "/gameden/status").await;
    assert_eq!(response.status(), StatusCode::OK);

    let status: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(status["name"], "gameden");
    assert_eq!(status["root"], dir.path().display().to_string());
}

#[tokio::test]
async fn known_main_js_is_served_patched() {
    let dir = game_dir().await;
    let base = dir.path();

    let mut patches = PatchSet::new();
    patches.register(PatchSet::hash_key(MAIN_JS), "// patched".to_string());
    let state = AppState::from_components(
        Resolver::new(base.to_path_buf()),
        PathCache::new(),
        patches,
        SaveStore::new(base),
    );

    let response = get(&state, "/js/main.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/javascript");
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"// patched"));
}

#[tokio::test]
async fn unknown_main_js_is_served_verbatim() {
    let dir = game_dir().await;
    let state = AppState::new(dir.path().to_path_buf());

    // The bundled patch targets a different engine build, so this
    // main.js hashes to an unregistered key.
    let response = get(&state, "/js/main.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, Bytes::from_static(MAIN_JS));
}

#[tokio::test]
async fn other_js_files_are_never_intercepted() {
    let dir = game_dir().await;
    tokio::fs::write(dir.path().join("js/plugins.js"), MAIN_JS)
        .await
        .unwrap();

    let mut patches = PatchSet::new();
    patches.register(PatchSet::hash_key(MAIN_JS), "// patched".to_string());
    let state = AppState::from_components(
        Resolver::new(dir.path().to_path_buf()),
        PathCache::new(),
        patches,
        SaveStore::new(dir.path()),
    );

    // Same content, same hash, but the name is not main.js.
    let response = get(&state, "/js/plugins.js").await;
    assert_eq!(body_bytes(response).await, Bytes::from_static(MAIN_JS));
}
