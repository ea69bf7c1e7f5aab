use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures::future::join_all;
use pretty_assertions::assert_eq;
use sanctuary_local::{CommandAnalyzer, LocalFileSystem};
use sanctuary_server::{
    router, AppState, PreviewServer, ShutdownListener, ShutdownTrigger, StartOutcome, Workspace,
};
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    app: Router,
    state: AppState,
    root: PathBuf,
    quit: Option<ShutdownListener>,
    _temp_dir: TempDir,
}

async fn harness_with(analyzer: &str, preview_addr: &str) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    let workspace = Workspace::new(
        &root,
        Arc::new(LocalFileSystem::new()),
        Arc::new(CommandAnalyzer::from_command_line(analyzer)),
        PreviewServer::new(preview_addr, Duration::from_secs(1)),
    )
    .await
    .unwrap();

    let (shutdown, quit) = ShutdownTrigger::new();
    let state = AppState {
        workspace: Arc::new(workspace),
        shutdown,
    };
    Harness {
        app: router(state.clone()),
        state,
        root,
        quit: Some(quit),
        _temp_dir: temp_dir,
    }
}

async fn harness() -> Harness {
    harness_with("true", "127.0.0.1:0").await
}

impl Harness {
    async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn save(&self, path: &str, content: &str) -> Response {
        let body = format!(
            "path={}&content={}",
            urlencoding::encode(path),
            urlencoding::encode(content)
        );
        let request = Request::builder()
            .method("POST")
            .uri("/save")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn listing(&self) -> String {
        body_text(self.get("/fm").await).await
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_redirects_to_listing(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/fm");
}

#[tokio::test]
async fn test_shell_points_at_preview_address() {
    let h = harness_with("true", "127.0.0.1:0").await;
    let response = h.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"const PREVIEW_ORIGIN = "http://127.0.0.1:0";"#));
    assert!(html.contains(r#"<iframe src="/fm""#));
}

#[tokio::test]
async fn test_change_directory_and_back() {
    let h = harness().await;
    std::fs::create_dir(h.root.join("docs")).unwrap();
    std::fs::write(h.root.join("docs/guide.md"), "# Guide").unwrap();

    assert_redirects_to_listing(&h.get("/cd?path=docs").await);
    let html = h.listing().await;
    assert!(html.contains("guide.md"));
    assert!(html.contains(&format!(r#"value="{}""#, h.root.join("docs").display())));

    assert_redirects_to_listing(&h.get("/cd?path=..").await);
    assert_eq!(h.state.workspace.cursor.current().await, h.root);
}

#[tokio::test]
async fn test_failed_navigation_keeps_listing() {
    let h = harness().await;
    std::fs::write(h.root.join("stay.txt"), "").unwrap();

    assert_redirects_to_listing(&h.get("/cd?path=%2Fnonexistent%2Fsanctuary").await);
    assert_redirects_to_listing(&h.get("/cd").await);
    assert_redirects_to_listing(&h.get("/cd?path=stay.txt").await);

    assert_eq!(h.state.workspace.cursor.current().await, h.root);
    assert!(h.listing().await.contains("stay.txt"));
}

#[tokio::test]
async fn test_home_redirects() {
    let h = harness().await;
    assert_redirects_to_listing(&h.get("/home").await);
}

#[tokio::test]
async fn test_save_then_read_round_trip() {
    let h = harness().await;
    let path = h.root.join("main.go").to_string_lossy().to_string();
    let text = "package main\n\nfunc main() {\n\tprintln(\"héllo & <bye>\")\n}\n";

    assert_eq!(h.save(&path, text).await.status(), StatusCode::NO_CONTENT);

    let response = h.get(&format!("/read?path={}", urlencoding::encode(&path))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, text);
    assert_eq!(std::fs::read_to_string(h.root.join("main.go")).unwrap(), text);
}

#[tokio::test]
async fn test_save_empty_and_large_content() {
    let h = harness().await;
    let path = h.root.join("big.txt").to_string_lossy().to_string();

    assert_eq!(h.save(&path, "").await.status(), StatusCode::NO_CONTENT);
    assert_eq!(std::fs::read(h.root.join("big.txt")).unwrap().len(), 0);

    // Well past the default extractor body limit
    let large: String = "0123456789abcdef\n".repeat(200_000);
    assert_eq!(h.save(&path, &large).await.status(), StatusCode::NO_CONTENT);

    let read = body_text(h.get(&format!("/read?path={}", urlencoding::encode(&path))).await).await;
    assert_eq!(read.len(), large.len());
    assert!(read == large);
}

#[tokio::test]
async fn test_read_missing_is_empty() {
    let h = harness().await;
    let response = h.get("/read?path=missing.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn test_save_without_path_is_rejected() {
    let h = harness().await;
    let response = h.save("", "orphan").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "INVALID_PATH");
}

#[tokio::test]
async fn test_create_and_delete_entries() {
    let h = harness().await;

    assert_redirects_to_listing(&h.get("/newfolder?name=site").await);
    assert_redirects_to_listing(&h.get("/cd?path=site").await);
    assert_redirects_to_listing(&h.get("/newfile?name=index.html").await);
    assert_redirects_to_listing(&h.get("/newfolder?name=css").await);
    std::fs::write(h.root.join("site/css/deep.css"), "body {}").unwrap();
    assert!(h.root.join("site/index.html").is_file());

    // Collisions and empty names change nothing
    assert_redirects_to_listing(&h.get("/newfile?name=css").await);
    assert_redirects_to_listing(&h.get("/newfolder?name=").await);
    assert!(h.root.join("site/css").is_dir());

    assert_redirects_to_listing(&h.get("/delete?name=css").await);
    let html = h.listing().await;
    assert!(!html.contains(">css/<"));
    assert!(html.contains("index.html"));
    assert!(!h.root.join("site/css").exists());
}

#[tokio::test]
async fn test_delete_never_removes_cursor_parent() {
    let h = harness().await;
    std::fs::create_dir(h.root.join("inner")).unwrap();
    h.get("/cd?path=inner").await;

    assert_redirects_to_listing(&h.get("/delete?name=..").await);
    assert_redirects_to_listing(&h.get("/delete").await);
    assert!(h.root.join("inner").is_dir());
}

#[tokio::test]
async fn test_delete_never_empties_cursor_dir() {
    let h = harness().await;
    std::fs::create_dir_all(h.root.join("inner/sub")).unwrap();
    std::fs::write(h.root.join("inner/precious.txt"), "p").unwrap();
    h.get("/cd?path=inner").await;

    for name in [".", ".%2F", "sub%2F."] {
        assert_redirects_to_listing(&h.get(&format!("/delete?name={name}")).await);
    }

    let mut remaining: Vec<String> = std::fs::read_dir(h.root.join("inner"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    remaining.sort();
    assert_eq!(remaining, vec!["precious.txt".to_string(), "sub".to_string()]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_check_reports() {
    let clean = harness_with("true", "127.0.0.1:0").await;
    let response = clean.get("/check?path=main.go").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");

    let noisy = harness_with("echo vet:", "127.0.0.1:0").await;
    let report = body_text(noisy.get("/check?path=main.go").await).await;
    assert_eq!(report, format!("vet: {}\n", noisy.root.join("main.go").display()));

    let missing = harness_with("sanctuary-no-such-linter", "127.0.0.1:0").await;
    let report = body_text(missing.get("/check?path=main.go").await).await;
    assert!(report.starts_with("failed to run"));
}

#[tokio::test]
async fn test_preview_toggle_serves_cursor_directory() {
    let h = harness().await;
    std::fs::create_dir(h.root.join("www")).unwrap();
    std::fs::write(h.root.join("www/index.html"), "<h1>preview</h1>").unwrap();
    h.get("/cd?path=www").await;

    let response = h.get("/start-server").await;
    assert_eq!(response.status(), StatusCode::OK);
    let status: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(status["state"], "running");
    let address = status["address"].as_str().unwrap().to_string();

    // Second start is a no-op on the same listener
    let again: serde_json::Value =
        serde_json::from_str(&body_text(h.get("/start-server").await).await).unwrap();
    assert_eq!(again["address"], address.as_str());

    let page = reqwest::get(format!("http://{}/index.html", address))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(page, "<h1>preview</h1>");

    let root_page = reqwest::get(format!("http://{}/", address))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(root_page, "<h1>preview</h1>");

    let stopped: serde_json::Value =
        serde_json::from_str(&body_text(h.get("/stop-server").await).await).unwrap();
    assert_eq!(stopped["state"], "stopped");

    assert!(reqwest::get(format!("http://{}/index.html", address)).await.is_err());

    // Stopping again is harmless
    assert_eq!(h.get("/stop-server").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_starts_bind_exactly_once() {
    let h = harness().await;
    let workspace = h.state.workspace.clone();

    let outcomes = join_all((0..16).map(|_| {
        let workspace = workspace.clone();
        async move { workspace.start_preview().await }
    }))
    .await;

    let outcomes: Vec<StartOutcome> = outcomes.into_iter().map(|r| r.unwrap()).collect();
    let started = outcomes
        .iter()
        .filter(|o| matches!(o, StartOutcome::Started(_)))
        .count();
    assert_eq!(started, 1);

    let address = outcomes[0].address();
    assert!(outcomes.iter().all(|o| o.address() == address));

    workspace.stop_preview().await;
}

/// Grab a free loopback port and release it for the preview to claim.
fn reserve_port() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

fn is_bound(addr: &str) -> bool {
    std::net::TcpListener::bind(addr).is_err()
}

#[tokio::test]
async fn test_interleaved_start_and_stop_stay_consistent() {
    let addr = reserve_port();
    let h = harness_with("true", &addr).await;
    let workspace = h.state.workspace.clone();

    for round in 0..4 {
        let transitions = join_all((0..12).map(|i| {
            let workspace = workspace.clone();
            async move {
                if (i + round) % 3 == 0 {
                    workspace.stop_preview().await;
                    Ok(None)
                } else {
                    workspace.start_preview().await.map(Some)
                }
            }
        }))
        .await;

        // A start never trips over a listener this process still holds
        for transition in transitions {
            if let Some(outcome) = transition.unwrap() {
                assert_eq!(outcome.address().to_string(), addr);
            }
        }

        let running = workspace.preview.status().await.is_running();
        assert_eq!(running, is_bound(&addr), "round {round}: status disagrees with the socket");
    }

    workspace.stop_preview().await;
    assert!(!workspace.preview.status().await.is_running());
    assert!(!is_bound(&addr), "port still held after the final stop");
}

#[tokio::test]
async fn test_concurrent_start_requests_over_http() {
    let h = harness().await;

    let responses = join_all((0..8).map(|_| h.get("/start-server"))).await;
    let mut addresses = Vec::new();
    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
        let status: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        addresses.push(status["address"].as_str().unwrap().to_string());
    }
    addresses.dedup();
    assert_eq!(addresses.len(), 1);

    h.get("/stop-server").await;
}

#[tokio::test]
async fn test_preview_bind_conflict_is_unavailable() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = occupied.local_addr().unwrap().to_string();
    let h = harness_with("true", &addr).await;

    let response = h.get("/start-server").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "PREVIEW_UNAVAILABLE");

    let status: serde_json::Value =
        serde_json::from_str(&body_text(h.get("/preview/status").await).await).unwrap();
    assert_eq!(status["state"], "stopped");

    // The main interface keeps working
    assert_eq!(h.get("/fm").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_quit_fires_shutdown() {
    let mut h = harness().await;
    let quit = h.quit.take().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/quit")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Sanctuary shutting down...");

    tokio::time::timeout(Duration::from_secs(1), quit.wait())
        .await
        .expect("quit did not reach the shutdown listener");
    assert!(h.state.shutdown.is_triggered());
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    let body: serde_json::Value =
        serde_json::from_str(&body_text(h.get("/health").await).await).unwrap();
    assert_eq!(body["healthy"], true);
    assert_eq!(body["preview_running"], false);
}
