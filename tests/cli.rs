//! End-to-end tests that run the `clq` binary against a stub backend.

mod common;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use common::serve;

fn clq_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("clq");
    path
}

fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let config_path = dir.join("clq.toml");
    fs::write(
        &config_path,
        format!(
            r#"[backend]
base_url = "{}"

[registry]
poll_secs = 10
"#,
            base_url
        ),
    )
    .unwrap();
    config_path
}

fn run_clq_blocking(config_path: PathBuf, args: Vec<String>) -> (String, String, bool) {
    let output = Command::new(clq_binary())
        .arg("--config")
        .arg(&config_path)
        .args(&args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run clq binary: {}", e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

async fn run_clq(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let config_path = config_path.to_path_buf();
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    tokio::task::spawn_blocking(move || run_clq_blocking(config_path, args))
        .await
        .unwrap()
}

fn listing() -> Value {
    json!([
        {"id": 1, "uid": "abc-123", "name": "terms.pdf", "status": "Completed"},
        {"id": 2, "uid": "def-456", "name": "policy.pdf", "status": "Processing"}
    ])
}

#[tokio::test(flavor = "multi_thread")]
async fn test_files_prints_table() {
    let app = Router::new().route("/files", get(|| async { Json(listing()) }));
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base);

    let (stdout, stderr, success) = run_clq(&config_path, &["files"]).await;
    assert!(success, "files failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("terms.pdf"));
    assert!(stdout.contains("Completed"));
    assert!(stdout.contains("abc-123"));
    assert!(stdout.contains("Processing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_files_empty_prints_guidance() {
    let app = Router::new().route("/files", get(|| async { Json(json!([])) }));
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base);

    let (stdout, _, success) = run_clq(&config_path, &["files"]).await;
    assert!(success);
    assert!(stdout.contains("No files found. Please upload a file."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_base_url_env_fallback() {
    let app = Router::new().route("/files", get(|| async { Json(listing()) }));
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let missing_config = tmp.path().join("does-not-exist.toml");

    let output = tokio::task::spawn_blocking(move || {
        Command::new(clq_binary())
            .arg("--config")
            .arg(&missing_config)
            .arg("files")
            .env("CLQ_BACKEND_URL", &base)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("terms.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_prints_message_and_fresh_listing() {
    let app = Router::new()
        .route(
            "/upload",
            post(|mut multipart: Multipart| async move {
                let field = multipart.next_field().await.unwrap().unwrap();
                assert_eq!(field.name(), Some("file"));
                Json(json!({"message": "File terms.pdf uploaded successfully."}))
            }),
        )
        .route("/files", get(|| async { Json(listing()) }));
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base);

    let pdf_path = tmp.path().join("terms.pdf");
    fs::write(&pdf_path, b"%PDF-1.4 fake").unwrap();

    let (stdout, stderr, success) =
        run_clq(&config_path, &["upload", pdf_path.to_str().unwrap()]).await;
    assert!(success, "upload failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("File terms.pdf uploaded successfully."));
    assert!(stdout.contains("terms.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_prints_confirmation() {
    let app = Router::new().route(
        "/delete-file/{uid}",
        delete(|| async { Json(json!({"message": "File terms.pdf deleted successfully"})) }),
    );
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base);

    let (stdout, _, success) = run_clq(&config_path, &["delete", "abc-123"]).await;
    assert!(success);
    assert!(stdout.contains("File terms.pdf deleted successfully"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_missing_file_prints_error() {
    let app = Router::new().route(
        "/delete-file/{uid}",
        delete(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "File not found"}))) }),
    );
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base);

    let (_, stderr, success) = run_clq(&config_path, &["delete", "zzz-999"]).await;
    assert!(success);
    assert!(stderr.contains("File not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_chat_repl_roundtrip() {
    let app = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["file_uid"], "abc-123");
            Json(json!({
                "answer": "Either party may terminate with 30 days notice.",
                "source": "doc.pdf",
                "page": "4"
            }))
        }),
    );
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base);

    let output = tokio::task::spawn_blocking(move || {
        let mut child = Command::new(clq_binary())
            .arg("--config")
            .arg(&config_path)
            .args(["chat", "abc-123"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .as_mut()
            .unwrap()
            .write_all(b"What is the termination clause?\n/quit\n")
            .unwrap();
        child.wait_with_output().unwrap()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "chat failed: {}", stdout);
    assert!(stdout.contains("ai> Either party may terminate with 30 days notice."));
    assert!(stdout.contains("[source: doc.pdf, page 4]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_chat_repl_suggested_prompt() {
    let app = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            let question = body["question"].as_str().unwrap();
            assert!(question.contains("termination clauses"));
            Json(json!({"answer": "Nothing unusual.", "source": "doc.pdf", "page": null}))
        }),
    );
    let base = serve(app).await;
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base);

    // Pick prompt 2, then send it with an empty line.
    let output = tokio::task::spawn_blocking(move || {
        let mut child = Command::new(clq_binary())
            .arg("--config")
            .arg(&config_path)
            .args(["chat", "abc-123"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .as_mut()
            .unwrap()
            .write_all(b"/prompt 2\n\n/quit\n")
            .unwrap();
        child.wait_with_output().unwrap()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "chat failed: {}", stdout);
    assert!(stdout.contains("[pending]"));
    assert!(stdout.contains("ai> Nothing unusual."));
    assert!(stdout.contains("[source: doc.pdf]"));
}
