use std::path::Path;
use std::process::Output;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode as HttpStatus;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::process::Command;

fn wuprobe_cmd(dir: &Path) -> Command {
    let config = dir.join("wuprobe.toml");
    if !config.exists() {
        std::fs::write(&config, "").expect("write empty config");
    }

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wuprobe"));
    cmd.current_dir(dir);
    cmd.env("WUPROBE_CONFIG", &config);
    cmd.env_remove("WUPROBE_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--log-file").arg(dir.join("wuprobe.log"));
    cmd
}

async fn run(dir: &Path, args: &[&str]) -> Output {
    wuprobe_cmd(dir)
        .args(args)
        .output()
        .await
        .expect("run wuprobe")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

#[derive(Clone, Default)]
struct Server {
    details: Arc<Mutex<Vec<Value>>>,
}

async fn spawn_server() -> (String, Server) {
    let state = Server::default();
    let router = Router::new()
        .route(
            "/rest/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "secret" {
                    (HttpStatus::OK, Json(json!({ "token": "tok" })))
                } else {
                    (HttpStatus::UNAUTHORIZED, Json(json!({ "message": "denied" })))
                }
            }),
        )
        .route(
            "/rest/detail",
            post(
                |State(state): State<Server>, Json(body): Json<Value>| async move {
                    state.details.lock().unwrap().push(body);
                    Json(json!({}))
                },
            ),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn help_exits_0() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["--help"]).await;
    assert_eq!(out.status.code(), Some(0));
}

#[tokio::test]
async fn unknown_flag_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["--bogus"]).await;
    assert_eq!(out.status.code(), Some(3));
    assert!(stdout(&out).starts_with("UNKNOWN - "));
}

#[tokio::test]
async fn invalid_severity_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["--reboot-severity", "loud"]).await;
    assert_eq!(out.status.code(), Some(3));
}

#[tokio::test]
async fn missing_server_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &[]).await;
    assert_eq!(out.status.code(), Some(3));
    assert!(stdout(&out).starts_with("UNKNOWN - configuration error"));
}

#[tokio::test]
async fn oversized_cache_expiry_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(
        dir.path(),
        &[
            "--server",
            "http://127.0.0.1:9",
            "--username",
            "admin",
            "--password",
            "secret",
            "--cache-expiry-hours",
            "9223372036854775807",
        ],
    )
    .await;
    assert_eq!(out.status.code(), Some(3));
    assert!(stdout(&out).starts_with("UNKNOWN - configuration error"));
}

#[tokio::test]
async fn malformed_config_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("wuprobe.toml"), "[server\nurl = ").unwrap();
    let out = run(dir.path(), &[]).await;
    assert_eq!(out.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn inventory_failure_is_submitted_as_unknown() {
    let (url, server) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let out = run(
        dir.path(),
        &[
            "--server",
            &url,
            "--username",
            "admin",
            "--password",
            "secret",
            "--hostname",
            "web01",
            "--no-cache",
            "--powershell",
            "wuprobe-missing-shell",
        ],
    )
    .await;

    assert_eq!(out.status.code(), Some(3));
    assert!(stdout(&out).starts_with("UNKNOWN - inventory unavailable"));

    let details = server.details.lock().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["set_state"]["result"], "3");
    assert!(details[0]["set_state"].get("perfdata").is_none());
    assert!(dir.path().join("wuprobe.log").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_exits_3_without_submission() {
    let (url, server) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let out = run(
        dir.path(),
        &[
            "--server",
            &url,
            "--username",
            "admin",
            "--password",
            "wrong",
            "--no-cache",
            "--powershell",
            "wuprobe-missing-shell",
        ],
    )
    .await;

    assert_eq!(out.status.code(), Some(3));
    assert!(stdout(&out).starts_with("UNKNOWN - authentication failed"));
    assert!(server.details.lock().unwrap().is_empty());
}
