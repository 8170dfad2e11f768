//! Runs the built `feedsnap` binary and checks exit status and stderr.
//!
//! Each test runs the binary from its own scratch directory so the default
//! output path never touches the repository.

use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <item>
    <title>CLI entry</title>
    <link>https://zenn.dev/urakawa_jinsei/articles/cli</link>
  </item>
</channel></rss>"#;

fn work_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("feedsnap_cli_{name}"));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

async fn feedsnap(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_feedsnap"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .await
        .unwrap()
}

fn write_config(dir: &Path, server: &MockServer) -> PathBuf {
    let path = dir.join("feedsnap.toml");
    std::fs::write(
        &path,
        format!(
            "feed_url = \"{uri}/feed\"\nproxy_url = \"{uri}/proxy\"\ntimeout_secs = 5\n",
            uri = server.uri()
        ),
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let dir = work_dir("missing_config");

    let out = feedsnap(&dir, &["--config", "no-such-feedsnap.toml"]).await;

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("Error: Failed to load config 'no-such-feedsnap.toml'"));
    assert!(!dir.join("assets").exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_unreachable_feed_exits_with_single_error_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = work_dir("unreachable");
    let config = write_config(&dir, &server);

    let out = feedsnap(&dir, &["--config", config.to_str().unwrap()]).await;

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1, "stderr was: {stderr}");
    assert!(lines[0].starts_with("Error: Unable to fetch RSS feed: "));
    assert!(out.stdout.is_empty());
    assert!(!dir.join("assets").exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_successful_run_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RSS_FEED))
        .mount(&server)
        .await;
    let dir = work_dir("success");
    let config = write_config(&dir, &server);

    let out = feedsnap(
        &dir,
        &["--config", config.to_str().unwrap(), "--output", "out/feed.json"],
    )
    .await;

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim_end(),
        format!("Wrote 1 articles to {}", Path::new("out/feed.json").display())
    );
    let written = std::fs::read_to_string(dir.join("out").join("feed.json")).unwrap();
    assert!(written.contains("\"title\": \"CLI entry\""));

    std::fs::remove_dir_all(&dir).ok();
}
