//! Integration tests for CLI argument handling

use std::process::Command;

/// Runs the binary with `args`, pointing it at `base_url`
fn run_cli(args: &[&str], base_url: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hextech_api"))
        .args(args)
        .env("API_BASE_URL", base_url)
        .env("API_TIMEOUT_MS", "1000")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute hextech_api")
}

/// Base URL of a port nobody listens on
fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[test]
fn test_help_lists_subcommands() {
    let output = run_cli(&["--help"], "http://localhost:8080");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["stats", "get", "post"] {
        assert!(stdout.contains(command), "help should mention {}", command);
    }
}

#[test]
fn test_malformed_param_is_rejected() {
    let output = run_cli(&["get", "/api/echo", "-p", "novalue"], "http://localhost:8080");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("key=value"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_invalid_json_body_is_rejected() {
    let output = run_cli(&["post", "/api/login", "--body", "{not json"], &dead_base_url());
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not valid JSON"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_unreachable_backend_fails_with_context() {
    let output = run_cli(&["stats"], &dead_base_url());
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load champion stats"),
        "unexpected stderr: {}",
        stderr
    );
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let output = run_cli(&["stats"], "not a url");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to build API client"), "unexpected stderr: {}", stderr);
}
