#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::cargo::cargo_bin;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParam, CallToolResult},
    service::{RoleClient, RunningService},
    transport::child_process::{ConfigureCommandExt, TokioChildProcess},
};
use std::path::PathBuf;
use tokio::process::Command;

pub const API_KEY: &str = "integration-key";

pub fn server_bin() -> PathBuf {
    cargo_bin("moon-banking-mcp")
}

/// Environment shared by every spawned server: no config files, no metrics.
pub fn isolate(cmd: &mut Command) {
    let config_dir = std::env::temp_dir().join("moon-banking-mcp-tests-no-config");
    cmd.env("MOON_BANKING_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn")
        .env_remove("MOON_BANKING_CONFIG_PROFILE")
        .env_remove("MOON_BANKING_TIMEOUT_MS")
        .env_remove("METRICS_ADDR")
        .env_remove("METRICS_AUTH_TOKEN");
}

/// Spawn the server against `base_url` and complete the MCP handshake.
pub async fn connect(base_url: &str, args: &[&str]) -> Result<RunningService<RoleClient, ()>> {
    let bin = server_bin();
    let base_url = base_url.to_string();
    let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    let service = ()
        .serve(TokioChildProcess::new(Command::new(&bin).configure(
            |cmd| {
                isolate(cmd);
                cmd.args(&args)
                    .env("MOON_BANKING_API_KEY", API_KEY)
                    .env("MOON_BANKING_INTERNAL_BASE_URL", &base_url);
            },
        ))?)
        .await?;
    Ok(service)
}

pub fn call(name: &str, arguments: serde_json::Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.to_string().into(),
        arguments: arguments.as_object().cloned(),
    }
}

pub fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| content.as_text().map(|text| text.text.clone()))
        .collect::<Vec<_>>()
        .join("\n")
}
