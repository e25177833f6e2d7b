use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::EapiError;
use crate::models::Switch;

/// Structured response format: nested command-tree JSON
pub const FORMAT_JSON: &str = "json";
/// Plain CLI text format: callers use this when they need literal
/// configuration text, avoiding a lossy structured-to-text conversion
pub const FORMAT_TEXT: &str = "text";

/// Ordered command variants for reading the device configuration.
/// Callers try each in turn and accept the first non-empty result.
pub const RUNNING_CONFIG_COMMANDS: &[&str] = &[
    "show running-config",
    "show startup-config",
    "show config",
    "show configuration",
];

/// eAPI client for one switch: JSON-RPC `runCmds` over HTTP(S) to
/// /command-api with basic auth. Credentials live only inside this
/// value for the duration of the calls made with it.
pub struct EapiClient {
    endpoint: String,
    username: String,
    password: String,
    client: Client,
}

impl EapiClient {
    /// Build a client from a switch's stored connection parameters.
    /// Switch management certs are routinely self-signed, so certificate
    /// verification is disabled for the HTTPS scheme.
    pub fn new(target: &Switch) -> Result<Self, EapiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(target.timeout_secs.max(1) as u64))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| EapiError::Communication(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: target.eapi_url(),
            username: target.username.clone(),
            password: target.password.clone(),
            client,
        })
    }

    /// Execute an ordered list of CLI commands. `enable` is prepended so
    /// privileged show/config commands work; its result is stripped from
    /// the returned vec, which then lines up with `cmds`.
    pub async fn run_commands(&self, cmds: &[&str], format: &str) -> Result<Vec<Value>, EapiError> {
        if cmds.is_empty() {
            return Err(EapiError::Validation("no commands to run".to_string()));
        }

        let mut full_cmds: Vec<&str> = Vec::with_capacity(cmds.len() + 1);
        full_cmds.push("enable");
        full_cmds.extend_from_slice(cmds);

        let payload = json!({
            "jsonrpc": "2.0",
            "method": "runCmds",
            "params": {
                "version": 1,
                "cmds": full_cmds,
                "format": format,
            },
            "id": "eos-console",
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&payload)
            .send()
            .await
            .map_err(|e| EapiError::Communication(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(EapiError::Communication(
                "authentication rejected by device".to_string(),
            ));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EapiError::Communication(format!(
                "eAPI HTTP {}: {}",
                status, body
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| EapiError::Communication(format!("invalid eAPI response: {}", e)))?;

        if let Some(err) = body.get("error") {
            return Err(Self::device_error(err, &full_cmds));
        }

        let mut results = match body.get("result") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(EapiError::Communication(
                    "eAPI response missing result array".to_string(),
                ))
            }
        };

        // Drop the enable result so indices match the caller's cmds
        if !results.is_empty() {
            results.remove(0);
        }
        Ok(results)
    }

    /// Execute a single command
    pub async fn run_command(&self, cmd: &str, format: &str) -> Result<Value, EapiError> {
        let mut results = self.run_commands(&[cmd], format).await?;
        results
            .pop()
            .ok_or_else(|| EapiError::Communication("empty eAPI result".to_string()))
    }

    /// Execute a single command in text format and return the output string
    pub async fn run_command_text(&self, cmd: &str) -> Result<String, EapiError> {
        let result = self.run_command(cmd, FORMAT_TEXT).await?;
        Ok(result
            .get("output")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Try an ordered list of command variants in text format and return
    /// the first non-empty output. Keeps the last error when all fail.
    /// This is the only retry the client layer participates in; a single
    /// RPC is never retried internally.
    pub async fn run_first_ok_text(&self, variants: &[&str]) -> Result<String, EapiError> {
        let mut last_error =
            EapiError::Communication("no command variants provided".to_string());

        for cmd in variants {
            match self.run_command_text(cmd).await {
                Ok(output) if !output.trim().is_empty() => return Ok(output),
                Ok(_) => {
                    last_error = EapiError::command(format!("{}: empty output", cmd));
                }
                Err(e) => {
                    tracing::debug!("eAPI variant '{}' failed: {}", cmd, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Translate an eAPI error object into a typed error. Device-side
    /// command failures include a data array with per-command results;
    /// the first entry carrying `errors` points at the failed command.
    fn device_error(err: &Value, cmds: &[&str]) -> EapiError {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown eAPI error")
            .to_string();

        let mut failed_command = None;
        let mut detail = Vec::new();
        if let Some(data) = err.get("data").and_then(Value::as_array) {
            for (i, entry) in data.iter().enumerate() {
                if let Some(errors) = entry.get("errors").and_then(Value::as_array) {
                    for e in errors {
                        if let Some(s) = e.as_str() {
                            detail.push(s.to_string());
                        }
                    }
                    failed_command = cmds.get(i).map(|c| c.to_string());
                    break;
                }
            }
        }

        let message = if detail.is_empty() {
            message
        } else {
            format!("{}: {}", message, detail.join("; "))
        };

        EapiError::Command {
            message,
            failed_command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn target(use_https: bool, port: i64) -> Switch {
        Switch {
            id: 1,
            hostname: "sw1".to_string(),
            ip_address: "10.0.0.1".to_string(),
            port,
            use_https,
            timeout_secs: 30,
            username: "admin".to_string(),
            password: "admin".to_string(),
            model: String::new(),
            eos_version: String::new(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_eapi_url() {
        assert_eq!(
            target(true, 443).eapi_url(),
            "https://10.0.0.1:443/command-api"
        );
        assert_eq!(
            target(false, 8080).eapi_url(),
            "http://10.0.0.1:8080/command-api"
        );
    }

    #[test]
    fn test_device_error_extracts_failed_command() {
        let err = serde_json::json!({
            "code": 1002,
            "message": "CLI command 3 of 3 'vlan 9999' failed: invalid command",
            "data": [
                {"output": ""},
                {"output": ""},
                {"errors": ["Invalid input (at token 1: '9999')"]}
            ]
        });
        let cmds = ["enable", "configure", "vlan 9999"];
        match EapiClient::device_error(&err, &cmds) {
            EapiError::Command {
                message,
                failed_command,
            } => {
                assert!(message.contains("Invalid input"));
                assert_eq!(failed_command.as_deref(), Some("vlan 9999"));
            }
            other => panic!("expected Command error, got {:?}", other),
        }
    }

    #[test]
    fn test_device_error_without_data() {
        let err = serde_json::json!({"code": -32602, "message": "Invalid params"});
        match EapiClient::device_error(&err, &["enable"]) {
            EapiError::Command {
                message,
                failed_command,
            } => {
                assert_eq!(message, "Invalid params");
                assert!(failed_command.is_none());
            }
            other => panic!("expected Command error, got {:?}", other),
        }
    }
}
