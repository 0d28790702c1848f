//! JSON-lines browser driver
//!
//! [`DriverExecutor`] spawns an external browser-automation process and
//! exchanges one JSON object per line over its stdin/stdout. Requests look
//! like `{"op":"navigate","url":"..."}`; every request gets exactly one
//! response line:
//!
//! ```text
//! {"ok": true}
//! {"ok": true, "page": { ...PageState... }}
//! {"ok": true, "outcome": "clicked"}
//! {"ok": false, "error": "element detached"}
//! ```

use super::executor::{ClickOutcome, Control, Field, InteractionExecutor, PageState};
use crate::error::{ErrorCode, RelishError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, trace, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum DriverRequest<'a> {
    Navigate { url: &'a str },
    Observe,
    Click { control: &'a Control },
    Type { field: Field, value: &'a str },
    Close,
}

impl DriverRequest<'_> {
    fn describe(&self) -> String {
        match self {
            DriverRequest::Navigate { url } => format!("navigate {url}"),
            DriverRequest::Observe => "observe".to_string(),
            DriverRequest::Click { control } => format!("click {control}"),
            DriverRequest::Type { field, .. } => format!("type {field:?}"),
            DriverRequest::Close => "close".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DriverResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    page: Option<PageState>,
    #[serde(default)]
    outcome: Option<ClickOutcome>,
}

/// Executor backed by a child process speaking the JSON-lines protocol
pub struct DriverExecutor {
    program: String,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl DriverExecutor {
    /// Spawn `command_line`, split with shell quoting rules
    pub fn spawn(command_line: &str) -> Result<Self> {
        let parts = shell_words::split(command_line).map_err(|e| {
            RelishError::config(format!("invalid driver command '{command_line}'")).with_source(e)
        })?;
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| RelishError::config("driver command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RelishError::executor_with_code(
                    ErrorCode::EXEC_SPAWN_FAILED,
                    format!("failed to start driver '{program}'"),
                    None,
                )
                .with_source(e)
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RelishError::executor("failed to capture driver stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RelishError::executor("failed to capture driver stdout"))?;

        debug!("Started browser driver: {}", program);
        Ok(Self {
            program: program.clone(),
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    async fn request(&mut self, request: DriverRequest<'_>) -> Result<DriverResponse> {
        let action = request.describe();
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');
        trace!("-> driver: {}", action);

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let reply = self.stdout.next_line().await?.ok_or_else(|| {
            RelishError::executor_with_code(
                ErrorCode::EXEC_DRIVER_EXITED,
                format!("driver '{}' closed its output", self.program),
                Some(action.clone()),
            )
        })?;
        let response: DriverResponse = serde_json::from_str(&reply).map_err(|e| {
            RelishError::executor_with_code(
                ErrorCode::EXEC_PROTOCOL_ERROR,
                format!("unparseable driver reply: {reply}"),
                Some(action.clone()),
            )
            .with_source(e)
        })?;

        if !response.ok {
            return Err(RelishError::executor_with_code(
                ErrorCode::EXEC_ACTION_FAILED,
                response
                    .error
                    .unwrap_or_else(|| "driver reported failure".to_string()),
                Some(action),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl InteractionExecutor for DriverExecutor {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.request(DriverRequest::Navigate { url }).await?;
        Ok(())
    }

    async fn observe_page_state(&mut self) -> Result<PageState> {
        self.request(DriverRequest::Observe)
            .await?
            .page
            .ok_or_else(|| {
                RelishError::executor_with_code(
                    ErrorCode::EXEC_PROTOCOL_ERROR,
                    "observe reply carried no page",
                    Some("observe".to_string()),
                )
            })
    }

    async fn click_control(&mut self, control: &Control) -> Result<ClickOutcome> {
        let response = self.request(DriverRequest::Click { control }).await?;
        Ok(response.outcome.unwrap_or(ClickOutcome::Clicked))
    }

    async fn type_text(&mut self, field: Field, value: &str) -> Result<()> {
        self.request(DriverRequest::Type { field, value }).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.request(DriverRequest::Close).await {
            debug!("Driver close request failed: {}", e);
        }
        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Browser driver exited with {}", status);
                Ok(())
            }
            Ok(Err(e)) => Err(RelishError::from(e)),
            Err(_) => {
                warn!(
                    "Browser driver did not exit within {:?}, killing it",
                    SHUTDOWN_GRACE
                );
                self.child.kill().await.map_err(RelishError::from)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::MealType;

    #[test]
    fn test_request_wire_format() {
        let control = Control::ProceedToCheckout;
        let json = serde_json::to_value(DriverRequest::Click { control: &control }).unwrap();
        assert_eq!(json["op"], "click");
        assert_eq!(json["control"]["kind"], "proceed_to_checkout");

        let json = serde_json::to_value(DriverRequest::Type {
            field: Field::DeliveryInstructions,
            value: "Front desk",
        })
        .unwrap();
        assert_eq!(json["field"], "delivery_instructions");
    }

    #[test]
    fn test_response_parsing() {
        let response: DriverResponse =
            serde_json::from_str(r#"{"ok":true,"outcome":"not_found"}"#).unwrap();
        assert_eq!(response.outcome, Some(ClickOutcome::NotFound));

        let response: DriverResponse = serde_json::from_str(
            r#"{"ok":true,"page":{"authenticated":true,"meals":{"lunch":{"menu":[]}}}}"#,
        )
        .unwrap();
        let page = response.page.unwrap();
        assert!(page.section(MealType::Lunch).is_some());
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(DriverExecutor::spawn("   ").is_err());
        assert!(DriverExecutor::spawn("driver 'unterminated").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_round_trip_with_shell_driver() {
        let script = r#"sh -c 'while read line; do case "$line" in *observe*) echo "{\"ok\":true,\"page\":{\"authenticated\":true}}";; *close*) echo "{\"ok\":true}"; exit 0;; *) echo "{\"ok\":true,\"outcome\":\"not_found\"}";; esac; done'"#;
        let mut driver = DriverExecutor::spawn(script).unwrap();

        let outcome = driver
            .click_control(&Control::WelcomeContinue)
            .await
            .unwrap();
        assert_eq!(outcome, ClickOutcome::NotFound);

        let page = driver.observe_page_state().await.unwrap();
        assert!(page.authenticated);

        driver.close().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_driver_error_reply() {
        let script = r#"sh -c 'read line; echo "{\"ok\":false,\"error\":\"tab crashed\"}"'"#;
        let mut driver = DriverExecutor::spawn(script).unwrap();
        let err = driver.navigate("https://example.com").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EXEC_ACTION_FAILED);
        assert!(err.to_string().contains("tab crashed"));
    }
}
