use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::{HarnessError, Result};

/// Default location of the Playwright adapter, relative to the working directory.
pub const DEFAULT_SERVER_SCRIPT: &str = "node/browser_server.js";

/// Request sent to browser_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Query {
        cmd: &'static str,
        selector: String,
    },
    Element {
        cmd: &'static str,
        selector: String,
        nth: usize,
    },
    ElementValue {
        cmd: &'static str,
        selector: String,
        nth: usize,
        value: String,
    },
    Attribute {
        cmd: &'static str,
        selector: String,
        nth: usize,
        name: String,
    },
    SetFiles {
        cmd: &'static str,
        selector: String,
        nth: usize,
        path: String,
    },
    Pause {
        cmd: &'static str,
        duration_ms: u64,
    },
    Screenshot {
        cmd: &'static str,
        path: String,
    },
    Page {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn count(selector: &str) -> Self {
        BrowserRequest::Query {
            cmd: "count",
            selector: selector.to_string(),
        }
    }

    /// Element-targeted commands without a payload
    /// (`visible`, `text`, `input_value`, `checked`, `click`, `click_popup`,
    /// `check`, `hover`, `scroll`).
    pub fn element(cmd: &'static str, element: &ElementRef) -> Self {
        BrowserRequest::Element {
            cmd,
            selector: element.selector.clone(),
            nth: element.nth,
        }
    }

    /// Element-targeted commands carrying a string (`fill`, `press`, `set_value`).
    pub fn element_value(cmd: &'static str, element: &ElementRef, value: &str) -> Self {
        BrowserRequest::ElementValue {
            cmd,
            selector: element.selector.clone(),
            nth: element.nth,
            value: value.to_string(),
        }
    }

    pub fn attribute(element: &ElementRef, name: &str) -> Self {
        BrowserRequest::Attribute {
            cmd: "attribute",
            selector: element.selector.clone(),
            nth: element.nth,
            name: name.to_string(),
        }
    }

    pub fn set_files(element: &ElementRef, path: &Path) -> Self {
        BrowserRequest::SetFiles {
            cmd: "set_files",
            selector: element.selector.clone(),
            nth: element.nth,
            path: path.display().to_string(),
        }
    }

    pub fn pause(duration_ms: u64) -> Self {
        BrowserRequest::Pause {
            cmd: "pause",
            duration_ms,
        }
    }

    pub fn screenshot(path: &str) -> Self {
        BrowserRequest::Screenshot {
            cmd: "screenshot",
            path: path.to_string(),
        }
    }

    /// Page-level commands (`current_url`, `title`, `body_text`, `quit`).
    pub fn page(cmd: &'static str) -> Self {
        BrowserRequest::Page { cmd }
    }
}

/// Response received from browser_server.js over stdout (one JSON line).
#[derive(Debug, Default, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// How to start the adapter process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserOptions {
    pub server_script: PathBuf,
    pub headless: bool,
    pub slow_mo_ms: u64,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            server_script: PathBuf::from(DEFAULT_SERVER_SCRIPT),
            headless: true,
            slow_mo_ms: 0,
        }
    }
}

/// A persistent browser session backed by browser_server.js.
///
/// Launches a long-lived Node.js process that keeps one Chromium page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    current_url: Option<String>,
    closed: bool,
}

impl BrowserSession {
    /// Launch a new browser session by spawning the adapter script.
    pub fn launch(options: &BrowserOptions) -> Result<Self> {
        let script = options.server_script.display().to_string();
        debug!(%script, headless = options.headless, "launching browser adapter");

        let mut child = Command::new("node")
            .arg(&options.server_script)
            .arg(format!("--headless={}", options.headless))
            .arg(format!("--slow-mo={}", options.slow_mo_ms))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| HarnessError::SubprocessSpawn {
                script: script.clone(),
                source: e,
            })?;

        let (stdin, reader) = match Self::handshake(&mut child, &script) {
            Ok(pipes) => pipes,
            Err(e) => {
                warn!(%script, error = %e, "adapter failed to start, killing it");
                reap(&mut child);
                return Err(e);
            }
        };

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            current_url: None,
            closed: false,
        })
    }

    fn handshake(child: &mut Child, script: &str) -> Result<(ChildStdin, BufReader<ChildStdout>)> {
        let stdin = child.stdin.take().ok_or_else(|| {
            HarnessError::SessionIo(format!("failed to capture stdin of {}", script))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            HarnessError::SessionIo(format!("failed to capture stdout of {}", script))
        })?;

        let mut reader = BufReader::new(stdout);
        read_ready(&mut reader)?;
        Ok((stdin, reader))
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse> {
        let json = serde_json::to_string(request).map_err(|e| HarnessError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json)
            .map_err(|e| HarnessError::SessionIo(format!("failed to write to adapter: {}", e)))?;

        self.stdin
            .flush()
            .map_err(|e| HarnessError::SessionIo(format!("failed to flush adapter stdin: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| HarnessError::SessionIo(format!("failed to read from adapter: {}", e)))?;

        if line.trim().is_empty() {
            return Err(HarnessError::SessionIo(
                "empty response from adapter (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| HarnessError::JsonParse {
            context: "adapter response".into(),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &BrowserRequest, command_name: &str) -> Result<BrowserResponse> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(HarnessError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    fn element_cmd(&mut self, cmd: &'static str, element: &ElementRef) -> Result<BrowserResponse> {
        self.send_ok(&BrowserRequest::element(cmd, element), cmd)
    }

    /// Last known URL (cached, no browser call).
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }
}

impl PageDriver for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.send_ok(&BrowserRequest::navigate(url), "navigate")?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        let response = self.send_ok(&BrowserRequest::page("current_url"), "current_url")?;
        let url = response.url.ok_or_else(|| HarnessError::SessionProtocol {
            command: "current_url".into(),
            error: "no URL in response".into(),
        })?;
        self.current_url = Some(url.clone());
        Ok(url)
    }

    fn title(&mut self) -> Result<String> {
        let response = self.send_ok(&BrowserRequest::page("title"), "title")?;
        Ok(response.title.unwrap_or_default())
    }

    fn body_text(&mut self) -> Result<String> {
        let response = self.send_ok(&BrowserRequest::page("body_text"), "body_text")?;
        Ok(response.text.unwrap_or_default())
    }

    fn count(&mut self, selector: &str) -> Result<usize> {
        let response = self.send_ok(&BrowserRequest::count(selector), "count")?;
        Ok(response.count.unwrap_or(0))
    }

    fn is_visible(&mut self, element: &ElementRef) -> Result<bool> {
        Ok(self.element_cmd("visible", element)?.visible.unwrap_or(false))
    }

    fn text_content(&mut self, element: &ElementRef) -> Result<Option<String>> {
        Ok(self.element_cmd("text", element)?.text)
    }

    fn attribute(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let response = self.send_ok(&BrowserRequest::attribute(element, name), "attribute")?;
        Ok(response.value)
    }

    fn input_value(&mut self, element: &ElementRef) -> Result<String> {
        Ok(self.element_cmd("input_value", element)?.value.unwrap_or_default())
    }

    fn is_checked(&mut self, element: &ElementRef) -> Result<bool> {
        Ok(self.element_cmd("checked", element)?.checked.unwrap_or(false))
    }

    fn click(&mut self, element: &ElementRef) -> Result<()> {
        self.element_cmd("click", element).map(|_| ())
    }

    fn click_and_follow_popup(&mut self, element: &ElementRef) -> Result<()> {
        let response = self.element_cmd("click_popup", element)?;
        self.current_url = response.url;
        Ok(())
    }

    fn fill(&mut self, element: &ElementRef, value: &str) -> Result<()> {
        self.send_ok(&BrowserRequest::element_value("fill", element, value), "fill")
            .map(|_| ())
    }

    fn check(&mut self, element: &ElementRef) -> Result<()> {
        self.element_cmd("check", element).map(|_| ())
    }

    fn hover(&mut self, element: &ElementRef) -> Result<()> {
        self.element_cmd("hover", element).map(|_| ())
    }

    fn press(&mut self, element: &ElementRef, key: &str) -> Result<()> {
        self.send_ok(&BrowserRequest::element_value("press", element, key), "press")
            .map(|_| ())
    }

    fn scroll_into_view(&mut self, element: &ElementRef) -> Result<()> {
        self.element_cmd("scroll", element).map(|_| ())
    }

    fn set_input_files(&mut self, element: &ElementRef, path: &Path) -> Result<()> {
        self.send_ok(&BrowserRequest::set_files(element, path), "set_files")
            .map(|_| ())
    }

    fn set_value_by_script(&mut self, element: &ElementRef, value: &str) -> Result<()> {
        self.send_ok(
            &BrowserRequest::element_value("set_value", element, value),
            "set_value",
        )
        .map(|_| ())
    }

    fn pause(&mut self, ms: u64) -> Result<()> {
        self.send_ok(&BrowserRequest::pause(ms), "pause").map(|_| ())
    }

    fn screenshot(&mut self, path: &str) -> Result<()> {
        self.send_ok(&BrowserRequest::screenshot(path), "screenshot")
            .map(|_| ())
    }

    fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Best-effort: the process may already be gone
        if let Err(e) = self.send(&BrowserRequest::page("quit")) {
            debug!("adapter quit: {}", e);
        }
        if let Err(e) = self.child.wait() {
            warn!("waiting for adapter exit: {}", e);
        }
        Ok(())
    }
}

/// Wait for the adapter's `{"ok": true, "ready": true}` line.
fn read_ready(reader: &mut impl BufRead) -> Result<()> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| HarnessError::SessionIo(format!("failed to read ready signal: {}", e)))?;

    let response: BrowserResponse =
        serde_json::from_str(line.trim()).map_err(|e| HarnessError::JsonParse {
            context: "adapter ready signal".into(),
            source: e,
        })?;

    if !response.ok || response.ready != Some(true) {
        return Err(HarnessError::SessionProtocol {
            command: "launch".into(),
            error: response
                .error
                .unwrap_or_else(|| "did not receive ready signal".into()),
        });
    }
    Ok(())
}

/// Kill a child that never became usable and collect its exit status.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("killing adapter: {}", e);
    }
    if let Err(e) = child.wait() {
        warn!("waiting for adapter exit: {}", e);
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn ready_line_is_accepted() {
        let mut input = Cursor::new("{\"ok\":true,\"ready\":true}\n");
        read_ready(&mut input).unwrap();
    }

    #[test]
    fn missing_or_failed_ready_line_is_an_error() {
        let err = read_ready(&mut Cursor::new("")).unwrap_err();
        assert!(matches!(err, HarnessError::JsonParse { .. }));

        let mut failed = Cursor::new("{\"ok\":false,\"error\":\"no chromium\"}\n");
        let err = read_ready(&mut failed).unwrap_err();
        assert!(matches!(err, HarnessError::SessionProtocol { ref error, .. } if error == "no chromium"));
    }

    #[cfg(unix)]
    #[test]
    fn reaped_child_has_exited() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }
}
