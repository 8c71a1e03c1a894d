use std::time::{Duration, Instant};

use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::{HarnessError, Result};

/// Default timeout for element-appearance polling.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Bounds for a condition-based wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }

    /// Single check, no polling. Used for "is it there right now" checks.
    pub fn immediate() -> Self {
        Self {
            timeout_ms: 0,
            poll_interval_ms: 0,
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Poll `check` until it yields `Some`, or the timeout elapses.
///
/// The check always runs at least once, so a zero timeout is a single check.
/// Errors from the check abort the wait immediately.
pub fn poll_until<T, F>(options: &WaitOptions, mut check: F) -> Result<Option<T>>
where
    F: FnMut() -> Result<Option<T>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = check()? {
            return Ok(Some(value));
        }
        if start.elapsed() >= options.timeout() {
            return Ok(None);
        }
        std::thread::sleep(options.poll_interval());
    }
}

/// Like [`poll_until`] for boolean conditions, failing with `Timeout`.
pub fn wait_for<F>(options: &WaitOptions, what: &str, mut condition: F) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    let found = poll_until(options, || Ok(condition()?.then_some(())))?;
    found.ok_or_else(|| HarnessError::Timeout {
        what: what.to_string(),
        ms: options.timeout_ms,
    })
}

/// First visible element matching `selector`, polled until the timeout.
pub fn first_visible(
    driver: &mut dyn PageDriver,
    selector: &str,
    options: &WaitOptions,
) -> Result<Option<ElementRef>> {
    poll_until(options, || {
        let count = driver.count(selector)?;
        for i in 0..count {
            let element = ElementRef::new(selector, i);
            if driver.is_visible(&element)? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    })
}
