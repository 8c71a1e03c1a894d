use tracing::{info, warn};

use crate::actions::ActionConfig;
use crate::browser::driver::PageDriver;
use crate::browser::session::{BrowserOptions, BrowserSession};
use crate::error::{HarnessError, Result};
use crate::fixture::FixtureData;
use crate::scenario::composer::Composer;
use crate::scenario::progress;
use crate::scenario::step_model::NavAction;
use crate::spec::assertions;
use crate::spec::context::TestContext;
use crate::spec::spec_model::{TestResult, TestSpec, TestStep};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;
use crate::wait::first_visible;

/// Executes a [`TestSpec`] step by step against one page.
#[derive(Debug, Clone, Default)]
pub struct TestRunner {
    pub config: ActionConfig,
    /// Prefix for URLs starting with `/`
    pub base_url: Option<String>,
}

impl TestRunner {
    pub fn new(config: ActionConfig) -> Self {
        Self {
            config,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn resolve(&self, url: &str) -> String {
        match (&self.base_url, url.starts_with('/')) {
            (Some(base), true) => format!("{}{}", base.trim_end_matches('/'), url),
            _ => url.to_string(),
        }
    }

    /// Run a complete test spec.
    ///
    /// The first fatal error aborts the run and is reported in
    /// [`TestResult::error`]; assertion failures do not abort.
    pub fn run(
        &self,
        spec: &TestSpec,
        driver: &mut dyn PageDriver,
        fixtures: &FixtureData,
        trace: &TraceLogger,
    ) -> TestResult {
        info!(spec = %spec.name, steps = spec.steps.len(), "running test");
        let mut ctx = TestContext::new();

        if let Err(e) = driver.navigate(&self.resolve(&spec.start_url)) {
            return Self::finish(spec, ctx, Some(format!("Failed to navigate to start_url: {}", e)));
        }

        let mut composer = Composer::new(driver, self.config.clone())
            .with_fixtures(fixtures)
            .with_trace(trace);

        for (i, step) in spec.steps.iter().enumerate() {
            ctx.current_step = i;
            let outcome = self.execute_step(step, i, &mut composer, &mut ctx);
            ctx.record_actions(composer.records());
            if let Err(e) = outcome {
                warn!(spec = %spec.name, step = i, error = %e, "step failed");
                trace.log(&TraceEvent::now(&spec.name, "step").with_value(i).with_error(&e));
                return Self::finish(spec, ctx, Some(format!("Step {} failed: {}", i, e)));
            }
        }
        ctx.current_step = spec.steps.len();
        Self::finish(spec, ctx, None)
    }

    fn finish(spec: &TestSpec, ctx: TestContext, error: Option<String>) -> TestResult {
        let steps_run = match &error {
            Some(_) if spec.steps.is_empty() => 0,
            Some(_) => ctx.current_step + 1,
            None => spec.steps.len(),
        };
        info!(
            spec = %spec.name,
            assertions_passed = ctx.pass_count(),
            assertions_failed = ctx.fail_count(),
            "test finished"
        );
        TestResult {
            spec_name: spec.name.clone(),
            passed: error.is_none() && ctx.all_passed(),
            steps_run,
            actions_run: ctx.actions.len(),
            assertion_results: ctx.assertion_results,
            error,
        }
    }

    /// Launch a browser, run the spec, and always close the browser.
    pub fn run_with_session(
        &self,
        spec: &TestSpec,
        options: &BrowserOptions,
        fixtures: &FixtureData,
        trace: &TraceLogger,
    ) -> Result<TestResult> {
        let mut session = BrowserSession::launch(options)?;
        let result = self.run(spec, &mut session, fixtures, trace);
        if let Err(e) = session.quit() {
            warn!(error = %e, "failed to close browser session");
        }
        Ok(result)
    }

    fn execute_step(
        &self,
        step: &TestStep,
        step_index: usize,
        composer: &mut Composer<'_>,
        ctx: &mut TestContext,
    ) -> Result<()> {
        let wait = composer.wait();
        match step {
            TestStep::Navigate { url } => composer.driver().navigate(&self.resolve(url)),

            TestStep::Click { text } => composer.perform(&NavAction::ClickText { text: text.clone() }),

            TestStep::ClickElement { selector } => {
                let driver = composer.driver();
                let el = first_visible(&mut *driver, selector, &wait)?.ok_or_else(|| {
                    HarnessError::Timeout {
                        what: format!("visible '{}'", selector),
                        ms: wait.timeout_ms,
                    }
                })?;
                driver.click(&el)
            }

            TestStep::FollowPopup { text } => {
                composer.perform(&NavAction::FollowPopup { text: text.clone() })
            }

            TestStep::Wait { duration_ms } => composer.driver().pause(*duration_ms),

            TestStep::Form(form) => composer.run_step(form),

            TestStep::SaveAndNext => composer.perform(&NavAction::SaveAndNext),

            TestStep::ExpectStep { expected } => {
                progress::expect_step(composer.driver(), expected, &wait)
            }

            TestStep::Assert { assertions } => {
                let results = assertions::evaluate_all(assertions, step_index, composer.driver(), &wait);
                for failed in results.iter().filter(|r| !r.passed) {
                    warn!(
                        step = step_index,
                        message = failed.message.as_deref().unwrap_or(""),
                        "assertion failed"
                    );
                }
                ctx.record_assertions(results);
                Ok(())
            }

            TestStep::Screenshot { path } => {
                info!(path = %path, "taking screenshot");
                composer.driver().screenshot(path)
            }
        }
    }
}
