use tracing::{debug, info};

use crate::browser::driver::ElementRef;
use crate::error::{HarnessError, Result};
use crate::locator::strategy;
use crate::scenario::composer::Composer;
use crate::scenario::progress;
use crate::scenario::step_model::StepEntry;
use crate::trace::trace::TraceEvent;
use crate::wait::{first_visible, poll_until, wait_for};

impl Composer<'_> {
    /// Add `count` household members one at a time.
    ///
    /// Each round opens the create control, fills `entries`, clicks the
    /// enabled `save` button and waits for exactly one new person card.
    /// `{{member_email}}` expands to one address per round.
    pub fn add_adults(&mut self, count: usize, entries: &[StepEntry], save: &str) -> Result<()> {
        let result = (0..count).try_for_each(|n| {
            self.next_member(true);
            self.add_adult(n, count, entries, save)
        });
        self.next_member(false);
        result
    }

    fn add_adult(&mut self, n: usize, count: usize, entries: &[StepEntry], save: &str) -> Result<()> {
        let before = self.driver().count(strategy::PERSON_CARD)?;
        let ms = self.config().timeout_ms;

        let create = self.actions().wait_visible(strategy::CREATE_ADULT)?;
        let create = create.ok_or_else(|| HarnessError::Timeout {
            what: "add-adult control".into(),
            ms,
        })?;
        self.driver().click(&create)?;

        self.run_entries(entries)?;

        let wait = self.wait();
        progress::click_enabled(self.driver(), &strategy::exact_text(save), save, &wait)?;

        let driver = self.driver();
        let mut cards = before;
        let grown = poll_until(&wait, || {
            cards = driver.count(strategy::PERSON_CARD)?;
            Ok((cards == before + 1).then_some(()))
        })?;
        if grown.is_none() {
            return Err(HarnessError::Timeout {
                what: format!("person card {} (cards: {} -> {})", n + 1, before, cards),
                ms,
            });
        }
        info!(adult = n + 1, of = count, "household member added");
        self.trace_event(TraceEvent::now("household", "add_adult").with_value(n + 1));
        Ok(())
    }

    /// Delete the person card at `index` through its confirmation modal.
    ///
    /// Returns `false` when no such card exists.
    pub fn delete_adult(&mut self, index: usize) -> Result<bool> {
        let wait = self.wait();
        let ms = wait.timeout_ms;
        let card_selector = strategy::person_card(index);
        let driver = self.driver();

        if driver.count(&card_selector)? == 0 {
            info!(index, "no person card, nothing to delete");
            return Ok(false);
        }
        driver.hover(&ElementRef::first(&card_selector))?;

        let trash = first_visible(&mut *driver, &strategy::person_card_trash(index), &wait)?
            .ok_or_else(|| HarnessError::Timeout {
                what: format!("trash icon of person card {}", index),
                ms,
            })?;
        driver.click(&trash)?;

        let modal = first_visible(&mut *driver, strategy::MODAL_FOOTER, &wait)?;
        if modal.is_none() {
            return Err(HarnessError::ModalNotAppeared { timeout_ms: ms });
        }
        let confirm = first_visible(&mut *driver, strategy::MODAL_CONFIRM, &wait)?
            .ok_or(HarnessError::ModalNotAppeared { timeout_ms: ms })?;
        driver.click(&confirm)?;
        debug!(index, "deletion confirmed");

        wait_for(&wait, "confirmation modal to close", || {
            let el = ElementRef::first(strategy::MODAL_FOOTER);
            Ok(!driver.is_visible(&el)?)
        })?;
        info!(index, "household member deleted");
        Ok(true)
    }
}
