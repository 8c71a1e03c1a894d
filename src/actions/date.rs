use std::cmp::Ordering;

use chrono::{Month, NaiveDate};
use tracing::{debug, warn};

use crate::actions::{ActionOutcome, FieldActions};
use crate::error::{HarnessError, Result};
use crate::locator::{FieldReference, strategy};

/// Month number from an English name, abbreviation or `1..=12`.
pub fn parse_month(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    s.parse::<Month>().ok().map(|m| m.number_from_month())
}

/// `(year, month)` shown in a picker header such as `"June 2024"`.
pub fn parse_header(header: &str) -> Option<(i32, u32)> {
    let mut parts = header.split_whitespace();
    let month = parse_month(parts.next()?)?;
    let year = parts.next()?.parse().ok()?;
    Some((year, month))
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("?")
}

impl FieldActions<'_> {
    /// Open the calendar, page to the target month and click the day.
    pub fn pick_date(&mut self, field: &FieldReference, day: u32, month: &str, year: i32) -> Result<ActionOutcome> {
        let month_no = parse_month(month)
            .ok_or_else(|| HarnessError::InvalidDate(format!("unknown month '{}'", month)))?;
        let date = NaiveDate::from_ymd_opt(year, month_no, day)
            .ok_or_else(|| HarnessError::InvalidDate(format!("{} {} {}", day, month, year)))?;
        let target = format!("{} {}", month_name(month_no), year);

        let control = self.locate(field)?;
        self.driver.click(&control)?;
        if self.wait_visible(strategy::DATEPICKER_WRAPPER)?.is_none() {
            return Err(HarnessError::Timeout {
                what: format!("date picker of '{}'", field.label),
                ms: self.config.timeout_ms,
            });
        }

        let mut clicks = 0;
        loop {
            let header = self.read_header()?;
            if header.to_lowercase().contains(&target.to_lowercase()) {
                break;
            }
            if clicks >= self.config.max_date_attempts {
                return Err(HarnessError::DateNavigationTimeout {
                    field: field.label.clone(),
                    month: month_name(month_no).to_string(),
                    year,
                    attempts: clicks,
                });
            }
            let button = match parse_header(&header).map(|shown| shown.cmp(&(year, month_no))) {
                Some(Ordering::Less) => strategy::DATEPICKER_NEXT,
                _ => strategy::DATEPICKER_PREV,
            };
            let Some(el) = self.wait_visible(button)? else {
                return Err(HarnessError::Timeout {
                    what: "date picker month button".into(),
                    ms: self.config.timeout_ms,
                });
            };
            self.driver.click(&el)?;
            clicks += 1;
        }
        debug!(field = %field, target = %target, clicks, "calendar on target month");

        let Some(cell) = self.wait_visible(&strategy::day_cell(day))? else {
            return Err(HarnessError::DateNotFound {
                field: field.label.clone(),
                day,
                month: month_name(month_no).to_string(),
                year,
            });
        };
        self.driver.click(&cell)?;

        let typed = date.format("%d.%m.%Y").to_string();
        if self.driver.input_value(&control)?.is_empty() {
            warn!(field = %field, "picker left the input empty, typing the date");
            self.driver.fill(&control, &typed)?;
            let actual = self.driver.input_value(&control)?;
            if actual.is_empty() {
                return Err(HarnessError::ValueNotPersisted {
                    field: field.label.clone(),
                    expected: typed,
                    actual,
                });
            }
        }
        Ok(ActionOutcome::DatePicked { date: typed })
    }

    fn read_header(&mut self) -> Result<String> {
        match self.wait_visible(strategy::DATEPICKER_HEADER)? {
            Some(el) => Ok(self.driver.text_content(&el)?.unwrap_or_default()),
            None => Ok(String::new()),
        }
    }
}
