use std::path::Path;

use tracing::{debug, info};

use crate::actions::{ActionOutcome, FieldActions};
use crate::browser::driver::ElementRef;
use crate::error::{HarnessError, Result};
use crate::locator::{FieldReference, strategy};

impl FieldActions<'_> {
    /// Upload `path`, removing a previously uploaded file first.
    ///
    /// A field without a file input is skipped, not failed.
    pub fn upload_file(&mut self, field: &FieldReference, path: &Path) -> Result<ActionOutcome> {
        if !path.is_file() {
            return Err(HarnessError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let Some(input) = self.locator.find_now(&mut *self.driver, field)? else {
            info!(field = %field, "no file input, upload skipped");
            return Ok(ActionOutcome::Skipped {
                reason: format!("no file input for '{}'", field.label),
            });
        };

        let delete = strategy::file_delete(&input);
        let replaced = self.driver.count(&delete)? > 0;
        if replaced {
            debug!(field = %field, "removing previous upload");
            self.driver.click(&ElementRef::first(&delete))?;
            self.wait_gone(&delete, "previous upload to be removed")?;
        }

        self.driver.set_input_files(&input, path)?;
        debug!(field = %field, path = %path.display(), replaced, "uploaded");
        Ok(ActionOutcome::Uploaded { replaced })
    }
}
