//! Address form model
//!
//! `AddressForm` owns the single active draft. Fields are edited one at a
//! time; submission hands a copy of the draft to the store. The draft is
//! cleared only when the store confirms the create, so a failed submission
//! can be retried without retyping.

use crate::error::{AddrbookError, Result};
use crate::service::AddressStore;
use crate::types::{Address, AddressDraft, AddressField};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    draft: AddressDraft,
    submitting: bool,
    last_error: Option<String>,
}

impl AddressForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &AddressDraft {
        &self.draft
    }

    pub fn value(&self, field: AddressField) -> &str {
        self.draft.get(field)
    }

    /// A submission is waiting on the store
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message of the last failed submission, if not yet superseded
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn missing_fields(&self) -> Vec<AddressField> {
        self.draft.missing_fields()
    }

    pub fn is_complete(&self) -> bool {
        self.draft.is_complete()
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && self.draft.is_complete()
    }

    /// Update exactly one field of the draft
    pub fn on_field_change(&mut self, field: AddressField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// Start a submission, returning the draft to send
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a submission is already running or a field is empty.
    pub fn begin_submit(&mut self) -> Result<AddressDraft> {
        if self.submitting {
            return Err(AddrbookError::InvalidInput(
                "A submission is already in progress".to_string(),
            ));
        }
        self.draft.validate()?;

        self.submitting = true;
        self.last_error = None;
        Ok(self.draft.clone())
    }

    /// The store confirmed the create: reset to an empty draft
    pub fn complete_success(&mut self) {
        self.draft = AddressDraft::default();
        self.submitting = false;
        self.last_error = None;
    }

    /// The create failed: keep the draft for resubmission
    pub fn complete_failure(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.last_error = Some(message.into());
    }

    /// Apply the outcome of a create call
    pub fn finish_submit<T>(&mut self, outcome: &Result<T>) {
        match outcome {
            Ok(_) => self.complete_success(),
            Err(AddrbookError::Cancelled) => self.submitting = false,
            Err(e) => self.complete_failure(e.to_string()),
        }
    }

    /// Submit the draft through `store`
    ///
    /// # Errors
    ///
    /// Validation errors leave the form untouched. Store errors keep the
    /// draft and are remembered in `last_error`.
    pub async fn submit(&mut self, store: &AddressStore) -> Result<Address> {
        let draft = self.begin_submit()?;
        let outcome = store.create(&draft).await;
        self.finish_submit(&outcome);
        outcome
    }
}
