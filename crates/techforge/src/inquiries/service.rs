use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    ContactSubmission, Inquiry, InquiryEdit, InquiryId, InquiryQuery, InquiryStatus, ReplyForm,
    ReplySubmission,
};
use super::repository::{InquiryRepository, RepositoryError};
use super::validation::{non_blank, validate_reply, validate_submission, FieldErrors};
use crate::notifications::{MailSettings, Mailer, Notifier, ReplyDeliveryError, StaffNotification};

/// Service composing the inquiry store, validator, and notifier.
pub struct InquiryService<R, M> {
    repository: Arc<R>,
    notifier: Notifier<M>,
}

/// Result of posting the reply screen for an existing inquiry.
#[derive(Debug)]
pub enum ReplyOutcome {
    /// Subject or body missing; nothing was written.
    Invalid {
        inquiry: Inquiry,
        errors: FieldErrors,
    },
    DraftSaved(Inquiry),
    Sent(Inquiry),
    /// The draft was persisted before the send attempt; status is unchanged.
    DeliveryFailed {
        inquiry: Inquiry,
        error: ReplyDeliveryError,
    },
}

/// Error raised by the inquiry service.
#[derive(Debug, thiserror::Error)]
pub enum InquiryServiceError {
    #[error(transparent)]
    Validation(#[from] FieldErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl<R, M> InquiryService<R, M>
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    pub fn new(repository: Arc<R>, mailer: Arc<M>, settings: MailSettings) -> Self {
        Self {
            repository,
            notifier: Notifier::new(mailer, settings),
        }
    }

    pub fn organization_name(&self) -> &str {
        &self.notifier.settings().organization_name
    }

    /// Validate and store a public submission, then notify staff on a best-effort basis.
    pub fn submit(&self, submission: &ContactSubmission) -> Result<Inquiry, InquiryServiceError> {
        let fields = validate_submission(submission)?;
        let inquiry = self.repository.create(fields)?;
        info!(inquiry_id = %inquiry.id, subject = %inquiry.subject, "contact inquiry received");

        match self.notifier.notify_staff(&inquiry) {
            Ok(StaffNotification::Sent | StaffNotification::Skipped) => {}
            Err(err) => {
                warn!(inquiry_id = %inquiry.id, error = %err, "staff notification failed");
            }
        }

        Ok(inquiry)
    }

    pub fn list(&self, query: &InquiryQuery) -> Result<Vec<Inquiry>, InquiryServiceError> {
        Ok(self.repository.list(query)?)
    }

    /// Fetch for the detail page, marking unseen inquiries as read.
    pub fn open(&self, id: InquiryId) -> Result<Inquiry, InquiryServiceError> {
        let mut inquiry = self.repository.get(id)?;
        if inquiry.status == InquiryStatus::New {
            inquiry.status = InquiryStatus::Read;
            inquiry = self.repository.save(inquiry)?;
            info!(inquiry_id = %id, "inquiry marked read");
        }
        Ok(inquiry)
    }

    /// Apply a staff edit of status and notes. Status changes are unrestricted; an absent
    /// notes field leaves the stored notes alone, a blank one clears them.
    pub fn update(
        &self,
        id: InquiryId,
        edit: &InquiryEdit,
    ) -> Result<Inquiry, InquiryServiceError> {
        let mut inquiry = self.repository.get(id)?;

        if let Some(raw) = edit.status.as_deref().filter(|raw| !raw.trim().is_empty()) {
            let status = raw.parse::<InquiryStatus>().map_err(|err| {
                let mut errors = FieldErrors::default();
                errors.insert("status", err.to_string());
                errors
            })?;
            inquiry.status = status;
        }
        if let Some(notes) = edit.admin_notes.as_deref() {
            inquiry.admin_notes = non_blank(Some(notes));
        }

        let saved = self.repository.save(inquiry)?;
        info!(inquiry_id = %id, status = %saved.status, "inquiry updated");
        Ok(saved)
    }

    /// Save status changes from the list view, skipping rows whose status is unchanged.
    pub fn bulk_update_status(
        &self,
        changes: &[(InquiryId, InquiryStatus)],
    ) -> Result<usize, InquiryServiceError> {
        let mut updated = 0;
        for (id, status) in changes {
            let mut inquiry = self.repository.get(*id)?;
            if inquiry.status == *status {
                continue;
            }
            inquiry.status = *status;
            self.repository.save(inquiry)?;
            updated += 1;
        }
        if updated > 0 {
            info!(updated, "inquiry statuses updated");
        }
        Ok(updated)
    }

    /// Load an inquiry with the reply screen's initial values.
    pub fn reply_form(&self, id: InquiryId) -> Result<(Inquiry, ReplyForm), InquiryServiceError> {
        let inquiry = self.repository.get(id)?;
        let form = self.default_reply(&inquiry);
        Ok((inquiry, form))
    }

    /// Suggested subject and greeting, derived only from the inquiry's subject and name.
    pub fn default_reply(&self, inquiry: &Inquiry) -> ReplyForm {
        ReplyForm {
            reply_subject: format!("Re: {}", inquiry.subject),
            reply_message: format!(
                "Dear {},\n\nThank you for contacting {}. We have received your inquiry regarding \"{}\".\n\n",
                inquiry.name,
                self.organization_name(),
                inquiry.subject
            ),
            admin_notes: inquiry.admin_notes.clone().unwrap_or_default(),
        }
    }

    /// Persist the draft and, when requested, email it and mark the inquiry replied.
    pub fn submit_reply(
        &self,
        id: InquiryId,
        submission: &ReplySubmission,
    ) -> Result<ReplyOutcome, InquiryServiceError> {
        let mut inquiry = self.repository.get(id)?;
        let draft = match validate_reply(submission) {
            Ok(draft) => draft,
            Err(errors) => return Ok(ReplyOutcome::Invalid { inquiry, errors }),
        };

        inquiry.reply_subject = Some(draft.reply_subject.clone());
        inquiry.reply_message = Some(draft.reply_message.clone());
        inquiry.admin_notes = draft.admin_notes.clone();
        let inquiry = self.repository.save(inquiry)?;

        if !draft.send_email {
            info!(inquiry_id = %id, "reply saved as draft");
            return Ok(ReplyOutcome::DraftSaved(inquiry));
        }

        match self.notifier.send_reply(
            &inquiry,
            &draft.reply_subject,
            &draft.reply_message,
            draft.sender_name.as_deref(),
        ) {
            Ok(()) => {
                let mut replied = inquiry;
                replied.status = InquiryStatus::Replied;
                replied.replied_at = Some(Utc::now());
                let replied = self.repository.save(replied)?;
                Ok(ReplyOutcome::Sent(replied))
            }
            Err(error) => {
                warn!(inquiry_id = %id, error = %error, "reply delivery failed; draft kept");
                Ok(ReplyOutcome::DeliveryFailed { inquiry, error })
            }
        }
    }
}
