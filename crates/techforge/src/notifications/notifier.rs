use std::sync::Arc;

use tracing::{debug, info};

use super::mailer::{MailError, Mailer, OutgoingEmail};
use super::templates::{
    render_reply_html, render_reply_text, staff_notification_body, staff_notification_subject,
    ReplyContext,
};
use crate::inquiries::Inquiry;

/// Addresses and names used when composing outbound mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub from_address: String,
    /// Staff mailbox for new-inquiry notifications. Notifications are skipped when unset.
    pub staff_address: Option<String>,
    pub reply_to: Option<String>,
    pub organization_name: String,
    /// Signature used on replies when the sending staff member gives no name.
    pub sender_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffNotification {
    Sent,
    Skipped,
}

/// Reply delivery failed; the text is shown to staff verbatim.
#[derive(Debug, thiserror::Error)]
#[error("Failed to send email: {source}")]
pub struct ReplyDeliveryError {
    #[from]
    source: MailError,
}

/// Composes inquiry emails and hands them to a [`Mailer`].
#[derive(Debug)]
pub struct Notifier<M> {
    mailer: Arc<M>,
    settings: MailSettings,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: Arc<M>, settings: MailSettings) -> Self {
        Self { mailer, settings }
    }

    pub fn settings(&self) -> &MailSettings {
        &self.settings
    }

    /// Tell staff about a new submission. Callers treat errors as non-fatal.
    pub fn notify_staff(&self, inquiry: &Inquiry) -> Result<StaffNotification, MailError> {
        let Some(staff_address) = self.settings.staff_address.clone() else {
            debug!(inquiry_id = %inquiry.id, "no staff mailbox configured; notification skipped");
            return Ok(StaffNotification::Skipped);
        };

        let email = OutgoingEmail {
            from: self.settings.from_address.clone(),
            to: vec![staff_address],
            reply_to: None,
            subject: staff_notification_subject(inquiry),
            text_body: staff_notification_body(inquiry),
            html_body: None,
        };

        self.mailer.send(&email)?;
        debug!(inquiry_id = %inquiry.id, "staff notified of new inquiry");
        Ok(StaffNotification::Sent)
    }

    /// Send a staff reply to the submitter as HTML with a plain-text alternative.
    pub fn send_reply(
        &self,
        inquiry: &Inquiry,
        subject: &str,
        body: &str,
        sender_name: Option<&str>,
    ) -> Result<(), ReplyDeliveryError> {
        let admin_name = sender_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.settings.sender_name);
        let context = ReplyContext::new(
            inquiry,
            body,
            admin_name,
            &self.settings.organization_name,
        );

        let email = OutgoingEmail {
            from: self.settings.from_address.clone(),
            to: vec![inquiry.email.clone()],
            reply_to: self.settings.reply_to.clone(),
            subject: subject.to_string(),
            text_body: render_reply_text(&context),
            html_body: Some(render_reply_html(&context)),
        };

        self.mailer.send(&email)?;
        info!(inquiry_id = %inquiry.id, recipient = %inquiry.email, "reply delivered");
        Ok(())
    }
}
