use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a contact inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(pub u64);

impl fmt::Display for InquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Triage state of an inquiry. Any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    #[default]
    New,
    Read,
    Replied,
    Closed,
}

impl InquiryStatus {
    pub const ALL: [InquiryStatus; 4] = [
        InquiryStatus::New,
        InquiryStatus::Read,
        InquiryStatus::Replied,
        InquiryStatus::Closed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Read => "read",
            InquiryStatus::Replied => "replied",
            InquiryStatus::Closed => "closed",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            InquiryStatus::New => "New",
            InquiryStatus::Read => "Read",
            InquiryStatus::Replied => "Replied",
            InquiryStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown inquiry status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for InquiryStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        InquiryStatus::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Validated, trimmed submitter fields ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// A contact-form submission together with its staff workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: InquiryStatus,
    pub reply_subject: Option<String>,
    pub reply_message: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub admin_notes: Option<String>,
}

impl Inquiry {
    pub(crate) fn from_new(
        id: InquiryId,
        fields: NewInquiry,
        created_at: DateTime<Utc>,
    ) -> Self {
        let NewInquiry {
            name,
            email,
            subject,
            message,
            phone,
            company,
        } = fields;

        Self {
            id,
            name,
            email,
            subject,
            message,
            phone,
            company,
            status: InquiryStatus::New,
            reply_subject: None,
            reply_message: None,
            replied_at: None,
            created_at,
            updated_at: created_at,
            admin_notes: None,
        }
    }

    /// The drafted reply, present only when both subject and body are set.
    pub fn reply_draft(&self) -> Option<(&str, &str)> {
        match (self.reply_subject.as_deref(), self.reply_message.as_deref()) {
            (Some(subject), Some(message)) if !subject.is_empty() && !message.is_empty() => {
                Some((subject, message))
            }
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        format!(
            "{} - {} - {}",
            self.name,
            self.subject,
            self.created_at.format("%Y-%m-%d")
        )
    }
}

/// Raw public form fields as posted by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Raw reply screen fields as posted by staff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplySubmission {
    pub reply_subject: String,
    pub reply_message: String,
    pub admin_notes: Option<String>,
    pub send_email: Option<String>,
    /// Signature for the outgoing email; the configured team name is used when absent.
    pub sender_name: Option<String>,
}

impl ReplySubmission {
    /// A checkbox only posts when ticked; explicit falsy values are honoured too.
    pub fn wants_send(&self) -> bool {
        match self.send_email.as_deref().map(str::trim) {
            None => false,
            Some(value) => !matches!(
                value.to_ascii_lowercase().as_str(),
                "" | "false" | "0" | "off" | "no"
            ),
        }
    }
}

/// Reply fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    pub reply_subject: String,
    pub reply_message: String,
    pub admin_notes: Option<String>,
    pub send_email: bool,
    pub sender_name: Option<String>,
}

/// Values shown on the reply screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyForm {
    pub reply_subject: String,
    pub reply_message: String,
    pub admin_notes: String,
}

/// Staff edit of an inquiry's workflow fields from the detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InquiryEdit {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

/// Filter and search applied to the admin list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InquiryQuery {
    pub status: Option<InquiryStatus>,
    pub search: Option<String>,
}

impl InquiryQuery {
    pub fn matches(&self, inquiry: &Inquiry) -> bool {
        if let Some(status) = self.status {
            if inquiry.status != status {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                [
                    &inquiry.name,
                    &inquiry.email,
                    &inquiry.subject,
                    &inquiry.message,
                ]
                .into_iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}
