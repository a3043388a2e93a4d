use std::collections::BTreeMap;
use std::fmt;

use validator::ValidateEmail;

use super::domain::{ContactSubmission, NewInquiry, ReplyDraft, ReplySubmission};

pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 254;
pub const SUBJECT_MAX: usize = 200;
pub const PHONE_MAX: usize = 20;
pub const COMPANY_MAX: usize = 100;

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_PHONE: &str = "Please enter a valid phone number.";

/// Field-level validation failures keyed by form field name, one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid fields ({rendered})")
    }
}

impl std::error::Error for FieldErrors {}

/// Validate and normalize a public contact form post.
pub fn validate_submission(raw: &ContactSubmission) -> Result<NewInquiry, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = required(&mut errors, "name", &raw.name, Some(NAME_MAX));
    let email = required(&mut errors, "email", &raw.email, Some(EMAIL_MAX));
    let subject = required(&mut errors, "subject", &raw.subject, Some(SUBJECT_MAX));
    let message = required(&mut errors, "message", &raw.message, None);
    let phone = optional(&mut errors, "phone", raw.phone.as_deref(), PHONE_MAX);
    let company = optional(&mut errors, "company", raw.company.as_deref(), COMPANY_MAX);

    if !errors.contains("email") && !is_deliverable_address(&email) {
        errors.insert("email", INVALID_EMAIL);
    }

    if let Some(phone) = phone.as_deref() {
        if !errors.contains("phone") && !is_phone_number(phone) {
            errors.insert("phone", INVALID_PHONE);
        }
    }

    errors.into_result(NewInquiry {
        name,
        email,
        subject,
        message,
        phone,
        company,
    })
}

/// Validate the reply screen. Both subject and body are mandatory regardless of `send_email`.
pub fn validate_reply(raw: &ReplySubmission) -> Result<ReplyDraft, FieldErrors> {
    let mut errors = FieldErrors::default();

    let reply_subject = required(
        &mut errors,
        "reply_subject",
        &raw.reply_subject,
        Some(SUBJECT_MAX),
    );
    let reply_message = required(&mut errors, "reply_message", &raw.reply_message, None);

    errors.into_result(ReplyDraft {
        reply_subject,
        reply_message,
        admin_notes: non_blank(raw.admin_notes.as_deref()),
        send_email: raw.wants_send(),
        sender_name: non_blank(raw.sender_name.as_deref()),
    })
}

/// The address must pass the general email check and parse as a mailbox the SMTP
/// transport can deliver to; domain literals such as `x@[127.0.0.1]` fail the latter.
pub fn is_deliverable_address(raw: &str) -> bool {
    raw.validate_email() && raw.parse::<lettre::Address>().is_ok()
}

/// Spaces and hyphens anywhere plus a single leading `+` are permitted around the digits.
pub fn is_phone_number(raw: &str) -> bool {
    let stripped = raw.strip_prefix('+').unwrap_or(raw);
    let digits: String = stripped
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn required(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    max: Option<usize>,
) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.insert(field, REQUIRED);
    } else if let Some(max) = max {
        check_length(errors, field, value, max);
    }
    value.to_string()
}

fn optional(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: Option<&str>,
    max: usize,
) -> Option<String> {
    let value = raw.map(str::trim).filter(|value| !value.is_empty())?;
    check_length(errors, field, value, max);
    Some(value.to_string())
}

pub(crate) fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn check_length(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    let length = value.chars().count();
    if length > max {
        errors.insert(
            field,
            format!("Ensure this value has at most {max} characters (it has {length})."),
        );
    }
}
