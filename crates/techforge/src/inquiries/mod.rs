//! Contact inquiry intake, staff triage, and the reply workflow.

pub mod domain;
pub mod flash;
pub(crate) mod pages;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ContactSubmission, Inquiry, InquiryEdit, InquiryId, InquiryQuery, InquiryStatus, NewInquiry,
    ReplyDraft, ReplyForm, ReplySubmission, UnknownStatus,
};
pub use flash::{Flash, FlashLevel};
pub use repository::{InquiryRepository, RepositoryError};
pub use router::inquiry_router;
pub use service::{InquiryService, InquiryServiceError, ReplyOutcome};
pub use store::{InMemoryInquiryRepository, InquiryStore, JsonFileInquiryRepository};
pub use validation::{
    is_deliverable_address, is_phone_number, validate_reply, validate_submission, FieldErrors,
};
