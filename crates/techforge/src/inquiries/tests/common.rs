use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;

use crate::inquiries::flash::{Flash, FLASH_COOKIE};
use crate::inquiries::repository::{InquiryRepository, RepositoryError};
use crate::inquiries::{
    inquiry_router, ContactSubmission, InMemoryInquiryRepository, Inquiry, InquiryId,
    InquiryQuery, InquiryService, NewInquiry, ReplySubmission,
};
use crate::notifications::{MailError, MailSettings, Mailer, OutgoingEmail};

pub(super) const STAFF_MAILBOX: &str = "staff@techforge.test";

pub(super) fn mail_settings() -> MailSettings {
    MailSettings {
        from_address: "Techforge <noreply@techforge.test>".to_string(),
        staff_address: Some(STAFF_MAILBOX.to_string()),
        reply_to: Some("support@techforge.test".to_string()),
        organization_name: "Techforge Technologies".to_string(),
        sender_name: "Techforge Team".to_string(),
    }
}

#[derive(Debug, Default, Clone)]
pub(super) struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }

    pub(super) fn sent_to(&self, address: &str) -> Vec<OutgoingEmail> {
        self.sent()
            .into_iter()
            .filter(|email| email.to.iter().any(|to| to == address))
            .collect()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(email.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(super) struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Transport("Connection refused".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl InquiryRepository for UnavailableRepository {
    fn create(&self, _fields: NewInquiry) -> Result<Inquiry, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn get(&self, _id: InquiryId) -> Result<Inquiry, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn save(&self, _inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn list(&self, _query: &InquiryQuery) -> Result<Vec<Inquiry>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) type RecordingService = InquiryService<InMemoryInquiryRepository, RecordingMailer>;

pub(super) fn build_service() -> (
    RecordingService,
    Arc<InMemoryInquiryRepository>,
    Arc<RecordingMailer>,
) {
    let repository = Arc::new(InMemoryInquiryRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let service = InquiryService::new(repository.clone(), mailer.clone(), mail_settings());
    (service, repository, mailer)
}

pub(super) fn build_failing_service() -> (
    InquiryService<InMemoryInquiryRepository, FailingMailer>,
    Arc<InMemoryInquiryRepository>,
) {
    let repository = Arc::new(InMemoryInquiryRepository::default());
    let service = InquiryService::new(
        repository.clone(),
        Arc::new(FailingMailer),
        mail_settings(),
    );
    (service, repository)
}

pub(super) fn submission() -> ContactSubmission {
    ContactSubmission {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: Some("+1 555-123-4567".to_string()),
        company: Some("Analytical Engines Ltd".to_string()),
        subject: "Pricing".to_string(),
        message: "How much for a custom integration?\nWe need it by spring.".to_string(),
    }
}

pub(super) fn submission_from(name: &str, email: &str, subject: &str) -> ContactSubmission {
    ContactSubmission {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        company: None,
        subject: subject.to_string(),
        message: format!("{name} would like to talk about {subject}."),
    }
}

pub(super) fn reply(subject: &str, message: &str, send: bool) -> ReplySubmission {
    ReplySubmission {
        reply_subject: subject.to_string(),
        reply_message: message.to_string(),
        admin_notes: None,
        send_email: send.then(|| "on".to_string()),
        sender_name: None,
    }
}

pub(super) fn router_with<R, M>(service: InquiryService<R, M>) -> axum::Router
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    inquiry_router(Arc::new(service))
}

pub(super) fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// The flash message a response queues for the next page, if any.
pub(super) fn queued_flash(response: &Response) -> Option<Flash> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.strip_prefix(FLASH_COOKIE)?.strip_prefix('='))
        .filter_map(|rest| rest.split(';').next())
        .find_map(Flash::decode)
}

pub(super) fn flash_cookie_header(flash: &Flash) -> String {
    format!("{FLASH_COOKIE}={}", flash.encode())
}
