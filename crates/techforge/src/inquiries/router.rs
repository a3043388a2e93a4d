use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, warn};

use super::domain::{
    ContactSubmission, InquiryEdit, InquiryId, InquiryQuery, InquiryStatus, ReplyForm,
    ReplySubmission,
};
use super::flash::{self, Flash};
use super::pages::{self, ReplyScreen};
use super::repository::{InquiryRepository, RepositoryError};
use super::service::{InquiryService, InquiryServiceError, ReplyOutcome};
use super::validation::FieldErrors;
use crate::notifications::Mailer;

pub const CONTACT_THANKS: &str = "Thank you for your message! We will get back to you soon.";
pub const CONTACT_INVALID: &str = "Please correct the errors below.";
pub const REPLY_INVALID: &str = "Both subject and message are required.";
pub const REPLY_DRAFTED: &str = "Reply saved as draft";

const INQUIRY_LIST: &str = "/admin/inquiries";

/// Router builder exposing the public contact form and the staff inquiry screens.
pub fn inquiry_router<R, M>(service: Arc<InquiryService<R, M>>) -> Router
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route("/", get(landing_handler::<R, M>))
        .route(
            "/contact",
            get(landing_handler::<R, M>).post(contact_handler::<R, M>),
        )
        .route(
            "/admin/inquiries",
            get(list_handler::<R, M>).post(bulk_status_handler::<R, M>),
        )
        .route(
            "/admin/inquiries/:inquiry_id",
            get(detail_handler::<R, M>).post(update_handler::<R, M>),
        )
        .route(
            "/admin/inquiries/:inquiry_id/reply",
            get(reply_form_handler::<R, M>).post(reply_handler::<R, M>),
        )
        .with_state(service)
}

type SharedService<R, M> = Arc<InquiryService<R, M>>;

/// Runs store and mail I/O on the blocking pool.
async fn blocking<T, F>(task: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| {
        error!(error = %err, "blocking inquiry task failed");
        server_error()
    })
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::error_page(
            "The request could not be completed. Please try again later.",
        )),
    )
        .into_response()
}

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found_page(detail))).into_response()
}

fn service_error_response(err: InquiryServiceError) -> Response {
    match err {
        InquiryServiceError::Repository(RepositoryError::NotFound(id)) => {
            not_found(&format!("Inquiry {id} does not exist."))
        }
        InquiryServiceError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            Html(pages::error_page(&errors.to_string())),
        )
            .into_response(),
        InquiryServiceError::Repository(other) => {
            error!(error = %other, "inquiry store failure");
            server_error()
        }
    }
}

fn parse_id(raw: &str) -> Result<InquiryId, Response> {
    raw.trim()
        .parse::<u64>()
        .map(InquiryId)
        .map_err(|_| not_found(&format!("Inquiry {raw} does not exist.")))
}

fn redirect_with(jar: CookieJar, flash: &Flash, to: &str) -> Response {
    (flash::push(jar, flash), Redirect::to(to)).into_response()
}

pub(crate) async fn landing_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    jar: CookieJar,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let (jar, flash) = flash::take(jar);
    let page = pages::landing_page(
        service.organization_name(),
        &ContactSubmission::default(),
        &FieldErrors::default(),
        flash.as_ref(),
    );
    (jar, Html(page)).into_response()
}

pub(crate) async fn contact_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    jar: CookieJar,
    Form(submission): Form<ContactSubmission>,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let task_service = service.clone();
    let posted = submission.clone();
    let outcome = match blocking(move || task_service.submit(&posted)).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    match outcome {
        Ok(_) => redirect_with(jar, &Flash::success(CONTACT_THANKS), "/"),
        Err(InquiryServiceError::Validation(errors)) => {
            let page = pages::landing_page(
                service.organization_name(),
                &submission,
                &errors,
                Some(&Flash::error(CONTACT_INVALID)),
            );
            (StatusCode::OK, Html(page)).into_response()
        }
        Err(other) => service_error_response(other),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ListParams {
    status: Option<String>,
    q: Option<String>,
}

impl ListParams {
    fn into_query(self) -> InquiryQuery {
        InquiryQuery {
            status: self
                .status
                .as_deref()
                .and_then(|raw| raw.parse::<InquiryStatus>().ok()),
            search: self
                .q
                .map(|term| term.trim().to_string())
                .filter(|term| !term.is_empty()),
        }
    }
}

pub(crate) async fn list_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    jar: CookieJar,
    Query(params): Query<ListParams>,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let query = params.into_query();
    let task_query = query.clone();
    let inquiries = match blocking(move || service.list(&task_query)).await {
        Ok(Ok(inquiries)) => inquiries,
        Ok(Err(err)) => return service_error_response(err),
        Err(response) => return response,
    };

    let (jar, flash) = flash::take(jar);
    let page = pages::admin_list_page(&inquiries, &query, flash.as_ref());
    (jar, Html(page)).into_response()
}

/// Reads `status_{id}` fields posted by the list view.
fn parse_status_changes(fields: &[(String, String)]) -> Vec<(InquiryId, InquiryStatus)> {
    fields
        .iter()
        .filter_map(|(key, value)| {
            let raw_id = key.strip_prefix("status_")?;
            let parsed = raw_id
                .parse::<u64>()
                .ok()
                .zip(value.parse::<InquiryStatus>().ok());
            if parsed.is_none() {
                warn!(field = %key, value = %value, "ignoring malformed status field");
            }
            parsed.map(|(id, status)| (InquiryId(id), status))
        })
        .collect()
}

pub(crate) async fn bulk_status_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let changes = parse_status_changes(&fields);
    match blocking(move || service.bulk_update_status(&changes)).await {
        Ok(Ok(updated)) => {
            let message = match updated {
                0 => "No inquiry statuses changed.".to_string(),
                1 => "1 inquiry was changed successfully.".to_string(),
                n => format!("{n} inquiries were changed successfully."),
            };
            redirect_with(jar, &Flash::success(message), INQUIRY_LIST)
        }
        Ok(Err(err)) => service_error_response(err),
        Err(response) => response,
    }
}

pub(crate) async fn detail_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match blocking(move || service.open(id)).await {
        Ok(Ok(inquiry)) => {
            let (jar, flash) = flash::take(jar);
            (jar, Html(pages::admin_detail_page(&inquiry, flash.as_ref()))).into_response()
        }
        Ok(Err(err)) => service_error_response(err),
        Err(response) => response,
    }
}

pub(crate) async fn update_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    Form(edit): Form<InquiryEdit>,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let detail = format!("{INQUIRY_LIST}/{id}");

    match blocking(move || service.update(id, &edit)).await {
        Ok(Ok(inquiry)) => redirect_with(
            jar,
            &Flash::success(format!("\"{}\" was changed successfully.", inquiry.label())),
            &detail,
        ),
        Ok(Err(InquiryServiceError::Validation(errors))) => {
            redirect_with(jar, &Flash::error(errors.to_string()), &detail)
        }
        Ok(Err(err)) => service_error_response(err),
        Err(response) => response,
    }
}

pub(crate) async fn reply_form_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    Path(raw_id): Path<String>,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match blocking(move || service.reply_form(id)).await {
        Ok(Ok((inquiry, form))) => {
            let screen = ReplyScreen {
                inquiry: &inquiry,
                form: &form,
                send_email: false,
                sender_name: "",
                errors: &FieldErrors::default(),
            };
            Html(pages::reply_page(&screen, None)).into_response()
        }
        Ok(Err(err)) => service_error_response(err),
        Err(response) => response,
    }
}

pub(crate) async fn reply_handler<R, M>(
    State(service): State<SharedService<R, M>>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    Form(submission): Form<ReplySubmission>,
) -> Response
where
    R: InquiryRepository + 'static,
    M: Mailer + 'static,
{
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let posted = submission.clone();
    let outcome = match blocking(move || service.submit_reply(id, &posted)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => return service_error_response(err),
        Err(response) => return response,
    };

    let (inquiry, errors, banner) = match outcome {
        ReplyOutcome::DraftSaved(_) => {
            return redirect_with(jar, &Flash::success(REPLY_DRAFTED), INQUIRY_LIST);
        }
        ReplyOutcome::Sent(inquiry) => {
            let message = format!("Reply sent successfully to {}", inquiry.email);
            return redirect_with(jar, &Flash::success(message), INQUIRY_LIST);
        }
        ReplyOutcome::Invalid { inquiry, errors } => {
            (inquiry, errors, Flash::error(REPLY_INVALID))
        }
        ReplyOutcome::DeliveryFailed { inquiry, error } => {
            (inquiry, FieldErrors::default(), Flash::error(error.to_string()))
        }
    };

    // Redisplay exactly what was posted so nothing typed is lost.
    let form = ReplyForm {
        reply_subject: submission.reply_subject.clone(),
        reply_message: submission.reply_message.clone(),
        admin_notes: submission.admin_notes.clone().unwrap_or_default(),
    };
    let screen = ReplyScreen {
        inquiry: &inquiry,
        form: &form,
        send_email: submission.wants_send(),
        sender_name: submission.sender_name.as_deref().unwrap_or_default(),
        errors: &errors,
    };
    (StatusCode::OK, Html(pages::reply_page(&screen, Some(&banner)))).into_response()
}
