//! Server-rendered HTML for the public landing page and the staff screens.

use std::fmt::Write as _;

use super::domain::{ContactSubmission, Inquiry, InquiryQuery, InquiryStatus, ReplyForm};
use super::flash::Flash;
use super::validation::FieldErrors;
use crate::html::{escape_html, linebreaks};

const NOT_PROVIDED: &str = "Not provided";

/// Input widget description; presentation only, validation lives in `validation`.
struct Field<'a> {
    name: &'a str,
    label: &'a str,
    input_type: &'a str,
    placeholder: &'a str,
    required: bool,
}

const CONTACT_FIELDS: [Field<'static>; 5] = [
    Field {
        name: "name",
        label: "Name",
        input_type: "text",
        placeholder: "Your Name",
        required: true,
    },
    Field {
        name: "email",
        label: "Email",
        input_type: "email",
        placeholder: "Your Email",
        required: true,
    },
    Field {
        name: "phone",
        label: "Phone",
        input_type: "text",
        placeholder: "Your Phone (Optional)",
        required: false,
    },
    Field {
        name: "company",
        label: "Company",
        input_type: "text",
        placeholder: "Your Company (Optional)",
        required: false,
    },
    Field {
        name: "subject",
        label: "Subject",
        input_type: "text",
        placeholder: "Subject",
        required: true,
    },
];

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let mut html = String::new();
    writeln!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{}</title></head>\n<body>",
        escape_html(title)
    )
    .expect("write head");
    if let Some(flash) = flash {
        writeln!(
            html,
            "<div class=\"alert alert-{}\" role=\"alert\">{}</div>",
            flash.level.label(),
            escape_html(&flash.message)
        )
        .expect("write flash");
    }
    html.push_str(body);
    html.push_str("\n</body>\n</html>\n");
    html
}

fn field_error(html: &mut String, errors: &FieldErrors, name: &str) {
    if let Some(message) = errors.get(name) {
        writeln!(
            html,
            "<div class=\"invalid-feedback\" data-field=\"{}\">{}</div>",
            name,
            escape_html(message)
        )
        .expect("write field error");
    }
}

fn contact_value<'a>(values: &'a ContactSubmission, name: &str) -> &'a str {
    match name {
        "name" => &values.name,
        "email" => &values.email,
        "phone" => values.phone.as_deref().unwrap_or_default(),
        "company" => values.company.as_deref().unwrap_or_default(),
        "subject" => &values.subject,
        "message" => &values.message,
        _ => "",
    }
}

pub fn landing_page(
    organization: &str,
    values: &ContactSubmission,
    errors: &FieldErrors,
    flash: Option<&Flash>,
) -> String {
    let mut body = String::new();
    writeln!(
        body,
        "<header class=\"hero\"><h1>{org}</h1><p>Software engineering, cloud platforms and product design for growing teams.</p></header>",
        org = escape_html(organization)
    )
    .expect("write hero");

    body.push_str("<section id=\"contact\"><h2>Contact us</h2>\n<form method=\"post\" action=\"/contact\" novalidate>\n");
    for field in &CONTACT_FIELDS {
        writeln!(
            body,
            "<label for=\"id_{name}\">{label}</label><input type=\"{kind}\" class=\"form-control\" id=\"id_{name}\" name=\"{name}\" placeholder=\"{placeholder}\" value=\"{value}\"{required}>",
            name = field.name,
            label = field.label,
            kind = field.input_type,
            placeholder = field.placeholder,
            value = escape_html(contact_value(values, field.name)),
            required = if field.required { " required" } else { "" },
        )
        .expect("write input");
        field_error(&mut body, errors, field.name);
    }
    writeln!(
        body,
        "<label for=\"id_message\">Message</label><textarea class=\"form-control\" id=\"id_message\" name=\"message\" rows=\"5\" placeholder=\"Your Message\" required>{}</textarea>",
        escape_html(&values.message)
    )
    .expect("write message");
    field_error(&mut body, errors, "message");
    body.push_str("<button type=\"submit\">Send Message</button>\n</form></section>");

    layout(organization, flash, &body)
}

fn status_options(html: &mut String, selected: Option<InquiryStatus>) {
    for status in InquiryStatus::ALL {
        writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            status.label(),
            if Some(status) == selected { " selected" } else { "" },
            status.display_name()
        )
        .expect("write status option");
    }
}

pub fn admin_list_page(inquiries: &[Inquiry], query: &InquiryQuery, flash: Option<&Flash>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Contact Inquiries</h1>\n");

    body.push_str("<form method=\"get\" action=\"/admin/inquiries\" class=\"filters\"><select name=\"status\"><option value=\"\">All statuses</option>");
    status_options(&mut body, query.status);
    writeln!(
        body,
        "</select><input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search name, email, subject, message\"><button type=\"submit\">Filter</button></form>",
        escape_html(query.search.as_deref().unwrap_or_default())
    )
    .expect("write filters");

    if inquiries.is_empty() {
        body.push_str("<p class=\"empty\">No inquiries found.</p>");
        return layout("Contact Inquiries", flash, &body);
    }

    body.push_str("<form method=\"post\" action=\"/admin/inquiries\">\n<table>\n<thead><tr><th>Name</th><th>Email</th><th>Subject</th><th>Status</th><th>Created</th><th>Action</th></tr></thead>\n<tbody>\n");
    for inquiry in inquiries {
        writeln!(
            body,
            "<tr data-id=\"{id}\"><td><a href=\"/admin/inquiries/{id}\">{name}</a></td><td>{email}</td><td>{subject}</td><td><select name=\"status_{id}\">",
            id = inquiry.id,
            name = escape_html(&inquiry.name),
            email = escape_html(&inquiry.email),
            subject = escape_html(&inquiry.subject),
        )
        .expect("write row");
        status_options(&mut body, Some(inquiry.status));
        writeln!(
            body,
            "</select></td><td>{created}</td><td><a class=\"button\" href=\"/admin/inquiries/{id}/reply\">Reply</a></td></tr>",
            created = inquiry.created_at.format("%Y-%m-%d %H:%M"),
            id = inquiry.id,
        )
        .expect("write row tail");
    }
    body.push_str("</tbody>\n</table>\n<button type=\"submit\">Save</button>\n</form>");

    layout("Contact Inquiries", flash, &body)
}

fn reply_preview(html: &mut String, inquiry: &Inquiry) {
    match inquiry.reply_draft() {
        None => html.push_str("<p class=\"reply-preview\">No reply drafted yet</p>"),
        Some((subject, message)) => {
            writeln!(
                html,
                "<div class=\"reply-preview\"><h4>Preview:</h4><p><strong>Subject:</strong> {}</p><div>{}</div></div>",
                escape_html(subject),
                linebreaks(message)
            )
            .expect("write reply preview");
        }
    }
}

pub fn admin_detail_page(inquiry: &Inquiry, flash: Option<&Flash>) -> String {
    let mut body = String::new();
    writeln!(
        body,
        "<p><a href=\"/admin/inquiries\">&larr; All inquiries</a></p><h1>{}</h1>",
        escape_html(&inquiry.label())
    )
    .expect("write heading");

    writeln!(
        body,
        "<section class=\"contact-details\"><h2>Contact Information</h2><p><strong>Name:</strong> {}</p><p><strong>Email:</strong> {}</p><p><strong>Phone:</strong> {}</p><p><strong>Company:</strong> {}</p></section>",
        escape_html(&inquiry.name),
        escape_html(&inquiry.email),
        escape_html(inquiry.phone.as_deref().unwrap_or(NOT_PROVIDED)),
        escape_html(inquiry.company.as_deref().unwrap_or(NOT_PROVIDED)),
    )
    .expect("write contact details");

    writeln!(
        body,
        "<section><h2>Message Details</h2><p><strong>Subject:</strong> {}</p><div class=\"message\">{}</div></section>",
        escape_html(&inquiry.subject),
        linebreaks(&inquiry.message)
    )
    .expect("write message details");

    body.push_str("<section><h2>Reply</h2>");
    reply_preview(&mut body, inquiry);
    if let Some(replied_at) = inquiry.replied_at {
        writeln!(
            body,
            "<p><strong>Replied:</strong> {}</p>",
            replied_at.format("%Y-%m-%d %H:%M")
        )
        .expect("write replied at");
    }
    writeln!(
        body,
        "<p><a class=\"button\" href=\"/admin/inquiries/{}/reply\">Reply</a></p></section>",
        inquiry.id
    )
    .expect("write reply link");

    writeln!(
        body,
        "<section><h2>Status &amp; Tracking</h2><form method=\"post\" action=\"/admin/inquiries/{}\"><label for=\"id_status\">Status</label><select id=\"id_status\" name=\"status\">",
        inquiry.id
    )
    .expect("write status form");
    status_options(&mut body, Some(inquiry.status));
    writeln!(
        body,
        "</select><label for=\"id_admin_notes\">Admin notes</label><textarea id=\"id_admin_notes\" name=\"admin_notes\" rows=\"4\">{}</textarea><button type=\"submit\">Save</button></form><p><strong>Created:</strong> {}</p><p><strong>Updated:</strong> {}</p></section>",
        escape_html(inquiry.admin_notes.as_deref().unwrap_or_default()),
        inquiry.created_at.format("%Y-%m-%d %H:%M:%S"),
        inquiry.updated_at.format("%Y-%m-%d %H:%M:%S"),
    )
    .expect("write tracking");

    layout(&inquiry.label(), flash, &body)
}

/// Reply screen state: either the suggested defaults or the values staff just posted.
pub struct ReplyScreen<'a> {
    pub inquiry: &'a Inquiry,
    pub form: &'a ReplyForm,
    pub send_email: bool,
    pub sender_name: &'a str,
    pub errors: &'a FieldErrors,
}

pub fn reply_page(screen: &ReplyScreen<'_>, flash: Option<&Flash>) -> String {
    let ReplyScreen {
        inquiry,
        form,
        send_email,
        sender_name,
        errors,
    } = screen;
    let mut body = String::new();

    writeln!(
        body,
        "<p><a href=\"/admin/inquiries\">&larr; All inquiries</a></p><h1>Reply to {}</h1>",
        escape_html(&inquiry.name)
    )
    .expect("write heading");

    writeln!(
        body,
        "<section class=\"original\"><p><strong>From:</strong> {} &lt;{}&gt;</p><p><strong>Subject:</strong> {}</p><p><strong>Received:</strong> {}</p><div class=\"message\">{}</div></section>",
        escape_html(&inquiry.name),
        escape_html(&inquiry.email),
        escape_html(&inquiry.subject),
        inquiry.created_at.format("%B %d, %Y at %I:%M %p"),
        linebreaks(&inquiry.message)
    )
    .expect("write original");

    if inquiry.reply_draft().is_some() {
        body.push_str("<section class=\"saved-draft\"><h2>Saved draft</h2>");
        reply_preview(&mut body, inquiry);
        body.push_str("</section>");
    }

    writeln!(
        body,
        "<form method=\"post\" action=\"/admin/inquiries/{}/reply\">\n<label for=\"id_reply_subject\">Subject</label><input type=\"text\" id=\"id_reply_subject\" name=\"reply_subject\" value=\"{}\" required>",
        inquiry.id,
        escape_html(&form.reply_subject)
    )
    .expect("write subject");
    field_error(&mut body, errors, "reply_subject");

    writeln!(
        body,
        "<label for=\"id_reply_message\">Message</label><textarea id=\"id_reply_message\" name=\"reply_message\" rows=\"12\" required>{}</textarea>",
        escape_html(&form.reply_message)
    )
    .expect("write message");
    field_error(&mut body, errors, "reply_message");

    writeln!(
        body,
        "<label for=\"id_admin_notes\">Admin notes</label><textarea id=\"id_admin_notes\" name=\"admin_notes\" rows=\"4\">{}</textarea>\n<label for=\"id_sender_name\">Signature</label><input type=\"text\" id=\"id_sender_name\" name=\"sender_name\" value=\"{}\">\n<label><input type=\"checkbox\" name=\"send_email\" value=\"on\"{}> Send email to {}</label>\n<button type=\"submit\">Save</button>\n</form>",
        escape_html(&form.admin_notes),
        escape_html(sender_name),
        if *send_email { " checked" } else { "" },
        escape_html(&inquiry.email)
    )
    .expect("write reply controls");

    layout(&format!("Reply to {}", inquiry.name), flash, &body)
}

pub fn not_found_page(detail: &str) -> String {
    let body = format!("<h1>Not Found</h1><p>{}</p>", escape_html(detail));
    layout("Not Found", None, &body)
}

pub fn error_page(detail: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1><p>{}</p>",
        escape_html(detail)
    );
    layout("Server Error", None, &body)
}
