use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::html::{escape_html, linebreaks};
use crate::inquiries::Inquiry;

const NOT_PROVIDED: &str = "Not provided";

/// Values shared by the HTML and plain-text reply bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub contact_name: String,
    pub reply_message: String,
    pub original_subject: String,
    pub original_message: String,
    pub original_date: String,
    pub admin_name: String,
    pub company_name: String,
}

impl ReplyContext {
    pub fn new(
        inquiry: &Inquiry,
        reply_message: &str,
        admin_name: &str,
        company_name: &str,
    ) -> Self {
        Self {
            contact_name: inquiry.name.clone(),
            reply_message: reply_message.to_string(),
            original_subject: inquiry.subject.clone(),
            original_message: inquiry.message.clone(),
            original_date: format_original_date(inquiry.created_at),
            admin_name: admin_name.to_string(),
            company_name: company_name.to_string(),
        }
    }
}

pub fn format_original_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%B %d, %Y at %I:%M %p").to_string()
}

pub fn staff_notification_subject(inquiry: &Inquiry) -> String {
    format!("New Contact Inquiry: {}", inquiry.subject)
}

pub fn staff_notification_body(inquiry: &Inquiry) -> String {
    let mut body = String::new();
    writeln!(body, "New contact form submission:").expect("write heading");
    body.push('\n');
    writeln!(body, "Name: {}", inquiry.name).expect("write name");
    writeln!(body, "Email: {}", inquiry.email).expect("write email");
    writeln!(
        body,
        "Phone: {}",
        inquiry.phone.as_deref().unwrap_or(NOT_PROVIDED)
    )
    .expect("write phone");
    writeln!(
        body,
        "Company: {}",
        inquiry.company.as_deref().unwrap_or(NOT_PROVIDED)
    )
    .expect("write company");
    writeln!(body, "Subject: {}", inquiry.subject).expect("write subject");
    writeln!(body, "Message: {}", inquiry.message).expect("write message");
    body.push('\n');
    writeln!(
        body,
        "Received: {}",
        inquiry.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
    .expect("write timestamp");
    body
}

pub fn render_reply_text(context: &ReplyContext) -> String {
    let mut text = String::new();
    writeln!(text, "{}", context.reply_message.trim_end()).expect("write reply");
    text.push('\n');
    writeln!(text, "Best regards,").expect("write closing");
    writeln!(text, "{}", context.admin_name).expect("write signature");
    writeln!(text, "{}", context.company_name).expect("write company");
    text.push('\n');
    writeln!(text, "----------------------------------------").expect("write divider");
    writeln!(
        text,
        "On {}, {} wrote:",
        context.original_date, context.contact_name
    )
    .expect("write attribution");
    writeln!(text, "Subject: {}", context.original_subject).expect("write original subject");
    text.push('\n');
    for line in context.original_message.lines() {
        writeln!(text, "> {line}").expect("write quoted line");
    }
    text
}

pub fn render_reply_html(context: &ReplyContext) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html><body style=\"font-family: Arial, sans-serif; color: #1f2937; line-height: 1.6;\">");
    writeln!(
        html,
        "<div style=\"max-width: 640px; margin: 0 auto; padding: 24px;\"><h2 style=\"color: #1e40af; margin-top: 0;\">{}</h2>",
        escape_html(&context.company_name)
    )
    .expect("write header");

    for paragraph in context
        .reply_message
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
    {
        writeln!(html, "<p>{}</p>", linebreaks(paragraph)).expect("write paragraph");
    }

    writeln!(
        html,
        "<p>Best regards,<br>{}<br>{}</p>",
        escape_html(&context.admin_name),
        escape_html(&context.company_name)
    )
    .expect("write signature");

    writeln!(
        html,
        "<div style=\"background: #f8f9fa; border-left: 4px solid #2563eb; padding: 12px 16px; margin-top: 24px;\"><p style=\"margin-top: 0;\"><strong>Your original message</strong> ({})</p><p><strong>Subject:</strong> {}</p><p>{}</p></div>",
        escape_html(&context.original_date),
        escape_html(&context.original_subject),
        linebreaks(&context.original_message)
    )
    .expect("write original");

    html.push_str("</div></body></html>");
    html
}
