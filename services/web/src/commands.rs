use crate::infra::{open_store, parse_status};
use chrono::SecondsFormat;
use clap::Args;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use techforge::config::AppConfig;
use techforge::error::AppError;
use techforge::inquiries::{Inquiry, InquiryQuery, InquiryRepository, InquiryStatus};

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Only show inquiries with this status (new, read, replied, closed)
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<InquiryStatus>,
    /// Case-insensitive match against name, email, subject, and message
    #[arg(long)]
    pub(crate) search: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Only export inquiries with this status
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<InquiryStatus>,
    /// Destination file; stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

fn load(query: &InquiryQuery) -> Result<Vec<Inquiry>, AppError> {
    let config = AppConfig::load()?;
    let store = open_store(&config)?;
    Ok(store.list(query)?)
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let inquiries = load(&InquiryQuery {
        status: args.status,
        search: args.search,
    })?;
    print!("{}", render_table(&inquiries));
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let inquiries = load(&InquiryQuery {
        status: args.status,
        search: None,
    })?;

    match &args.output {
        Some(path) => {
            write_csv(File::create(path)?, &inquiries)?;
            println!("Exported {} inquiries to {}", inquiries.len(), path.display());
        }
        None => write_csv(io::stdout().lock(), &inquiries)?,
    }
    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(width.saturating_sub(3)).collect();
    shortened.push_str("...");
    shortened
}

pub(crate) fn render_table(inquiries: &[Inquiry]) -> String {
    if inquiries.is_empty() {
        return "No inquiries found.\n".to_string();
    }

    let mut table = String::new();
    writeln!(
        table,
        "{:>5}  {:<8}  {:<16}  {:<24}  {:<30}  {}",
        "ID", "STATUS", "CREATED", "NAME", "EMAIL", "SUBJECT"
    )
    .expect("write header");
    for inquiry in inquiries {
        writeln!(
            table,
            "{:>5}  {:<8}  {:<16}  {:<24}  {:<30}  {}",
            inquiry.id.0,
            inquiry.status.label(),
            inquiry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            truncate(&inquiry.name, 24),
            truncate(&inquiry.email, 30),
            truncate(&inquiry.subject, 48)
        )
        .expect("write row");
    }
    table
}

#[derive(Debug, Serialize)]
struct InquiryRow<'a> {
    id: u64,
    status: &'static str,
    name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    company: Option<&'a str>,
    subject: &'a str,
    message: &'a str,
    created_at: String,
    updated_at: String,
    replied_at: Option<String>,
    reply_subject: Option<&'a str>,
    reply_message: Option<&'a str>,
    admin_notes: Option<&'a str>,
}

impl<'a> From<&'a Inquiry> for InquiryRow<'a> {
    fn from(inquiry: &'a Inquiry) -> Self {
        let timestamp = |value: chrono::DateTime<chrono::Utc>| {
            value.to_rfc3339_opts(SecondsFormat::Secs, true)
        };
        Self {
            id: inquiry.id.0,
            status: inquiry.status.label(),
            name: &inquiry.name,
            email: &inquiry.email,
            phone: inquiry.phone.as_deref(),
            company: inquiry.company.as_deref(),
            subject: &inquiry.subject,
            message: &inquiry.message,
            created_at: timestamp(inquiry.created_at),
            updated_at: timestamp(inquiry.updated_at),
            replied_at: inquiry.replied_at.map(timestamp),
            reply_subject: inquiry.reply_subject.as_deref(),
            reply_message: inquiry.reply_message.as_deref(),
            admin_notes: inquiry.admin_notes.as_deref(),
        }
    }
}

pub(crate) fn write_csv<W: Write>(writer: W, inquiries: &[Inquiry]) -> Result<(), io::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for inquiry in inquiries {
        csv_writer.serialize(InquiryRow::from(inquiry))?;
    }
    csv_writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use techforge::inquiries::InquiryId;

    fn inquiry(id: u64, name: &str) -> Inquiry {
        let created_at = Utc
            .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        Inquiry {
            id: InquiryId(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            subject: "Pricing, timelines".to_string(),
            message: "Line one\nLine two".to_string(),
            phone: None,
            company: Some("Initech".to_string()),
            status: InquiryStatus::Read,
            reply_subject: None,
            reply_message: None,
            replied_at: None,
            created_at,
            updated_at: created_at,
            admin_notes: None,
        }
    }

    #[test]
    fn table_lists_one_row_per_inquiry() {
        let table = render_table(&[inquiry(2, "Grace"), inquiry(1, "Ada")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("STATUS"));
        assert!(lines[1].contains("Grace"));
        assert!(lines[1].contains("2025-03-14 09:30"));
        assert!(lines[2].trim_start().starts_with("1  read"));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(render_table(&[]), "No inquiries found.\n");
    }

    #[test]
    fn long_values_are_shortened() {
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("short", 6), "short");
    }

    #[test]
    fn csv_export_quotes_commas_and_newlines() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[inquiry(7, "Ada")]).expect("csv written");
        let output = String::from_utf8(buffer).expect("utf-8");

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("id,status,name,email,phone,company,subject,message,created_at,updated_at,replied_at,reply_subject,reply_message,admin_notes")
        );
        assert!(output.contains("7,read,Ada,ada@example.com,,Initech,\"Pricing, timelines\",\"Line one\nLine two\",2025-03-14T09:30:00Z"));
    }
}
