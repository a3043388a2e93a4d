use std::fmt::Debug;

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::config::{MailTransportKind, SmtpConfig, SmtpSecurity};

/// Transport-neutral description of one outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text_body: String,
    /// When present the message is sent as multipart/alternative with `text_body` as fallback.
    pub html_body: Option<String>,
}

impl OutgoingEmail {
    pub fn to_message(&self) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .subject(self.subject.clone());

        for recipient in &self.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let message = match &self.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                self.text_body.clone(),
                html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(self.text_body.clone()),
        };

        message.map_err(|err| MailError::Build(err.to_string()))
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, MailError> {
    raw.parse::<Mailbox>().map_err(|err| MailError::Address {
        address: raw.to_string(),
        reason: err.to_string(),
    })
}

/// Outbound mail hook so flows can be exercised without a live SMTP server.
pub trait Mailer: Debug + Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("unable to build message: {0}")]
    Build(String),
    #[error("{0}")]
    Transport(String),
}

/// Blocking SMTP delivery through lettre. One attempt per message, transport default timeout.
pub struct SmtpMailer {
    transport: SmtpTransport,
    host: String,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        let transport_error = |err: lettre::transport::smtp::Error| {
            MailError::Transport(format!("unable to configure {}: {err}", config.host))
        };

        let mut builder = match config.security {
            SmtpSecurity::Tls => SmtpTransport::relay(&config.host).map_err(transport_error)?,
            SmtpSecurity::StartTls => {
                SmtpTransport::starttls_relay(&config.host).map_err(transport_error)?
            }
            SmtpSecurity::None => SmtpTransport::builder_dangerous(&config.host),
        };

        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }
}

impl Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = email.to_message()?;
        self.transport
            .send(&message)
            .map_err(|err| MailError::Transport(err.to_string()))?;
        debug!(host = %self.host, recipients = ?email.to, "smtp delivery accepted");
        Ok(())
    }
}

/// Development transport: renders the message and writes it to the log.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = email.to_message()?;
        info!(
            to = ?email.to,
            subject = %email.subject,
            multipart = email.html_body.is_some(),
            "email captured by log transport"
        );
        debug!(
            body = %String::from_utf8_lossy(&message.formatted()),
            "rendered email"
        );
        Ok(())
    }
}

/// Transport picked at startup from `MAIL_TRANSPORT`.
#[derive(Debug)]
pub enum ConfiguredMailer {
    Log(LogMailer),
    Smtp(SmtpMailer),
}

impl ConfiguredMailer {
    pub fn from_config(kind: &MailTransportKind) -> Result<Self, MailError> {
        match kind {
            MailTransportKind::Log => Ok(Self::Log(LogMailer)),
            MailTransportKind::Smtp(config) => SmtpMailer::from_config(config).map(Self::Smtp),
        }
    }
}

impl Mailer for ConfiguredMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        match self {
            ConfiguredMailer::Log(mailer) => mailer.send(email),
            ConfiguredMailer::Smtp(mailer) => mailer.send(email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(html: Option<&str>) -> OutgoingEmail {
        OutgoingEmail {
            from: "Techforge <noreply@techforge.test>".to_string(),
            to: vec!["ada@example.com".to_string()],
            reply_to: Some("support@techforge.test".to_string()),
            subject: "Re: Pricing".to_string(),
            text_body: "Here are our rates.".to_string(),
            html_body: html.map(str::to_string),
        }
    }

    #[test]
    fn plain_messages_carry_a_single_text_part() {
        let message = email(None).to_message().expect("message builds");
        let rendered = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(rendered.contains("Subject: Re: Pricing"));
        assert!(rendered.contains("Reply-To: support@techforge.test"));
        assert!(rendered.contains("text/plain"));
        assert!(!rendered.contains("multipart/alternative"));
    }

    #[test]
    fn html_messages_are_sent_as_alternatives() {
        let message = email(Some("<p>Here are our rates.</p>"))
            .to_message()
            .expect("message builds");
        let rendered = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(rendered.contains("multipart/alternative"));
        assert!(rendered.contains("text/html"));
        assert!(rendered.contains("text/plain"));
    }

    #[test]
    fn rejects_malformed_recipients() {
        let mut outgoing = email(None);
        outgoing.to = vec!["not an address".to_string()];
        match outgoing.to_message() {
            Err(MailError::Address { address, .. }) => assert_eq!(address, "not an address"),
            other => panic!("expected address error, got {other:?}"),
        }
    }

    #[test]
    fn log_transport_accepts_well_formed_messages() {
        assert!(LogMailer.send(&email(Some("<p>hi</p>"))).is_ok());
    }
}
