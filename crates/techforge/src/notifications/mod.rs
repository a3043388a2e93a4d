//! Outbound email: transports, message composition, and the inquiry notifier.

pub mod mailer;
pub mod notifier;
pub mod templates;

pub use mailer::{ConfiguredMailer, LogMailer, MailError, Mailer, OutgoingEmail, SmtpMailer};
pub use notifier::{MailSettings, Notifier, ReplyDeliveryError, StaffNotification};
pub use templates::ReplyContext;
