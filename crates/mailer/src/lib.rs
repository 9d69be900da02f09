//! SMTP mail dispatcher for bookferry.
//!
//! Implements the pipeline's [`Mailer`] seam with lettre: one binary
//! attachment per message, fixed sender/recipient/subject, submitted over an
//! authenticated STARTTLS session to the configured relay. The blocking SMTP
//! transaction runs on tokio's blocking pool so it never stalls the
//! cooperative scheduler while other pipeline runs are in flight.

pub mod error;

use std::path::Path;

use {
    async_trait::async_trait,
    lettre::{
        SmtpTransport, Transport,
        message::{Attachment, Mailbox, Message, MultiPart, header::ContentType},
        transport::smtp::authentication::Credentials,
    },
    secrecy::ExposeSecret,
    tracing::debug,
};

use {
    bookferry_config::SmtpSettings,
    bookferry_pipeline::deliver::{DeliveryError, Mailer},
};

pub use error::{Error, Result};

/// Subject line of every forwarded book.
const MAIL_SUBJECT: &str = "New Book";

/// Packages files into MIME attachments and submits them to the relay.
pub struct SmtpMailer {
    sender: Mailbox,
    recipient: Mailbox,
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Parse the configured addresses and prepare the STARTTLS transport.
    ///
    /// Fails fast on a malformed address or relay host so a broken
    /// configuration is caught at startup, before any event is consumed.
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let sender: Mailbox = settings.sender.parse()?;
        let recipient: Mailbox = settings.recipient.parse()?;

        let transport = SmtpTransport::starttls_relay(&settings.relay_host)?
            .port(settings.relay_port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.expose_secret().clone(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            sender,
            recipient,
            transport,
        })
    }

    fn build_message(&self, display_filename: &str, payload: Vec<u8>) -> Result<Message> {
        let content_type = ContentType::parse("application/octet-stream")?;
        let attachment = Attachment::new(display_filename.to_string()).body(payload, content_type);

        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(MAIL_SUBJECT)
            .multipart(MultiPart::mixed().singlepart(attachment))?;
        Ok(message)
    }

    async fn send(&self, file_path: &Path, display_filename: &str) -> Result<()> {
        let payload = tokio::fs::read(file_path).await?;
        debug!(
            filename = display_filename,
            bytes = payload.len(),
            "submitting message to relay"
        );
        let message = self.build_message(display_filename, payload)?;

        // lettre's SmtpTransport is synchronous network I/O; run it on the
        // blocking pool and await the handle.
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| Error::message(format!("mail worker panicked: {e}")))??;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(
        &self,
        file_path: &Path,
        display_filename: &str,
    ) -> std::result::Result<(), DeliveryError> {
        self.send(file_path, display_filename)
            .await
            .map_err(|e| DeliveryError::new("mail delivery", e))
    }
}
