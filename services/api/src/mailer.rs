//! SMTP mail relay
//!
//! Templated HTML mail for OTP delivery, sign-up/login notices, newsletter
//! broadcasts, and contact-form relay. Notices are best-effort; OTP and
//! newsletter sends propagate failure to the caller.

use anyhow::Result;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use tracing::{error, info};

use crate::config::MailConfig;

/// SMTP mailer
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    mail_from: String,
    contact_inbox: String,
}

impl Mailer {
    /// Create a new mailer from SMTP settings.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            mail_from: config.mail_from.clone(),
            contact_inbox: config.contact_inbox.clone(),
        })
    }

    async fn send_html(&self, to: &str, subject: &str, body_html: String) -> Result<()> {
        let message = Message::builder()
            .from(self.mail_from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body_html)?;

        self.transport.send(message).await?;
        info!("Sent '{}' mail to {}", subject, to);
        Ok(())
    }

    /// Deliver a one-time code.
    pub async fn send_otp(&self, to: &str, code: &str) -> Result<()> {
        let body = format!(
            "<html><body><h2>Your Wavehouse verification code</h2>\
             <p>Enter this code to continue: <strong>{}</strong></p>\
             <p>The code expires in 10 minutes.</p></body></html>",
            code
        );
        self.send_html(to, "Your verification code", body).await
    }

    /// Welcome mail after sign-up. Best-effort.
    pub async fn send_welcome(&self, to: &str, full_name: &str) {
        let body = format!(
            "<html><body><h2>Welcome to Wavehouse, {}!</h2>\
             <p>Your account is ready. Head over to your dashboard to start \
             uploading your first release.</p></body></html>",
            full_name
        );
        if let Err(e) = self.send_html(to, "Welcome to Wavehouse", body).await {
            error!("Failed to send welcome mail to {}: {}", to, e);
        }
    }

    /// New-login notice. Best-effort.
    pub async fn send_login_notice(&self, to: &str) {
        let body = "<html><body><h2>New login to your Wavehouse account</h2>\
             <p>If this was not you, reset your password immediately.</p></body></html>"
            .to_string();
        if let Err(e) = self.send_html(to, "New login to your account", body).await {
            error!("Failed to send login notice to {}: {}", to, e);
        }
    }

    /// One newsletter issue to a single subscriber.
    pub async fn send_newsletter(&self, to: &str, subject: &str, body_html: &str) -> Result<()> {
        self.send_html(to, subject, body_html.to_string()).await
    }

    /// Relay a contact-form message to the support inbox.
    pub async fn send_contact(&self, name: &str, reply_to: &str, message: &str) -> Result<()> {
        let body = format!(
            "<html><body><h2>Contact form message</h2>\
             <p><strong>From:</strong> {} &lt;{}&gt;</p><p>{}</p></body></html>",
            name, reply_to, message
        );
        let inbox = self.contact_inbox.clone();
        self.send_html(&inbox, "Contact form message", body).await
    }
}
