use anyhow::anyhow;
use lettre::message::{MultiPart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

/// Outbound email. An optional collaborator: with SMTP disabled every send
/// is logged and skipped rather than treated as a failure, so auth flows
/// never depend on a mail server being up.
#[derive(Clone, Debug)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, token))]
    pub async fn send_confirmation_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
    ) -> Result<(), AppError> {
        let link = format!(
            "{}/confirm-email?token={}",
            self.config.client_base_url, token
        );
        let text_body = format!(
            "Hi {},\n\n\
             Please confirm your email address by following the link below:\n\
             {}\n\n\
             This link will expire in 1 hour.\n\n\
             If you didn't create an account, please ignore this email.",
            to_name, link
        );
        let html_body = format!(
            "<p>Hi {},</p>\
             <p>Please confirm your email address:</p>\
             <p><a href=\"{}\">Confirm email</a></p>\
             <p>This link will expire in 1 hour.</p>",
            to_name, link
        );

        self.send_email(to_email, "Confirm your email", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
    ) -> Result<(), AppError> {
        let link = format!(
            "{}/reset-password?token={}",
            self.config.client_base_url, token
        );
        let text_body = format!(
            "Hi {},\n\n\
             You requested to reset your password.\n\n\
             Follow the link below to choose a new one:\n\
             {}\n\n\
             This link will expire in 1 hour.\n\n\
             If you didn't request this, please ignore this email.",
            to_name, link
        );
        let html_body = format!(
            "<p>Hi {},</p>\
             <p>You requested to reset your password.</p>\
             <p><a href=\"{}\">Reset password</a></p>\
             <p>This link will expire in 1 hour. If you didn't request this, ignore this email.</p>",
            to_name, link
        );

        self.send_email(to_email, "Password Reset Request", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, text_body, html_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::info!(to = %to_email, subject, "email delivery disabled, skipping send");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let message = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(anyhow!("Invalid from address: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal(anyhow!("Invalid recipient address: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow!("Failed to build email: {}", e)))?;

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal(anyhow!("Failed to create SMTP transport: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ))
            .build();

        mailer
            .send(&message)
            .map_err(|e| AppError::internal(anyhow!("Failed to send email: {}", e)))?;

        tracing::info!(to = %to_email, subject, "email sent");
        Ok(())
    }
}
