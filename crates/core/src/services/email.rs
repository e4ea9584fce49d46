//! Transactional email delivery.
//!
//! Renders the Cinewix mail templates (verification codes, login OTPs,
//! password resets, booking receipts) and delivers them through the
//! configured provider: SMTP via lettre, or the SendGrid/Mailgun HTTP APIs.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::MultiPart,
    transport::smtp::authentication::Credentials,
};
use serde::Deserialize;

use cinewix_common::{
    AppError, AppResult, Config,
    config::{EmailConfig, EmailProviderConfig},
    render_code39_data_uri,
};

/// An email ready for delivery.
#[derive(Debug)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
}

/// The data rendered into a booking receipt email.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking_code: String,
    pub movie_title: String,
    pub show_date: String,
    pub show_time: String,
    pub studio: String,
    pub seats: Vec<String>,
    pub total_price: i64,
    pub transaction_code: String,
}

/// Email delivery service.
#[derive(Clone)]
pub struct EmailService {
    config: Option<EmailConfig>,
    http_client: reqwest::Client,
    public_url: String,
}

impl EmailService {
    /// Create a new email service. Sending is a logged no-op when the
    /// `email` config section is absent.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.email.clone(),
            http_client: reqwest::Client::new(),
            public_url: config.server.url.clone(),
        }
    }

    /// Check if email delivery is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send an email through the configured provider.
    pub async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let Some(config) = self.config.as_ref() else {
            tracing::info!(
                to = %message.to,
                subject = %message.subject,
                "Email delivery disabled, skipping send"
            );
            tracing::debug!(body = %message.text_body, "Skipped email body");
            return Ok(());
        };

        match &config.provider {
            EmailProviderConfig::Smtp {
                host,
                port,
                username,
                password,
            } => {
                self.send_smtp(config, host, *port, username.as_deref(), password.as_deref(), message)
                    .await
            }
            EmailProviderConfig::Sendgrid { api_key } => {
                self.send_sendgrid(config, api_key, message).await
            }
            EmailProviderConfig::Mailgun {
                api_key,
                domain,
                eu_region,
            } => {
                self.send_mailgun(config, api_key, domain, *eu_region, message)
                    .await
            }
        }
    }

    /// Email a registration verification code.
    pub async fn send_verification_email(
        &self,
        to: &str,
        name: &str,
        code: &str,
    ) -> AppResult<()> {
        let subject = "Welcome to Cinewix - Verify your email".to_string();
        let text = format!(
            "Hi {name},\n\n\
            Welcome to Cinewix! Enter this code to verify your email address:\n\n\
            {code}\n\n\
            The code expires in 5 minutes.\n\n\
            If you didn't create an account, you can safely ignore this email."
        );
        let html = self.wrap_html(&format!(
            "<p>Hi <strong>{name}</strong>,</p>\
            <p>Welcome to Cinewix! Enter this code to verify your email address:</p>\
            {}\
            <p><small>The code expires in 5 minutes. If you didn't create an account, \
            you can safely ignore this email.</small></p>",
            code_block(code)
        ));

        self.send(EmailMessage {
            to: to.to_string(),
            subject,
            text_body: text,
            html_body: html,
        })
        .await
    }

    /// Email a login one-time passcode.
    pub async fn send_login_otp_email(&self, to: &str, name: &str, code: &str) -> AppResult<()> {
        let subject = "Your Cinewix login code".to_string();
        let text = format!(
            "Hi {name},\n\n\
            Your one-time login code is:\n\n\
            {code}\n\n\
            The code expires in 10 minutes. If you didn't try to log in, \
            please change your password."
        );
        let html = self.wrap_html(&format!(
            "<p>Hi <strong>{name}</strong>,</p>\
            <p>Your one-time login code is:</p>\
            {}\
            <p><small>The code expires in 10 minutes. If you didn't try to log in, \
            please change your password.</small></p>",
            code_block(code)
        ));

        self.send(EmailMessage {
            to: to.to_string(),
            subject,
            text_body: text,
            html_body: html,
        })
        .await
    }

    /// Email a password reset link.
    pub async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> AppResult<()> {
        let reset_url = format!("{}/reset-password?token={token}", self.public_url);
        let subject = "Reset your Cinewix password".to_string();
        let text = format!(
            "Hi {name},\n\n\
            You requested a password reset. Open the link below to choose a new password:\n\n\
            {reset_url}\n\n\
            The link expires in 1 hour. If you didn't request this, \
            you can safely ignore this email."
        );
        let html = self.wrap_html(&format!(
            "<p>Hi <strong>{name}</strong>,</p>\
            <p>You requested a password reset.</p>\
            <p><a href=\"{reset_url}\" style=\"display:inline-block;padding:12px 24px;\
            background:#e50914;color:#fff;text-decoration:none;border-radius:4px;\">\
            Reset Password</a></p>\
            <p><small>The link expires in 1 hour. If you didn't request this, \
            you can safely ignore this email.</small></p>"
        ));

        self.send(EmailMessage {
            to: to.to_string(),
            subject,
            text_body: text,
            html_body: html,
        })
        .await
    }

    /// Email a booking receipt with a scannable Code 39 barcode.
    pub async fn send_booking_receipt(
        &self,
        to: &str,
        name: &str,
        receipt: &BookingReceipt,
    ) -> AppResult<()> {
        let barcode = render_code39_data_uri(&receipt.booking_code)?;
        let seats = receipt.seats.join(", ");
        let subject = format!("Your Cinewix tickets - {}", receipt.booking_code);
        let text = format!(
            "Hi {name},\n\n\
            Your booking is confirmed!\n\n\
            Booking code: {}\n\
            Movie: {}\n\
            Date: {} at {}\n\
            Studio: {}\n\
            Seats: {seats}\n\
            Total: Rp {}\n\
            Transaction: {}\n\n\
            Show the booking code at the cinema entrance.",
            receipt.booking_code,
            receipt.movie_title,
            receipt.show_date,
            receipt.show_time,
            receipt.studio,
            receipt.total_price,
            receipt.transaction_code,
        );
        let html = self.wrap_html(&format!(
            "<p>Hi <strong>{name}</strong>,</p>\
            <p>Your booking is confirmed!</p>\
            <table cellpadding=\"6\" style=\"border-collapse:collapse;\">\
            <tr><td>Booking code</td><td><strong>{}</strong></td></tr>\
            <tr><td>Movie</td><td>{}</td></tr>\
            <tr><td>Date</td><td>{} at {}</td></tr>\
            <tr><td>Studio</td><td>{}</td></tr>\
            <tr><td>Seats</td><td>{seats}</td></tr>\
            <tr><td>Total</td><td>Rp {}</td></tr>\
            <tr><td>Transaction</td><td>{}</td></tr>\
            </table>\
            <p><img src=\"{barcode}\" alt=\"{}\" /></p>\
            <p><small>Show the barcode at the cinema entrance.</small></p>",
            receipt.booking_code,
            receipt.movie_title,
            receipt.show_date,
            receipt.show_time,
            receipt.studio,
            receipt.total_price,
            receipt.transaction_code,
            receipt.booking_code,
        ));

        self.send(EmailMessage {
            to: to.to_string(),
            subject,
            text_body: text,
            html_body: html,
        })
        .await
    }

    /// Wrap body content in the shared HTML shell.
    fn wrap_html(&self, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; color: #333;">
    <h2 style="color: #e50914;">Cinewix</h2>
    {content}
    <hr style="border: none; border-top: 1px solid #eee; margin: 24px 0;">
    <p style="font-size: 12px; color: #999;">
        This email was sent by <a href="{}">Cinewix</a>.
    </p>
</body>
</html>"#,
            self.public_url
        )
    }

    // Provider-specific implementations

    async fn send_smtp(
        &self,
        config: &EmailConfig,
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        message: EmailMessage,
    ) -> AppResult<()> {
        let from = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid from address: {e}")))?;
        let to = message
            .to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(&message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.text_body,
                message.html_body,
            ))
            .map_err(|e| AppError::Email(format!("Failed to build message: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Email(format!("Invalid SMTP relay: {e}")))?
            .port(port);

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        builder
            .build()
            .send(email)
            .await
            .map_err(|e| AppError::Email(format!("SMTP send failed: {e}")))?;

        tracing::debug!(to = %message.to, "Sent email via SMTP");
        Ok(())
    }

    async fn send_sendgrid(
        &self,
        config: &EmailConfig,
        api_key: &str,
        message: EmailMessage,
    ) -> AppResult<()> {
        let body = serde_json::json!({
            "personalizations": [{
                "to": [{"email": message.to}]
            }],
            "from": {
                "email": config.from_address,
                "name": config.from_name
            },
            "subject": message.subject,
            "content": [
                {"type": "text/plain", "value": message.text_body},
                {"type": "text/html", "value": message.html_body}
            ]
        });

        let response = self
            .http_client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Email(format!("SendGrid request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Email(format!("SendGrid rejected email: {error_text}")));
        }
        Ok(())
    }

    async fn send_mailgun(
        &self,
        config: &EmailConfig,
        api_key: &str,
        domain: &str,
        eu_region: bool,
        message: EmailMessage,
    ) -> AppResult<()> {
        let base_url = if eu_region {
            "https://api.eu.mailgun.net"
        } else {
            "https://api.mailgun.net"
        };

        let form_params = vec![
            (
                "from",
                format!("{} <{}>", config.from_name, config.from_address),
            ),
            ("to", message.to),
            ("subject", message.subject),
            ("text", message.text_body),
            ("html", message.html_body),
        ];

        let response = self
            .http_client
            .post(format!("{base_url}/v3/{domain}/messages"))
            .basic_auth("api", Some(api_key))
            .form(&form_params)
            .send()
            .await
            .map_err(|e| AppError::Email(format!("Mailgun request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Email(format!("Mailgun rejected email: {error_text}")));
        }

        #[derive(Deserialize)]
        struct MailgunResponse {
            id: Option<String>,
        }
        let result: MailgunResponse = response
            .json()
            .await
            .unwrap_or(MailgunResponse { id: None });
        tracing::debug!(message_id = ?result.id, "Sent email via Mailgun");
        Ok(())
    }
}

/// Large centered code block for OTP-style emails.
fn code_block(code: &str) -> String {
    format!(
        "<p style=\"font-size:32px;letter-spacing:8px;font-weight:bold;\
        text-align:center;padding:16px;background:#f5f5f5;border-radius:4px;\">{code}</p>"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cinewix_common::config::{
        AuthConfig, BookingConfig, DatabaseConfig, ServerConfig, UploadConfig,
    };

    fn test_config(email: Option<EmailConfig>) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/cinewix".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                token_days: 7,
                verification_minutes: 5,
                otp_minutes: 10,
                reset_minutes: 60,
            },
            email,
            booking: BookingConfig::default(),
            uploads: UploadConfig::default(),
        }
    }

    #[tokio::test]
    async fn send_is_noop_when_unconfigured() {
        let service = EmailService::new(&test_config(None));
        assert!(!service.is_enabled());

        let result = service
            .send(EmailMessage {
                to: "user@example.com".to_string(),
                subject: "Test".to_string(),
                text_body: "Test".to_string(),
                html_body: "<p>Test</p>".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn receipt_html_embeds_barcode_and_seats() {
        let service = EmailService::new(&test_config(None));
        let receipt = BookingReceipt {
            booking_code: "CWABCD1234".to_string(),
            movie_title: "Dune".to_string(),
            show_date: "2025-07-01".to_string(),
            show_time: "19:00".to_string(),
            studio: "Studio 1".to_string(),
            seats: vec!["A1".to_string(), "A2".to_string()],
            total_price: 100_000,
            transaction_code: "TRX17000000000042".to_string(),
        };

        let barcode = render_code39_data_uri(&receipt.booking_code).unwrap();
        let html = service.wrap_html(&format!("<img src=\"{barcode}\" />"));
        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("Cinewix"));
        assert_eq!(receipt.seats.join(", "), "A1, A2");
    }
}
