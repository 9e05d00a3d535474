//! Outbound email delivery.
//!
//! Mail is always best-effort: the registration and payment write paths
//! dispatch a message and move on. Delivery runs as a spawned task with a
//! bounded retry; terminal failures are logged, never surfaced to the
//! delegate-facing request. Without SMTP credentials the mailer runs in
//! disabled mode and sends return a synthetic result.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use munreg_common::config::SmtpConfig;
use munreg_common::{AppError, AppResult};
use serde::Serialize;

/// Maximum delivery attempts per message.
const MAX_MAIL_ATTEMPTS: u32 = 3;

/// Result of a delivery attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailOutcome {
    /// Whether the message reached the SMTP server.
    pub delivered: bool,
    /// True when the mailer has no transport configured.
    pub disabled: bool,
}

impl MailOutcome {
    const fn disabled() -> Self {
        Self {
            delivered: false,
            disabled: true,
        }
    }

    const fn delivered() -> Self {
        Self {
            delivered: true,
            disabled: false,
        }
    }
}

/// Rendered email content.
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Outbound mailer.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
    conference_name: String,
}

impl Mailer {
    /// Create a mailer from optional SMTP configuration. `None` yields a
    /// disabled mailer.
    pub fn new(smtp: Option<&SmtpConfig>, conference_name: &str) -> AppResult<Self> {
        let Some(smtp) = smtp else {
            tracing::info!("SMTP not configured, mail delivery disabled");
            return Ok(Self {
                transport: None,
                from: None,
                conference_name: conference_name.to_string(),
            });
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| AppError::Config(format!("Invalid SMTP relay: {e}")))?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();

        let from = format!("{} <{}>", smtp.from_name, smtp.from_address)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("Invalid from address: {e}")))?;

        Ok(Self {
            transport: Some(transport),
            from: Some(from),
            conference_name: conference_name.to_string(),
        })
    }

    /// Check if mail delivery is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Attempt a single delivery.
    pub async fn send(&self, to: &str, content: &EmailContent) -> AppResult<MailOutcome> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::info!(to = %to, subject = %content.subject, "Mail disabled, skipping send");
            return Ok(MailOutcome::disabled());
        };

        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Validation(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from.clone())
            .to(recipient)
            .subject(content.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                content.text.clone(),
                content.html.clone(),
            ))
            .map_err(|e| AppError::Mail(format!("Failed to build message: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("SMTP send failed: {e}")))?;

        Ok(MailOutcome::delivered())
    }

    /// Dispatch a message as a background task with bounded retry.
    ///
    /// Returns immediately; the caller's write path is already committed by
    /// the time this is invoked and must not block on delivery.
    pub fn dispatch(&self, to: String, content: EmailContent) {
        if !self.is_enabled() {
            tracing::info!(to = %to, subject = %content.subject, "Mail disabled, dropping dispatch");
            return;
        }

        let mailer = self.clone();
        tokio::spawn(async move {
            let mut attempt = 0u32;
            loop {
                match mailer.send(&to, &content).await {
                    Ok(outcome) if outcome.delivered => {
                        tracing::debug!(to = %to, subject = %content.subject, "Mail delivered");
                        return;
                    }
                    Ok(_) => return,
                    Err(e) => {
                        attempt += 1;
                        if attempt >= MAX_MAIL_ATTEMPTS {
                            tracing::warn!(
                                to = %to,
                                subject = %content.subject,
                                error = %e,
                                "Mail delivery failed after max attempts"
                            );
                            return;
                        }

                        let delay_secs = 2u64.pow(attempt - 1);
                        tracing::debug!(
                            to = %to,
                            attempt = attempt,
                            delay_secs = delay_secs,
                            error = %e,
                            "Mail delivery failed, retrying"
                        );
                        tokio::time::sleep(std::time::Duration::from_secs(delay_secs)).await;
                    }
                }
            }
        });
    }

    /// Registration confirmation email.
    #[must_use]
    pub fn registration_confirmation(&self, first_name: &str, code: &str) -> EmailContent {
        let subject = format!("{} registration received", self.conference_name);
        let text = format!(
            "Hi {first_name},\n\n\
            Your registration for {} has been received.\n\n\
            Your registration code is: {code}\n\n\
            Keep this code safe; you will need it to complete payment and \
            for all further correspondence.\n\n\
            Your spot is confirmed once payment is completed.",
            self.conference_name
        );
        let html = self.wrap_html(&format!(
            "<p>Hi {first_name},</p>\
            <p>Your registration for <strong>{}</strong> has been received.</p>\
            <p>Your registration code is: <strong>{code}</strong></p>\
            <p>Keep this code safe; you will need it to complete payment and \
            for all further correspondence.</p>\
            <p>Your spot is confirmed once payment is completed.</p>",
            self.conference_name
        ));

        EmailContent { subject, text, html }
    }

    /// Payment confirmation email carrying the assignment.
    #[must_use]
    pub fn payment_confirmation(
        &self,
        first_name: &str,
        code: &str,
        committee: &str,
        country: &str,
    ) -> EmailContent {
        let subject = format!("{} payment confirmed", self.conference_name);
        let text = format!(
            "Hi {first_name},\n\n\
            Your payment for {} has been confirmed. Registration code: {code}.\n\n\
            You have been assigned to:\n\
            Committee: {committee}\n\
            Country: {country}\n\n\
            We look forward to seeing you at the conference.",
            self.conference_name
        );
        let html = self.wrap_html(&format!(
            "<p>Hi {first_name},</p>\
            <p>Your payment for <strong>{}</strong> has been confirmed. \
            Registration code: <strong>{code}</strong>.</p>\
            <p>You have been assigned to:</p>\
            <ul><li>Committee: <strong>{committee}</strong></li>\
            <li>Country: <strong>{country}</strong></li></ul>\
            <p>We look forward to seeing you at the conference.</p>",
            self.conference_name
        ));

        EmailContent { subject, text, html }
    }

    /// Wrap HTML content in a basic email template.
    fn wrap_html(&self, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #007bff; }}
    </style>
</head>
<body>
    {}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">
        This email was sent by the {} registration desk.
    </p>
</body>
</html>"#,
            content, self.conference_name
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_mailer_returns_synthetic_result() {
        let mailer = Mailer::new(None, "Test Conference").unwrap();
        assert!(!mailer.is_enabled());

        let content = mailer.registration_confirmation("Ama", "MUNC-100000-0001");
        let outcome = mailer.send("delegate@example.com", &content).await.unwrap();

        assert!(outcome.disabled);
        assert!(!outcome.delivered);
    }

    #[test]
    fn test_registration_confirmation_carries_code() {
        let mailer = Mailer::new(None, "Test Conference").unwrap();
        let content = mailer.registration_confirmation("Ama", "MUNC-100000-0001");

        assert!(content.subject.contains("Test Conference"));
        assert!(content.text.contains("MUNC-100000-0001"));
        assert!(content.html.contains("MUNC-100000-0001"));
    }

    #[test]
    fn test_payment_confirmation_carries_assignment() {
        let mailer = Mailer::new(None, "Test Conference").unwrap();
        let content =
            mailer.payment_confirmation("Ama", "MUNC-100000-0001", "General Assembly", "Ghana");

        assert!(content.text.contains("General Assembly"));
        assert!(content.text.contains("Ghana"));
        assert!(content.html.contains("Ghana"));
    }
}
