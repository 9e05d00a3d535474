//! Paystack hosted-checkout gateway adapter.
//!
//! Wraps the three gateway interactions: initializing a checkout,
//! verifying a transaction by reference, and receiving signed webhook
//! events. Both verify and webhook confirmations funnel into the
//! registration service's transactional paid-transition, so calling them
//! concurrently or repeatedly is safe.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use munreg_common::config::PaystackConfig;
use munreg_common::{AppError, AppResult};
use munreg_db::entities::registration::{self, PaymentMethod};
use munreg_db::entities::payment_initialization;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::sync::Arc;
use validator::Validate;

use super::registration::{ConfirmedTransaction, RegistrationService, is_valid_code};

type HmacSha512 = Hmac<Sha512>;

/// Signature header the gateway sends with webhook deliveries.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Input for initializing a checkout. Required fields default to empty so
/// a missing field becomes a 400 validation error.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentInput {
    #[serde(default)]
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "firstName is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "surname is required"))]
    pub surname: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "registrationCode is required"))]
    pub registration_code: String,
}

/// A started checkout, as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializedCheckout {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Public gateway configuration for the in-page checkout widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub public_key: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
}

/// Outcome of a verify call.
#[derive(Debug)]
pub enum VerifyOutcome {
    /// The gateway has not (yet) reported success; the client may keep
    /// polling, and the webhook may still land later.
    Pending { gateway_status: String },
    /// The transaction succeeded and the registration is paid.
    Confirmed {
        registration: registration::Model,
        already_paid: bool,
    },
}

// === Gateway wire types ===

#[derive(Debug, Deserialize)]
struct GatewayEnvelope<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    id: i64,
    status: String,
    reference: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    paid_at: Option<String>,
    #[serde(default)]
    metadata: Option<TransactionMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct TransactionMetadata {
    #[serde(default)]
    registration_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    data: TransactionData,
}

/// Derive the registration code from a checkout reference
/// (`<code>-<epoch-ms>`) by stripping the trailing epoch segment.
/// Fallback for transactions whose metadata did not survive the gateway.
#[must_use]
pub fn code_from_reference(reference: &str) -> Option<&str> {
    reference
        .rsplit_once('-')
        .map(|(code, _)| code)
        .filter(|code| is_valid_code(code))
}

/// Paystack gateway adapter.
#[derive(Clone)]
pub struct PaystackService {
    config: PaystackConfig,
    http_client: Arc<reqwest::Client>,
    registrations: RegistrationService,
}

impl PaystackService {
    /// Create a new gateway adapter.
    #[must_use]
    #[allow(clippy::expect_used)] // Client build only fails with incompatible TLS settings
    pub fn new(config: PaystackConfig, registrations: RegistrationService) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client: Arc::new(http_client),
            registrations,
        }
    }

    /// Public key and fee for the in-page checkout widget.
    #[must_use]
    pub fn public_config(&self) -> PublicConfig {
        PublicConfig {
            public_key: self.config.public_key.clone(),
            amount: self.registrations.fee_minor_units(),
            currency: self.registrations_currency(),
        }
    }

    /// Start a hosted checkout for a pending registration.
    ///
    /// Appends a `payment_initialization` row; retries produce additional
    /// rows, and only the reference the gateway later confirms matters.
    pub async fn initialize(&self, input: InitializePaymentInput) -> AppResult<InitializedCheckout> {
        input.validate()?;

        let reg = self
            .registrations
            .get_by_code(&input.registration_code)
            .await?;
        if reg.is_paid() {
            return Err(AppError::BadRequest(
                "Registration is already paid".to_string(),
            ));
        }

        let reference = format!(
            "{}-{}",
            input.registration_code,
            Utc::now().timestamp_millis()
        );
        let amount = self.registrations.fee_minor_units();

        let body = serde_json::json!({
            "email": input.email,
            "amount": amount,
            "currency": self.registrations_currency(),
            "reference": reference,
            "metadata": {
                "registration_code": input.registration_code,
                "full_name": format!("{} {}", input.first_name, input.surname),
            },
        });

        let response = self
            .http_client
            .post(format!("{}/transaction/initialize", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gateway initialize failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Gateway initialize returned HTTP {}",
                response.status()
            )));
        }

        let envelope: GatewayEnvelope<InitializeData> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Gateway initialize response invalid: {e}")))?;

        let data = match envelope {
            GatewayEnvelope {
                status: true,
                data: Some(data),
                ..
            } => data,
            GatewayEnvelope { message, .. } => {
                return Err(AppError::Upstream(format!(
                    "Gateway rejected initialize: {message}"
                )));
            }
        };

        let attempt = payment_initialization::ActiveModel {
            id: Set(crate::generate_id()),
            registration_code: Set(input.registration_code.clone()),
            email: Set(input.email.clone()),
            amount: Set(amount),
            reference: Set(data.reference.clone()),
            status: Set(payment_initialization::InitializationStatus::Pending),
            created_at: Set(Utc::now().into()),
        };
        self.registrations.initializations().create(attempt).await?;

        tracing::info!(
            registration_code = %input.registration_code,
            reference = %data.reference,
            "Checkout initialized"
        );

        Ok(InitializedCheckout {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    /// Verify a transaction by reference.
    ///
    /// A not-yet-successful gateway status is a pending outcome, not an
    /// error: clients poll this endpoint on an interval and give up on
    /// their own schedule. Success runs the transactional paid-transition,
    /// so repeated or concurrent calls confirm at most once.
    pub async fn verify(&self, reference: &str) -> AppResult<VerifyOutcome> {
        let response = self
            .http_client
            .get(format!(
                "{}/transaction/verify/{reference}",
                self.config.base_url
            ))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gateway verify failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Gateway verify returned HTTP {}",
                response.status()
            )));
        }

        let envelope: GatewayEnvelope<TransactionData> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Gateway verify response invalid: {e}")))?;

        let Some(data) = envelope.data else {
            return Err(AppError::Upstream(format!(
                "Gateway verify carried no data: {}",
                envelope.message
            )));
        };

        if data.status != "success" {
            return Ok(VerifyOutcome::Pending {
                gateway_status: data.status,
            });
        }

        let transition = self.confirm_transaction(&data).await?;
        Ok(VerifyOutcome::Confirmed {
            registration: transition.registration,
            already_paid: transition.already_paid,
        })
    }

    /// Handle a signed webhook delivery.
    ///
    /// The signature is an HMAC-SHA512 of the raw payload under the secret
    /// key; a mismatch is unauthorized. Once authenticated, processing
    /// failures are logged and swallowed so the route can answer 200 and
    /// the gateway stops retrying.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> AppResult<()> {
        let signature = signature.ok_or(AppError::Unauthorized)?;
        if !self.signature_matches(payload, signature) {
            return Err(AppError::Unauthorized);
        }

        let event: WebhookEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook payload did not parse, ignoring");
                return Ok(());
            }
        };

        if event.event != "charge.success" {
            tracing::debug!(event = %event.event, "Ignoring webhook event");
            return Ok(());
        }

        if let Err(e) = self.confirm_transaction(&event.data).await {
            tracing::error!(
                reference = %event.data.reference,
                error = %e,
                "Webhook confirmation failed"
            );
        }

        Ok(())
    }

    /// Check a webhook signature against the raw payload.
    #[must_use]
    #[allow(clippy::expect_used)] // HMAC accepts any key size, this cannot fail
    pub fn signature_matches(&self, payload: &[u8], signature: &str) -> bool {
        let mut mac = HmacSha512::new_from_slice(self.config.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());
        expected == signature.to_lowercase()
    }

    /// Shared confirmation path for verify and webhook.
    async fn confirm_transaction(
        &self,
        data: &TransactionData,
    ) -> AppResult<super::registration::PaidTransition> {
        let code = data
            .metadata
            .as_ref()
            .and_then(|m| m.registration_code.clone())
            .or_else(|| code_from_reference(&data.reference).map(String::from))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Cannot derive registration code from transaction {}",
                    data.reference
                ))
            })?;

        self.registrations
            .initializations()
            .mark_success(&data.reference)
            .await?;

        let paid_at = data
            .paid_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

        self.registrations
            .mark_paid(
                &code,
                PaymentMethod::Paystack,
                Some(data.reference.clone()),
                Some(ConfirmedTransaction {
                    transaction_id: data.id.to_string(),
                    amount: data.amount,
                    currency: data.currency.clone(),
                    paid_at,
                }),
            )
            .await
    }

    fn registrations_currency(&self) -> String {
        self.registrations.currency().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use munreg_common::config::RegistrationConfig;
    use munreg_db::repositories::{
        PaymentInitializationRepository, PaymentRepository, RegistrationRepository,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_service() -> PaystackService {
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let registrations = RegistrationService::new(
            db.clone(),
            RegistrationRepository::new(db.clone()),
            PaymentRepository::new(db.clone()),
            PaymentInitializationRepository::new(db),
            super::super::mailer::Mailer::new(None, "Test Conference").unwrap(),
            RegistrationConfig {
                fee: 350,
                currency: "GHS".to_string(),
                conference_name: "Test Conference".to_string(),
            },
        );

        PaystackService::new(
            PaystackConfig {
                secret_key: "sk_test_secret".to_string(),
                public_key: "pk_test_public".to_string(),
                base_url: "https://api.paystack.co".to_string(),
            },
            registrations,
        )
    }

    fn sign(payload: &[u8], key: &str) -> String {
        let mut mac = HmacSha512::new_from_slice(key.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_code_from_reference_strips_epoch_segment() {
        assert_eq!(
            code_from_reference("MUNC-100000-0001-1719222000000"),
            Some("MUNC-100000-0001")
        );
        // A bare code with no epoch suffix strips down to something that no
        // longer matches the code format.
        assert_eq!(code_from_reference("MUNC-100000-0001"), None);
        assert_eq!(code_from_reference("garbage"), None);
        assert_eq!(code_from_reference(""), None);
    }

    #[test]
    fn test_signature_round_trip() {
        let service = test_service();
        let payload = br#"{"event":"charge.success"}"#;

        let good = sign(payload, "sk_test_secret");
        assert!(service.signature_matches(payload, &good));

        let bad = sign(payload, "some_other_key");
        assert!(!service.signature_matches(payload, &bad));

        let tampered = br#"{"event":"charge.failed"}"#;
        assert!(!service.signature_matches(tampered, &good));
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_signature() {
        let service = test_service();
        let result = service.handle_webhook(b"{}", None).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_webhook_rejects_bad_signature() {
        let service = test_service();
        let result = service.handle_webhook(b"{}", Some("deadbeef")).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_webhook_ignores_other_events() {
        let service = test_service();
        let payload =
            br#"{"event":"transfer.success","data":{"id":1,"status":"success","reference":"r","amount":1,"currency":"GHS"}}"#;
        let signature = sign(payload, "sk_test_secret");

        // No database queries are mocked: reaching the confirmation path
        // would error, so Ok proves the event was ignored.
        let result = service.handle_webhook(payload, Some(&signature)).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_public_config_exposes_fee_in_minor_units() {
        let service = test_service();
        let config = service.public_config();

        assert_eq!(config.public_key, "pk_test_public");
        assert_eq!(config.amount, 35_000);
        assert_eq!(config.currency, "GHS");
    }
}
