//! Payment endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use munreg_common::AppResult;
use munreg_core::paystack::{InitializePaymentInput, InitializedCheckout, SIGNATURE_HEADER};
use munreg_core::{PublicConfig, VerifyOutcome};
use munreg_db::entities::payment;
use munreg_db::entities::registration::PaymentStatus;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Create payment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initialize", post(initialize_payment))
        .route("/verify/{reference}", get(verify_payment))
        .route("/webhook", post(payment_webhook))
        .route("/status/{code}", get(payment_status))
        .route("/config/public-key", get(public_config))
}

/// Start a hosted checkout.
async fn initialize_payment(
    State(state): State<AppState>,
    Json(input): Json<InitializePaymentInput>,
) -> AppResult<Json<InitializedCheckout>> {
    let checkout = state.paystack_service.initialize(input).await?;
    Ok(Json(checkout))
}

/// Response for a verify call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub status: &'static str,
    pub data: serde_json::Value,
}

/// Verify a transaction by reference.
///
/// Clients poll this on an interval; `pending` is a normal answer, not an
/// error. The webhook may still complete the transition after a client
/// stops polling.
async fn verify_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<VerifyResponse>> {
    match state.paystack_service.verify(&reference).await? {
        VerifyOutcome::Pending { gateway_status } => Ok(Json(VerifyResponse {
            status: "pending",
            data: json!({ "gatewayStatus": gateway_status }),
        })),
        VerifyOutcome::Confirmed {
            registration,
            already_paid,
        } => Ok(Json(VerifyResponse {
            status: "success",
            data: json!({
                "registrationCode": registration.registration_code,
                "paymentStatus": registration.payment_status,
                "assignedCommittee": registration.assigned_committee,
                "assignedCountry": registration.assigned_country,
                "alreadyPaid": already_paid,
            }),
        })),
    }
}

/// Receive a signed gateway webhook.
///
/// A bad signature is a 401. After authentication the answer is always
/// 200: processing failures are logged inside the adapter so the gateway
/// does not keep retrying an event we cannot use.
async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    state.paystack_service.handle_webhook(&body, signature).await?;
    Ok(StatusCode::OK)
}

/// A confirmed payment as exposed to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetail {
    pub transaction_id: String,
    pub amount: i64,
    pub status: String,
    pub payment_method: String,
    pub currency: String,
    pub payment_date: DateTime<Utc>,
}

impl From<payment::Model> for PaymentDetail {
    fn from(p: payment::Model) -> Self {
        Self {
            transaction_id: p.transaction_id,
            amount: p.amount,
            status: p.status,
            payment_method: p.payment_method,
            currency: p.currency,
            payment_date: p.payment_date.with_timezone(&Utc),
        }
    }
}

/// Response for the payment status lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub payment_status: PaymentStatus,
    pub payment_details: Vec<PaymentDetail>,
}

/// A registration's payment projection and confirmed payments.
async fn payment_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<PaymentStatusResponse>> {
    let (reg, payments) = state.registration_service.payment_details(&code).await?;

    Ok(Json(PaymentStatusResponse {
        payment_status: reg.payment_status,
        payment_details: payments.into_iter().map(Into::into).collect(),
    }))
}

/// Public gateway configuration for the in-page checkout widget.
async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.paystack_service.public_config())
}
