//! Registration endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use munreg_common::AppResult;
use munreg_core::{CreateRegistrationInput, FinancialSummary};
use munreg_db::entities::registration::{self, PaymentMethod, PaymentStatus};
use serde::{Deserialize, Serialize};

use crate::{auth::AdminKey, state::AppState};

/// Create registration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_registration))
        .route("/", get(list_registrations))
        .route("/email/{email}", get(email_exists))
        .route("/code/{code}", get(get_by_code))
        .route("/momo-payment", post(submit_momo_payment))
        .route("/confirm-momo/{code}", post(confirm_momo_payment))
        .route("/complete", post(complete_registration))
        .route("/reset", post(reset_registrations))
        // Aliases kept for clients that predate the /export surface
        .route("/export/csv", get(super::export::export_csv))
        .route("/export/json", get(super::export::export_json))
}

/// Full registration row as exposed to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub registration_id: String,
    pub registration_code: String,
    pub first_name: String,
    pub surname: String,
    pub other_names: Option<String>,
    pub date_of_birth: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub institution: String,
    pub education_level: String,
    pub nationality: String,
    pub city: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub special_needs: Option<String>,
    pub has_mun_experience: bool,
    pub experience_details: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub assigned_committee: Option<String>,
    pub assigned_country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<registration::Model> for RegistrationResponse {
    fn from(reg: registration::Model) -> Self {
        Self {
            registration_id: reg.id,
            registration_code: reg.registration_code,
            first_name: reg.first_name,
            surname: reg.surname,
            other_names: reg.other_names,
            date_of_birth: reg.date_of_birth,
            gender: reg.gender,
            email: reg.email,
            phone: reg.phone,
            institution: reg.institution,
            education_level: reg.education_level,
            nationality: reg.nationality,
            city: reg.city,
            emergency_contact_name: reg.emergency_contact_name,
            emergency_contact_phone: reg.emergency_contact_phone,
            special_needs: reg.special_needs,
            has_mun_experience: reg.has_mun_experience,
            experience_details: reg.experience_details,
            payment_status: reg.payment_status,
            payment_method: reg.payment_method,
            payment_reference: reg.payment_reference,
            assigned_committee: reg.assigned_committee,
            assigned_country: reg.assigned_country,
            created_at: reg.created_at.with_timezone(&Utc),
            updated_at: reg.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Response for a created registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationResponse {
    pub registration_code: String,
    pub registration_id: String,
}

/// Create a registration with status `pending`.
async fn create_registration(
    State(state): State<AppState>,
    Json(input): Json<CreateRegistrationInput>,
) -> AppResult<(StatusCode, Json<CreateRegistrationResponse>)> {
    let created = state.registration_service.create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRegistrationResponse {
            registration_code: created.registration_code,
            registration_id: created.id,
        }),
    ))
}

/// Response for an email existence probe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailExistsResponse {
    pub exists: bool,
}

/// Check whether an email is already registered.
async fn email_exists(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<EmailExistsResponse>> {
    let exists = state.registration_service.email_exists(&email).await?;
    Ok(Json(EmailExistsResponse { exists }))
}

/// Get a registration by code.
async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<RegistrationResponse>> {
    let reg = state.registration_service.get_by_code(&code).await?;
    Ok(Json(reg.into()))
}

/// Response for the admin listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRegistrationsResponse {
    pub registrations: Vec<RegistrationResponse>,
    pub summary: FinancialSummary,
}

/// List every registration with the financial summary. Admin only.
async fn list_registrations(
    _key: AdminKey,
    State(state): State<AppState>,
) -> AppResult<Json<ListRegistrationsResponse>> {
    let (registrations, summary) = state.registration_service.list_all().await?;

    Ok(Json(ListRegistrationsResponse {
        registrations: registrations.into_iter().map(Into::into).collect(),
        summary,
    }))
}

/// Input for submitting a mobile-money proof.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoPaymentInput {
    #[serde(default)]
    pub registration_code: String,
    #[serde(default)]
    pub transaction_id: String,
}

/// Response for a mobile-money submission or confirmation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoPaymentResponse {
    pub registration_code: String,
    pub payment_status: PaymentStatus,
}

/// Submit a mobile-money transaction id as proof of payment.
async fn submit_momo_payment(
    State(state): State<AppState>,
    Json(input): Json<MomoPaymentInput>,
) -> AppResult<Json<MomoPaymentResponse>> {
    let updated = state
        .registration_service
        .submit_momo_proof(&input.registration_code, &input.transaction_id)
        .await?;

    Ok(Json(MomoPaymentResponse {
        registration_code: updated.registration_code,
        payment_status: updated.payment_status,
    }))
}

/// Confirm a submitted mobile-money proof. Admin only.
async fn confirm_momo_payment(
    _key: AdminKey,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<RegistrationResponse>> {
    let transition = state.registration_service.confirm_momo(&code).await?;
    Ok(Json(transition.registration.into()))
}

/// Input for the direct already-paid flow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRegistrationInput {
    #[serde(flatten)]
    pub registration: CreateRegistrationInput,
    #[serde(default)]
    pub payment_reference: String,
}

/// Create a registration directly in status `paid`.
///
/// Used when the client completed checkout before submitting the form; the
/// duplicate-code conflict is what prevents double submission.
async fn complete_registration(
    State(state): State<AppState>,
    Json(input): Json<CompleteRegistrationInput>,
) -> AppResult<(StatusCode, Json<RegistrationResponse>)> {
    if input.payment_reference.trim().is_empty() {
        return Err(munreg_common::AppError::Validation(
            "paymentReference is required".to_string(),
        ));
    }

    let created = state
        .registration_service
        .complete_after_payment(input.registration, &input.payment_reference)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Response for the administrative reset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub removed: u64,
}

/// Truncate all registration data. Admin only.
async fn reset_registrations(
    _key: AdminKey,
    State(state): State<AppState>,
) -> AppResult<Json<ResetResponse>> {
    let removed = state.registration_service.reset().await?;
    Ok(Json(ResetResponse { removed }))
}
