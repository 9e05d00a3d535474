//! Registration lifecycle service.
//!
//! Owns the delegate registration aggregate: creation, lookups, the manual
//! mobile-money proof flow, the financial summary, and the single
//! transactional transition to `paid` that every confirmation path funnels
//! through.

use chrono::Utc;
use munreg_common::config::RegistrationConfig;
use munreg_common::{AppError, AppResult};
use munreg_db::entities::registration::{PaymentMethod, PaymentStatus};
use munreg_db::entities::{Registration, payment, registration};
use munreg_db::repositories::{
    PaymentInitializationRepository, PaymentRepository, RegistrationRepository,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::assignment;
use super::mailer::Mailer;

/// Client-generated registration code format: `MUNC-<timestamp>-<random>`.
#[allow(clippy::expect_used)] // pattern is a literal and always compiles
static CODE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^MUNC-\d+-\d+$").expect("valid registration code pattern"));

/// Check a client-supplied registration code against the expected format.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    CODE_FORMAT.is_match(code)
}

/// Input for creating a registration.
///
/// Every required field defaults to empty on deserialization so that a
/// missing field surfaces as a 400 validation error rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "registrationCode is required"))]
    pub registration_code: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "firstName is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "surname is required"))]
    pub surname: String,
    #[serde(default)]
    pub other_names: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "dateOfBirth is required"))]
    pub date_of_birth: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "gender is required"))]
    pub gender: String,
    #[serde(default)]
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "institution is required"))]
    pub institution: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "educationLevel is required"))]
    pub education_level: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "nationality is required"))]
    pub nationality: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "emergencyContactName is required"))]
    pub emergency_contact_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "emergencyContactPhone is required"))]
    pub emergency_contact_phone: String,
    #[serde(default)]
    pub special_needs: Option<String>,
    #[serde(default)]
    pub has_mun_experience: bool,
    #[serde(default)]
    pub experience_details: Option<String>,
}

/// Aggregate financial counts over the whole table. All amounts are in
/// minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_registrations: u64,
    pub total_expected: i64,
    pub total_paid: i64,
    pub total_pending: i64,
    pub currency: String,
}

/// A gateway-confirmed transaction to record alongside the paid transition.
#[derive(Debug, Clone)]
pub struct ConfirmedTransaction {
    pub transaction_id: String,
    pub amount: i64,
    pub currency: String,
    pub paid_at: chrono::DateTime<Utc>,
}

/// Result of the transition to `paid`.
#[derive(Debug, Clone)]
pub struct PaidTransition {
    pub registration: registration::Model,
    /// True when the registration was already `paid`: the assignment was
    /// left untouched and no email was sent.
    pub already_paid: bool,
}

/// Registration lifecycle service.
#[derive(Clone)]
pub struct RegistrationService {
    db: Arc<DatabaseConnection>,
    registration_repo: RegistrationRepository,
    payment_repo: PaymentRepository,
    initialization_repo: PaymentInitializationRepository,
    mailer: Mailer,
    config: RegistrationConfig,
}

impl RegistrationService {
    /// Create a new registration service.
    pub fn new(
        db: Arc<DatabaseConnection>,
        registration_repo: RegistrationRepository,
        payment_repo: PaymentRepository,
        initialization_repo: PaymentInitializationRepository,
        mailer: Mailer,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            db,
            registration_repo,
            payment_repo,
            initialization_repo,
            mailer,
            config,
        }
    }

    /// Registration fee in minor currency units.
    #[must_use]
    pub const fn fee_minor_units(&self) -> i64 {
        self.config.fee_minor_units()
    }

    /// ISO currency code registrations are charged in.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Create a registration with status `pending`.
    ///
    /// Fails with a validation error on missing fields or a malformed code,
    /// and with a conflict on a duplicate code or email. A second
    /// submission with the same code is rejected, never merged.
    pub async fn create(
        &self,
        input: CreateRegistrationInput,
    ) -> AppResult<registration::Model> {
        input.validate()?;

        if !is_valid_code(&input.registration_code) {
            return Err(AppError::Validation(format!(
                "Invalid registration code format: {}",
                input.registration_code
            )));
        }

        if self
            .registration_repo
            .find_by_code(&input.registration_code)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Registration code already exists: {}",
                input.registration_code
            )));
        }

        if self
            .registration_repo
            .find_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Email already registered: {}",
                input.email
            )));
        }

        let created = self
            .registration_repo
            .create(Self::build_active_model(&input, PaymentStatus::Pending, None, None, None))
            .await?;

        tracing::info!(
            registration_code = %created.registration_code,
            "Registration created"
        );

        let content = self
            .mailer
            .registration_confirmation(&created.first_name, &created.registration_code);
        self.mailer.dispatch(created.email.clone(), content);

        Ok(created)
    }

    /// Create a registration already in status `paid`.
    ///
    /// Direct flow for clients that completed checkout before submitting
    /// the form: no prior pending row exists, so the row is created paid
    /// with the assignment populated inline. A duplicate code is a
    /// conflict, which is what prevents double submission.
    pub async fn complete_after_payment(
        &self,
        input: CreateRegistrationInput,
        payment_reference: &str,
    ) -> AppResult<registration::Model> {
        input.validate()?;

        if !is_valid_code(&input.registration_code) {
            return Err(AppError::Validation(format!(
                "Invalid registration code format: {}",
                input.registration_code
            )));
        }

        if self
            .registration_repo
            .find_by_code(&input.registration_code)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Registration code already exists: {}",
                input.registration_code
            )));
        }

        if self
            .registration_repo
            .find_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Email already registered: {}",
                input.email
            )));
        }

        let assignment = assignment::assign();
        let created = self
            .registration_repo
            .create(Self::build_active_model(
                &input,
                PaymentStatus::Paid,
                Some(PaymentMethod::Paystack),
                Some(payment_reference.to_string()),
                Some(&assignment),
            ))
            .await?;

        tracing::info!(
            registration_code = %created.registration_code,
            reference = %payment_reference,
            "Registration created directly as paid"
        );

        let content = self.mailer.payment_confirmation(
            &created.first_name,
            &created.registration_code,
            &assignment.committee,
            &assignment.country,
        );
        self.mailer.dispatch(created.email.clone(), content);

        Ok(created)
    }

    /// Get a registration by code.
    pub async fn get_by_code(&self, code: &str) -> AppResult<registration::Model> {
        self.registration_repo.get_by_code(code).await
    }

    /// Check whether an email is already registered.
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.registration_repo.find_by_email(email).await?.is_some())
    }

    /// List every registration together with the financial summary.
    pub async fn list_all(&self) -> AppResult<(Vec<registration::Model>, FinancialSummary)> {
        let registrations = self.registration_repo.find_all().await?;
        let payments = self.payment_repo.find_all().await?;

        let total_paid: i64 = payments.iter().map(|p| p.amount).sum();
        let total_expected = registrations.len() as i64 * self.fee_minor_units();

        let summary = FinancialSummary {
            total_registrations: registrations.len() as u64,
            total_expected,
            total_paid,
            total_pending: total_expected - total_paid,
            currency: self.config.currency.clone(),
        };

        Ok((registrations, summary))
    }

    /// A registration's payment projection plus its confirmed payments.
    pub async fn payment_details(
        &self,
        code: &str,
    ) -> AppResult<(registration::Model, Vec<payment::Model>)> {
        let reg = self.registration_repo.get_by_code(code).await?;
        let payments = self.payment_repo.find_by_registration_id(&reg.id).await?;
        Ok((reg, payments))
    }

    /// Record a manual mobile-money proof: `pending` to
    /// `pending_verification`. Rejected once the registration is `paid`.
    pub async fn submit_momo_proof(
        &self,
        code: &str,
        transaction_id: &str,
    ) -> AppResult<registration::Model> {
        if transaction_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Transaction id must not be empty".to_string(),
            ));
        }

        let reg = self.registration_repo.get_by_code(code).await?;
        if reg.is_paid() {
            return Err(AppError::BadRequest(
                "Registration is already paid".to_string(),
            ));
        }

        let mut active: registration::ActiveModel = reg.into();
        active.payment_status = Set(PaymentStatus::PendingVerification);
        active.payment_method = Set(Some(PaymentMethod::Momo));
        active.payment_reference = Set(Some(transaction_id.to_string()));
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.registration_repo.update(active).await?;

        tracing::info!(
            registration_code = %updated.registration_code,
            transaction_id = %transaction_id,
            "Mobile-money proof submitted, awaiting verification"
        );

        Ok(updated)
    }

    /// Admin confirmation of a mobile-money proof:
    /// `pending_verification` to `paid`.
    pub async fn confirm_momo(&self, code: &str) -> AppResult<PaidTransition> {
        let reg = self.registration_repo.get_by_code(code).await?;
        if reg.payment_status == PaymentStatus::Pending {
            return Err(AppError::BadRequest(
                "No mobile-money proof submitted for this registration".to_string(),
            ));
        }

        let reference = reg.payment_reference.clone();
        self.mark_paid(code, PaymentMethod::Momo, reference, None)
            .await
    }

    /// Transition a registration to `paid` and assign committee/country.
    ///
    /// Every confirmation path (gateway verify, webhook, mobile-money
    /// confirmation) goes through here. The whole step runs in one
    /// transaction with the row locked: of two concurrent confirmations,
    /// exactly one performs the assignment and sends the email; the other
    /// observes `already_paid` and changes nothing. When a gateway
    /// transaction is supplied, the payment row is inserted only if its
    /// `transaction_id` has not been recorded before.
    pub async fn mark_paid(
        &self,
        code: &str,
        method: PaymentMethod,
        reference: Option<String>,
        confirmed: Option<ConfirmedTransaction>,
    ) -> AppResult<PaidTransition> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let reg = Registration::find()
            .filter(registration::Column::RegistrationCode.eq(code))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Registration: {code}")))?;

        if reg.is_paid() {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            tracing::debug!(
                registration_code = %code,
                "Registration already paid, skipping transition"
            );
            return Ok(PaidTransition {
                registration: reg,
                already_paid: true,
            });
        }

        let assignment = assignment::assign();

        let mut active: registration::ActiveModel = reg.into();
        active.payment_status = Set(PaymentStatus::Paid);
        active.payment_method = Set(Some(method));
        active.payment_reference = Set(reference);
        active.assigned_committee = Set(Some(assignment.committee.clone()));
        active.assigned_country = Set(Some(assignment.country.clone()));
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(confirmed) = confirmed {
            let existing = payment::Entity::find()
                .filter(payment::Column::TransactionId.eq(&confirmed.transaction_id))
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if existing.is_none() {
                let record = payment::ActiveModel {
                    id: Set(crate::generate_id()),
                    registration_id: Set(updated.id.clone()),
                    transaction_id: Set(confirmed.transaction_id.clone()),
                    amount: Set(confirmed.amount),
                    status: Set("success".to_string()),
                    payment_method: Set(method_label(method).to_string()),
                    currency: Set(confirmed.currency.clone()),
                    payment_date: Set(confirmed.paid_at.into()),
                    created_at: Set(Utc::now().into()),
                };
                record
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            } else {
                tracing::debug!(
                    transaction_id = %confirmed.transaction_id,
                    "Payment already recorded for transaction"
                );
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            registration_code = %updated.registration_code,
            committee = %assignment.committee,
            country = %assignment.country,
            "Registration paid and assigned"
        );

        let content = self.mailer.payment_confirmation(
            &updated.first_name,
            &updated.registration_code,
            &assignment.committee,
            &assignment.country,
        );
        self.mailer.dispatch(updated.email.clone(), content);

        Ok(PaidTransition {
            registration: updated,
            already_paid: false,
        })
    }

    /// Access the initialization attempt log.
    #[must_use]
    pub const fn initializations(&self) -> &PaymentInitializationRepository {
        &self.initialization_repo
    }

    /// Administrative reset: truncate payments, initialization attempts,
    /// and registrations, in that order. Returns rows removed.
    pub async fn reset(&self) -> AppResult<u64> {
        let payments = self.payment_repo.delete_all().await?;
        let initializations = self.initialization_repo.delete_all().await?;
        let registrations = self.registration_repo.delete_all().await?;

        tracing::warn!(
            payments = payments,
            initializations = initializations,
            registrations = registrations,
            "Administrative reset wiped all registration data"
        );

        Ok(payments + initializations + registrations)
    }

    fn build_active_model(
        input: &CreateRegistrationInput,
        status: PaymentStatus,
        method: Option<PaymentMethod>,
        reference: Option<String>,
        assignment: Option<&assignment::Assignment>,
    ) -> registration::ActiveModel {
        registration::ActiveModel {
            id: Set(crate::generate_id()),
            registration_code: Set(input.registration_code.clone()),
            first_name: Set(input.first_name.clone()),
            surname: Set(input.surname.clone()),
            other_names: Set(input.other_names.clone()),
            date_of_birth: Set(input.date_of_birth.clone()),
            gender: Set(input.gender.clone()),
            email: Set(input.email.clone()),
            phone: Set(input.phone.clone()),
            institution: Set(input.institution.clone()),
            education_level: Set(input.education_level.clone()),
            nationality: Set(input.nationality.clone()),
            city: Set(input.city.clone()),
            emergency_contact_name: Set(input.emergency_contact_name.clone()),
            emergency_contact_phone: Set(input.emergency_contact_phone.clone()),
            special_needs: Set(input.special_needs.clone()),
            has_mun_experience: Set(input.has_mun_experience),
            experience_details: Set(input.experience_details.clone()),
            payment_status: Set(status),
            payment_method: Set(method),
            payment_reference: Set(reference),
            assigned_committee: Set(assignment.map(|a| a.committee.clone())),
            assigned_country: Set(assignment.map(|a| a.country.clone())),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
    }
}

const fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Paystack => "paystack",
        PaymentMethod::Momo => "momo",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use munreg_common::config::RegistrationConfig;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_config() -> RegistrationConfig {
        RegistrationConfig {
            fee: 350,
            currency: "GHS".to_string(),
            conference_name: "Test Conference".to_string(),
        }
    }

    fn test_input(code: &str) -> CreateRegistrationInput {
        CreateRegistrationInput {
            registration_code: code.to_string(),
            first_name: "Ama".to_string(),
            surname: "Mensah".to_string(),
            other_names: None,
            date_of_birth: "2004-03-15".to_string(),
            gender: "female".to_string(),
            email: "ama@example.com".to_string(),
            phone: "+233200000000".to_string(),
            institution: "University of Ghana".to_string(),
            education_level: "undergraduate".to_string(),
            nationality: "Ghanaian".to_string(),
            city: "Accra".to_string(),
            emergency_contact_name: "Kofi Mensah".to_string(),
            emergency_contact_phone: "+233200000001".to_string(),
            special_needs: None,
            has_mun_experience: false,
            experience_details: None,
        }
    }

    fn mock_registration(code: &str, status: PaymentStatus) -> registration::Model {
        registration::Model {
            id: "01hq3ktv9zr6v5x8w2k4m7p9t1".to_string(),
            registration_code: code.to_string(),
            first_name: "Ama".to_string(),
            surname: "Mensah".to_string(),
            other_names: None,
            date_of_birth: "2004-03-15".to_string(),
            gender: "female".to_string(),
            email: "ama@example.com".to_string(),
            phone: "+233200000000".to_string(),
            institution: "University of Ghana".to_string(),
            education_level: "undergraduate".to_string(),
            nationality: "Ghanaian".to_string(),
            city: "Accra".to_string(),
            emergency_contact_name: "Kofi Mensah".to_string(),
            emergency_contact_phone: "+233200000001".to_string(),
            special_needs: None,
            has_mun_experience: false,
            experience_details: None,
            payment_status: status,
            payment_method: None,
            payment_reference: None,
            assigned_committee: None,
            assigned_country: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: std::sync::Arc<DatabaseConnection>) -> RegistrationService {
        RegistrationService::new(
            db.clone(),
            RegistrationRepository::new(db.clone()),
            PaymentRepository::new(db.clone()),
            PaymentInitializationRepository::new(db),
            Mailer::new(None, "Test Conference").unwrap(),
            test_config(),
        )
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code("MUNC-100000-0001"));
        assert!(is_valid_code("MUNC-1719222000000-4821"));
        assert!(!is_valid_code("MUNC-abc-0001"));
        assert!(!is_valid_code("CONF-100000-0001"));
        assert!(!is_valid_code("MUNC-100000"));
        assert!(!is_valid_code(""));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_code() {
        let existing = mock_registration("MUNC-100000-0001", PaymentStatus::Pending);
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create(test_input("MUNC-100000-0001")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let existing = mock_registration("MUNC-100000-0002", PaymentStatus::Pending);
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // code lookup: free
                .append_query_results([Vec::<registration::Model>::new()])
                // email lookup: taken
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create(test_input("MUNC-100000-0001")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_code() {
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let service = service_with(db);
        let result = service.create(test_input("not-a-code")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let mut input = test_input("MUNC-100000-0001");
        input.first_name = String::new();

        let service = service_with(db);
        let result = service.create(input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_inserts_pending_registration() {
        let created = mock_registration("MUNC-100000-0001", PaymentStatus::Pending);
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // code lookup: free
                .append_query_results([Vec::<registration::Model>::new()])
                // email lookup: free
                .append_query_results([Vec::<registration::Model>::new()])
                // insert returning
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create(test_input("MUNC-100000-0001")).await.unwrap();

        assert_eq!(result.payment_status, PaymentStatus::Pending);
        assert!(result.assigned_committee.is_none());
        assert!(result.assigned_country.is_none());
    }

    #[tokio::test]
    async fn test_momo_proof_rejected_when_already_paid() {
        let paid = mock_registration("MUNC-100000-0001", PaymentStatus::Paid);
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[paid]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .submit_momo_proof("MUNC-100000-0001", "MM-12345")
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_mark_paid_skips_when_already_paid() {
        let mut paid = mock_registration("MUNC-100000-0001", PaymentStatus::Paid);
        paid.assigned_committee = Some("General Assembly".to_string());
        paid.assigned_country = Some("Ghana".to_string());

        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[paid.clone()]])
                .into_connection(),
        );

        let service = service_with(db);
        let transition = service
            .mark_paid("MUNC-100000-0001", PaymentMethod::Paystack, None, None)
            .await
            .unwrap();

        assert!(transition.already_paid);
        assert_eq!(
            transition.registration.assigned_country,
            Some("Ghana".to_string())
        );
    }

    #[tokio::test]
    async fn test_mark_paid_assigns_and_records_payment() {
        let pending = mock_registration("MUNC-100000-0001", PaymentStatus::Pending);
        let mut updated = pending.clone();
        updated.payment_status = PaymentStatus::Paid;
        updated.payment_method = Some(PaymentMethod::Paystack);
        updated.payment_reference = Some("MUNC-100000-0001-1719222000000".to_string());
        updated.assigned_committee = Some("General Assembly".to_string());
        updated.assigned_country = Some("Kenya".to_string());

        let payment_row = payment::Model {
            id: "01hq3ktv9zr6v5x8w2k4m7p9t2".to_string(),
            registration_id: pending.id.clone(),
            transaction_id: "1234567890".to_string(),
            amount: 35_000,
            status: "success".to_string(),
            payment_method: "paystack".to_string(),
            currency: "GHS".to_string(),
            payment_date: Utc::now().into(),
            created_at: Utc::now().into(),
        };

        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // locked read inside the transaction
                .append_query_results([[pending]])
                // update returning
                .append_query_results([[updated]])
                // transaction_id guard: unseen
                .append_query_results([Vec::<payment::Model>::new()])
                // payment insert returning
                .append_query_results([[payment_row]])
                .into_connection(),
        );

        let service = service_with(db);
        let transition = service
            .mark_paid(
                "MUNC-100000-0001",
                PaymentMethod::Paystack,
                Some("MUNC-100000-0001-1719222000000".to_string()),
                Some(ConfirmedTransaction {
                    transaction_id: "1234567890".to_string(),
                    amount: 35_000,
                    currency: "GHS".to_string(),
                    paid_at: Utc::now(),
                }),
            )
            .await
            .unwrap();

        assert!(!transition.already_paid);
        assert!(transition.registration.is_paid());
        assert!(transition.registration.assigned_committee.is_some());
        assert!(transition.registration.assigned_country.is_some());
    }

    #[tokio::test]
    async fn test_confirm_momo_requires_submitted_proof() {
        let pending = mock_registration("MUNC-100000-0001", PaymentStatus::Pending);
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.confirm_momo("MUNC-100000-0001").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_list_all_computes_financial_summary() {
        let reg1 = mock_registration("MUNC-100000-0001", PaymentStatus::Paid);
        let mut reg2 = mock_registration("MUNC-100000-0002", PaymentStatus::Pending);
        reg2.id = "01hq3ktv9zr6v5x8w2k4m7p9t3".to_string();
        reg2.email = "kojo@example.com".to_string();

        let payment_row = payment::Model {
            id: "01hq3ktv9zr6v5x8w2k4m7p9t4".to_string(),
            registration_id: reg1.id.clone(),
            transaction_id: "1234567890".to_string(),
            amount: 35_000,
            status: "success".to_string(),
            payment_method: "paystack".to_string(),
            currency: "GHS".to_string(),
            payment_date: Utc::now().into(),
            created_at: Utc::now().into(),
        };

        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![reg1, reg2]])
                .append_query_results([[payment_row]])
                .into_connection(),
        );

        let service = service_with(db);
        let (registrations, summary) = service.list_all().await.unwrap();

        assert_eq!(registrations.len(), 2);
        assert_eq!(summary.total_registrations, 2);
        assert_eq!(summary.total_expected, 70_000);
        assert_eq!(summary.total_paid, 35_000);
        assert_eq!(summary.total_pending, 35_000);
    }

    #[tokio::test]
    async fn test_reset_wipes_all_tables() {
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 3, // payments
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 5, // initialization attempts
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 4, // registrations
                    },
                ])
                .into_connection(),
        );

        let service = service_with(db);
        let removed = service.reset().await.unwrap();

        assert_eq!(removed, 12);
    }
}
