//! Payment initialization repository.

use std::sync::Arc;

use crate::entities::{PaymentInitialization, payment_initialization};
use munreg_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Payment initialization repository for database operations.
#[derive(Clone)]
pub struct PaymentInitializationRepository {
    db: Arc<DatabaseConnection>,
}

impl PaymentInitializationRepository {
    /// Create a new payment initialization repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an initialization attempt by gateway reference.
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> AppResult<Option<payment_initialization::Model>> {
        PaymentInitialization::find()
            .filter(payment_initialization::Column::Reference.eq(reference))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all initialization attempts for a registration code, newest
    /// first. Several rows per code are expected (retries).
    pub async fn find_by_code(
        &self,
        code: &str,
    ) -> AppResult<Vec<payment_initialization::Model>> {
        PaymentInitialization::find()
            .filter(payment_initialization::Column::RegistrationCode.eq(code))
            .order_by_desc(payment_initialization::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append a new initialization attempt.
    pub async fn create(
        &self,
        model: payment_initialization::ActiveModel,
    ) -> AppResult<payment_initialization::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark the attempt with this reference as confirmed by the gateway.
    pub async fn mark_success(&self, reference: &str) -> AppResult<()> {
        let Some(attempt) = self.find_by_reference(reference).await? else {
            // Webhook confirmations can reference an attempt initialized
            // against a different deployment; nothing to update.
            return Ok(());
        };

        let mut active: payment_initialization::ActiveModel = attempt.into();
        active.status = Set(payment_initialization::InitializationStatus::Success);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete every initialization attempt. Administrative reset only.
    pub async fn delete_all(&self) -> AppResult<u64> {
        let result = PaymentInitialization::delete_many()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
