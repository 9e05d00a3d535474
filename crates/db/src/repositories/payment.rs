//! Payment repository.

use std::sync::Arc;

use crate::entities::{Payment, payment};
use munreg_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Payment repository for database operations.
#[derive(Clone)]
pub struct PaymentRepository {
    db: Arc<DatabaseConnection>,
}

impl PaymentRepository {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a payment by the gateway transaction id.
    pub async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> AppResult<Option<payment::Model>> {
        Payment::find()
            .filter(payment::Column::TransactionId.eq(transaction_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all payments for a registration.
    pub async fn find_by_registration_id(
        &self,
        registration_id: &str,
    ) -> AppResult<Vec<payment::Model>> {
        Payment::find()
            .filter(payment::Column::RegistrationId.eq(registration_id))
            .order_by_desc(payment::Column::PaymentDate)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all confirmed payments.
    pub async fn find_all(&self) -> AppResult<Vec<payment::Model>> {
        Payment::find()
            .order_by_desc(payment::Column::PaymentDate)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a confirmed payment.
    pub async fn create(&self, model: payment::ActiveModel) -> AppResult<payment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every payment. Administrative reset only.
    pub async fn delete_all(&self) -> AppResult<u64> {
        let result = Payment::delete_many()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
