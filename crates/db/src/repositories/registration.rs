//! Registration repository.

use std::sync::Arc;

use crate::entities::{Registration, registration};
use munreg_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Registration repository for database operations.
#[derive(Clone)]
pub struct RegistrationRepository {
    db: Arc<DatabaseConnection>,
}

impl RegistrationRepository {
    /// Create a new registration repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a registration by its registration code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<registration::Model>> {
        Registration::find()
            .filter(registration::Column::RegistrationCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a registration by code, returning an error if not found.
    pub async fn get_by_code(&self, code: &str) -> AppResult<registration::Model> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Registration: {code}")))
    }

    /// Find a registration by delegate email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<registration::Model>> {
        Registration::find()
            .filter(registration::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all registrations, newest first. The admin surface always
    /// materializes the whole table; there is no pagination.
    pub async fn find_all(&self) -> AppResult<Vec<registration::Model>> {
        Registration::find()
            .order_by_desc(registration::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new registration.
    pub async fn create(&self, model: registration::ActiveModel) -> AppResult<registration::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a registration.
    pub async fn update(&self, model: registration::ActiveModel) -> AppResult<registration::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every registration. Administrative reset only.
    pub async fn delete_all(&self) -> AppResult<u64> {
        let result = Registration::delete_many()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
