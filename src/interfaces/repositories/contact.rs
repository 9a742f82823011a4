use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::{
    entities::contact::ContactSubmission,
    errors::RepositoryError,
    repositories::sqlx_repo::SqlxContactRepo,
};

/// Insert-only store for accepted submissions.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn insert_contact(
        &self,
        submission: &ContactSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

impl SqlxContactRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxContactRepo { pool }
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepo {
    async fn insert_contact(
        &self,
        submission: &ContactSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, company, email, phone, country, interest, message, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.company)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.country)
        .bind(&submission.interest)
        .bind(&submission.message)
        .bind(submitted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotInserted);
        }

        Ok(())
    }
}
