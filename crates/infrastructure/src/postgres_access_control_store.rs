use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use precinct_application::{AccessControlStore, AccessControlTransaction, TransactionMode};
use precinct_core::{AppError, AppResult};

mod assignments;
mod audit;
mod grants;
mod management;
mod permissions;
mod roles;

/// PostgreSQL-backed access-control store.
#[derive(Clone)]
pub struct PostgresAccessControlStore {
    pool: PgPool,
}

impl PostgresAccessControlStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessControlStore for PostgresAccessControlStore {
    async fn begin(&self, mode: TransactionMode) -> AppResult<Box<dyn AccessControlTransaction>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Persistence(format!("failed to begin transaction: {error}"))
        })?;

        if mode == TransactionMode::ReadOnly {
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Persistence(format!(
                        "failed to open read-only snapshot: {error}"
                    ))
                })?;
        }

        Ok(Box::new(PostgresAccessControlTransaction { transaction }))
    }
}

/// Open PostgreSQL transaction implementing every access-control repository.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct PostgresAccessControlTransaction {
    transaction: Transaction<'static, Postgres>,
}

#[async_trait]
impl AccessControlTransaction for PostgresAccessControlTransaction {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Persistence(format!("failed to commit transaction: {error}"))
        })
    }
}

/// Maps a write failure, reporting unique violations as conflicts.
fn map_write_error(
    error: sqlx::Error,
    context: &str,
    conflict: impl FnOnce() -> String,
) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict());
    }

    AppError::Persistence(format!("failed to {context}: {error}"))
}

/// Maps a storage failure that has no business meaning.
fn persistence_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |error| AppError::Persistence(format!("failed to {context}: {error}"))
}

/// Converts a page size or offset into a SQL bind value.
fn sql_bound(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests;
