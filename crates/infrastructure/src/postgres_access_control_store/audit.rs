use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use precinct_application::{
    ActionEvent, ActionLogEntry, ActionLogQuery, AuditTrailRepository, RoleChangeEntry,
    RoleChangeEvent, RoleHistoryQuery,
};
use precinct_core::{AppError, AppResult, UserId};
use precinct_domain::{RoleChangeAction, RoleId};

use super::{PostgresAccessControlTransaction, persistence_error, sql_bound};

#[derive(Debug, FromRow)]
struct RoleChangeRow {
    id: i64,
    role_id: Uuid,
    changed_by: Uuid,
    action: String,
    previous_snapshot: Option<Value>,
    new_snapshot: Option<Value>,
    changed_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ActionRow {
    id: i64,
    actor_id: Option<Uuid>,
    action: String,
    entity_type: String,
    entity_id: Option<String>,
    detail: Value,
    origin: Option<String>,
    client: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl AuditTrailRepository for PostgresAccessControlTransaction {
    async fn append_role_change(&mut self, event: RoleChangeEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_change_history (
                role_id, changed_by, action, previous_snapshot, new_snapshot, changed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.role_id.as_uuid())
        .bind(event.changed_by.as_uuid())
        .bind(event.action.as_str())
        .bind(event.previous)
        .bind(event.new)
        .bind(event.changed_at)
        .execute(&mut *self.transaction)
        .await
        .map_err(persistence_error("append role change history"))?;

        Ok(())
    }

    async fn append_action(&mut self, event: ActionEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                actor_id, action, entity_type, entity_id, detail, origin, client, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.actor_id.map(|user_id| user_id.as_uuid()))
        .bind(event.action)
        .bind(event.entity_type)
        .bind(event.entity_id)
        .bind(event.detail)
        .bind(event.origin)
        .bind(event.client)
        .bind(event.created_at)
        .execute(&mut *self.transaction)
        .await
        .map_err(persistence_error("append audit log entry"))?;

        Ok(())
    }

    async fn list_role_changes(
        &mut self,
        role_id: RoleId,
        query: RoleHistoryQuery,
    ) -> AppResult<Vec<RoleChangeEntry>> {
        let rows = sqlx::query_as::<_, RoleChangeRow>(
            r#"
            SELECT id, role_id, changed_by, action, previous_snapshot, new_snapshot, changed_at
            FROM role_change_history
            WHERE role_id = $1
            ORDER BY id DESC
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(sql_bound(query.limit))
        .bind(sql_bound(query.offset))
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list role change history"))?;

        rows.into_iter()
            .map(|row| {
                let action = RoleChangeAction::from_str(row.action.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "invalid stored role change action in entry '{}': {error}",
                        row.id
                    ))
                })?;

                Ok(RoleChangeEntry {
                    entry_id: row.id,
                    role_id: RoleId::from_uuid(row.role_id),
                    changed_by: UserId::from_uuid(row.changed_by),
                    action,
                    previous: row.previous_snapshot,
                    new: row.new_snapshot,
                    changed_at: row.changed_at,
                })
            })
            .collect()
    }

    async fn list_actions(&mut self, query: ActionLogQuery) -> AppResult<Vec<ActionLogEntry>> {
        let rows = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT id, actor_id, action, entity_type, entity_id, detail, origin, client, created_at
            FROM audit_logs
            WHERE ($1::TEXT IS NULL OR action = $1)
                AND ($2::UUID IS NULL OR actor_id = $2)
            ORDER BY id DESC
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(query.action)
        .bind(query.actor_id.map(|user_id| user_id.as_uuid()))
        .bind(sql_bound(query.limit))
        .bind(sql_bound(query.offset))
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list audit log entries"))?;

        Ok(rows
            .into_iter()
            .map(|row| ActionLogEntry {
                entry_id: row.id,
                actor_id: row.actor_id.map(UserId::from_uuid),
                action: row.action,
                entity_type: row.entity_type,
                entity_id: row.entity_id,
                detail: row.detail,
                origin: row.origin,
                client: row.client,
                created_at: row.created_at,
            })
            .collect())
    }
}
