use chrono::{DateTime, Utc};
use precinct_core::{AppError, AppResult, NonEmptyString, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Maximum role name length in characters.
pub const ROLE_NAME_MAX_LENGTH: usize = 50;

/// Level assigned to roles created without an explicit seniority.
pub const DEFAULT_ROLE_LEVEL: i32 = 1;

/// Unique identifier for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Persisted role state used to rehydrate a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleParts {
    /// Role identifier.
    pub id: RoleId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Parent role, if any.
    pub parent_id: Option<RoleId>,
    /// Informational seniority rank.
    pub level: i32,
    /// Built-in role protected from deletion.
    pub is_system: bool,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Last updating user.
    pub updated_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Field changes applied by a role update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFieldUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New seniority level.
    pub level: Option<i32>,
}

impl RoleFieldUpdate {
    /// Returns whether the update carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.level.is_none()
    }
}

/// A node of the organizational role hierarchy.
///
/// The parent is held as an identifier only; ancestry is resolved on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: String,
    parent_id: Option<RoleId>,
    level: i32,
    is_system: bool,
    created_by: Option<UserId>,
    updated_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates a new role with a fresh identifier.
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        level: i32,
        parent_id: Option<RoleId>,
        is_system: bool,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            name: validate_role_name(name)?,
            description: description.into().trim().to_owned(),
            parent_id,
            level,
            is_system,
            created_by: Some(created_by),
            updated_by: Some(created_by),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrates a role from persisted state.
    pub fn from_parts(parts: RoleParts) -> AppResult<Self> {
        Ok(Self {
            id: parts.id,
            name: validate_role_name(parts.name)?,
            description: parts.description,
            parent_id: parts.parent_id,
            level: parts.level,
            is_system: parts.is_system,
            created_by: parts.created_by,
            updated_by: parts.updated_by,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the parent role identifier, if any.
    #[must_use]
    pub fn parent_id(&self) -> Option<RoleId> {
        self.parent_id
    }

    /// Returns the informational seniority level. Higher is more senior.
    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Returns whether this is a built-in role.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns the creating user.
    #[must_use]
    pub fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the last updating user.
    #[must_use]
    pub fn updated_by(&self) -> Option<UserId> {
        self.updated_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies field changes and stamps the updating actor.
    pub fn apply_update(
        &mut self,
        update: RoleFieldUpdate,
        updated_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(name) = update.name {
            self.name = validate_role_name(name)?;
        }
        if let Some(description) = update.description {
            self.description = description.trim().to_owned();
        }
        if let Some(level) = update.level {
            self.level = level;
        }

        self.touch(updated_by, now);
        Ok(())
    }

    /// Moves the role under a new parent. Acyclicity is checked by the caller.
    pub fn reparent(&mut self, parent_id: Option<RoleId>, updated_by: UserId, now: DateTime<Utc>) {
        self.parent_id = parent_id;
        self.touch(updated_by, now);
    }

    /// Returns the full serialized state used for change history.
    pub fn snapshot(&self) -> AppResult<Value> {
        serde_json::to_value(self).map_err(|error| {
            AppError::Internal(format!(
                "failed to serialize snapshot of role '{}': {error}",
                self.id
            ))
        })
    }

    fn touch(&mut self, updated_by: UserId, now: DateTime<Utc>) {
        self.updated_by = Some(updated_by);
        self.updated_at = now;
    }
}

fn validate_role_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    NonEmptyString::bounded(name, "role name", ROLE_NAME_MAX_LENGTH)
}
