use std::fmt::{Display, Formatter};

use precinct_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum permission code length in characters.
pub const PERMISSION_CODE_MAX_LENGTH: usize = 50;

/// Maximum permission and category name length in characters.
pub const PERMISSION_NAME_MAX_LENGTH: usize = 100;

/// Unique identifier for a permission category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionCategoryId(Uuid);

impl PermissionCategoryId {
    /// Creates a new random category identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a category identifier from an existing UUID value.
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

impl Default for PermissionCategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionCategoryId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a new random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
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

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Stable machine key of a permission, e.g. `case.view`.
///
/// Codes are lowercase ASCII letters, digits and `_`, grouped into non-empty
/// dot-separated segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a validated permission code.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let code = value.trim();

        if code.is_empty() {
            return Err(AppError::Validation(
                "permission code must not be empty".to_owned(),
            ));
        }
        if code.len() > PERMISSION_CODE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission code must be at most {PERMISSION_CODE_MAX_LENGTH} characters"
            )));
        }

        let segments_are_valid = code.split('.').all(|segment| {
            !segment.is_empty()
                && segment.chars().all(|character| {
                    character.is_ascii_lowercase() || character.is_ascii_digit() || character == '_'
                })
        });
        if !segments_are_valid {
            return Err(AppError::Validation(format!(
                "permission code '{code}' must be dot-separated lowercase segments"
            )));
        }

        Ok(Self(code.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PermissionCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Display grouping for permissions. Has no behavioral effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCategory {
    id: PermissionCategoryId,
    name: NonEmptyString,
    description: String,
}

impl PermissionCategory {
    /// Creates a validated category.
    pub fn new(
        id: PermissionCategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::bounded(name, "category name", PERMISSION_NAME_MAX_LENGTH)?,
            description: description.into().trim().to_owned(),
        })
    }

    /// Returns the category identifier.
    #[must_use]
    pub fn id(&self) -> PermissionCategoryId {
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
}

/// A grantable capability identified by a globally unique code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    category_id: PermissionCategoryId,
    code: PermissionCode,
    name: NonEmptyString,
    description: String,
}

impl Permission {
    /// Creates a validated permission definition.
    pub fn new(
        id: PermissionId,
        category_id: PermissionCategoryId,
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            category_id,
            code: PermissionCode::new(code)?,
            name: NonEmptyString::bounded(name, "permission name", PERMISSION_NAME_MAX_LENGTH)?,
            description: description.into().trim().to_owned(),
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the owning category.
    #[must_use]
    pub fn category_id(&self) -> PermissionCategoryId {
        self.category_id
    }

    /// Returns the stable code.
    #[must_use]
    pub fn code(&self) -> &PermissionCode {
        &self.code
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
}
