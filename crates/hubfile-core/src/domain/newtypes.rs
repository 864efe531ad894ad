//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for the identifiers and
//! opaque values exchanged during an upload. Each newtype ensures data
//! validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Maximum blob name length accepted by the storage backend
pub const MAX_BLOB_NAME_LEN: usize = 1024;

// ============================================================================
// SessionId
// ============================================================================

/// Identifier for a single upload session (diagnostics only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random SessionId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid SessionId: {e}")))
    }
}

// ============================================================================
// BlobName
// ============================================================================

/// Name of the destination blob, as requested from the hub
///
/// Must be non-empty and at most [`MAX_BLOB_NAME_LEN`] characters. Slashes
/// are allowed and act as virtual directories on the storage side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlobName(String);

impl BlobName {
    /// Create a new BlobName with validation
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();

        if name.is_empty() {
            return Err(DomainError::InvalidBlobName(
                "blob name is null or empty".to_string(),
            ));
        }

        if name.chars().count() > MAX_BLOB_NAME_LEN {
            return Err(DomainError::InvalidBlobName(format!(
                "blob name exceeds {MAX_BLOB_NAME_LEN} characters"
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(DomainError::InvalidBlobName(format!(
                "blob name contains control characters: {name:?}"
            )));
        }

        Ok(Self(name))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BlobName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BlobName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for BlobName {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlobName> for String {
    fn from(name: BlobName) -> Self {
        name.0
    }
}

// ============================================================================
// CorrelationId
// ============================================================================

/// Opaque token issued by the hub that ties a notify call to its credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Create a new CorrelationId; must be non-empty
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidCorrelationId(
                "correlation id cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

// ============================================================================
// SasToken
// ============================================================================

/// Short-lived storage write token (query string form, e.g. `?sv=...&sig=...`)
///
/// The `Debug` and `Display` impls redact the signature so the token can be
/// traced safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SasToken(String);

impl SasToken {
    /// Create a new SasToken; must be non-empty
    pub fn new(token: impl Into<String>) -> Result<Self, DomainError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DomainError::InvalidSasToken(
                "SAS token cannot be empty".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// The raw token, suitable for appending to a blob URI
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The token as a query string, always starting with `?`
    pub fn as_query(&self) -> String {
        if self.0.starts_with('?') {
            self.0.clone()
        } else {
            format!("?{}", self.0)
        }
    }
}

impl fmt::Debug for SasToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SasToken(<redacted>)")
    }
}

impl Display for SasToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted>")
    }
}

impl TryFrom<String> for SasToken {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SasToken> for String {
    fn from(token: SasToken) -> Self {
        token.0
    }
}
