use chrono::Utc;
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Publication state of a saved query.
///
/// `Public` queries are listable by anyone; `Private` queries are listable
/// only by their owner. Any record missing a visibility value resolves to
/// `Private` on read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    /// Returns the opposite visibility value.
    pub fn toggled(&self) -> Self {
        match self {
            Visibility::Public => Visibility::Private,
            Visibility::Private => Visibility::Public,
        }
    }

    /// Wire/display form: "public" or "private".
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// Parse a wire value, rejecting anything outside the enumerated set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entity Structs
// =============================================================================

/// A saved SQL query with its description, sample result, and history.
///
/// Every query has exactly one owning `user_id`; only that owner may mutate
/// or delete it through owner-scoped operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub id: i64,
    pub name: String,
    pub sql: String,
    pub description: String,
    pub result: String,
    pub result_image: Option<String>,
    pub date: String,
    pub timestamp: String,
    pub last_edited: Option<String>,
    /// Historical snapshots, oldest first. May be empty.
    #[serde(default)]
    pub versions: Vec<QueryVersion>,
    pub current_version: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub user_id: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Query {
    /// Whether `user_id` is this query's owner.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// A historical snapshot of a query, owned exclusively by its parent.
///
/// `version` increases monotonically within a query and is never addressable
/// on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryVersion {
    pub version: u32,
    pub name: String,
    pub sql: String,
    pub description: String,
    pub result: String,
    pub result_image: Option<String>,
    pub edited_at: String,
    pub edited_by: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

/// The session-time identity of the current caller.
///
/// A subset of `User`; produced by the external authentication provider and
/// never persisted by this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub is_admin: bool,
}

/// Current UTC time as an RFC 3339 string, the timestamp form used on
/// `Query.timestamp` and `QueryVersion.edited_at`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

// =============================================================================
// Tests
// =============================================================================
