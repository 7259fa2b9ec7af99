//! Storage-facing record form for the hosted backend.
//!
//! The relational store cannot hold nested structures, so `versions` and
//! `tags` travel as JSON-encoded text columns and are decoded on read. The
//! mapping to and from the logical `Query` is pure and reversible, and it
//! happens only at the remote boundary.

use serde::{Deserialize, Serialize};

use querypad_core::{Query, Result, Visibility};

/// A query in the shape the hosted store persists and the API speaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRow {
    pub id: i64,
    pub name: String,
    pub sql: String,
    pub description: String,
    pub result: String,
    pub result_image: Option<String>,
    pub date: String,
    pub timestamp: String,
    pub last_edited: Option<String>,
    /// JSON-encoded array of version snapshots.
    pub versions: Option<String>,
    pub current_version: u32,
    /// JSON-encoded array of tag strings.
    pub tags: Option<String>,
    pub is_favorite: bool,
    pub user_id: String,
    /// Nullable on the wire; resolves to private when absent.
    pub visibility: Option<Visibility>,
}

impl QueryRow {
    /// Encode a logical query into its stored form.
    pub fn from_query(query: &Query) -> Result<Self> {
        Ok(Self {
            id: query.id,
            name: query.name.clone(),
            sql: query.sql.clone(),
            description: query.description.clone(),
            result: query.result.clone(),
            result_image: query.result_image.clone(),
            date: query.date.clone(),
            timestamp: query.timestamp.clone(),
            last_edited: query.last_edited.clone(),
            versions: Some(serde_json::to_string(&query.versions)?),
            current_version: query.current_version,
            tags: Some(serde_json::to_string(&query.tags)?),
            is_favorite: query.is_favorite,
            user_id: query.user_id.clone(),
            visibility: Some(query.visibility),
        })
    }

    /// Decode a stored row back into the logical query.
    pub fn into_query(self) -> Result<Query> {
        let versions = match self.versions.as_deref() {
            Some(text) if !text.is_empty() => serde_json::from_str(text)?,
            _ => Vec::new(),
        };
        let tags = match self.tags.as_deref() {
            Some(text) if !text.is_empty() => serde_json::from_str(text)?,
            _ => Vec::new(),
        };

        Ok(Query {
            id: self.id,
            name: self.name,
            sql: self.sql,
            description: self.description,
            result: self.result,
            result_image: self.result_image,
            date: self.date,
            timestamp: self.timestamp,
            last_edited: self.last_edited,
            versions,
            current_version: self.current_version,
            tags,
            is_favorite: self.is_favorite,
            user_id: self.user_id,
            visibility: self.visibility.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querypad_core::{now_rfc3339, QueryVersion};

    fn sample_query() -> Query {
        Query {
            id: 7,
            name: "slow orders".to_string(),
            sql: "SELECT * FROM orders WHERE latency_ms > 500".to_string(),
            description: "Orders exceeding the latency budget".to_string(),
            result: "id | latency_ms".to_string(),
            result_image: Some("data:image/png;base64,AAAA".to_string()),
            date: "2025-05-20".to_string(),
            timestamp: now_rfc3339(),
            last_edited: Some(now_rfc3339()),
            versions: vec![QueryVersion {
                version: 1,
                name: "slow orders".to_string(),
                sql: "SELECT 1".to_string(),
                description: "draft".to_string(),
                result: "".to_string(),
                result_image: None,
                edited_at: now_rfc3339(),
                edited_by: Some("u1".to_string()),
                tags: Some(vec!["perf".to_string()]),
                is_favorite: Some(false),
            }],
            current_version: 2,
            tags: vec!["perf".to_string(), "orders".to_string()],
            is_favorite: true,
            user_id: "u1".to_string(),
            visibility: Visibility::Public,
        }
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let query = sample_query();
        let row = QueryRow::from_query(&query).unwrap();

        // Array-valued fields travel as text.
        assert!(row.versions.as_deref().unwrap().starts_with('['));
        assert!(row.tags.as_deref().unwrap().contains("perf"));

        let back = row.into_query().unwrap();
        assert_eq!(back.id, query.id);
        assert_eq!(back.versions.len(), 1);
        assert_eq!(back.versions[0].tags, Some(vec!["perf".to_string()]));
        assert_eq!(back.tags, query.tags);
        assert_eq!(back.current_version, 2);
        assert_eq!(back.visibility, Visibility::Public);
    }

    #[test]
    fn test_null_visibility_resolves_private() {
        let mut row = QueryRow::from_query(&sample_query()).unwrap();
        row.visibility = None;
        let query = row.into_query().unwrap();
        assert_eq!(query.visibility, Visibility::Private);
    }

    #[test]
    fn test_null_arrays_decode_empty() {
        let mut row = QueryRow::from_query(&sample_query()).unwrap();
        row.versions = None;
        row.tags = None;
        let query = row.into_query().unwrap();
        assert!(query.versions.is_empty());
        assert!(query.tags.is_empty());
    }

    #[test]
    fn test_malformed_versions_text_is_an_error() {
        let mut row = QueryRow::from_query(&sample_query()).unwrap();
        row.versions = Some("not json".to_string());
        assert!(row.into_query().is_err());
    }

    #[test]
    fn test_row_serializes_snake_case() {
        let row = QueryRow::from_query(&sample_query()).unwrap();
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("result_image").is_some());
        assert!(json.get("last_edited").is_some());
        assert!(json.get("current_version").is_some());
        assert!(json.get("is_favorite").is_some());
        assert!(json.get("user_id").is_some());
        assert_eq!(json.get("visibility").unwrap(), "public");
    }
}
