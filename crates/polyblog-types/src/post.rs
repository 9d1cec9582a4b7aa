//! Persisted post record.
//!
//! Mirrors the `posts` table created by `migrations/0001_create_posts.sql`.
//! Route workers in this repository do not read or write posts; the type
//! pins down the shape future persistence must conform to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A blog post row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Auto-increment primary key, assigned by the database.
    pub id: i64,
    /// Public unique identifier.
    pub uuid: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Post title.
    pub title: String,
    /// Post body text.
    pub content: String,
}

impl PostRecord {
    /// Column names of the `posts` table, in declaration order.
    pub const COLUMNS: [&'static str; 5] = ["id", "uuid", "created_at", "title", "content"];

    /// Name of the backing table.
    pub const TABLE: &'static str = "posts";
}
