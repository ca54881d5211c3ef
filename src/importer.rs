/// Type definitions for the esa.io v1 REST API payloads this tool consumes.
///
/// Endpoint: `GET /v1/teams/{team}/posts?include=comments`
///
/// Only the fields the archiver reads (plus the obvious metadata) are modeled;
/// everything else in the response is ignored by serde.
///
/// Timestamps are RFC 3339 with the team's local offset, e.g.
/// `2014-05-10T11:45:42+09:00`. The offset is kept so rendered headings match
/// what esa shows.
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// One page of `GET /v1/teams/{team}/posts`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub total_count: usize,
    pub page: u32,
    pub per_page: u32,
    pub max_per_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub number: u64,
    /// Title. Never contains `/`.
    pub name: String,
    /// `category/path/name`, optionally decorated with ` #tag` suffixes.
    pub full_name: String,
    #[serde(default)]
    pub wip: bool,
    #[serde(default)]
    pub body_md: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub revision_number: u64,
    pub created_by: Option<User>,
    pub updated_by: Option<User>,
    /// Present only when the request asked for `include=comments`.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

// ---------------------------------------------------------------------------
// Comments & users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub body_md: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub url: String,
    pub created_by: Option<User>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub star: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub name: String,
    pub screen_name: String,
    pub icon: Option<String>,
}
