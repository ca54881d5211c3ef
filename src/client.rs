use crate::error::{ArchiveError, Result};
use crate::importer::{Post, PostsPage};
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.esa.io/v1/";

const PER_PAGE: u32 = 100;

/// Blocking client without reqwest's default 30s request deadline.
pub(crate) fn blocking_client() -> reqwest::Result<Client> {
    Client::builder().timeout(None).build()
}

/// Anything that can hand the archiver a complete, ordered list of posts.
pub trait PostSource {
    fn fetch_all_posts(&self) -> Result<Vec<Post>>;
}

/// Blocking client for the esa.io v1 API.
pub struct EsaClient {
    http: Client,
    base_url: Url,
    access_token: String,
    team: String,
}

impl EsaClient {
    pub fn new(access_token: impl Into<String>, team: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(DEFAULT_API_BASE).map_err(|e| ArchiveError::UpstreamFetch {
            page: 0,
            source: e.into(),
        })?;
        Self::with_base_url(access_token, team, base_url)
    }

    pub fn with_base_url(
        access_token: impl Into<String>,
        team: impl Into<String>,
        base_url: Url,
    ) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(ArchiveError::CredentialMissing);
        }
        let team = team.into();
        if team.trim().is_empty() {
            return Err(ArchiveError::TeamMissing);
        }
        let http = blocking_client().map_err(|e| ArchiveError::UpstreamFetch {
            page: 0,
            source: e.into(),
        })?;
        Ok(Self {
            http,
            base_url,
            access_token,
            team,
        })
    }

    fn posts_url(&self) -> Result<Url> {
        // A base without a trailing slash would drop its last segment on join.
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(&format!("teams/{}/posts", self.team))
            .map_err(|e| ArchiveError::UpstreamFetch {
                page: 0,
                source: e.into(),
            })
    }

    fn fetch_page(&self, url: &Url, page: u32) -> Result<PostsPage> {
        let upstream = |e: reqwest::Error| ArchiveError::UpstreamFetch {
            page,
            source: e.into(),
        };

        let resp = self
            .http
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .query(&[
                ("page", page.to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("include", "comments".to_string()),
            ])
            .send()
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?;

        let remaining = resp
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        debug!(page, rate_limit_remaining = %remaining, "Fetched posts page");

        resp.json::<PostsPage>().map_err(upstream)
    }
}

impl PostSource for EsaClient {
    fn fetch_all_posts(&self) -> Result<Vec<Post>> {
        let url = self.posts_url()?;
        let mut page = 1;
        let mut all_posts: Vec<Post> = Vec::new();

        loop {
            let result = self.fetch_page(&url, page)?;
            if all_posts.is_empty() {
                all_posts.reserve(result.total_count);
            }
            all_posts.extend(result.posts);

            match result.next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(all_posts)
    }
}
