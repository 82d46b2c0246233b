//! Read access to the gist host's REST API, plus the single file update used
//! after editing.

use crate::error::GistError;
use crate::options::GistConfig;
use crate::types::{RawFile, RawItem};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

const PER_PAGE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    /// Gists owned by the authenticated user, or by `user` without a token.
    #[default]
    Own,
    Starred,
}

#[derive(Debug, Deserialize)]
struct WireGist {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    public: bool,
    #[serde(default)]
    files: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WireFile {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl WireGist {
    fn into_raw(self) -> Result<RawItem, GistError> {
        let mut files = Vec::with_capacity(self.files.len());
        for (name, value) in self.files {
            let wire: WireFile = serde_json::from_value(value)?;
            files.push(RawFile {
                filename: wire.filename.unwrap_or(name),
                content: wire.content.unwrap_or_default(),
            });
        }
        Ok(RawItem {
            id: self.id,
            short_id: None,
            description: self.description.unwrap_or_default(),
            public: self.public,
            files,
        })
    }
}

pub struct RemoteClient {
    api: Url,
    token: String,
    user: String,
    client: Client,
}

impl RemoteClient {
    pub fn new(api_url: &str, token: impl Into<String>, user: impl Into<String>) -> Result<Self, GistError> {
        let mut normalized = api_url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let api = Url::parse(&normalized).map_err(|e| GistError::InvalidUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .user_agent(concat!("gistsel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            api,
            token: token.into(),
            user: user.into(),
            client,
        })
    }

    pub fn from_config(gist: &GistConfig, user: &str) -> Result<Self, GistError> {
        Self::new(&gist.api_url, gist.token.clone(), user)
    }

    fn url(&self, path: &str) -> Result<Url, GistError> {
        self.api.join(path).map_err(|e| GistError::InvalidUrl {
            url: format!("{}{}", self.api, path),
            reason: e.to_string(),
        })
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if self.token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    fn ensure_ok(&self, resp: Response, label: &str) -> Result<Response, GistError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GistError::Api {
                status: status.as_u16(),
                message: format!("{}: unauthorized (token invalid or expired)", label),
            });
        }
        if status == StatusCode::FORBIDDEN {
            return Err(GistError::Api {
                status: status.as_u16(),
                message: format!("{}: forbidden (rate limited or missing gist scope)", label),
            });
        }
        Ok(resp.error_for_status()?)
    }

    fn list_path(&self, kind: ListKind) -> String {
        match kind {
            ListKind::Starred => "gists/starred".to_string(),
            ListKind::Own if self.token.is_empty() && !self.user.is_empty() => {
                format!("users/{}/gists", self.user)
            }
            ListKind::Own => "gists".to_string(),
        }
    }

    /// Lists gist metadata in remote order, following pages until one is empty.
    /// File contents are left empty.
    pub fn list_summaries(&self, kind: ListKind) -> Result<Vec<RawItem>, GistError> {
        let mut url = self.url(&self.list_path(kind))?;
        let mut items = Vec::new();
        for page in 1.. {
            url.query_pairs_mut()
                .clear()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            #[cfg(feature = "logging")]
            tracing::debug!("GET {}", url);
            let resp = self.authorize(self.client.get(url.clone())).send()?;
            let batch: Vec<WireGist> = self.ensure_ok(resp, "list gists")?.json()?;
            let done = batch.len() < PER_PAGE;
            for gist in batch {
                items.push(gist.into_raw()?);
            }
            if done {
                break;
            }
        }
        Ok(items)
    }

    /// Fetches one gist with file contents.
    pub fn get_item(&self, id: &str) -> Result<RawItem, GistError> {
        let url = self.url(&format!("gists/{}", id))?;
        #[cfg(feature = "logging")]
        tracing::debug!("GET {}", url);
        let resp = self.authorize(self.client.get(url)).send()?;
        let gist: WireGist = self.ensure_ok(resp, "get gist")?.json()?;
        gist.into_raw()
    }

    /// Lists gists with their contents.
    pub fn list_items(&self, kind: ListKind) -> Result<Vec<RawItem>, GistError> {
        self.list_summaries(kind)?
            .into_iter()
            .map(|summary| self.get_item(&summary.id))
            .collect()
    }

    /// Replaces the content of one file of a gist.
    pub fn update_file(&self, id: &str, filename: &str, content: &str) -> Result<(), GistError> {
        let url = self.url(&format!("gists/{}", id))?;
        let mut files = serde_json::Map::new();
        files.insert(
            filename.to_string(),
            serde_json::json!({ "content": content }),
        );
        #[cfg(feature = "logging")]
        tracing::debug!("PATCH {} ({})", url, filename);
        let resp = self
            .authorize(self.client.patch(url))
            .json(&serde_json::json!({ "files": files }))
            .send()?;
        self.ensure_ok(resp, "update gist")?;
        Ok(())
    }
}
