use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::query::{characters_request, decode_characters};
use crate::error::ApiError;
use crate::state::data::CharactersPage;

/// Longest error body echoed into the log
const MAX_LOGGED_BODY: usize = 256;

/// Client for the character GraphQL endpoint
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The shared HTTP client, reused for avatar downloads
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Fetch one page of characters
    ///
    /// Takes `self` by value so the future can be handed to the runtime.
    pub async fn fetch_page(self, page: u32) -> Result<Option<CharactersPage>, ApiError> {
        debug!(page, endpoint = %self.endpoint, "posting characters query");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&characters_request(page))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // GraphQL servers often report errors with a 4xx and a JSON body,
        // so try decoding before giving up on the status.
        match decode_characters(&body) {
            Ok(result) => Ok(result),
            Err(ApiError::Decode(_)) if !status.is_success() => {
                let snippet: String = body.chars().take(MAX_LOGGED_BODY).collect();
                debug!(status = status.as_u16(), body = %snippet, "non-success response");
                Err(ApiError::Status {
                    status: status.as_u16(),
                })
            }
            Err(err) => Err(err),
        }
    }
}
