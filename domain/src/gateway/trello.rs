//! Trello REST API client for the board and card operations the relay proxies.
//!
//! Every call authenticates with the configured key/token pair as query
//! parameters, is bounded by the configured timeout and is never retried.
//! Failures of any sort are reported as a single upstream error naming the
//! API path and the HTTP status, if one was received.

use crate::error::Error;
use log::*;
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service::config::Config;
use std::collections::HashMap;
use utoipa::ToSchema;

/// A Trello board as returned by the API. Fields the relay doesn't name are
/// kept in `extra` and passed through to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: HashMap<String, Value>,
}

/// A Trello card, which the relay's API calls a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(rename = "idList", default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct CreateBoardRequest<'a> {
    name: &'a str,
    #[serde(rename = "defaultLists", skip_serializing_if = "Option::is_none")]
    default_lists: Option<bool>,
}

#[derive(Debug, Serialize)]
struct CreateCardRequest<'a> {
    #[serde(rename = "idList")]
    list_id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    desc: Option<&'a str>,
}

/// Trello API client
#[derive(Clone)]
pub struct TrelloClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    api_token: String,
}

impl TrelloClient {
    /// Create a new Trello client from the configured credentials, base URL and timeout.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let api_key = config.trello_api_key().ok_or_else(|| {
            warn!("Failed to get Trello API key from config");
            Error::config("TRELLO_API_KEY is not set")
        })?;
        let api_token = config.trello_api_token().ok_or_else(|| {
            warn!("Failed to get Trello API token from config");
            Error::config("TRELLO_API_TOKEN is not set")
        })?;

        let base_url = Url::parse(config.trello_base_url())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                Error::config(format!(
                    "TRELLO_BASE_URL is not a usable URL: {}",
                    config.trello_base_url()
                ))
            })?;

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.upstream_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            api_token,
        })
    }

    /// POST /boards
    pub async fn create_board(&self, name: &str, default_lists: Option<bool>) -> Result<Board, Error> {
        let body = CreateBoardRequest {
            name,
            default_lists,
        };
        let response = self.call(Method::POST, &["boards"], Some(&body)).await?;
        Self::decode("/boards", response).await
    }

    /// POST /cards
    pub async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        desc: Option<&str>,
    ) -> Result<Task, Error> {
        let body = CreateCardRequest {
            list_id,
            name,
            desc,
        };
        let response = self.call(Method::POST, &["cards"], Some(&body)).await?;
        Self::decode("/cards", response).await
    }

    /// PUT /cards/{id}. `fields` is forwarded verbatim, so any card attribute
    /// Trello accepts can be changed.
    pub async fn update_card(
        &self,
        card_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Task, Error> {
        let card_id = Self::card_segment(card_id)?;
        let response = self
            .call(Method::PUT, &["cards", card_id], Some(fields))
            .await?;
        Self::decode(&format!("/cards/{card_id}"), response).await
    }

    /// DELETE /cards/{id}. Trello's response body carries nothing useful and
    /// is discarded.
    pub async fn delete_card(&self, card_id: &str) -> Result<(), Error> {
        let card_id = Self::card_segment(card_id)?;
        self.call::<()>(Method::DELETE, &["cards", card_id], None)
            .await?;
        Ok(())
    }

    /// A card id always addresses exactly one card. Ids that would resolve
    /// to a different path once placed in the URL are refused.
    fn card_segment(card_id: &str) -> Result<&str, Error> {
        match card_id.trim() {
            "" | "." | ".." => {
                warn!("Refusing Trello card id {card_id:?}");
                Err(Error::invalid_input(format!("Invalid task id {card_id:?}")))
            }
            _ => Ok(card_id),
        }
    }

    /// `segments` are percent-encoded one by one, so a `/`, `?` or `#` in
    /// an id stays inside its own path segment.
    async fn call<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response, Error>
    where
        B: Serialize + ?Sized,
    {
        let path = format!("/{}", segments.join("/"));
        let path = path.as_str();
        let mut url = self.base_url.clone();
        if let Ok(mut url_path) = url.path_segments_mut() {
            url_path.pop_if_empty().extend(segments);
        }
        debug!("Trello API request: {method} {path}");

        let mut request = self
            .client
            .request(method, url)
            .query(&[("key", &self.api_key), ("token", &self.api_token)]);
        if let Some(body) = body {
            request = request.json(body);
        }

        // The request URL carries the credentials, so it is stripped from
        // any transport error before it can be logged or stored.
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            warn!("Trello API request to {path} failed: {e}");
            Error::upstream(path, e.status().map(|s| s.as_u16()), Some(Box::new(e)))
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Trello API error ({path}): {status} - {error_text}");
            Err(Error::upstream(path, Some(status.as_u16()), None))
        }
    }

    /// A body that can't be read or decoded is not a usable response, so
    /// the error carries no status even though the call returned 2xx.
    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, Error> {
        let status = response.status();
        response.json::<T>().await.map_err(|e| {
            let e = e.without_url();
            warn!("Failed to decode Trello API response ({status}) from {path}: {e}");
            Error::upstream(path, None, Some(Box::new(e)))
        })
    }
}
