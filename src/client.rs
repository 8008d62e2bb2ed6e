//! This module provides a client to connect to the to-do list REST API

use std::convert::TryFrom;
use std::error::Error;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::api::{ErrorBody, ListAdd, ListEnvelope, ListIndexResponse, NewTask, TaskAdd, TaskChange, TaskEnvelope};
use crate::list::{List, ListIndex, Rgb};
use crate::task::{Task, TaskId};
use crate::traits::TodoSource;

/// Failures reported by the API itself (as opposed to network failures)
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server replied with an error status and said why
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },
    /// The server replied with an error status, but its body was not the expected JSON
    #[error("Unknown API error and unable to parse error response (HTTP {status})")]
    UnparseableError { status: u16 },
    /// The server replied with a success status, but not with the expected content
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// The HTTP status of the reply, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::UnparseableError { status } => Some(*status),
            ApiError::InvalidResponse(_) => None,
        }
    }
}


/// A to-do list source that fetches its data from the REST API
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", base_url).into());
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL of an endpoint. Every segment is percent-encoded, so that list names may contain any character (even `/`)
    fn url_for(&self, segments: &[&str]) -> Result<Url, Box<dyn Error>> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be used as a base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and parse its JSON reply.
    ///
    /// Returns `None` for `204 No Content` replies. Failures are logged before being returned.
    async fn request<T: DeserializeOwned>(&self, method: Method, segments: &[&str], body: Option<String>) -> Result<Option<T>, Box<dyn Error>> {
        let url = self.url_for(segments)?;
        match self.sub_request(method.clone(), &url, body).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                log::error!("API request {} {} failed: {}", method, url, err);
                Err(err)
            },
        }
    }

    async fn sub_request<T: DeserializeOwned>(&self, method: Method, url: &Url, body: Option<String>) -> Result<Option<T>, Box<dyn Error>> {
        log::debug!("{} {}", method, url);

        let mut request = self.http
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, crate::config::user_agent());
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() == false {
            let text = response.text().await?;
            let err = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => ApiError::Server {
                    status: status.as_u16(),
                    message: body.error.unwrap_or_else(|| String::from("Unknown API error")),
                },
                Err(_) => ApiError::UnparseableError { status: status.as_u16() },
            };
            return Err(err.into());
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;
        let parsed = serde_json::from_str(&text)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        Ok(Some(parsed))
    }

    /// Like `request`, for endpoints that must reply with a body
    async fn request_content<T: DeserializeOwned>(&self, method: Method, segments: &[&str], body: Option<String>) -> Result<T, Box<dyn Error>> {
        match self.request(method, segments, body).await? {
            Some(content) => Ok(content),
            None => Err(ApiError::InvalidResponse(String::from("empty reply")).into()),
        }
    }
}

#[async_trait]
impl TodoSource for Client {
    async fn get_lists(&self) -> Result<ListIndex, Box<dyn Error>> {
        let response: ListIndexResponse = self.request_content(Method::GET, &["list"], None).await?;
        let index = ListIndex::try_from(response)?;
        log::debug!("Got {} lists and {} filtered lists", index.lists().len(), index.filtered_lists().len());
        Ok(index)
    }

    async fn get_list(&self, name: &str) -> Result<List, Box<dyn Error>> {
        let envelope: ListEnvelope = self.request_content(Method::GET, &["list", name], None).await?;
        envelope.list.into_list(envelope.filtered)
    }

    async fn create_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>> {
        let body = serde_json::to_string(&ListAdd { name: name.to_string(), colour })?;
        let envelope: ListEnvelope = self.request_content(Method::POST, &["list"], Some(body)).await?;
        envelope.list.into_list(false)
    }

    async fn edit_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>> {
        let body = serde_json::to_string(&ListAdd { name: name.to_string(), colour })?;
        let envelope: ListEnvelope = self.request_content(Method::PATCH, &["list", name], Some(body)).await?;
        envelope.list.into_list(false)
    }

    async fn delete_list(&mut self, name: &str) -> Result<(), Box<dyn Error>> {
        self.request::<serde_json::Value>(Method::DELETE, &["list", name], None).await?;
        Ok(())
    }

    async fn create_task(&mut self, list: &str, task: &NewTask) -> Result<Task, Box<dyn Error>> {
        let body = serde_json::to_string(&TaskAdd::from(task))?;
        let envelope: TaskEnvelope = self.request_content(Method::POST, &["list", list], Some(body)).await?;
        Task::try_from(envelope.task)
    }

    async fn update_task(&mut self, id: TaskId, change: &TaskChange) -> Result<Task, Box<dyn Error>> {
        let body = serde_json::to_string(change)?;
        let id = id.to_string();
        let envelope: TaskEnvelope = self.request_content(Method::PATCH, &["items", id.as_str()], Some(body)).await?;
        Task::try_from(envelope.task)
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<(), Box<dyn Error>> {
        let id = id.to_string();
        self.request::<serde_json::Value>(Method::DELETE, &["items", id.as_str()], None).await?;
        Ok(())
    }
}
