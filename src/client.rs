use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::schedule::model::{
    AckResponse, CheckResponse, ConfigWindow, ErrorBody, GetResponse, RemoteConfig, ToggleResponse,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("{0}")]
    Service(String),
    #[error("unreadable response: {0}")]
    InvalidResponse(String),
}

pub trait ScheduleApi: Send + Sync {
    fn fetch_config(&self) -> Result<RemoteConfig, ServiceError>;
    fn write_config(&self, window: &ConfigWindow) -> Result<Option<String>, ServiceError>;
    fn toggle_pause(&self) -> Result<ToggleResponse, ServiceError>;
    fn check_results(&self) -> Result<Vec<String>, ServiceError>;
    fn launch_scraper(&self) -> Result<Option<String>, ServiceError>;
}

pub struct HttpScheduleClient {
    base: Url,
    http: Client,
}

impl HttpScheduleClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .with_context(|| format!("invalid service URL '{base_url}'"))?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base, http })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let url = self
            .base
            .join(path)
            .map_err(|err| ServiceError::Transport(format!("invalid request URL: {err}")))?;
        debug!("GET {url}");
        let mut request = self.http.get(url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .map_err(|err| ServiceError::Transport(err.to_string()))?;

        // HTTP status is authoritative; the body's error field only refines
        // the message.
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().unwrap_or_default();
            let message = body
                .error
                .unwrap_or_else(|| format!("service returned HTTP {status}"));
            warn!("GET {url} failed: {message}");
            return Err(ServiceError::Service(message));
        }
        response
            .json::<T>()
            .map_err(|err| ServiceError::InvalidResponse(err.to_string()))
    }
}

impl ScheduleApi for HttpScheduleClient {
    fn fetch_config(&self) -> Result<RemoteConfig, ServiceError> {
        let response: GetResponse = self.get_json("get", &[])?;
        Ok(response.current_config)
    }

    fn write_config(&self, window: &ConfigWindow) -> Result<Option<String>, ServiceError> {
        let response: AckResponse = self.get_json(
            "set",
            &[
                ("date", window.date.as_str()),
                ("start", window.start.as_str()),
                ("end", window.end.as_str()),
            ],
        )?;
        Ok(response.message)
    }

    fn toggle_pause(&self) -> Result<ToggleResponse, ServiceError> {
        self.get_json("toggle-scraper-pause", &[])
    }

    fn check_results(&self) -> Result<Vec<String>, ServiceError> {
        let response: CheckResponse = self.get_json("check", &[])?;
        Ok(response.results)
    }

    fn launch_scraper(&self) -> Result<Option<String>, ServiceError> {
        let response: AckResponse = self.get_json("run-scraper", &[])?;
        Ok(response.message)
    }
}
