use bytes::Bytes;
use chrono::Utc;
use reqwest::Proxy;
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

use super::signing::{self, Scope};
use super::{service_error, TransportError};
use crate::config::{Credentials, TransportConfig, PROXY_VAR, REGION};
use crate::error::ErrorContext;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether leftover arguments travel in the query string rather than a body.
    pub fn uses_query(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

/// Outgoing request, relative to the transport's endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Path appended to the endpoint path; already percent-encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.body = body;
        self.with_header("content-type", content_type)
    }
}

/// Response as received; header names are lower-case.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header("x-amzn-requestid")
            .or_else(|| self.header("x-amz-request-id"))
    }
}

/// Signed HTTP client bound to one service endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
    /// Service identifier used in error reports.
    service: &'static str,
    /// Service name in the signature scope.
    signing_name: &'static str,
}

impl HttpTransport {
    pub fn new(
        service: &'static str,
        signing_name: &'static str,
        endpoint: Url,
        credentials: Credentials,
        config: &TransportConfig,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(concat!("c2client/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url.as_str()).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL '{}' in {}", proxy_url, PROXY_VAR),
                    ErrorContext::new()
                        .with_field_path(PROXY_VAR)
                        .with_details(e.to_string())
                        .with_source("transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        debug!(
            service,
            verify_tls = config.verify_tls,
            num_retries = config.num_retries,
            timeout = ?config.timeout,
            proxy = config.proxy.is_some(),
            "http transport ready"
        );

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
            service,
            signing_name,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url_for(&self, request: &HttpRequest) -> Url {
        let mut url = self.endpoint.clone();
        if !request.path.is_empty() {
            let base = url.path().trim_end_matches('/').to_string();
            let path = request.path.trim_start_matches('/');
            url.set_path(&format!("{}/{}", base, path));
        }
        if request.query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&signing::encode_pairs(&request.query)));
        }
        url
    }

    /// Sign and send a request. Non-2xx statuses become service errors.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.url_for(&request);
        let now = Utc::now();

        let mut headers = request.headers.clone();
        headers.insert("x-amz-date".into(), signing::amz_date(now));
        headers.insert(
            "amz-sdk-invocation-id".into(),
            uuid::Uuid::new_v4().to_string(),
        );
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        let mut signed = headers.clone();
        signed.insert("host".into(), host);
        let authorization = signing::authorization(
            request.method.as_str(),
            &url,
            &signed,
            &request.body,
            &self.credentials,
            Scope {
                region: REGION,
                service: self.signing_name,
            },
            now,
        );

        debug!(
            method = request.method.as_str(),
            url = %url,
            body_bytes = request.body.len(),
            "sending request"
        );

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(url.clone()),
            HttpMethod::Post => self.client.post(url.clone()),
            HttpMethod::Put => self.client.put(url.clone()),
            HttpMethod::Delete => self.client.delete(url.clone()),
        };
        for (name, value) in &headers {
            req = req.header(name.as_str(), value.as_str());
        }
        req = req.header("authorization", authorization);
        if !request.body.is_empty() {
            req = req.body(request.body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let response = HttpResponse {
            status,
            headers,
            body,
        };
        debug!(
            status,
            request_id = response.request_id().unwrap_or("-"),
            body_bytes = response.body.len(),
            "received response"
        );

        if !(200..300).contains(&status) {
            return Err(service_error(self.service, &response).into());
        }
        Ok(response)
    }
}
