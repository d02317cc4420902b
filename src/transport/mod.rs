//! Transport adapters: one request/response cycle against one service.
//!
//! Two implementations sit behind the [`TransportAdapter`] trait:
//! [`LegacyAdapter`] sends raw action names to XML/RPC query services and the
//! audit-log JSON service, [`ModernAdapter`] resolves actions against explicit
//! per-service operation tables. [`build_adapter`] selects one from the
//! descriptor's [`TransportKind`].

pub mod http;
pub mod legacy;
pub mod modern;
pub mod operations;
pub mod signing;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::info;

use crate::config::{Settings, TransportConfig};
use crate::format::{self, parse_document};
use crate::params::ParameterCoercer;
use crate::registry::{ClientDescriptor, TransportKind};
use crate::Result;

pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use legacy::LegacyAdapter;
pub use modern::ModernAdapter;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {code}: {message}")]
    Service {
        service: String,
        status: u16,
        code: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Other(String),
}

/// One invocation: the action and its typed parameters.
#[derive(Debug, Clone)]
pub struct Request {
    pub action: String,
    pub params: Value,
    pub verify_tls: bool,
}

/// Decoded response body, by transport style.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Raw XML from a legacy query service.
    Xml(Bytes),
    /// JSON from the legacy audit-log service.
    Json(Value),
    /// Structured result of a modern call, including `ResponseMetadata`.
    Mapping(Map<String, Value>),
}

/// Request/response cycle against one service.
#[async_trait]
pub trait TransportAdapter: Send + Sync + std::fmt::Debug {
    fn descriptor(&self) -> &'static ClientDescriptor;

    /// Coercer for flat-mode parameters, carrying any service field overrides.
    fn coercer(&self) -> ParameterCoercer {
        ParameterCoercer::new()
    }

    async fn send(&self, request: &Request) -> Result<Response>;

    fn format(&self, response: &Response) -> Result<String> {
        Ok(format::render(response)?)
    }
}

/// Build the adapter for a descriptor's transport kind.
pub fn build_adapter(
    descriptor: &'static ClientDescriptor,
    settings: &Settings,
    config: &TransportConfig,
) -> Result<Box<dyn TransportAdapter>> {
    info!(
        program = %descriptor.program(),
        service = descriptor.service,
        kind = ?descriptor.kind,
        verify_tls = config.verify_tls,
        "building transport adapter"
    );
    match descriptor.kind {
        TransportKind::Legacy => Ok(Box::new(LegacyAdapter::new(descriptor, settings, config)?)),
        TransportKind::Modern => Ok(Box::new(ModernAdapter::new(descriptor, settings, config)?)),
    }
}

/// Turn a non-2xx response into a service error carrying the service's own
/// error code and message.
pub fn service_error(service: &str, response: &HttpResponse) -> TransportError {
    let text = String::from_utf8_lossy(&response.body);
    let trimmed = text.trim();

    let mut code = None;
    let mut message = None;
    if trimmed.starts_with('<') {
        if let Ok(doc) = parse_document(trimmed) {
            code = doc.find("Code").map(|e| e.text.clone());
            message = doc.find("Message").map(|e| e.text.clone());
        }
    } else if let Ok(Value::Object(body)) = serde_json::from_str::<Value>(trimmed) {
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| body.get(*n).and_then(Value::as_str))
                .map(str::to_string)
        };
        // `__type` may be namespaced: `com.amazon.coral#ResourceNotFoundException`.
        code = field(&["__type", "code", "Code"])
            .map(|c| c.rsplit('#').next().unwrap_or_default().to_string());
        message = field(&["message", "Message", "errorMessage"]);
    }

    let code = code
        .filter(|c| !c.is_empty())
        .or_else(|| {
            response
                .header("x-amzn-errortype")
                .and_then(|h| h.split(':').next())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown".to_string());
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if trimmed.is_empty() {
                format!("HTTP status {}", response.status)
            } else {
                trimmed.to_string()
            }
        });

    TransportError::Service {
        service: service.to_string(),
        status: response.status,
        code,
        message,
    }
}
