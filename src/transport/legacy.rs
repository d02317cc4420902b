//! Legacy adapter: raw action names, no operation model.
//!
//! Query-style services (`ec2`, `cw`) receive a form-encoded POST of
//! `Action`, `Version` and the flattened parameters and answer with XML that
//! is printed as-is after re-indentation. The audit-log service (`ct`) takes
//! the nested parameters as a JSON body addressed through `X-Amz-Target`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::http::{HttpMethod, HttpRequest, HttpTransport};
use super::signing::encode_pairs;
use super::{Request, Response, TransportAdapter};
use crate::config::{Settings, TransportConfig};
use crate::format::DecodeError;
use crate::params::{flatten, scalar_to_string, ListStyle, ParameterCoercer};
use crate::registry::ClientDescriptor;
use crate::{Error, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStyle {
    Query {
        version: &'static str,
    },
    JsonTarget {
        prefix: &'static str,
        content_type: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyProfile {
    pub service: &'static str,
    pub signing_name: &'static str,
    pub style: LegacyStyle,
    /// Top-level fields always sent as integers.
    pub integer_fields: &'static [&'static str],
}

static PROFILES: &[LegacyProfile] = &[
    LegacyProfile {
        service: "ec2",
        signing_name: "ec2",
        style: LegacyStyle::Query {
            version: "2014-10-01",
        },
        integer_fields: &[],
    },
    LegacyProfile {
        service: "cw",
        signing_name: "monitoring",
        style: LegacyStyle::Query {
            version: "2010-08-01",
        },
        integer_fields: &[],
    },
    LegacyProfile {
        service: "ct",
        signing_name: "cloudtrail",
        style: LegacyStyle::JsonTarget {
            prefix: "com.amazonaws.cloudtrail.v20131101.CloudTrail_20131101",
            content_type: "application/x-amz-json-1.1",
        },
        integer_fields: &["MaxResults", "StartTime", "EndTime"],
    },
];

pub fn profile(service: &str) -> Option<&'static LegacyProfile> {
    PROFILES.iter().find(|p| p.service == service)
}

#[derive(Debug)]
pub struct LegacyAdapter {
    descriptor: &'static ClientDescriptor,
    profile: &'static LegacyProfile,
    http: HttpTransport,
}

impl LegacyAdapter {
    pub fn new(
        descriptor: &'static ClientDescriptor,
        settings: &Settings,
        config: &TransportConfig,
    ) -> Result<Self> {
        let profile =
            profile(descriptor.service).ok_or_else(|| Error::UnknownClient(descriptor.program()))?;
        let endpoint = settings.endpoint(descriptor)?;
        let credentials = settings.credentials()?;
        let http = HttpTransport::new(
            descriptor.service,
            profile.signing_name,
            endpoint,
            credentials,
            config,
        )?;
        Ok(Self {
            descriptor,
            profile,
            http,
        })
    }

    pub fn profile(&self) -> &'static LegacyProfile {
        self.profile
    }

    /// Build the wire request for an action.
    pub fn http_request(&self, request: &Request) -> Result<HttpRequest> {
        match self.profile.style {
            LegacyStyle::Query { version } => {
                let mut fields = vec![
                    ("Action".to_string(), request.action.clone()),
                    ("Version".to_string(), version.to_string()),
                ];
                fields.extend(
                    flatten(&request.params, ListStyle::Indexed)
                        .into_iter()
                        .map(|(k, v)| (k, scalar_to_string(&v))),
                );
                Ok(HttpRequest::new(HttpMethod::Post, "")
                    .with_body(FORM_CONTENT_TYPE, encode_pairs(&fields).into_bytes()))
            }
            LegacyStyle::JsonTarget {
                prefix,
                content_type,
            } => {
                let body = serde_json::to_vec(&request.params).map_err(DecodeError::from)?;
                Ok(HttpRequest::new(HttpMethod::Post, "")
                    .with_header("x-amz-target", format!("{}.{}", prefix, request.action))
                    .with_body(content_type, body))
            }
        }
    }
}

#[async_trait]
impl TransportAdapter for LegacyAdapter {
    fn descriptor(&self) -> &'static ClientDescriptor {
        self.descriptor
    }

    fn coercer(&self) -> ParameterCoercer {
        ParameterCoercer::new().with_integer_fields(self.profile.integer_fields)
    }

    async fn send(&self, request: &Request) -> Result<Response> {
        debug!(
            service = self.profile.service,
            action = %request.action,
            verify_tls = request.verify_tls,
            "legacy call"
        );
        let response = self.http.execute(self.http_request(request)?).await?;
        match self.profile.style {
            LegacyStyle::Query { .. } => Ok(Response::Xml(response.body)),
            LegacyStyle::JsonTarget { .. } => {
                if response.body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Response::Json(Value::Object(Default::default())));
                }
                let value: Value =
                    serde_json::from_slice(&response.body).map_err(DecodeError::from)?;
                Ok(Response::Json(value))
            }
        }
    }
}
