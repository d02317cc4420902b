//! Modern adapter: named operations resolved against a service model.
//!
//! The action is converted to snake case and looked up in the service's
//! operation table; there is no probing at call time. Responses are
//! normalized into a mapping carrying `ResponseMetadata`, the way a
//! structured-call SDK returns them.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use super::operations::{self, Operation, Protocol, ServiceModel};
use super::signing::{encode_pairs, uri_encode};
use super::{Request, Response, TransportAdapter};
use crate::config::{Settings, TransportConfig};
use crate::format::{self, parse_document, stringify_timestamps, DecodeError, METADATA_KEY};
use crate::params::{flatten, scalar_to_string, ListStyle};
use crate::registry::ClientDescriptor;
use crate::{Error, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json";
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug)]
pub struct ModernAdapter {
    descriptor: &'static ClientDescriptor,
    model: &'static ServiceModel,
    http: HttpTransport,
}

impl ModernAdapter {
    pub fn new(
        descriptor: &'static ClientDescriptor,
        settings: &Settings,
        config: &TransportConfig,
    ) -> Result<Self> {
        let model = operations::model(descriptor.service)
            .ok_or_else(|| Error::UnknownClient(descriptor.program()))?;
        let endpoint = settings.endpoint(descriptor)?;
        let credentials = settings.credentials()?;
        let http = HttpTransport::new(
            descriptor.service,
            model.signing_name,
            endpoint,
            credentials,
            config,
        )?;
        Ok(Self {
            descriptor,
            model,
            http,
        })
    }

    pub fn resolve(&self, action: &str) -> Result<&'static Operation> {
        self.model
            .operation(action)
            .ok_or_else(|| Error::UnknownAction {
                service: self.descriptor.service.to_string(),
                action: action.to_string(),
            })
    }

    /// Serialize the named arguments for one operation.
    pub fn http_request(&self, op: &Operation, params: &Value) -> Result<HttpRequest> {
        let mut args = match params {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        match self.model.protocol {
            Protocol::Query { version } => {
                let mut fields = vec![
                    ("Action".to_string(), op.name.to_string()),
                    ("Version".to_string(), version.to_string()),
                ];
                fields.extend(
                    flatten(&Value::Object(args), ListStyle::Member)
                        .into_iter()
                        .map(|(k, v)| (k, scalar_to_string(&v))),
                );
                Ok(HttpRequest::new(HttpMethod::Post, "")
                    .with_body(FORM_CONTENT_TYPE, encode_pairs(&fields).into_bytes()))
            }
            Protocol::JsonTarget { prefix } => {
                let body = serde_json::to_vec(&args).map_err(DecodeError::from)?;
                Ok(HttpRequest::new(HttpMethod::Post, "")
                    .with_header("x-amz-target", format!("{}.{}", prefix, op.name))
                    .with_body(AMZ_JSON_CONTENT_TYPE, body))
            }
            Protocol::RestJson => {
                let mut path = op.uri.to_string();
                for member in op.path_members() {
                    let value = args.remove(member).ok_or_else(|| {
                        Error::InvalidArguments(format!(
                            "{} requires the '{}' parameter",
                            op.name, member
                        ))
                    })?;
                    if value.is_object() || value.is_array() {
                        return Err(Error::InvalidArguments(format!(
                            "'{}' is part of the request path and must be a single value",
                            member
                        )));
                    }
                    path = path.replace(
                        &format!("{{{}}}", member),
                        &uri_encode(&scalar_to_string(&value)),
                    );
                }

                let request = HttpRequest::new(op.method, path);
                if op.method.uses_query() {
                    Ok(request.with_query(query_pairs(&args)))
                } else {
                    let body = serde_json::to_vec(&args).map_err(DecodeError::from)?;
                    Ok(request.with_body(JSON_CONTENT_TYPE, body))
                }
            }
        }
    }

    /// Decode a successful response into a mapping with `ResponseMetadata`.
    pub fn normalize(&self, op: &Operation, response: &HttpResponse) -> Result<Map<String, Value>> {
        let (mut map, body_request_id) = match self.model.protocol {
            Protocol::Query { .. } => {
                let text = std::str::from_utf8(&response.body)
                    .map_err(|e| DecodeError::Utf8(e.to_string()))?;
                let doc = parse_document(text)?;
                let result_name = format!("{}Result", op.name);
                let map = match doc.child(&result_name).map(|e| e.to_value()) {
                    None => Map::new(),
                    Some(Value::String(s)) if s.is_empty() => Map::new(),
                    Some(Value::Object(map)) => map,
                    Some(_) => {
                        return Err(DecodeError::Shape(format!(
                            "<{}> is not a structure",
                            result_name
                        ))
                        .into())
                    }
                };
                let request_id = doc.find("RequestId").map(|e| e.text.clone());
                (map, request_id)
            }
            Protocol::RestJson | Protocol::JsonTarget { .. } => {
                if response.body.iter().all(u8::is_ascii_whitespace) {
                    (Map::new(), None)
                } else {
                    match serde_json::from_slice::<Value>(&response.body)
                        .map_err(DecodeError::from)?
                    {
                        Value::Object(map) => (map, None),
                        _ => {
                            return Err(DecodeError::Shape(format!(
                                "{} response is not a JSON object",
                                op.name
                            ))
                            .into())
                        }
                    }
                }
            }
        };

        let request_id = body_request_id
            .or_else(|| response.request_id().map(str::to_string))
            .unwrap_or_default();
        map.insert(
            METADATA_KEY.to_string(),
            json!({
                "RequestId": request_id,
                "HTTPStatusCode": response.status,
                "HTTPHeaders": response.headers,
                "RetryAttempts": 0,
            }),
        );
        Ok(map)
    }
}

/// Query-string arguments for GET/DELETE calls: scalar lists repeat the key,
/// nested structures use dot-notation.
fn query_pairs(args: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in args {
        match value {
            Value::Array(items) if items.iter().all(|i| !i.is_object() && !i.is_array()) => {
                pairs.extend(items.iter().map(|i| (key.clone(), scalar_to_string(i))));
            }
            Value::Array(_) | Value::Object(_) => {
                let single = Value::Object(Map::from_iter([(key.clone(), value.clone())]));
                pairs.extend(
                    flatten(&single, ListStyle::Indexed)
                        .into_iter()
                        .map(|(k, v)| (k, scalar_to_string(&v))),
                );
            }
            scalar => pairs.push((key.clone(), scalar_to_string(scalar))),
        }
    }
    pairs
}

#[async_trait]
impl TransportAdapter for ModernAdapter {
    fn descriptor(&self) -> &'static ClientDescriptor {
        self.descriptor
    }

    async fn send(&self, request: &Request) -> Result<Response> {
        let op = self.resolve(&request.action)?;
        debug!(
            service = self.model.service,
            operation = op.name,
            verify_tls = request.verify_tls,
            "modern call"
        );
        let http_request = self.http_request(op, &request.params)?;
        let response = self.http.execute(http_request).await?;
        Ok(Response::Mapping(self.normalize(op, &response)?))
    }

    fn format(&self, response: &Response) -> Result<String> {
        match response {
            Response::Mapping(map) => {
                let mut value = Value::Object(format::strip_metadata(map.clone()));
                stringify_timestamps(&mut value, self.model.timestamp_members);
                Ok(format::pretty_json(&value)?)
            }
            other => Ok(format::render(other)?),
        }
    }
}
