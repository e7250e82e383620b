//! JSON-RPC wire types
//!
//! Every remote procedure answers with a JSON-RPC `result` holding the
//! response envelope:
//!
//! ```json
//! {"success": true,  "result": {"data": [18, 52]}}
//! {"success": false, "result": {"error": "VVC with type=UART_VVC channel=TX instance_id=3 does not exist."}}
//! ```
//!
//! Façade failures always travel inside the envelope. JSON-RPC error objects
//! are reserved for requests that never reach the façade (bad JSON, unknown
//! method, missing or mistyped parameters).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::FacadeError;

/// Remote procedure names
pub mod methods {
    pub const GET_VVC_LIST: &str = "GetVvcList";
    pub const TRANSMIT_BYTES: &str = "TransmitBytes";
    pub const TRANSMIT_PACKET: &str = "TransmitPacket";
    pub const RECEIVE_BYTES: &str = "ReceiveBytes";
    pub const RECEIVE_PACKET: &str = "ReceivePacket";
    pub const START_SIM: &str = "StartSim";
}

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
}

/// Response envelope carried in every JSON-RPC result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the operation succeeded
    pub success: bool,
    /// Operation payload, or `{"error": reason}` on failure
    pub result: Value,
}

impl Envelope {
    /// Successful response with a payload
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result,
        }
    }

    /// Failed response naming the reason
    pub fn failure(reason: impl fmt::Display) -> Self {
        Self {
            success: false,
            result: json!({ "error": reason.to_string() }),
        }
    }

    /// Build an envelope from a façade result
    pub fn from_result<T: Serialize>(result: Result<T, FacadeError>) -> Self {
        match result {
            Ok(payload) => match serde_json::to_value(payload) {
                Ok(value) => Self::ok(value),
                Err(e) => Self::failure(e),
            },
            Err(e) => Self::failure(e),
        }
    }

    /// Error reason, if this is a failure envelope
    pub fn error(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.result.get("error").and_then(Value::as_str)
    }
}

/// Payload of a successful `ReceiveBytes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedData {
    pub data: Vec<u8>,
}

/// Empty JSON object payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Empty {}

/// Incoming JSON-RPC request
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    /// Protocol version, expected to be "2.0"
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Procedure name
    pub method: String,
    /// Named (object) or positional (array) parameters
    #[serde(default)]
    pub params: Value,
    /// Request ID; `None` only when the member is absent (notification)
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
}

/// A present `id` member, `null` included, marks a call that expects a reply
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    /// Error with an explicit code
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Request body is not valid JSON
    pub fn parse_error(details: impl fmt::Display) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details))
    }

    /// JSON is not a valid request object
    pub fn invalid_request(details: impl fmt::Display) -> Self {
        Self::new(codes::INVALID_REQUEST, format!("Invalid request: {}", details))
    }

    /// No procedure with this name
    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    /// Parameter missing or of the wrong type
    pub fn invalid_params(details: impl fmt::Display) -> Self {
        Self::new(codes::INVALID_PARAMS, format!("Invalid params: {}", details))
    }
}

/// Build a JSON-RPC success response
pub fn success_response(id: Value, envelope: &Envelope) -> Value {
    json!({
        "jsonrpc": "2.0",
        "result": envelope,
        "id": id,
    })
}

/// Build a JSON-RPC error response
pub fn error_response(id: Value, error: &RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": error,
        "id": id,
    })
}

/// Accessor over named or positional parameters
///
/// Clients may send `{"vvc_type": "UART_VVC", "vvc_id": 0}` or
/// `["UART_VVC", 0]`; both resolve through the same parameter list.
pub struct Params<'a> {
    raw: &'a Value,
}

impl<'a> Params<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// Required parameter by position and name
    pub fn get<T: serde::de::DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> Result<T, RpcError> {
        let value = match self.raw {
            Value::Object(map) => map.get(name),
            Value::Array(list) => list.get(index),
            _ => None,
        }
        .ok_or_else(|| RpcError::invalid_params(format!("missing parameter \"{}\"", name)))?;

        serde_json::from_value(value.clone())
            .map_err(|e| RpcError::invalid_params(format!("parameter \"{}\": {}", name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosim_core::{CoreError, InstanceIdentity};

    #[test]
    fn test_failure_names_identity() {
        let err = FacadeError::Core(CoreError::NotFound(InstanceIdentity::new(
            "UART_VVC", "TX", 3,
        )));
        let envelope = Envelope::from_result::<Empty>(Err(err));

        assert!(!envelope.success);
        assert_eq!(
            envelope.error(),
            Some("VVC with type=UART_VVC channel=TX instance_id=3 does not exist.")
        );
    }

    #[test]
    fn test_ok_payload_shapes() {
        let envelope = Envelope::from_result(Ok(ReceivedData { data: vec![1, 2] }));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true, "result": {"data": [1, 2]}})
        );

        let empty = Envelope::from_result(Ok(Empty {}));
        assert_eq!(empty.result, json!({}));
        assert!(empty.error().is_none());
    }

    #[test]
    fn test_named_and_positional_params() {
        let named = json!({"vvc_type": "UART_VVC", "vvc_id": 2});
        let positional = json!(["UART_VVC", 2]);

        for raw in [&named, &positional] {
            let params = Params::new(raw);
            assert_eq!(params.get::<String>(0, "vvc_type").unwrap(), "UART_VVC");
            assert_eq!(params.get::<i32>(1, "vvc_id").unwrap(), 2);
        }
    }

    #[test]
    fn test_missing_and_mistyped_params() {
        let raw = json!({"vvc_type": 5});
        let params = Params::new(&raw);

        let missing = params.get::<i32>(1, "vvc_id").unwrap_err();
        assert_eq!(missing.code, codes::INVALID_PARAMS);
        assert!(missing.message.contains("vvc_id"));

        let mistyped = params.get::<String>(0, "vvc_type").unwrap_err();
        assert_eq!(mistyped.code, codes::INVALID_PARAMS);
    }

    #[test]
    fn test_byte_out_of_range_rejected() {
        let raw = json!({"data": [1, 256]});
        assert!(Params::new(&raw).get::<Vec<u8>>(0, "data").is_err());
    }
}
