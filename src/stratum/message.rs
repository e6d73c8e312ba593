//! Stratum message envelope.
//!
//! Stratum is JSON-RPC shaped but predates JSON-RPC 2.0: notifications carry
//! `id: null` rather than omitting the field, errors are structured objects
//! inside responses, and there is no version field. The envelope here mirrors
//! those conventions and classifies raw lines by field presence alone.
//! Per-method parameter schemas live in the method codecs.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ProtocolError, ProtocolResult};

// Stratum wire error codes.
pub const UNKNOWN: u32 = 20;
pub const STALE_JOB: u32 = 21;
pub const DUPLICATE_SHARE: u32 = 22;
pub const LOW_DIFFICULTY_SHARE: u32 = 23;
pub const UNAUTHORIZED_WORKER: u32 = 24;
pub const NOT_SUBSCRIBED: u32 = 25;

/// A Stratum wire error, carried as data inside a response.
///
/// This is not a codec failure: a response with a non-null error still
/// parses, and the caller inspects the error to learn what the peer
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratumError {
    pub code: u32,
    pub message: String,
    pub traceback: String,
}

impl StratumError {
    /// Create a wire error whose message is the canonical label for `code`
    /// followed by the cause text. Codes outside the defined set collapse to
    /// `Other/Unknown`; only the numeric `code` field preserves them.
    pub fn new(code: u32, cause: impl fmt::Display) -> Self {
        let label = match code {
            STALE_JOB => "Stale Job",
            DUPLICATE_SHARE => "Duplicate share",
            LOW_DIFFICULTY_SHARE => "Low difficulty share",
            UNAUTHORIZED_WORKER => "Unauthorized worker",
            NOT_SUBSCRIBED => "Not subscribed",
            _ => "Other/Unknown",
        };

        Self {
            code,
            message: format!("{label}: {cause}"),
            traceback: String::new(),
        }
    }
}

/// A request or notification.
///
/// The two forms share one wire shape; a notification is a request whose id
/// is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: Option<u64>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// A response to an earlier request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default)]
    pub error: Option<StratumError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl Request {
    pub fn new(id: Option<u64>, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    /// Encode to canonical JSON bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::parse_with("failed to encode request", e))
    }
}

impl Response {
    pub fn new(id: u64, result: Option<Value>, error: Option<StratumError>) -> Self {
        Self { id, error, result }
    }

    /// Encode to canonical JSON bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| ProtocolError::parse_with("failed to encode response", e))
    }
}

/// A message recovered from raw bytes by [`identify`].
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Response(Response),
}

impl Message {
    /// Encode to canonical JSON bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        match self {
            Message::Request(req) => req.encode(),
            Message::Response(resp) => resp.encode(),
        }
    }
}

/// The three logical message forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
    Notification,
}

/// Determine the kind of a received message and decode it.
///
/// A non-empty `method` selects a request, or a notification when the id is
/// null. Anything else must decode as a response; responses with `id == 0`
/// are rejected since ids are allocated starting at 1.
pub fn identify(data: &[u8]) -> ProtocolResult<(Message, MessageKind)> {
    let req: Request =
        serde_json::from_slice(data).map_err(|e| ProtocolError::parse_with("malformed message", e))?;

    if !req.method.is_empty() {
        let kind = if req.id.is_none() {
            MessageKind::Notification
        } else {
            MessageKind::Request
        };
        return Ok((Message::Request(req), kind));
    }

    let resp: Response =
        serde_json::from_slice(data).map_err(|e| ProtocolError::parse_with("malformed message", e))?;

    if resp.id == 0 {
        return Err(ProtocolError::parse("unable to parse message"));
    }

    Ok((Message::Response(resp), MessageKind::Response))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::error::ErrorKind;
    use super::*;

    #[test]
    fn test_identify_request() {
        let data = br#"{"id":1,"method":"mining.authorize","params":["addr.worker",""]}"#;
        let (msg, kind) = identify(data).unwrap();

        assert_eq!(kind, MessageKind::Request);
        match msg {
            Message::Request(req) => {
                assert_eq!(req.id, Some(1));
                assert_eq!(req.method, "mining.authorize");
                assert_eq!(req.params, json!(["addr.worker", ""]));
            }
            _ => panic!("expected a request, got {msg:?}"),
        }
    }

    #[test]
    fn test_identify_notification() {
        let data = br#"{"id":null,"method":"mining.set_difficulty","params":[1024]}"#;
        let (msg, kind) = identify(data).unwrap();

        assert_eq!(kind, MessageKind::Notification);
        match msg {
            Message::Request(req) => {
                assert_eq!(req.id, None);
                assert_eq!(req.method, "mining.set_difficulty");
            }
            _ => panic!("expected a notification, got {msg:?}"),
        }
    }

    #[test]
    fn test_identify_notification_without_id_field() {
        // An absent id is equivalent to an explicit null.
        let data = br#"{"method":"mining.notify","params":[]}"#;
        let (_, kind) = identify(data).unwrap();
        assert_eq!(kind, MessageKind::Notification);
    }

    #[test]
    fn test_identify_response() {
        let data = br#"{"id":3,"result":true,"error":null}"#;
        let (msg, kind) = identify(data).unwrap();

        assert_eq!(kind, MessageKind::Response);
        match msg {
            Message::Response(resp) => {
                assert_eq!(resp.id, 3);
                assert_eq!(resp.result, Some(json!(true)));
                assert_eq!(resp.error, None);
            }
            _ => panic!("expected a response, got {msg:?}"),
        }
    }

    #[test]
    fn test_identify_rejects_zero_response_id() {
        let data = br#"{"id":0,"result":true,"error":null}"#;
        let err = identify(data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_identify_is_exclusive() {
        // A message carrying both request and response fields identifies by
        // the presence of a non-empty method, never as two kinds at once.
        let data = br#"{"id":4,"method":"mining.submit","params":[],"result":true,"error":null}"#;
        let (_, kind) = identify(data).unwrap();
        assert_eq!(kind, MessageKind::Request);
    }

    #[test]
    fn test_identify_rejects_malformed_input() {
        for data in [
            &b"not json"[..],
            br#"{"id":null,"result":null,"error":null}"#,
            br#"{"id":"seven","method":"mining.subscribe"}"#,
            br#"[1,2,3]"#,
        ] {
            let err = identify(data).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Parse, "input: {data:?}");
        }
    }

    #[test]
    fn test_identify_encode_roundtrip() {
        let req = Request::new(Some(5), "mining.submit", json!(["w", "j", "aa", "bb", "cc"]));
        let encoded = req.encode().unwrap();
        let (msg, kind) = identify(&encoded).unwrap();

        assert_eq!(kind, MessageKind::Request);
        assert_eq!(msg, Message::Request(req));
    }

    #[test]
    fn test_notification_serializes_null_id() {
        let req = Request::new(None, "mining.notify", json!([]));
        let encoded = String::from_utf8(req.encode().unwrap()).unwrap();
        assert!(encoded.contains("\"id\":null"), "encoded: {encoded}");
    }

    #[test]
    fn test_response_omits_missing_result() {
        let resp = Response::new(2, None, Some(StratumError::new(STALE_JOB, "job j1 expired")));
        let encoded = String::from_utf8(resp.encode().unwrap()).unwrap();
        assert!(!encoded.contains("result"), "encoded: {encoded}");
        assert!(encoded.contains("\"traceback\":\"\""), "encoded: {encoded}");
    }

    #[test]
    fn test_stratum_error_labels() {
        let cases = [
            (STALE_JOB, "Stale Job: cause"),
            (DUPLICATE_SHARE, "Duplicate share: cause"),
            (LOW_DIFFICULTY_SHARE, "Low difficulty share: cause"),
            (UNAUTHORIZED_WORKER, "Unauthorized worker: cause"),
            (NOT_SUBSCRIBED, "Not subscribed: cause"),
            (UNKNOWN, "Other/Unknown: cause"),
            (99, "Other/Unknown: cause"),
        ];

        for (code, want) in cases {
            let err = StratumError::new(code, "cause");
            assert_eq!(err.message, want);
            assert_eq!(err.code, code);
            assert!(err.traceback.is_empty());
        }
    }
}
