//! Resource Handler
//!
//! Implements Query and Update for the `/parking` resource against the
//! [`SlotStore`]. Every failure becomes a response; nothing propagates to
//! the transport layer.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ParkError, Result};
use crate::protocol::{Message, Method, ResponseCode};
use crate::store::{SlotStore, TransitionOutcome};

/// Path of the parking resource
pub const RESOURCE_PATH: &str = "/parking";

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub code: ResponseCode,
    pub body: Value,
}

impl HandlerResponse {
    fn ok(code: ResponseCode, body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { code, body },
            Err(e) => Self::error(ResponseCode::InternalServerError, e.to_string()),
        }
    }

    fn error(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code,
            body: serde_json::json!({ "status": "error", "message": message.into() }),
        }
    }

    /// Body as response payload bytes
    pub fn to_payload(&self) -> Vec<u8> {
        self.body.to_string().into_bytes()
    }

    /// `status` field of the body, if any
    pub fn status(&self) -> Option<&str> {
        self.body.get("status").and_then(Value::as_str)
    }
}

#[derive(Serialize)]
struct UpdateReply<'a> {
    status: &'static str,
    slot: &'a str,
    occupied: bool,
    car_count: u64,
}

/// Handler for the parking resource
pub struct ResourceHandler {
    store: Arc<SlotStore>,
}

impl ResourceHandler {
    pub fn new(store: Arc<SlotStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SlotStore> {
        &self.store
    }

    /// Route a request by method and path
    pub fn handle(&self, request: &Message) -> HandlerResponse {
        let path = request.path();
        let path = path.trim_end_matches('/');
        let method = request.method();

        match path.strip_prefix(RESOURCE_PATH) {
            Some("") => match method {
                Some(Method::Get) => self.query(),
                Some(Method::Put) => self.update(&request.payload),
                _ => method_not_allowed(request),
            },
            Some(rest) if is_single_segment(rest) => match method {
                Some(Method::Put) => self.update_slot(&rest[1..], &request.payload),
                _ => method_not_allowed(request),
            },
            _ => HandlerResponse::error(
                ResponseCode::NotFound,
                format!("No resource at {}", request.path()),
            ),
        }
    }

    /// Query: snapshot of every slot
    pub fn query(&self) -> HandlerResponse {
        HandlerResponse::ok(ResponseCode::Content, self.store.snapshot())
    }

    /// Update from a `{slot_id, occupied}` document
    pub fn update(&self, payload: &[u8]) -> HandlerResponse {
        let result = self
            .parse_update(payload)
            .and_then(|(slot_id, occupied)| self.store.transition(&slot_id, occupied));
        reply(result)
    }

    /// Update from a node notification: `occupied` or `free` as plain text
    pub fn update_slot(&self, slot_id: &str, payload: &[u8]) -> HandlerResponse {
        let result = parse_state(payload).and_then(|occupied| {
            if !self.store.contains(slot_id) {
                return Err(ParkError::BadRequest(format!("Unknown slot {}", slot_id)));
            }
            self.store.transition(slot_id, occupied)
        });
        reply(result)
    }

    fn parse_update(&self, payload: &[u8]) -> Result<(String, bool)> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|e| ParkError::BadRequest(e.to_string()))?;

        let slot_id = value.get("slot_id").and_then(Value::as_str);
        let occupied = value.get("occupied").and_then(Value::as_bool);

        match (slot_id, occupied) {
            (Some(slot_id), Some(occupied)) if self.store.contains(slot_id) => {
                Ok((slot_id.to_string(), occupied))
            }
            _ => Err(ParkError::BadRequest("Invalid data".to_string())),
        }
    }
}

fn reply(result: Result<TransitionOutcome>) -> HandlerResponse {
    match result {
        Ok(outcome) => HandlerResponse::ok(
            ResponseCode::Changed,
            UpdateReply {
                status: "success",
                slot: &outcome.slot_id,
                occupied: outcome.occupied,
                car_count: outcome.car_count,
            },
        ),
        Err(ParkError::BadRequest(message)) => {
            HandlerResponse::error(ResponseCode::BadRequest, message)
        }
        Err(e) => {
            tracing::warn!("Update failed: {}", e);
            HandlerResponse::error(ResponseCode::BadRequest, e.to_string())
        }
    }
}

fn parse_state(payload: &[u8]) -> Result<bool> {
    let text = String::from_utf8_lossy(payload).trim().to_ascii_lowercase();
    match text.as_str() {
        "occupied" => Ok(true),
        "free" => Ok(false),
        other => Err(ParkError::BadRequest(format!("Invalid state {:?}", other))),
    }
}

/// `/x` with no further `/`
fn is_single_segment(rest: &str) -> bool {
    rest.len() > 1 && rest.starts_with('/') && !rest[1..].contains('/')
}

fn method_not_allowed(request: &Message) -> HandlerResponse {
    HandlerResponse::error(
        ResponseCode::MethodNotAllowed,
        format!("Code 0x{:02x} not allowed on {}", request.code, request.path()),
    )
}
