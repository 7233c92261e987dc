//! Protocol Module
//!
//! Defines the wire protocol shared by nodes and the aggregator: a minimal
//! CoAP-style request/response format carried in single UDP datagrams.
//!
//! ## Message Format
//!
//! ```text
//! ┌─────┬──────┬─────┬──────────┬────────────────┬───────────┬─────────────┬──────────┐
//! │Ver 2│Type 2│TKL 4│ Code (1) │ Message ID (2) │ Token 0-8 │ Options ... │0xFF+body │
//! └─────┴──────┴─────┴──────────┴────────────────┴───────────┴─────────────┴──────────┘
//! ```
//!
//! ### Options (short form only)
//! ```text
//! ┌──────────┬──────────┬─────────────┐
//! │ Delta (4)│ Len (4)  │ Value (Len) │
//! └──────────┴──────────┴─────────────┘
//! ```
//! The delta is relative to the previous option's number, so options are
//! written in ascending order. Deltas and lengths of 13 and above require
//! the extended forms, which this protocol does not carry: encoding fails
//! instead of emitting a corrupt frame.
//!
//! ### Codes
//! - Requests: 0.01 GET, 0.02 POST, 0.03 PUT, 0.04 DELETE
//! - Responses: `class << 5 | detail`, e.g. 0x44 = 2.04 Changed, 0x84 = 4.04 Not Found

mod message;
mod response;
mod codec;
mod message_id;

pub use message::{
    Message, MessageOption, MessageType, Method, CONTENT_FORMAT_JSON, CONTENT_FORMAT_TEXT,
    MAX_TOKEN_LEN, OPTION_CONTENT_FORMAT, OPTION_URI_PATH, VERSION,
};
pub use response::{code_class, code_detail, compose_code, ResponseCode};
pub use codec::{
    decode_message, encode_message, encode_request, HEADER_SIZE, MAX_SHORT_FORM, PAYLOAD_MARKER,
};
pub use message_id::MessageIdGenerator;

/// Conventional UDP port for the protocol
pub const DEFAULT_PORT: u16 = 5683;

/// Largest datagram either side expects to receive
pub const MAX_DATAGRAM_SIZE: usize = 1152;
