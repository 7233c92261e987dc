//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Header (4 bytes)
//! ```text
//! ┌──────────────────────┬──────────┬──────────────────────┐
//! │ Ver|Type|TKL (1)     │ Code (1) │ Message ID (2, BE)   │
//! └──────────────────────┴──────────┴──────────────────────┘
//! ```
//!
//! ### Body
//! - Token: TKL bytes (0..=8)
//! - Options: `(delta << 4) | len` followed by `len` value bytes, ascending
//! - Payload: `0xFF` marker followed by the raw payload, only when non-empty
//!
//! Only the short option form is understood: nibbles 13..=15 (other than
//! the `0xFF` marker byte) are rejected on decode, and deltas or lengths
//! that would need them are rejected on encode.

use bytes::{BufMut, BytesMut};

use crate::error::{ParkError, Result};
use super::{Message, MessageOption, MessageType, Method, MAX_TOKEN_LEN, OPTION_URI_PATH, VERSION};

/// Header size: ver/type/tkl (1) + code (1) + message id (2)
pub const HEADER_SIZE: usize = 4;

/// Byte separating options from the payload
pub const PAYLOAD_MARKER: u8 = 0xFF;

/// Largest delta or length a short-form option nibble can carry
pub const MAX_SHORT_FORM: usize = 12;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a message to bytes
///
/// Fails with [`ParkError::Encode`] if the token is too long, options are not
/// in ascending order, or any option delta/length reaches 13.
pub fn encode_message(message: &Message) -> Result<Vec<u8>> {
    if message.version > 0x03 {
        return Err(ParkError::Encode(format!(
            "version {} does not fit in two bits",
            message.version
        )));
    }
    if message.token.len() > MAX_TOKEN_LEN {
        return Err(ParkError::Encode(format!(
            "token of {} bytes exceeds {} bytes",
            message.token.len(),
            MAX_TOKEN_LEN
        )));
    }

    let options_len: usize = message.options.iter().map(|o| 1 + o.value.len()).sum();
    let payload_len = if message.payload.is_empty() {
        0
    } else {
        1 + message.payload.len()
    };

    let mut buf =
        BytesMut::with_capacity(HEADER_SIZE + message.token.len() + options_len + payload_len);

    // Header
    buf.put_u8(
        (message.version << 6) | ((message.message_type as u8) << 4) | message.token.len() as u8,
    );
    buf.put_u8(message.code);
    buf.put_u16(message.message_id);
    buf.put_slice(&message.token);

    // Options, each as a delta over the previous number
    let mut last_number: u16 = 0;
    for option in &message.options {
        if option.number < last_number {
            return Err(ParkError::Encode(format!(
                "option {} follows option {}: options must be ascending",
                option.number, last_number
            )));
        }

        let delta = (option.number - last_number) as usize;
        if delta > MAX_SHORT_FORM {
            return Err(ParkError::Encode(format!(
                "option {} needs delta {} (max {})",
                option.number, delta, MAX_SHORT_FORM
            )));
        }
        if option.value.len() > MAX_SHORT_FORM {
            return Err(ParkError::Encode(format!(
                "option {} value of {} bytes (max {})",
                option.number,
                option.value.len(),
                MAX_SHORT_FORM
            )));
        }

        buf.put_u8(((delta as u8) << 4) | option.value.len() as u8);
        buf.put_slice(&option.value);
        last_number = option.number;
    }

    // Payload
    if !message.payload.is_empty() {
        buf.put_u8(PAYLOAD_MARKER);
        buf.put_slice(&message.payload);
    }

    Ok(buf.to_vec())
}

/// Encode a request with an empty token
///
/// One Uri-Path option per non-empty segment of `path`.
pub fn encode_request(
    message_id: u16,
    method: Method,
    path: &str,
    payload: &[u8],
    confirmable: bool,
) -> Result<Vec<u8>> {
    let message_type = if confirmable {
        MessageType::Confirmable
    } else {
        MessageType::NonConfirmable
    };
    encode_message(&Message::request(
        message_type,
        method,
        message_id,
        path,
        payload,
    ))
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a message from one datagram
///
/// Any undersized or malformed input yields [`ParkError::Decode`].
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    if bytes.len() < HEADER_SIZE {
        return Err(ParkError::Decode(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    // Parse header
    let version = bytes[0] >> 6;
    if version != VERSION {
        return Err(ParkError::Decode(format!("Unsupported version {}", version)));
    }
    let message_type = MessageType::from_bits(bytes[0] >> 4);
    let token_len = (bytes[0] & 0x0F) as usize;
    if token_len > MAX_TOKEN_LEN {
        return Err(ParkError::Decode(format!(
            "Token length {} exceeds {}",
            token_len, MAX_TOKEN_LEN
        )));
    }
    let code = bytes[1];
    let message_id = u16::from_be_bytes([bytes[2], bytes[3]]);

    let mut pos = HEADER_SIZE;
    if bytes.len() < pos + token_len {
        return Err(ParkError::Decode(format!(
            "Incomplete token: expected {} bytes, got {}",
            token_len,
            bytes.len() - pos
        )));
    }
    let token = bytes[pos..pos + token_len].to_vec();
    pos += token_len;

    // Parse options until the payload marker or the end of the datagram
    let mut options = Vec::new();
    let mut payload = Vec::new();
    let mut number: u16 = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        pos += 1;

        if byte == PAYLOAD_MARKER {
            if pos == bytes.len() {
                return Err(ParkError::Decode(
                    "Payload marker followed by empty payload".to_string(),
                ));
            }
            payload = bytes[pos..].to_vec();
            break;
        }

        let delta = (byte >> 4) as usize;
        let len = (byte & 0x0F) as usize;
        if delta > MAX_SHORT_FORM || len > MAX_SHORT_FORM {
            return Err(ParkError::Decode(format!(
                "Extended option encoding 0x{:02x} not supported",
                byte
            )));
        }

        number = number
            .checked_add(delta as u16)
            .ok_or_else(|| ParkError::Decode("Option number overflow".to_string()))?;
        if bytes.len() < pos + len {
            return Err(ParkError::Decode(format!(
                "Option {} truncated: expected {} bytes, got {}",
                number,
                len,
                bytes.len() - pos
            )));
        }
        let value = bytes[pos..pos + len].to_vec();
        pos += len;

        if number == OPTION_URI_PATH && std::str::from_utf8(&value).is_err() {
            return Err(ParkError::Decode("Path segment is not UTF-8".to_string()));
        }

        options.push(MessageOption { number, value });
    }

    Ok(Message {
        version,
        message_type,
        token,
        code,
        message_id,
        options,
        payload,
    })
}
