//! Codec Tests
//!
//! Tests for message encoding/decoding, response codes and message ids.

use parkwatch::protocol::{
    code_class, code_detail, compose_code, decode_message, encode_message, encode_request,
    Message, MessageIdGenerator, MessageOption, MessageType, Method, ResponseCode,
    CONTENT_FORMAT_JSON, OPTION_URI_PATH, PAYLOAD_MARKER,
};
use parkwatch::ParkError;

// =============================================================================
// Request Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_get_parking() {
    let encoded = encode_request(7, Method::Get, "/parking", b"", true).unwrap();
    let decoded = decode_message(&encoded).unwrap();

    assert_eq!(decoded.message_id, 7);
    assert_eq!(decoded.method(), Some(Method::Get));
    assert_eq!(decoded.path(), "/parking");
    assert!(decoded.payload.is_empty());
    assert_eq!(decoded.message_type, MessageType::Confirmable);
    assert!(decoded.token.is_empty());
}

#[test]
fn test_header_layout() {
    let encoded = encode_request(0x1234, Method::Put, "", b"", false).unwrap();

    // ver=1, type=NON(1), tkl=0
    assert_eq!(encoded[0], 0b0101_0000);
    assert_eq!(encoded[1], Method::Put.code());
    assert_eq!(&encoded[2..4], &[0x12, 0x34]);
    assert_eq!(encoded.len(), 4);
}

#[test]
fn test_single_path_option_byte() {
    let encoded = encode_request(1, Method::Get, "/parking", b"", true).unwrap();

    assert_eq!(encoded[4], (11 << 4) | 7);
    assert_eq!(&encoded[5..12], b"parking");
}

#[test]
fn test_second_path_segment_has_zero_delta() {
    let encoded = encode_request(1, Method::Put, "/parking/slot1", b"", false).unwrap();

    assert_eq!(encoded[4], (11 << 4) | 7);
    assert_eq!(encoded[12], 5);
    assert_eq!(&encoded[13..18], b"slot1");

    let decoded = decode_message(&encoded).unwrap();
    assert_eq!(decoded.path(), "/parking/slot1");
}

#[test]
fn test_payload_follows_marker() {
    let encoded = encode_request(3, Method::Put, "/led1", b"on", false).unwrap();

    let marker = encoded.len() - 3;
    assert_eq!(encoded[marker], PAYLOAD_MARKER);
    assert_eq!(&encoded[marker + 1..], b"on");

    let decoded = decode_message(&encoded).unwrap();
    assert_eq!(decoded.payload, b"on");
    assert_eq!(decoded.path(), "/led1");
}

#[test]
fn test_empty_path_decodes_as_root() {
    let encoded = encode_request(9, Method::Get, "/", b"", true).unwrap();
    let decoded = decode_message(&encoded).unwrap();

    assert!(decoded.options.is_empty());
    assert_eq!(decoded.path(), "/");
}

#[test]
fn test_empty_segments_are_skipped() {
    let encoded = encode_request(9, Method::Get, "//parking//", b"", true).unwrap();
    let decoded = decode_message(&encoded).unwrap();

    assert_eq!(decoded.options.len(), 1);
    assert_eq!(decoded.path(), "/parking");
}

// =============================================================================
// Encode Failure Tests
// =============================================================================

#[test]
fn test_segment_of_thirteen_bytes_fails() {
    let result = encode_request(1, Method::Get, "/abcdefghijklm", b"", true);
    assert!(matches!(result, Err(ParkError::Encode(_))));
}

#[test]
fn test_segment_of_twelve_bytes_succeeds() {
    let encoded = encode_request(1, Method::Get, "/abcdefghijkl", b"", true).unwrap();
    assert_eq!(encoded[4], (11 << 4) | 12);
}

#[test]
fn test_option_delta_of_thirteen_fails() {
    let mut message = Message::request(MessageType::Confirmable, Method::Get, 1, "", b"");
    message.options.push(MessageOption {
        number: 13,
        value: vec![1],
    });

    assert!(matches!(encode_message(&message), Err(ParkError::Encode(_))));
}

#[test]
fn test_descending_options_fail() {
    let mut message = Message::request(MessageType::Confirmable, Method::Get, 1, "/a", b"");
    message.options.push(MessageOption {
        number: 4,
        value: vec![1],
    });

    assert!(matches!(encode_message(&message), Err(ParkError::Encode(_))));
}

#[test]
fn test_oversized_token_fails() {
    let mut message = Message::request(MessageType::Confirmable, Method::Get, 1, "/a", b"");
    message.token = vec![0; 9];

    assert!(matches!(encode_message(&message), Err(ParkError::Encode(_))));
}

// =============================================================================
// Decode Failure Tests
// =============================================================================

#[test]
fn test_decode_undersized() {
    assert!(matches!(decode_message(&[]), Err(ParkError::Decode(_))));
    assert!(matches!(decode_message(&[0x40, 0x01, 0x00]), Err(ParkError::Decode(_))));
}

#[test]
fn test_decode_wrong_version() {
    // version 2
    assert!(matches!(
        decode_message(&[0x80, 0x01, 0x00, 0x01]),
        Err(ParkError::Decode(_))
    ));
}

#[test]
fn test_decode_truncated_token() {
    // tkl=4 but only two token bytes present
    assert!(matches!(
        decode_message(&[0x44, 0x01, 0x00, 0x01, 0xAA, 0xBB]),
        Err(ParkError::Decode(_))
    ));
}

#[test]
fn test_decode_truncated_option() {
    // Uri-Path of length 7 with only 3 bytes present
    assert!(matches!(
        decode_message(&[0x40, 0x01, 0x00, 0x01, 0xB7, b'p', b'a', b'r']),
        Err(ParkError::Decode(_))
    ));
}

#[test]
fn test_decode_extended_option_rejected() {
    // delta nibble 13 announces an extended delta
    assert!(matches!(
        decode_message(&[0x40, 0x01, 0x00, 0x01, 0xD1, 0x00, 0x41]),
        Err(ParkError::Decode(_))
    ));
}

#[test]
fn test_decode_marker_without_payload() {
    assert!(matches!(
        decode_message(&[0x40, 0x01, 0x00, 0x01, 0xFF]),
        Err(ParkError::Decode(_))
    ));
}

#[test]
fn test_decode_non_utf8_path() {
    assert!(matches!(
        decode_message(&[0x40, 0x01, 0x00, 0x01, 0xB2, 0xC3, 0x28]),
        Err(ParkError::Decode(_))
    ));
}

#[test]
fn test_decode_keeps_token() {
    let bytes = [0x42, 0x45, 0x00, 0x05, 0xAB, 0xCD];
    let decoded = decode_message(&bytes).unwrap();

    assert_eq!(decoded.token, vec![0xAB, 0xCD]);
    assert_eq!(decoded.response_code(), Some(ResponseCode::Content));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_ack_echoes_message_id() {
    let request = Message::request(MessageType::Confirmable, Method::Put, 4242, "/led1", b"on");
    let ack = Message::ack(&request, ResponseCode::Changed);
    let decoded = decode_message(&encode_message(&ack).unwrap()).unwrap();

    assert_eq!(decoded.message_type, MessageType::Acknowledgement);
    assert_eq!(decoded.message_id, 4242);
    assert_eq!(decoded.code, 0x44);
    assert!(decoded.options.is_empty());
    assert!(decoded.payload.is_empty());
}

#[test]
fn test_content_format_option() {
    let response = Message::response(MessageType::NonConfirmable, ResponseCode::Content, 2, &[])
        .with_content(CONTENT_FORMAT_JSON, b"{}".to_vec());
    let encoded = encode_message(&response).unwrap();

    // delta 12, length 1, value 50
    assert_eq!(encoded[4], (12 << 4) | 1);
    assert_eq!(encoded[5], 50);

    let decoded = decode_message(&encoded).unwrap();
    assert_eq!(decoded.content_format(), Some(50));
    assert_eq!(decoded.payload, b"{}");
}

#[test]
fn test_content_format_after_path_options() {
    let request = Message::request(MessageType::Confirmable, Method::Put, 1, "/parking", b"")
        .with_content(CONTENT_FORMAT_JSON, b"{}".to_vec());

    assert_eq!(request.options[0].number, OPTION_URI_PATH);
    let decoded = decode_message(&encode_message(&request).unwrap()).unwrap();
    assert_eq!(decoded.path(), "/parking");
    assert_eq!(decoded.content_format(), Some(50));
}

#[test]
fn test_code_class_and_detail() {
    assert_eq!(code_class(0x44), 2);
    assert_eq!(code_detail(0x44), 4);
    assert_eq!(code_class(0x84), 4);
    assert_eq!(code_detail(0x84), 4);
    assert_eq!(compose_code(2, 4), 0x44);
    assert_eq!(compose_code(4, 4), 0x84);
}

#[test]
fn test_response_code_display() {
    assert_eq!(ResponseCode::Changed.to_string(), "2.04 Changed");
    assert_eq!(ResponseCode::NotFound.to_string(), "4.04 Not Found");
    assert_eq!(ResponseCode::from_code(0x80), Some(ResponseCode::BadRequest));
    assert_eq!(ResponseCode::from_code(0x99), None);
}

// =============================================================================
// Message ID Tests
// =============================================================================

#[test]
fn test_message_ids_count_up_from_one() {
    let mut ids = MessageIdGenerator::new();
    let first: Vec<u16> = (0..5).map(|_| ids.next_id()).collect();
    assert_eq!(first, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_message_ids_never_zero_across_wrap() {
    let mut ids = MessageIdGenerator::new();
    for _ in 0..65535 {
        assert_ne!(ids.next_id(), 0);
    }
    assert_eq!(ids.last(), 65535);
    assert_eq!(ids.next_id(), 1);
}
