//! Message definitions
//!
//! The in-memory model of one protocol message, shared by requests and
//! responses.

use super::ResponseCode;

/// Protocol version carried in every header
pub const VERSION: u8 = 1;

/// Longest token the header's 4-bit length field may announce
pub const MAX_TOKEN_LEN: usize = 8;

/// Option number of a Uri-Path segment
pub const OPTION_URI_PATH: u16 = 11;

/// Option number of the Content-Format option
pub const OPTION_CONTENT_FORMAT: u16 = 12;

/// Content-Format value for `text/plain; charset=utf-8`
pub const CONTENT_FORMAT_TEXT: u8 = 0;

/// Content-Format value for `application/json`
pub const CONTENT_FORMAT_JSON: u8 = 50;

/// Message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Confirmable = 0,
    NonConfirmable = 1,
    Acknowledgement = 2,
    Reset = 3,
}

impl MessageType {
    /// Map the two type bits of the header to a message type
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => MessageType::Confirmable,
            1 => MessageType::NonConfirmable,
            2 => MessageType::Acknowledgement,
            _ => MessageType::Reset,
        }
    }
}

/// Request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Method {
    Get = 0x01,
    Post = 0x02,
    Put = 0x03,
    Delete = 0x04,
}

impl Method {
    /// Interpret a raw code as a request method
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Method::Get),
            0x02 => Some(Method::Post),
            0x03 => Some(Method::Put),
            0x04 => Some(Method::Delete),
            _ => None,
        }
    }

    /// Raw code value
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A single `(number, value)` option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOption {
    pub number: u16,
    pub value: Vec<u8>,
}

/// A decoded or constructed protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Protocol version (always [`VERSION`] for messages we build)
    pub version: u8,

    /// Confirmable, non-confirmable, acknowledgement or reset
    pub message_type: MessageType,

    /// Correlation token (empty in this system)
    pub token: Vec<u8>,

    /// Method on requests, response code on responses, 0 on empty messages
    pub code: u8,

    /// Exchange identifier
    pub message_id: u16,

    /// Options in ascending option-number order
    pub options: Vec<MessageOption>,

    /// Body (may be empty)
    pub payload: Vec<u8>,
}

impl Message {
    /// Build a request for `path`, one Uri-Path option per non-empty segment
    pub fn request(
        message_type: MessageType,
        method: Method,
        message_id: u16,
        path: &str,
        payload: &[u8],
    ) -> Self {
        let options = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| MessageOption {
                number: OPTION_URI_PATH,
                value: segment.as_bytes().to_vec(),
            })
            .collect();

        Self {
            version: VERSION,
            message_type,
            token: Vec::new(),
            code: method.code(),
            message_id,
            options,
            payload: payload.to_vec(),
        }
    }

    /// Build a response with no options and no payload
    pub fn response(
        message_type: MessageType,
        code: ResponseCode,
        message_id: u16,
        token: &[u8],
    ) -> Self {
        Self {
            version: VERSION,
            message_type,
            token: token.to_vec(),
            code: code.code(),
            message_id,
            options: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Piggybacked acknowledgement for `request`: echoes its id and token
    pub fn ack(request: &Message, code: ResponseCode) -> Self {
        Self::response(
            MessageType::Acknowledgement,
            code,
            request.message_id,
            &request.token,
        )
    }

    /// Reset for `message`, used to answer an empty confirmable ping
    pub fn reset(message: &Message) -> Self {
        Self {
            version: VERSION,
            message_type: MessageType::Reset,
            token: Vec::new(),
            code: 0,
            message_id: message.message_id,
            options: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Attach a Content-Format option and a body
    pub fn with_content(mut self, content_format: u8, payload: Vec<u8>) -> Self {
        self.options.retain(|o| o.number != OPTION_CONTENT_FORMAT);
        let at = self
            .options
            .iter()
            .position(|o| o.number > OPTION_CONTENT_FORMAT)
            .unwrap_or(self.options.len());
        self.options.insert(
            at,
            MessageOption {
                number: OPTION_CONTENT_FORMAT,
                value: vec![content_format],
            },
        );
        self.payload = payload;
        self
    }

    /// Uri-Path segments joined with `/`; `/` when there are none
    pub fn path(&self) -> String {
        let mut path = String::new();
        for option in self.options.iter().filter(|o| o.number == OPTION_URI_PATH) {
            path.push('/');
            path.push_str(&String::from_utf8_lossy(&option.value));
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    /// Request method, if the code is one
    pub fn method(&self) -> Option<Method> {
        Method::from_code(self.code)
    }

    /// Response code, if the code is a known one
    pub fn response_code(&self) -> Option<ResponseCode> {
        ResponseCode::from_code(self.code)
    }

    /// Code 0.00: a ping or bare acknowledgement
    pub fn is_empty_message(&self) -> bool {
        self.code == 0
    }

    /// Value of the Content-Format option, if present
    pub fn content_format(&self) -> Option<u16> {
        self.options
            .iter()
            .find(|o| o.number == OPTION_CONTENT_FORMAT)
            .map(|o| o.value.iter().fold(0u16, |acc, b| (acc << 8) | *b as u16))
    }
}
