//! Response code definitions
//!
//! A code byte is `class << 5 | detail`, written `c.dd` in diagnostics.

use std::fmt;

/// Split a code into its class (top 3 bits)
pub fn code_class(code: u8) -> u8 {
    code >> 5
}

/// Split a code into its detail (low 5 bits)
pub fn code_detail(code: u8) -> u8 {
    code & 0x1F
}

/// Compose a code from class and detail
pub fn compose_code(class: u8, detail: u8) -> u8 {
    ((class & 0x07) << 5) | (detail & 0x1F)
}

/// Response codes used by this system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    Created = 0x41,
    Deleted = 0x42,
    Valid = 0x43,
    Changed = 0x44,
    Content = 0x45,
    BadRequest = 0x80,
    NotFound = 0x84,
    MethodNotAllowed = 0x85,
    InternalServerError = 0xA0,
}

impl ResponseCode {
    /// Interpret a raw code as a known response code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x41 => Some(ResponseCode::Created),
            0x42 => Some(ResponseCode::Deleted),
            0x43 => Some(ResponseCode::Valid),
            0x44 => Some(ResponseCode::Changed),
            0x45 => Some(ResponseCode::Content),
            0x80 => Some(ResponseCode::BadRequest),
            0x84 => Some(ResponseCode::NotFound),
            0x85 => Some(ResponseCode::MethodNotAllowed),
            0xA0 => Some(ResponseCode::InternalServerError),
            _ => None,
        }
    }

    /// Raw code value
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn class(self) -> u8 {
        code_class(self.code())
    }

    pub fn detail(self) -> u8 {
        code_detail(self.code())
    }

    /// 2.xx codes
    pub fn is_success(self) -> bool {
        self.class() == 2
    }

    fn reason(self) -> &'static str {
        match self {
            ResponseCode::Created => "Created",
            ResponseCode::Deleted => "Deleted",
            ResponseCode::Valid => "Valid",
            ResponseCode::Changed => "Changed",
            ResponseCode::Content => "Content",
            ResponseCode::BadRequest => "Bad Request",
            ResponseCode::NotFound => "Not Found",
            ResponseCode::MethodNotAllowed => "Method Not Allowed",
            ResponseCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02} {}", self.class(), self.detail(), self.reason())
    }
}
