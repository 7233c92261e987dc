//! Message ID generation
//!
//! IDs run 1..=65535 and wrap back to 1; zero is never handed out.

/// Sequential message-id source owned by one sender
#[derive(Debug, Clone, Default)]
pub struct MessageIdGenerator {
    last: u16,
}

impl MessageIdGenerator {
    /// Start a fresh generator; the first id is 1
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Resume after `last`; the next id is `last + 1` (or 1 after 65535)
    pub fn starting_after(last: u16) -> Self {
        Self { last }
    }

    /// Advance and return the next id
    pub fn next_id(&mut self) -> u16 {
        self.last = match self.last {
            u16::MAX => 1,
            n => n + 1,
        };
        self.last
    }

    /// Last id handed out (0 before the first call)
    pub fn last(&self) -> u16 {
        self.last
    }
}
