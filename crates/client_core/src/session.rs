//! Scan session state: what the UI shows about the current scan.

use shared::machine_code;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    Resolved(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Start,
    Stop,
    DecodeSuccess(String),
    DecodeFailed(String),
    Reset,
    /// Manually entered code text.
    Submit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanSession {
    state: ScanState,
    last_raw_payload: Option<String>,
}

impl ScanSession {
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    pub fn last_raw_payload(&self) -> Option<&str> {
        self.last_raw_payload.as_deref()
    }

    pub fn resolved_code(&self) -> Option<&str> {
        match &self.state {
            ScanState::Resolved(code) => Some(code),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ScanState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Applies one event and reports whether anything changed. Decode
    /// results that arrive when no scan is running are ignored, as is a
    /// manual entry that normalizes to nothing.
    pub fn apply(&mut self, event: ScanEvent) -> bool {
        match event {
            ScanEvent::Start => {
                self.state = ScanState::Scanning;
                true
            }
            ScanEvent::Stop => {
                if !self.is_scanning() {
                    return false;
                }
                self.state = ScanState::Idle;
                true
            }
            ScanEvent::DecodeSuccess(payload) => {
                if !self.is_scanning() {
                    return false;
                }
                self.resolve(payload)
            }
            ScanEvent::DecodeFailed(message) => {
                if !self.is_scanning() {
                    return false;
                }
                self.state = ScanState::Error(message);
                true
            }
            ScanEvent::Reset => {
                let changed = *self != Self::default();
                *self = Self::default();
                changed
            }
            ScanEvent::Submit(text) => self.resolve(text),
        }
    }

    fn resolve(&mut self, raw: String) -> bool {
        let code = machine_code::normalize(&raw);
        if code.is_empty() {
            return false;
        }
        self.state = ScanState::Resolved(code);
        self.last_raw_payload = Some(raw);
        true
    }
}
