//! Kiosk-side logic: the scan session, its camera capability, exercise
//! lookup and trainer signup, against any [`storage::GymStore`].

pub mod capture;
pub mod controller;
pub mod error;
mod http_store;
pub mod lookup;
pub mod session;
pub mod signup;

pub use capture::{Camera, CaptureHandle, DecodeAttempt, LineScanner, MissingCamera};
pub use controller::{ExerciseView, ScanController, ScanSettings, SessionEvent};
pub use error::ScanError;
pub use http_store::HttpGymStore;
pub use lookup::Lookup;
pub use session::{ScanEvent, ScanSession, ScanState};
