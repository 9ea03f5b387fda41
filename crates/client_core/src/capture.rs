//! The camera side of scanning: something that hands out a capture, and a
//! capture that yields decoded QR text frame by frame.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, Lines},
    sync::{Mutex, OwnedMutexGuard},
};
use tracing::debug;

use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAttempt {
    Decoded(String),
    /// The current frame carried no readable code; keep polling.
    NoCode,
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn CaptureHandle>, ScanError>;
}

#[async_trait]
pub trait CaptureHandle: Send {
    async fn decode_next(&mut self) -> Result<DecodeAttempt, ScanError>;
    /// Stops the underlying capture. Called exactly once, by [`CaptureGuard`].
    fn release(&mut self);
}

/// Owns an acquired capture and releases it when dropped, including when
/// the scan task holding it is aborted.
pub struct CaptureGuard {
    handle: Box<dyn CaptureHandle>,
}

impl CaptureGuard {
    pub fn new(handle: Box<dyn CaptureHandle>) -> Self {
        Self { handle }
    }

    pub async fn decode_next(&mut self) -> Result<DecodeAttempt, ScanError> {
        self.handle.decode_next().await
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.handle.release();
        debug!("capture released");
    }
}

pub struct MissingCamera;

#[async_trait]
impl Camera for MissingCamera {
    async fn acquire(&self) -> Result<Box<dyn CaptureHandle>, ScanError> {
        Err(ScanError::camera_unavailable("no camera configured"))
    }
}

/// A keyboard-wedge style scanner: every line read from the source is one
/// decoded payload. Only one capture can hold the source at a time.
pub struct LineScanner<R> {
    lines: Arc<Mutex<Lines<R>>>,
}

impl<R> LineScanner<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: Arc::new(Mutex::new(reader.lines())),
        }
    }
}

#[async_trait]
impl<R> Camera for LineScanner<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn acquire(&self) -> Result<Box<dyn CaptureHandle>, ScanError> {
        let lines = Arc::clone(&self.lines).lock_owned().await;
        Ok(Box::new(LineCapture { lines: Some(lines) }))
    }
}

struct LineCapture<R> {
    lines: Option<OwnedMutexGuard<Lines<R>>>,
}

#[async_trait]
impl<R> CaptureHandle for LineCapture<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn decode_next(&mut self) -> Result<DecodeAttempt, ScanError> {
        let Some(lines) = self.lines.as_mut() else {
            return Err(ScanError::capture_lost("capture already released"));
        };
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => Ok(DecodeAttempt::NoCode),
            Ok(Some(line)) => Ok(DecodeAttempt::Decoded(line)),
            Ok(None) => Err(ScanError::capture_lost("scanner input closed")),
            Err(err) => Err(ScanError::capture_lost(err.to_string())),
        }
    }

    fn release(&mut self) {
        self.lines = None;
    }
}
