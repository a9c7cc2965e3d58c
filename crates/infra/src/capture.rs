//! Camera capture lifecycle.
//!
//! A capture runs three suspend points in order: permission request, stream
//! acquisition, frame grab. The first failure aborts the remaining steps; no
//! step is retried. An acquired stream is always stopped before returning.

use async_trait::async_trait;
use thiserror::Error;

/// Capture failure, by lifecycle step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera not accessible: {0}")]
    DeviceUnavailable(String),

    #[error("failed to capture photo: {0}")]
    FrameGrab(String),
}

/// One grabbed still image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// An open video stream on a capture device.
#[async_trait]
pub trait FrameStream: Send {
    async fn grab_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Release the device. Called exactly once per opened stream.
    fn stop(&mut self);
}

/// A camera (or anything that can stand in for one).
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    type Stream: FrameStream;

    async fn request_permission(&self) -> Result<(), CaptureError>;

    async fn open_stream(&self) -> Result<Self::Stream, CaptureError>;
}

/// Run the capture lifecycle against `device` and return the grabbed frame.
pub async fn capture_frame<D>(device: &D) -> Result<Frame, CaptureError>
where
    D: CaptureDevice + ?Sized,
{
    device.request_permission().await.inspect_err(|e| {
        tracing::warn!(error = %e, "camera permission request failed");
    })?;

    let mut stream = device.open_stream().await.inspect_err(|e| {
        tracing::warn!(error = %e, "failed to open camera stream");
    })?;

    let frame = stream.grab_frame().await;
    stream.stop();

    match &frame {
        Ok(f) => tracing::debug!(size = f.bytes.len(), content_type = %f.content_type, "captured frame"),
        Err(e) => tracing::warn!(error = %e, "frame grab failed"),
    }
    frame
}

/// A device that yields one already-captured image (e.g. a photo uploaded by
/// a browser that did the camera work itself).
#[derive(Debug, Clone)]
pub struct StillFrameDevice {
    frame: Frame,
}

impl StillFrameDevice {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            frame: Frame {
                bytes,
                content_type: content_type.into(),
            },
        }
    }
}

/// Stream over a [`StillFrameDevice`]: yields its frame once.
#[derive(Debug)]
pub struct StillFrameStream {
    frame: Option<Frame>,
}

#[async_trait]
impl FrameStream for StillFrameStream {
    async fn grab_frame(&mut self) -> Result<Frame, CaptureError> {
        self.frame
            .take()
            .ok_or_else(|| CaptureError::FrameGrab("frame already taken".to_string()))
    }

    fn stop(&mut self) {
        self.frame = None;
    }
}

#[async_trait]
impl CaptureDevice for StillFrameDevice {
    type Stream = StillFrameStream;

    async fn request_permission(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    async fn open_stream(&self) -> Result<Self::Stream, CaptureError> {
        if self.frame.bytes.is_empty() {
            return Err(CaptureError::DeviceUnavailable("no image data".to_string()));
        }
        Ok(StillFrameStream {
            frame: Some(self.frame.clone()),
        })
    }
}
