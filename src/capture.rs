use crate::error::{Error, Result};
use log::info;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio;

/// Anything that hands out frames until the stream ends.
pub trait FrameSource {
    /// Returns the next BGR frame or `None` at end-of-stream.
    fn read(&mut self) -> Result<Option<Mat>>;
}

pub struct CaptureSource {
    capture: videoio::VideoCapture,
}

impl CaptureSource {
    /// Opens `video` or, without a path, the default camera.
    pub fn open(video: Option<&str>) -> Result<Self> {
        let (capture, name) = match video {
            Some(path) => (
                videoio::VideoCapture::from_file(path, videoio::CAP_ANY)?,
                path.to_string(),
            ),
            None => (
                videoio::VideoCapture::new(0, videoio::CAP_ANY)?,
                "camera 0".to_string(),
            ),
        };

        if !capture.is_opened()? {
            return Err(Error::SourceUnavailable(name));
        }

        info!("reading frames from {name}");
        Ok(Self { capture })
    }
}

impl FrameSource for CaptureSource {
    fn read(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}
