use crate::roi::BoundingBox;

/// Errors raised while capturing, selecting or tracking.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A failure inside an OpenCV primitive (capture, conversion, drawing, highgui).
    #[error("opencv error: {0}")]
    OpenCv(#[from] opencv::Error),

    /// The selected points enclose no pixels of the frozen frame.
    #[error("degenerate roi {0:?}")]
    DegenerateRoi(BoundingBox),

    /// The camera or video file could not be opened.
    #[error("could not open video source: {0}")]
    SourceUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
