/// Failures of the homography and orientation solvers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("point sets differ in length ({src} vs {dst})")]
    LengthMismatch { src: usize, dst: usize },
    #[error("at least {required} correspondences required, got {got}")]
    TooFewPoints { required: usize, got: usize },
    #[error("degenerate point configuration")]
    Degenerate,
    #[error("homography is singular")]
    Singular,
}

/// Invalid frame buffers handed to the pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid BGR buffer length (expected {expected} bytes, got {got})")]
    BufferSize { expected: usize, got: usize },
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}
