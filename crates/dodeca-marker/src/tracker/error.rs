/// Errors of the binary face code.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeError {
    #[error("control bits disagree with the parity of the data bits")]
    ControlSum,
    #[error("decoded face index {0} outside 1..=12")]
    FaceIndexOutOfRange(u8),
    #[error("code sample falls outside the frame")]
    OutOfFrame,
}

/// Reasons a frame yields no detection.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("expected 5 colour spots, found {found}")]
    DetectionCountMismatch { found: usize },
    #[error("no spot ordering fits the face descriptor (best distance {best_distance:?})")]
    CorrespondenceNotFound { best_distance: Option<f64> },
    #[error("binary face code rejected: {0}")]
    BinaryCodeInvalid(#[from] CodeError),
}

/// Errors building a calibration reference.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    #[error("calibration needs {required} samples, have {got}")]
    Incomplete { required: usize, got: usize },
    #[error("sample {axis} is not rotated away from the neutral pose")]
    DegenerateAxis { axis: usize },
}
