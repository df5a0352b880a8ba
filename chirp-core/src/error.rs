use core::{error, fmt};
use fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    InvalidSampleRate { sample_rate: u32 },
    StateSizeMismatch { expected: usize, actual: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate { sample_rate } => write!(
                f,
                "invalid sample rate: {sample_rate} Hz, expected a value between {} and {} Hz",
                crate::MIN_SAMPLE_RATE,
                crate::MAX_SAMPLE_RATE
            ),
            Self::StateSizeMismatch { expected, actual } => write!(
                f,
                "save state buffer has the wrong size: expected {expected} bytes, got {actual} bytes"
            ),
        }
    }
}

impl error::Error for Error {}
