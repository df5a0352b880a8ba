#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Apu(chirp_core::Error),
    Poisoned,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apu(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apu(err) => write!(f, "apu error: {err}"),
            Self::Poisoned => write!(f, "apu lock poisoned by a panicking thread"),
        }
    }
}

impl From<chirp_core::Error> for Error {
    fn from(err: chirp_core::Error) -> Self {
        Self::Apu(err)
    }
}
