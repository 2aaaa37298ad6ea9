use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use ndarray::ShapeError;

/// The result type used in the entire decomposition crate.
pub type Result<T> = std::result::Result<T, DecompErr>;

/// The decomposition crate's error type.
#[derive(Debug)]
pub enum DecompErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    ZeroDim {
        what: &'static str,
    },
    RankOutOfRange {
        rank: usize,
        max: usize,
    },
    Svd(&'static str),
    Distribution(String),
    Shape(ShapeError),
    Config(serde_json::Error),
    Io(io::Error),
}

impl Display for DecompErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch for {what}, got {got} and expected {expected}"
            ),
            DecompErr::ZeroDim { what } => write!(f, "The {what} dimension must not be zero"),
            DecompErr::RankOutOfRange { rank, max } => write!(
                f,
                "The requested rank {rank} is out of range, it must be between 1 and {max}"
            ),
            DecompErr::Svd(msg) => write!(f, "svd failed: {msg}"),
            DecompErr::Distribution(msg) => write!(f, "invalid distribution: {msg}"),
            DecompErr::Shape(e) => write!(f, "shape error: {e}"),
            DecompErr::Config(e) => write!(f, "invalid config: {e}"),
            DecompErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for DecompErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecompErr::Shape(e) => Some(e),
            DecompErr::Config(e) => Some(e),
            DecompErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for DecompErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<serde_json::Error> for DecompErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value)
    }
}

impl From<io::Error> for DecompErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rand_distr::uniform::Error> for DecompErr {
    fn from(value: rand_distr::uniform::Error) -> Self {
        Self::Distribution(value.to_string())
    }
}
