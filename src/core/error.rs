use std::fmt::{Display, Formatter};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller or the provider supplied something that violates the half-hour grid
    /// or another input contract.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The prices are not published yet, the caller may retry later.
    #[error("data is not available yet: {0}")]
    DataUnavailable(String),

    #[error("insufficient data: {required} contiguous slots required, at most {available} available")]
    InsufficientData { required: usize, available: usize },

    /// Constraints are too strict to select enough slots.
    #[error("no solution: {required} slots required, only {eligible} eligible")]
    NoSolution { required: usize, eligible: usize },

    #[error("fetch failure")]
    FetchFailure(#[from] FetchFailure),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("provider request failed")]
    Provider(#[from] ureq::Error),

    #[error("storage operation failed")]
    Storage(#[from] rusqlite::Error),
}

impl From<ureq::Error> for Error {
    fn from(error: ureq::Error) -> Self {
        Self::FetchFailure(error.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::FetchFailure(error.into())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidInput,
    DataUnavailable,
    InsufficientData,
    NoSolution,
    FetchFailure,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::DataUnavailable(_) => ErrorKind::DataUnavailable,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::NoSolution { .. } => ErrorKind::NoSolution,
            Self::FetchFailure(_) => ErrorKind::FetchFailure,
        }
    }
}

impl ErrorKind {
    /// What the user can do about it.
    pub const fn hint(self) -> &'static str {
        match self {
            Self::InvalidInput => "check the command-line arguments",
            Self::DataUnavailable => "the prices are not published yet, try again later",
            Self::InsufficientData => "ask for a shorter window or try again when more prices are known",
            Self::NoSolution => "relax the constraints: raise the price ceiling or move the departure",
            Self::FetchFailure => "check the connectivity and the database file",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
