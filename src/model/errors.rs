use thiserror::Error;

use crate::model::{roster::Candidate, store::StoreError};

/// Why a ballot submission was rejected. Every variant is terminal for the
/// submission that produced it.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Missing voting token")]
    MissingCredential,
    #[error("Invalid token")]
    InvalidCredential,
    #[error("Token already used")]
    CredentialAlreadyUsed,
    #[error("Ballot must contain exactly {expected} rankings, got {actual}")]
    WrongBallotLength { expected: usize, actual: usize },
    #[error("No duplicate candidates allowed: '{0}' is ranked more than once")]
    DuplicateCandidate(Candidate),
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(Candidate),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl SubmissionError {
    /// Stable name of the error kind, for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "MissingCredential",
            Self::InvalidCredential => "InvalidCredential",
            Self::CredentialAlreadyUsed => "CredentialAlreadyUsed",
            Self::WrongBallotLength { .. } => "WrongBallotLength",
            Self::DuplicateCandidate(_) => "DuplicateCandidate",
            Self::UnknownCandidate(_) => "UnknownCandidate",
            Self::StorageUnavailable(_) => "StorageUnavailable",
        }
    }
}
