use jsonwebtoken::errors::Error as JwtError;
use rocket::{http::Status, response::Responder, serde::json::Json, Request};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{store::StoreError, SubmissionError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Self::Submission(e) => match e {
                SubmissionError::MissingCredential
                | SubmissionError::WrongBallotLength { .. }
                | SubmissionError::DuplicateCandidate(_)
                | SubmissionError::UnknownCandidate(_) => Status::BadRequest,
                SubmissionError::InvalidCredential | SubmissionError::CredentialAlreadyUsed => {
                    Status::Forbidden
                }
                SubmissionError::StorageUnavailable(_) => Status::ServiceUnavailable,
            },
            Self::Store(_) => Status::ServiceUnavailable,
            Self::Jwt(_) | Self::Csv(_) => Status::InternalServerError,
            Self::Status(status, _) => *status,
        }
    }

    fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Submission(e) => Some(e.kind()),
            Self::Store(_) => Some("StorageUnavailable"),
            _ => None,
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: None,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{self}");
        } else {
            debug!("Rejecting request: {self}");
        }
        // Don't leak internal details to the client.
        let message = match &self {
            Self::Jwt(_) | Self::Csv(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        let body = ErrorBody {
            error: message,
            kind: self.kind().map(str::to_string),
        };
        (status, Json(body)).respond_to(req)
    }
}
