use crate::model::{
    credential::{CredentialId, CredentialStatus, CredentialStore},
    errors::SubmissionError,
    roster::{Candidate, Roster},
};

/// A ranking and credential that passed every check in [`BallotValidator`].
///
/// The credential has been seen unused, but is not yet redeemed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBallot {
    ranking: Vec<Candidate>,
    credential_id: CredentialId,
}

impl ValidatedBallot {
    pub fn ranking(&self) -> &[Candidate] {
        &self.ranking
    }

    pub fn credential_id(&self) -> &CredentialId {
        &self.credential_id
    }

    pub(crate) fn into_parts(self) -> (Vec<Candidate>, CredentialId) {
        (self.ranking, self.credential_id)
    }
}

/// Checks a submission against the roster and the current credential state.
/// Never mutates anything.
pub struct BallotValidator<'a> {
    roster: &'a Roster,
    credentials: &'a CredentialStore,
}

impl<'a> BallotValidator<'a> {
    pub fn new(roster: &'a Roster, credentials: &'a CredentialStore) -> Self {
        Self {
            roster,
            credentials,
        }
    }

    /// Run the checks in order, stopping at the first violation:
    /// credential present, credential usable, length, duplicates, membership.
    pub fn validate(
        &self,
        ranking: Vec<Candidate>,
        credential_id: Option<CredentialId>,
    ) -> Result<ValidatedBallot, SubmissionError> {
        let credential_id = credential_id
            .filter(|id| !id.as_str().is_empty())
            .ok_or(SubmissionError::MissingCredential)?;

        match self.credentials.status(&credential_id) {
            CredentialStatus::Unused => {}
            CredentialStatus::Used => return Err(SubmissionError::CredentialAlreadyUsed),
            CredentialStatus::NotFound => return Err(SubmissionError::InvalidCredential),
        }

        let expected = self.roster.rank_depth();
        if ranking.len() != expected {
            return Err(SubmissionError::WrongBallotLength {
                expected,
                actual: ranking.len(),
            });
        }

        if let Some(repeated) = Roster::repeated(&ranking).next() {
            return Err(SubmissionError::DuplicateCandidate(repeated.clone()));
        }

        if let Some(unknown) = ranking.iter().find(|c| !self.roster.contains(c)) {
            return Err(SubmissionError::UnknownCandidate(unknown.clone()));
        }

        Ok(ValidatedBallot {
            ranking,
            credential_id,
        })
    }
}
