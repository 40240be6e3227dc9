use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeZone, Utc};

use crate::model::{
    ballot::{Ballot, BallotLedger},
    credential::{Credential, CredentialId, CredentialStore, Redemption},
    errors::SubmissionError,
    roster::{Candidate, Roster},
    store::{Coll, Persistence, StoreError},
    tabulation::{self, Tabulation},
    validator::{BallotValidator, ValidatedBallot},
};

/// The current time, at the millisecond precision timestamps are stored with.
fn now() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}

/// The credential table and the ballot ledger, always changed together.
#[derive(Debug)]
struct Tables {
    credentials: CredentialStore,
    ledger: BallotLedger,
}

/// Owner of all mutable voting state.
///
/// Every change to credentials or ballots happens under one lock, and is
/// written to the persistence port before it becomes visible in memory.
/// Readers take a snapshot under the lock and work on it afterwards.
#[derive(Clone)]
pub struct BallotBox {
    tables: Arc<Mutex<Tables>>,
    roster: Arc<Roster>,
    credential_coll: Coll<Credential>,
    ballot_coll: Coll<Ballot>,
}

impl BallotBox {
    /// Load credentials and ballots from the store.
    pub fn open(port: Arc<dyn Persistence>, roster: Roster) -> Result<Self, StoreError> {
        let credential_coll = Coll::<Credential>::new(port.clone());
        let ballot_coll = Coll::<Ballot>::new(port);
        let tables = Tables {
            credentials: CredentialStore::from_credentials(credential_coll.load()?),
            ledger: BallotLedger::from_ballots(ballot_coll.load()?),
        };
        info!(
            "Loaded {} credentials and {} ballots for {} candidates",
            tables.credentials.list().len(),
            tables.ledger.len(),
            roster.len()
        );
        if !roster.accepts_ballots() {
            warn!(
                "Ballots need {} ranks but the roster has {} candidates; no ballot can be accepted",
                roster.rank_depth(),
                roster.len()
            );
        }
        Ok(Self {
            tables: Arc::new(Mutex::new(tables)),
            roster: Arc::new(roster),
            credential_coll,
            ballot_coll,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    // Memory is only ever updated after a successful write, so a poisoned
    // lock still guards consistent tables.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue and persist a new unused credential.
    pub fn issue(&self) -> Result<Credential, StoreError> {
        let mut tables = self.lock();
        let mut credentials = tables.credentials.clone();
        let credential = credentials.issue(now());
        self.credential_coll.replace(credentials.list())?;
        tables.credentials = credentials;
        info!("Issued credential {}", credential.id);
        Ok(credential)
    }

    /// Every credential, in issue order.
    pub fn credentials(&self) -> Vec<Credential> {
        self.lock().credentials.list().to_vec()
    }

    /// The accepted ballots as of now.
    pub fn ballots(&self) -> Arc<Vec<Ballot>> {
        self.lock().ledger.snapshot()
    }

    /// Check a submission without changing anything.
    pub fn validate(
        &self,
        ranking: Vec<Candidate>,
        credential_id: Option<CredentialId>,
    ) -> Result<ValidatedBallot, SubmissionError> {
        let tables = self.lock();
        BallotValidator::new(&self.roster, &tables.credentials).validate(ranking, credential_id)
    }

    /// Redeem the credential and append the ballot, as one transaction.
    ///
    /// Passing validation does not guarantee admission: if another submission
    /// redeemed the same credential in the meantime, this fails with
    /// [`SubmissionError::CredentialAlreadyUsed`] and appends nothing.
    pub fn admit(&self, validated: ValidatedBallot) -> Result<Ballot, SubmissionError> {
        let mut tables = self.lock();
        let now = now();

        let mut credentials = tables.credentials.clone();
        match credentials.redeem_if_unused(validated.credential_id(), now) {
            Redemption::Redeemed => {}
            Redemption::AlreadyUsed => {
                warn!(
                    "Credential {} was redeemed by a concurrent submission",
                    validated.credential_id()
                );
                return Err(SubmissionError::CredentialAlreadyUsed);
            }
            Redemption::NotFound => return Err(SubmissionError::InvalidCredential),
        }
        let ballot = Ballot::new(validated, now);
        let ledger = tables.ledger.appended(ballot.clone());

        // Redemption first; undo it if the ballot cannot follow. Losing the
        // undo burns the credential but never lets it be used twice.
        self.credential_coll.replace(credentials.list())?;
        if let Err(e) = self.ballot_coll.replace(ledger.as_slice()) {
            if let Err(rollback) = self.credential_coll.replace(tables.credentials.list()) {
                error!(
                    "Failed to restore credential {} after ballot write failure, \
it stays redeemed without a ballot: {rollback}",
                    ballot.credential_id
                );
            }
            return Err(e.into());
        }

        tables.credentials = credentials;
        tables.ledger = ledger;
        debug!("Accepted ballot #{} for credential {}", tables.ledger.len(), ballot.credential_id);
        Ok(ballot)
    }

    /// Validate and admit a submission.
    pub fn submit(
        &self,
        ranking: Vec<Candidate>,
        credential_id: Option<CredentialId>,
    ) -> Result<Ballot, SubmissionError> {
        let validated = self.validate(ranking, credential_id)?;
        self.admit(validated)
    }

    /// Tabulate a snapshot of the ledger. Submissions are not blocked while
    /// the rounds are computed.
    pub fn tabulate(&self) -> Tabulation {
        let snapshot = self.ballots();
        tabulation::tabulate(&self.roster, &snapshot)
    }
}
