use std::sync::Arc;

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    credential::CredentialId, roster::Candidate, store::StoredCollection,
    validator::ValidatedBallot,
};

/// An accepted ballot. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    #[serde(alias = "ballot")]
    pub ranking: Vec<Candidate>,
    #[serde(with = "ts_milliseconds", alias = "timestamp")]
    pub submitted_at: DateTime<Utc>,
    #[serde(alias = "token")]
    pub credential_id: CredentialId,
}

impl Ballot {
    /// Ballots can only be built from a ranking that passed validation.
    pub fn new(validated: ValidatedBallot, submitted_at: DateTime<Utc>) -> Self {
        let (ranking, credential_id) = validated.into_parts();
        Self {
            ranking,
            submitted_at,
            credential_id,
        }
    }
}

impl StoredCollection for Ballot {
    const NAME: &'static str = "ballots";
}

/// The append-only list of accepted ballots.
///
/// Appending produces a new ledger and leaves `self` untouched, so readers
/// holding a [`BallotLedger::snapshot`] never observe a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BallotLedger {
    ballots: Arc<Vec<Ballot>>,
}

impl BallotLedger {
    pub fn from_ballots(ballots: Vec<Ballot>) -> Self {
        Self {
            ballots: Arc::new(ballots),
        }
    }

    /// A ledger with `ballot` appended after every existing one.
    pub fn appended(&self, ballot: Ballot) -> Self {
        let mut ballots = Vec::with_capacity(self.ballots.len() + 1);
        ballots.extend_from_slice(&self.ballots);
        ballots.push(ballot);
        Self::from_ballots(ballots)
    }

    /// A cheap, immutable view of the ledger as it is now.
    pub fn snapshot(&self) -> Arc<Vec<Ballot>> {
        self.ballots.clone()
    }

    pub fn as_slice(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl Ballot {
        /// A ballot that bypasses validation, for tabulation tests.
        pub fn example(names: &[&str]) -> Self {
            Self {
                ranking: names.iter().map(|&n| n.into()).collect(),
                submitted_at: Utc::now(),
                credential_id: CredentialId::random(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json::{self, json};

    use super::*;

    #[test]
    fn appending_leaves_snapshots_untouched() {
        let ledger = BallotLedger::default();
        let before = ledger.snapshot();

        let ledger = ledger.appended(Ballot::example(&["A", "B"]));
        let ledger = ledger.appended(Ballot::example(&["B", "A"]));

        assert!(before.is_empty());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.as_slice()[1].ranking[0], Candidate::from("B"));
    }

    #[test]
    fn reads_legacy_field_names() {
        let legacy = json!({
            "ballot": ["A", "B"],
            "timestamp": 1_700_000_000_000_i64,
            "token": "abc",
        });
        let ballot: Ballot = serde_json::from_value(legacy).unwrap();
        assert_eq!(ballot.ranking, vec![Candidate::from("A"), Candidate::from("B")]);
        assert_eq!(ballot.credential_id, CredentialId::from("abc"));

        let value = serde_json::to_value(&ballot).unwrap();
        assert_eq!(value["submittedAt"], json!(1_700_000_000_000_i64));
        assert_eq!(value["credentialId"], json!("abc"));
    }
}
