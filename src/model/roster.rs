use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::store::StoredCollection;

/// Default number of ranks every ballot must fill.
pub const DEFAULT_RANK_DEPTH: usize = 14;

/// A candidate, identified by their unique name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Candidate {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The roster is persisted as a plain array of names.
impl StoredCollection for Candidate {
    const NAME: &'static str = "roster";
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Candidate name must not be empty")]
    EmptyName,
    #[error("Candidate '{0}' appears more than once in the roster")]
    DuplicateName(String),
}

/// The fixed, ordered list of candidates for a voting round, together with
/// the number of ranks each ballot must contain.
///
/// Roster order is significant: it is the total order used to break ties
/// during tabulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    candidates: Vec<Candidate>,
    positions: HashMap<Candidate, usize>,
    rank_depth: usize,
}

impl Roster {
    /// Build a roster, rejecting empty or repeated names.
    pub fn new(candidates: Vec<Candidate>, rank_depth: usize) -> Result<Self, RosterError> {
        let mut positions = HashMap::with_capacity(candidates.len());
        for (position, candidate) in candidates.iter().enumerate() {
            if candidate.name().is_empty() {
                return Err(RosterError::EmptyName);
            }
            if positions.insert(candidate.clone(), position).is_some() {
                return Err(RosterError::DuplicateName(candidate.to_string()));
            }
        }
        Ok(Self {
            candidates,
            positions,
            rank_depth,
        })
    }

    /// The candidates, in roster order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of ranks every ballot must fill, and the maximum number of winners.
    pub fn rank_depth(&self) -> usize {
        self.rank_depth
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.positions.contains_key(candidate)
    }

    /// Position of the candidate in roster order.
    pub fn position(&self, candidate: &Candidate) -> Option<usize> {
        self.positions.get(candidate).copied()
    }

    /// Can a ballot for this roster ever be accepted?
    pub fn accepts_ballots(&self) -> bool {
        self.rank_depth > 0 && self.rank_depth <= self.candidates.len()
    }

    /// Names that appear more than once in `names`, in order of first repetition.
    pub(crate) fn repeated<'a>(names: &'a [Candidate]) -> impl Iterator<Item = &'a Candidate> {
        let mut seen = HashSet::with_capacity(names.len());
        names.iter().filter(move |name| !seen.insert(*name))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_roster_order() {
        let roster = Roster::example();
        assert_eq!(roster.position(&"Alice".into()), Some(0));
        assert_eq!(roster.position(&"Dave".into()), Some(3));
        assert_eq!(roster.position(&"Zed".into()), None);
        assert!(roster.accepts_ballots());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = Roster::new(vec!["A".into(), "B".into(), "A".into()], 2);
        assert_eq!(result, Err(RosterError::DuplicateName("A".to_string())));

        let result = Roster::new(vec!["A".into(), "".into()], 2);
        assert_eq!(result, Err(RosterError::EmptyName));
    }

    #[test]
    fn rank_depth_larger_than_roster_accepts_nothing() {
        let roster = Roster::from_names(&["A", "B"], 14);
        assert!(!roster.accepts_ballots());
        let roster = Roster::from_names(&["A", "B"], 0);
        assert!(!roster.accepts_ballots());
    }

    #[test]
    fn repeated_reports_first_repetition() {
        let names: Vec<Candidate> = vec!["A".into(), "B".into(), "B".into(), "A".into()];
        let repeated: Vec<_> = Roster::repeated(&names).cloned().collect();
        assert_eq!(repeated, vec![Candidate::from("B"), Candidate::from("A")]);
    }
}
