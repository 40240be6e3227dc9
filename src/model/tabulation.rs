//! Elect-one / eliminate-one tabulation.
//!
//! Each round re-tallies every ballot for its first candidate that is still
//! active, elects the highest tally and eliminates the lowest. There is no
//! weighted transfer of surplus votes; this is not STV, and outcomes depend on
//! the exact tie-break rule below, so it must not be swapped for another method.
//!
//! Ties are always broken in favour of the candidate earliest in roster order,
//! both for the elected candidate and the eliminated one.

use serde::Serialize;

use crate::model::{ballot::Ballot, roster::Candidate, roster::Roster};

/// The ordered winners of a tabulation; first elected comes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionResult {
    pub winners: Vec<Candidate>,
}

/// What happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    /// Tally of every candidate active during this round, in roster order.
    pub tally: Vec<(Candidate, u64)>,
    pub elected: Candidate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eliminated: Option<Candidate>,
}

/// Full output of a tabulation: the result plus the rounds that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tabulation {
    pub winners: Vec<Candidate>,
    pub rounds: Vec<RoundSummary>,
}

impl Tabulation {
    pub fn result(&self) -> ElectionResult {
        ElectionResult {
            winners: self.winners.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Active,
    Elected,
    Eliminated,
}

/// Compute up to `roster.rank_depth()` winners from `ballots`.
///
/// A pure function of its inputs: the same roster and ballots in the same
/// order always give the same result. An empty roster or an empty ballot list
/// gives no winners.
pub fn tabulate(roster: &Roster, ballots: &[Ballot]) -> Tabulation {
    let seats = roster.rank_depth();
    let num_candidates = roster.len();
    if num_candidates == 0 || ballots.is_empty() || seats == 0 {
        debug!(
            "Nothing to tabulate ({num_candidates} candidates, {} ballots)",
            ballots.len()
        );
        return Tabulation {
            winners: Vec::new(),
            rounds: Vec::new(),
        };
    }

    // Work on roster positions; they double as the tie-break order.
    let ranked: Vec<Vec<usize>> = ballots
        .iter()
        .map(|ballot| {
            ballot
                .ranking
                .iter()
                .filter_map(|candidate| roster.position(candidate))
                .collect()
        })
        .collect();

    let mut status = vec![Status::Active; num_candidates];
    let mut elected: Vec<usize> = Vec::new();
    let mut num_eliminated = 0;
    let mut rounds = Vec::new();

    while elected.len() < seats && elected.len() + num_eliminated < num_candidates {
        let tally = first_active_tally(&ranked, &status);
        let active: Vec<usize> = (0..num_candidates)
            .filter(|&c| status[c] == Status::Active)
            .collect();

        let top = match pick(&active, |c| tally[c], |a, b| a > b) {
            Some(top) => top,
            None => break,
        };
        let rest: Vec<usize> = active.iter().copied().filter(|&c| c != top).collect();
        let bottom = pick(&rest, |c| tally[c], |a, b| a < b);

        status[top] = Status::Elected;
        elected.push(top);
        if let Some(bottom) = bottom {
            status[bottom] = Status::Eliminated;
            num_eliminated += 1;
        }

        let candidates = roster.candidates();
        let summary = RoundSummary {
            round: rounds.len() as u32 + 1,
            tally: active
                .iter()
                .map(|&c| (candidates[c].clone(), tally[c]))
                .collect(),
            elected: candidates[top].clone(),
            eliminated: bottom.map(|c| candidates[c].clone()),
        };
        trace!("Round {}: {summary:?}", summary.round);
        rounds.push(summary);
    }

    elected.truncate(seats);
    let winners: Vec<Candidate> = elected
        .into_iter()
        .map(|c| roster.candidates()[c].clone())
        .collect();
    info!(
        "Tabulated {} ballots over {} rounds: {} winners",
        ballots.len(),
        rounds.len(),
        winners.len()
    );
    Tabulation { winners, rounds }
}

/// Count each ballot once, for its first still-active candidate.
fn first_active_tally(ranked: &[Vec<usize>], status: &[Status]) -> Vec<u64> {
    let mut tally = vec![0; status.len()];
    for ranking in ranked {
        if let Some(&first) = ranking.iter().find(|&&c| status[c] == Status::Active) {
            tally[first] += 1;
        }
    }
    tally
}

/// The first candidate (in the given order) whose tally beats every other
/// under `better`. Later candidates only win a strict improvement.
fn pick(
    candidates: &[usize],
    tally: impl Fn(usize) -> u64,
    better: impl Fn(u64, u64) -> bool,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &c in candidates {
        match best {
            Some(b) if !better(tally(c), tally(b)) => {}
            _ => best = Some(c),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(winners: &[Candidate]) -> Vec<&str> {
        winners.iter().map(Candidate::name).collect()
    }

    fn ballots(rankings: &[&[&str]]) -> Vec<Ballot> {
        rankings.iter().map(|r| Ballot::example(r)).collect()
    }

    #[test]
    fn three_candidates_two_seats() {
        let roster = Roster::from_names(&["A", "B", "C"], 2);
        let ballots = ballots(&[&["A", "B"], &["B", "A"], &["A", "C"]]);

        let tabulation = tabulate(&roster, &ballots);
        assert_eq!(names(&tabulation.winners), vec!["A", "B"]);

        let first = &tabulation.rounds[0];
        assert_eq!(
            first.tally,
            vec![("A".into(), 2), ("B".into(), 1), ("C".into(), 0)]
        );
        assert_eq!(first.elected, "A".into());
        assert_eq!(first.eliminated, Some("C".into()));

        let second = &tabulation.rounds[1];
        assert_eq!(second.tally, vec![("B".into(), 2)]);
        assert_eq!(second.elected, "B".into());
        assert_eq!(second.eliminated, None);

        assert_eq!(tabulation.result().winners, tabulation.winners);
    }

    #[test]
    fn empty_ledger_elects_nobody() {
        let roster = Roster::from_names(&["A", "B", "C"], 2);
        let tabulation = tabulate(&roster, &[]);
        assert!(tabulation.winners.is_empty());
        assert!(tabulation.rounds.is_empty());
    }

    #[test]
    fn empty_roster_elects_nobody() {
        let roster = Roster::from_names(&[], 2);
        assert!(tabulate(&roster, &ballots(&[&["A"]])).winners.is_empty());
    }

    #[test]
    fn ties_go_to_roster_order() {
        // Everyone ties on one vote each in the first round.
        let roster = Roster::from_names(&["A", "B", "C", "D"], 2);
        let ballots = ballots(&[&["D", "C"], &["C", "D"], &["B", "A"], &["A", "B"]]);

        let tabulation = tabulate(&roster, &ballots);
        let first = &tabulation.rounds[0];
        assert_eq!(first.elected, "A".into());
        // B is the earliest minimum once A is excluded.
        assert_eq!(first.eliminated, Some("B".into()));

        // Round 2: [B, A] and [A, B] have no active entry left.
        let second = &tabulation.rounds[1];
        assert_eq!(second.tally, vec![("C".into(), 1), ("D".into(), 1)]);
        assert_eq!(second.elected, "C".into());
        assert_eq!(names(&tabulation.winners), vec!["A", "C"]);
    }

    #[test]
    fn stops_when_candidates_run_out() {
        // Three candidates, more seats than can be filled.
        let roster = Roster::from_names(&["A", "B", "C"], 3);
        let ballots = ballots(&[&["C", "B", "A"], &["C", "A", "B"], &["B", "C", "A"]]);

        let tabulation = tabulate(&roster, &ballots);
        // Round 1: C=2, B=1, A=0 -> elect C, eliminate A. Round 2: only B left.
        assert_eq!(names(&tabulation.winners), vec!["C", "B"]);
        assert_eq!(tabulation.rounds.len(), 2);
    }

    #[test]
    fn winners_never_exceed_rank_depth() {
        let roster = Roster::from_names(&["A", "B", "C", "D", "E", "F"], 2);
        let ballots = ballots(&[
            &["A", "B"],
            &["B", "C"],
            &["C", "D"],
            &["D", "E"],
            &["E", "F"],
        ]);
        let tabulation = tabulate(&roster, &ballots);
        assert_eq!(tabulation.winners.len(), 2);
    }

    #[test]
    fn repeated_runs_agree() {
        let roster = Roster::from_names(&["A", "B", "C", "D"], 3);
        let ballots = ballots(&[
            &["B", "A", "C"],
            &["D", "C", "A"],
            &["B", "D", "C"],
            &["A", "C", "D"],
            &["C", "B", "A"],
        ]);
        assert_eq!(tabulate(&roster, &ballots), tabulate(&roster, &ballots));
    }
}
