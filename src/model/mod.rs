pub mod auth;
pub mod ballot;
pub mod ballot_box;
pub mod credential;
pub mod errors;
pub mod export;
pub mod roster;
pub mod store;
pub mod tabulation;
pub mod validator;

pub use ballot::{Ballot, BallotLedger};
pub use ballot_box::BallotBox;
pub use credential::{Credential, CredentialId, CredentialStore, Redemption};
pub use errors::SubmissionError;
pub use roster::{Candidate, Roster, RosterError};
pub use tabulation::{tabulate, ElectionResult, RoundSummary, Tabulation};
pub use validator::{BallotValidator, ValidatedBallot};
