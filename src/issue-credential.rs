//! Issue voting credentials straight into a data directory.
//! The server caches voting state in memory, so only run this while it is stopped.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use thiserror::Error;

use rankvote_backend::model::{
    export::voting_link,
    roster::DEFAULT_RANK_DEPTH,
    store::{Coll, JsonFileStore, StoreError},
    BallotBox, Candidate, Roster, RosterError,
};

const PROGRAM_NAME: &str = "issue-credential";

const ABOUT_TEXT: &str = "Issue single-use voting credentials and print their voting links.

The server must not be running while credentials are issued.";

// Must match `DEFAULT_RANK_DEPTH`.
const DEFAULT_RANK_DEPTH_STR: &str = "14";

const DATA_DIR: &str = "DATA_DIR";
const BASE_URL: &str = "BASE_URL";
const COUNT: &str = "COUNT";
const RANK_DEPTH: &str = "RANK_DEPTH";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(DATA_DIR)
                .long("data-dir")
                .help("Directory holding the roster, credentials and ballots")
                .value_parser(value_parser!(PathBuf))
                .default_value("data")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(BASE_URL)
                .long("base-url")
                .help("Frontend URL the voting links point at")
                .default_value("http://localhost:5173")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(RANK_DEPTH)
                .long("rank-depth")
                .help("Ranks per ballot, as configured for the server")
                .value_parser(value_parser!(usize))
                .default_value(DEFAULT_RANK_DEPTH_STR)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(COUNT)
                .short('n')
                .help("Number of credentials to issue")
                .value_parser(value_parser!(u32).range(1..))
                .default_value("1")
                .action(ArgAction::Set),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Error)]
enum Error {
    #[error("Failed to access voting data: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid roster: {0}")]
    Roster(#[from] RosterError),
}

/// Issue the requested credentials, printing each as it is stored.
fn issue(args: &ArgMatches) -> Result<(), Error> {
    // Arguments with defaults are always present.
    let data_dir: &PathBuf = args.get_one(DATA_DIR).unwrap();
    let base_url: &String = args.get_one(BASE_URL).unwrap();
    let count: u32 = *args.get_one(COUNT).unwrap();
    let rank_depth: usize = *args.get_one(RANK_DEPTH).unwrap();

    let store = Arc::new(JsonFileStore::open(data_dir)?);
    let names = Coll::<Candidate>::new(store.clone()).load()?;
    let ballot_box = BallotBox::open(store, Roster::new(names, rank_depth)?)?;

    for _ in 0..count {
        let credential = ballot_box.issue()?;
        println!("New credential: {}", credential.id);
        println!("Voting link: {}", voting_link(base_url, &credential.id));
    }
    Ok(())
}

fn main() {
    let args = cli().get_matches();
    if let Err(err) = issue(&args) {
        eprintln!("{err}");
        std::process::exit(1)
    }
}

#[cfg(test)]
mod tests {
    use rankvote_backend::model::Credential;

    use super::*;

    #[test]
    fn issues_into_data_dir() {
        let data_dir = tempfile::tempdir().unwrap();
        let args = cli()
            .try_get_matches_from([
                PROGRAM_NAME,
                "--data-dir",
                data_dir.path().to_str().unwrap(),
                "-n",
                "3",
            ])
            .unwrap();

        issue(&args).unwrap();

        let store = Arc::new(JsonFileStore::open(data_dir.path()).unwrap());
        let credentials = Coll::<Credential>::new(store).load().unwrap();
        assert_eq!(credentials.len(), 3);
        assert!(credentials.iter().all(|c| !c.used));
    }

    #[test]
    fn rank_depth_defaults_to_the_server_default() {
        let args = cli().try_get_matches_from([PROGRAM_NAME]).unwrap();
        assert_eq!(args.get_one::<usize>(RANK_DEPTH), Some(&DEFAULT_RANK_DEPTH));

        let args = cli()
            .try_get_matches_from([PROGRAM_NAME, "--rank-depth", "3"])
            .unwrap();
        assert_eq!(args.get_one::<usize>(RANK_DEPTH), Some(&3));
    }

    #[test]
    fn issues_against_a_small_roster() {
        let data_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::open(data_dir.path()).unwrap());
        let names: Vec<Candidate> = vec!["Alice".into(), "Bob".into(), "Carol".into()];
        Coll::<Candidate>::new(store.clone()).replace(&names).unwrap();

        let args = cli()
            .try_get_matches_from([
                PROGRAM_NAME,
                "--data-dir",
                data_dir.path().to_str().unwrap(),
                "--rank-depth",
                "3",
            ])
            .unwrap();
        issue(&args).unwrap();

        let credentials = Coll::<Credential>::new(store).load().unwrap();
        assert_eq!(credentials.len(), 1);
    }

    #[test]
    fn rejects_zero_count() {
        assert!(cli()
            .try_get_matches_from([PROGRAM_NAME, "-n", "0"])
            .is_err());
    }
}
