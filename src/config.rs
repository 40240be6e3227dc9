use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    roster::DEFAULT_RANK_DEPTH,
    store::{Coll, JsonFileStore, StoreError},
    BallotBox, Candidate, Roster,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    frontend_origin: String,
    frontend_base_url: String,
    auth_ttl: u32,
    admin_user: String,
    // secrets
    admin_password: String,
    jwt_secret: String,
}

impl Config {
    /// The origin allowed to make cross-site requests.
    pub fn frontend_origin(&self) -> &str {
        &self.frontend_origin
    }

    /// Base of the voting links handed out with credentials.
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    /// Valid lifetime of admin tokens in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Does this username/password pair identify the administrator?
    pub fn admin_matches(&self, username: &str, password: &str) -> bool {
        username == self.admin_user && password == self.admin_password
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the on-disk voting data.
#[derive(Deserialize)]
struct StoreConfig {
    data_dir: PathBuf,
    #[serde(default = "default_rank_depth")]
    rank_depth: usize,
}

fn default_rank_depth() -> usize {
    DEFAULT_RANK_DEPTH
}

/// A fairing that opens the data directory, loads the roster, credentials
/// and ballots, and places a [`BallotBox`] into managed state.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Ballot store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Opening voting data in {}...", config.data_dir.display());

        let ballot_box = match open_ballot_box(config) {
            Ok(ballot_box) => ballot_box,
            Err(e) => {
                error!("Failed to open voting data: {e}");
                return Err(rocket);
            }
        };
        info!("...voting data loaded!");

        // Manage the state.
        rocket = rocket.manage(ballot_box);
        Ok(rocket)
    }
}

#[derive(Debug, thiserror::Error)]
enum OpenError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Roster(#[from] crate::model::RosterError),
}

fn open_ballot_box(config: StoreConfig) -> Result<BallotBox, OpenError> {
    let store = Arc::new(JsonFileStore::open(&config.data_dir)?);
    let names = Coll::<Candidate>::new(store.clone()).load()?;
    if names.is_empty() {
        warn!("The roster is empty; add candidate names to roster.json");
    }
    let roster = Roster::new(names, config.rank_depth)?;
    Ok(BallotBox::open(store, roster)?)
}
