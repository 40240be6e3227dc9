#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod logging;
pub mod model;

use config::{ConfigFairing, StoreFairing};
use cors::CorsFairing;
use logging::LoggerFairing;

/// Build a server configured from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    assemble(rocket::build())
}

fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(CorsFairing)
}

/// Build a server over the given data directory, with example configuration.
#[cfg(test)]
pub(crate) fn rocket_for_data_dir(data_dir: &std::path::Path) -> Rocket<Build> {
    use config::examples::{ADMIN_PASSWORD, ADMIN_USER, FRONTEND_URL, JWT_SECRET};

    let figment = rocket::Config::figment()
        .merge(("data_dir", data_dir))
        .merge(("rank_depth", 3))
        .merge(("frontend_origin", FRONTEND_URL))
        .merge(("frontend_base_url", FRONTEND_URL))
        .merge(("auth_ttl", 3600))
        .merge(("admin_user", ADMIN_USER))
        .merge(("admin_password", ADMIN_PASSWORD))
        .merge(("jwt_secret", JWT_SECRET));
    assemble(rocket::custom(figment))
}

/// A fresh data directory holding the example roster.
#[cfg(test)]
pub(crate) fn example_data_dir() -> tempfile::TempDir {
    use model::store::{Coll, JsonFileStore};
    use std::sync::Arc;

    let data_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::open(data_dir.path()).unwrap());
    Coll::<model::Candidate>::new(store)
        .replace(model::Roster::example().candidates())
        .unwrap();
    data_dir
}
