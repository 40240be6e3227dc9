use rocket::{
    http::{ContentType, Status},
    serde::json::Json,
    tokio::task,
    Route, State,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        auth::AdminToken,
        export::{credentials_csv, voting_link},
        Ballot, BallotBox, Credential, CredentialId, ElectionResult, RoundSummary, Tabulation,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        credentials,
        issue_credential,
        credentials_export,
        raw_ballots,
        results,
        result_rounds,
    ]
}

#[get("/api/admin/tokens")]
fn credentials(_token: AdminToken, ballot_box: &State<BallotBox>) -> Json<Vec<Credential>> {
    Json(ballot_box.credentials())
}

#[post("/api/admin/generate-link")]
async fn issue_credential(
    token: AdminToken,
    ballot_box: &State<BallotBox>,
    config: &State<Config>,
) -> Result<Json<IssuedCredential>> {
    let ballot_box = ballot_box.inner().clone();
    let credential = task::spawn_blocking(move || ballot_box.issue())
        .await
        .map_err(|e| {
            Error::Status(
                Status::InternalServerError,
                format!("Credential issue did not complete: {e}"),
            )
        })??;
    info!("Admin '{}' issued credential {}", token.username(), credential.id);

    let link = voting_link(config.frontend_base_url(), &credential.id);
    Ok(Json(IssuedCredential {
        id: credential.id,
        link,
    }))
}

#[get("/api/admin/tokens.csv")]
fn credentials_export(
    _token: AdminToken,
    ballot_box: &State<BallotBox>,
    config: &State<Config>,
) -> Result<(ContentType, String)> {
    let csv = credentials_csv(&ballot_box.credentials(), config.frontend_base_url())?;
    Ok((ContentType::CSV, csv))
}

#[get("/api/admin/raw-votes")]
fn raw_ballots(_token: AdminToken, ballot_box: &State<BallotBox>) -> Json<Vec<Ballot>> {
    Json(ballot_box.ballots().to_vec())
}

#[get("/api/admin/results")]
async fn results(_token: AdminToken, ballot_box: &State<BallotBox>) -> Result<Json<ElectionResult>> {
    Ok(Json(tabulate(ballot_box).await?.result()))
}

#[get("/api/admin/results/rounds")]
async fn result_rounds(
    _token: AdminToken,
    ballot_box: &State<BallotBox>,
) -> Result<Json<Vec<RoundSummary>>> {
    Ok(Json(tabulate(ballot_box).await?.rounds))
}

/// Tabulate on the blocking pool; large ledgers take a while.
async fn tabulate(ballot_box: &State<BallotBox>) -> Result<Tabulation> {
    let ballot_box = ballot_box.inner().clone();
    task::spawn_blocking(move || ballot_box.tabulate())
        .await
        .map_err(|e| {
            Error::Status(
                Status::InternalServerError,
                format!("Tabulation did not complete: {e}"),
            )
        })
}

#[derive(Debug, Serialize, Deserialize)]
struct IssuedCredential {
    id: CredentialId,
    link: String,
}
