use rocket::{
    http::Status,
    serde::json::{serde_json::json, Json, Value},
    tokio::task,
    Route, State,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    logging::RequestId,
    model::{BallotBox, Candidate, CredentialId},
};

pub fn routes() -> Vec<Route> {
    routes![health, candidates, vote]
}

#[get("/api/health")]
fn health() -> Value {
    json!({ "ok": true })
}

#[get("/api/candidates")]
fn candidates(ballot_box: &State<BallotBox>) -> Json<Vec<Candidate>> {
    Json(ballot_box.roster().candidates().to_vec())
}

#[post("/api/vote", data = "<submission>")]
async fn vote(
    id: &RequestId,
    submission: Json<BallotSubmission>,
    ballot_box: &State<BallotBox>,
) -> Result<Json<VoteReceipt>> {
    let BallotSubmission {
        ranking,
        credential_id,
    } = submission.into_inner();

    // Redemption and persistence block, so keep them off the async workers.
    let ballot_box = ballot_box.inner().clone();
    let outcome = task::spawn_blocking(move || ballot_box.submit(ranking, credential_id))
        .await
        .map_err(|e| {
            Error::Status(
                Status::InternalServerError,
                format!("Ballot submission did not complete: {e}"),
            )
        })?;

    match outcome {
        Ok(ballot) => {
            info!("req{id}: accepted ballot for {}", ballot.credential_id);
            Ok(Json(VoteReceipt::default()))
        }
        Err(e) => {
            warn!("req{id}: rejected ballot ({}): {e}", e.kind());
            Err(e.into())
        }
    }
}

/// A ranked ballot as posted by the voting page.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct BallotSubmission {
    #[serde(default, alias = "ballot")]
    ranking: Vec<Candidate>,
    #[serde(default, alias = "token")]
    credential_id: Option<CredentialId>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VoteReceipt {
    message: String,
}

impl Default for VoteReceipt {
    fn default() -> Self {
        Self {
            message: "Vote recorded successfully".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Header},
        local::asynchronous::Client,
    };

    use crate::error::ErrorBody;

    use super::*;

    async fn post_vote(client: &Client, body: Value) -> (Status, Option<ErrorBody>) {
        let response = client
            .post(uri!(vote))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        let status = response.status();
        let error = if status == Status::Ok {
            None
        } else {
            response.into_json().await
        };
        (status, error)
    }

    #[backend_test]
    async fn health_reports_ok(client: Client) {
        let response = client.get(uri!(health)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(Some(json!({"ok": true})), response.into_json().await);
    }

    #[backend_test]
    async fn candidates_in_roster_order(client: Client) {
        let response = client.get(uri!(candidates)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let names: Vec<Candidate> = response.into_json().await.unwrap();
        assert_eq!(names, crate::model::Roster::example().candidates());
    }

    #[backend_test]
    async fn vote_accepted_once(client: Client, ballot_box: BallotBox) {
        let credential = ballot_box.issue().unwrap();
        let body = json!({
            "ranking": ["Carol", "Alice", "Dave"],
            "credentialId": credential.id,
        });

        let response = client
            .post(uri!(vote))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let receipt: VoteReceipt = response.into_json().await.unwrap();
        assert_eq!(receipt.message, "Vote recorded successfully");
        assert_eq!(ballot_box.ballots().len(), 1);

        let (status, error) = post_vote(&client, body).await;
        assert_eq!(Status::Forbidden, status);
        assert_eq!(error.unwrap().kind.as_deref(), Some("CredentialAlreadyUsed"));
        assert_eq!(ballot_box.ballots().len(), 1);
    }

    #[backend_test]
    async fn vote_accepts_original_field_names(client: Client, ballot_box: BallotBox) {
        let credential = ballot_box.issue().unwrap();
        let (status, _) = post_vote(
            &client,
            json!({
                "ballot": ["Bob", "Dave", "Alice"],
                "token": credential.id,
            }),
        )
        .await;
        assert_eq!(Status::Ok, status);
        let expected: Vec<Candidate> = vec!["Bob".into(), "Dave".into(), "Alice".into()];
        assert_eq!(ballot_box.ballots()[0].ranking, expected);
    }

    #[backend_test]
    async fn vote_rejections(client: Client, ballot_box: BallotBox) {
        let credential = ballot_box.issue().unwrap();

        let cases = [
            (
                json!({"ranking": ["Alice", "Bob", "Carol"]}),
                Status::BadRequest,
                "MissingCredential",
            ),
            (
                json!({"ranking": ["Alice", "Bob", "Carol"], "credentialId": "forged"}),
                Status::Forbidden,
                "InvalidCredential",
            ),
            (
                json!({"ranking": ["Alice", "Bob"], "credentialId": credential.id}),
                Status::BadRequest,
                "WrongBallotLength",
            ),
            (
                json!({"ranking": ["Alice", "Bob", "Alice"], "credentialId": credential.id}),
                Status::BadRequest,
                "DuplicateCandidate",
            ),
            (
                json!({"ranking": ["Alice", "Bob", "Mallory"], "credentialId": credential.id}),
                Status::BadRequest,
                "UnknownCandidate",
            ),
        ];
        for (body, expected_status, expected_kind) in cases {
            let (status, error) = post_vote(&client, body).await;
            assert_eq!(expected_status, status);
            assert_eq!(error.unwrap().kind.as_deref(), Some(expected_kind));
        }

        // Nothing was consumed by the rejected attempts.
        assert!(ballot_box.ballots().is_empty());
        assert!(ballot_box.credentials().iter().all(|c| !c.used));
    }

    #[backend_test]
    async fn vote_without_content_type_is_still_checked(client: Client) {
        let response = client
            .post(uri!(vote))
            .body(json!({"ranking": ["Alice", "Bob", "Carol"]}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let error: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(error.kind.as_deref(), Some("MissingCredential"));
    }

    #[backend_test]
    async fn malformed_body_is_a_json_error(client: Client) {
        let response = client
            .post(uri!(vote))
            .header(ContentType::JSON)
            .body("{ not json")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let error: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(error.error, "Bad Request");
    }

    #[backend_test]
    async fn cors_headers_are_set(client: Client) {
        let response = client
            .options("/api/vote")
            .header(Header::new("Origin", "https://vote.example.org"))
            .dispatch()
            .await;
        assert_eq!(Status::NoContent, response.status());
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("https://vote.example.org")
        );
    }
}
