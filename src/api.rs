use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

mod admin;
mod auth;
mod public;

#[cfg(test)]
pub(crate) use auth::AdminCredentials;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes.extend(auth::routes());
    routes.extend(routes![crate::cors::preflight]);
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Render unmatched routes, failed guards and malformed bodies as JSON errors.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody::new(status.reason_lossy()))
}
