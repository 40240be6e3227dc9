use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Error, Result},
    model::auth::{AdminToken, AUTH_TOKEN_COOKIE},
};

pub fn routes() -> Vec<Route> {
    routes![login, logout]
}

#[post("/api/admin/login", data = "<credentials>", format = "json")]
fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    config: &State<Config>,
) -> Result<Json<LoginResponse>> {
    if !config.admin_matches(&credentials.username, &credentials.password) {
        warn!("Failed admin login as '{}'", credentials.username);
        return Err(Error::Status(
            Status::Forbidden,
            "Invalid credentials".to_string(),
        ));
    }

    let token = AdminToken::new(&credentials.username).encode(config)?;
    cookies.add(AdminToken::cookie(token.clone(), config));
    info!("Admin '{}' logged in", credentials.username);

    Ok(Json(LoginResponse { token }))
}

#[delete("/api/admin/login")]
fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AdminCredentials {
    username: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LoginResponse {
    token: String,
}
