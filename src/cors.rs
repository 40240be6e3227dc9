use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Header, Status},
    Request, Response, State,
};

use crate::config::Config;

/// A fairing that lets the configured frontend origin call the API.
#[derive(Debug, Copy, Clone)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let config = match req.guard::<&State<Config>>().await.succeeded() {
            Some(config) => config,
            None => return,
        };
        res.set_header(Header::new(
            "Access-Control-Allow-Origin",
            config.frontend_origin().to_string(),
        ));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, DELETE, OPTIONS",
        ));
        res.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Authorization, Content-Type",
        ));
        res.set_header(Header::new("Vary", "Origin"));
    }
}

/// Answer CORS preflight requests for any path.
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
