mod token;

pub use token::{AdminToken, AuthError, AUTH_TOKEN_COOKIE};
