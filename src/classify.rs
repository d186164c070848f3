//! Decides what happens to a non-success response.

use reqwest::StatusCode;

use crate::request_context::Attempt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// 404: handed back untouched.
    NotFound,
    /// 401 that a token refresh may recover.
    AuthExpired,
    /// 401 that cannot be recovered locally; the session ends.
    AuthExhausted(&'static str),
    /// 5xx: announced on the global error channel, then rejected.
    ServerError,
    Unclassified,
}

pub fn classify(status: StatusCode, body: &str, attempt: &Attempt) -> Disposition {
    if status == StatusCode::NOT_FOUND {
        return Disposition::NotFound;
    }
    if status == StatusCode::UNAUTHORIZED {
        if refresh_token_already_used(body) {
            return Disposition::AuthExhausted("refresh token already used");
        }
        if attempt.budget_exhausted() {
            return Disposition::AuthExhausted("retry budget exhausted");
        }
        if attempt.retried {
            return Disposition::AuthExhausted("unauthorized after refresh");
        }
        return Disposition::AuthExpired;
    }
    if status.is_server_error() {
        return Disposition::ServerError;
    }
    Disposition::Unclassified
}

fn refresh_token_already_used(body: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("already used") || body.contains("already been used")
}
