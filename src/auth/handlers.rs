use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{LoginReq, LoginResponse},
};

/// Compares without short-circuiting on the first differing byte.
fn passcode_matches(candidate: &str, expected: &str) -> bool {
    let (a, b) = (candidate.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Shared passcode login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 401, description = "Wrong passcode", body = Object, example = json!({
            "detail": "Codice errato"
        })),
        (status = 429, description = "Too many attempts")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(payload, config))]
pub async fn login(
    payload: web::Json<LoginReq>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    if !passcode_matches(&payload.code, &config.access_code) {
        info!("Invalid credentials: passcode mismatch");
        return Err(AppError::Auth("Codice errato".to_string()));
    }

    info!("Login successful");
    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login riuscito".to_string(),
        token: config.session_token.clone(),
    }))
}
