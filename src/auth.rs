use crate::errors::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Pulls the shared key out of an `Authorization` value. Accepts both
/// `<token>` and `Bearer <token>`.
pub fn extract_token(header: &str) -> &str {
    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() == 2 { parts[1] } else { parts[0] }
}

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .filter(|value| !value.is_empty())
    else {
        return Err(AppError::unauthorized("Missing Authorization header"));
    };
    let header = header
        .to_str()
        .map_err(|_| AppError::forbidden("Invalid API key"))?;
    if extract_token(header) != &*state.api_key {
        return Err(AppError::forbidden("Invalid API key"));
    }
    Ok(next.run(request).await)
}
