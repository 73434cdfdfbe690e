use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::decode;
use tracing::{debug, warn};

use crate::{
    auth::models::{Claims, SubjectId},
    common::{
        app_state::{AppState, JwtKeys},
        server_error::ServerError,
    },
    system_log::models::{LogAction, LogCeverity},
};

pub async fn auth_mw(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(auth_header) = extract_header(AUTHORIZATION.as_str(), req.headers()) else {
        warn!("Missing authorization header");
        return Err(ServerError::Unauthorized(
            "Missing authorization header".into(),
        ));
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        state
            .syslog()
            .action(LogAction::Read)
            .ceverity(LogCeverity::Warning)
            .function("auth_mw")
            .description("Authorization header without bearer scheme")
            .log_async();

        return Err(ServerError::Unauthorized("Missing auth token".into()));
    };

    let claims = verify_jwt(token, state.get_jwt_keys())?;
    let Some(user_id) = claims.user_id() else {
        return Err(ServerError::Unauthorized(
            "Token subject is not a valid user id".into(),
        ));
    };

    let subject = SubjectId::Registered(user_id);
    debug!("Request by subject: {:?}", subject);
    req.extensions_mut().insert(subject);

    Ok(next.run(req).await)
}

fn extract_header(key: &str, header_map: &HeaderMap) -> Option<String> {
    header_map
        .get(key)
        .and_then(|header| header.to_str().ok())
        .map(|s| s.to_owned())
}

pub fn verify_jwt(token: &str, keys: &JwtKeys) -> Result<Claims, ServerError> {
    decode::<Claims>(token, &keys.decoding, &keys.validation)
        .map(|data| data.claims)
        .map_err(|e| {
            warn!("JWT validation failed: {}", e);
            ServerError::Unauthorized("Invalid auth token".into())
        })
}
