use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::Error;
use crate::models::user::Actor;
use crate::AppState;

fn bearer_token(req: &Request) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Resolves the caller through the identity service and stores the
/// [`Identity`](crate::models::user::Identity) and [`Actor`] in request
/// extensions. Anything short of a resolved actor is a 401.
pub async fn require_actor(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(&req) else {
        return Error::Unauthorized("Unauthenticated".to_string()).into_response();
    };

    let Some(identity) = state.identity_service.introspect(&token).await else {
        return Error::Unauthorized("Invalid or expired token".to_string()).into_response();
    };
    let Some(actor) = Actor::from_identity(&identity) else {
        return Error::Unauthorized("Token does not identify a user".to_string()).into_response();
    };

    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(actor);
    next.run(req).await
}
