use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    routing::{get, post},
    Json,
};
use log::{info, warn};
use serde_json::{json, Value};

use crate::{
    errors::{ServerError, ServerResult},
    schemas::{LoginSchema, ValidatedJson},
    Router, ServerContext,
};

/// Proof that the request carried a valid admin token.
///
/// A missing header, a scheme other than Bearer, and a bad or expired token are
/// all rejected the same way.
pub struct AdminSession;

#[async_trait]
impl FromRequestParts<ServerContext> for AdminSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        context: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .and_then(|x| x.strip_prefix("Bearer "))
            .ok_or(ServerError::Unauthorized)?;

        if context.reveal.auth.verify_token(token.trim()) {
            Ok(Self)
        } else {
            Err(ServerError::Unauthorized)
        }
    }
}

async fn login(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Json<Value>> {
    if !context.reveal.auth.verify_password(&body.password) {
        warn!("Rejected admin login attempt");
        return Err(ServerError::InvalidCredentials);
    }

    let token = context.reveal.auth.generate_token()?;
    info!("Admin logged in");

    Ok(Json(json!({ "token": token })))
}

async fn session(_session: AdminSession) -> Json<Value> {
    Json(json!({ "admin": true }))
}

pub fn router() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/session", get(session))
}
