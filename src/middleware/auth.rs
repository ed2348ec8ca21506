use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use subtle::ConstantTimeEq;

/// Operator identity carried by the internal surface's bearer tokens. The
/// organization id scopes every candidate operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub org_id: i64,
}

fn unauthorized(reason: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": reason })),
    )
        .into_response()
}

fn decode_claims(req: &Request) -> Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| unauthorized("invalid_token"))
}

/// Operator surface: requires a valid bearer token with an elevated role.
pub async fn require_operator(mut req: Request, next: Next) -> Response {
    let claims = match decode_claims(&req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };

    let role = claims.role.clone().unwrap_or_default();
    let allowed = ["admin", "hr"];
    if !allowed.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
        return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response();
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Machine callback surface: a shared secret header, compared in constant
/// time, distinct from operator sessions.
pub async fn require_agent_secret(req: Request, next: Next) -> Response {
    let Some(secret_hdr) = req.headers().get("x-agent-secret") else {
        return unauthorized("missing_agent_secret");
    };
    let Ok(provided) = secret_hdr.to_str() else {
        return unauthorized("invalid_secret_header");
    };

    let expected = &crate::config::get_config().agent_secret;
    if !bool::from(ConstantTimeEq::ct_eq(
        provided.as_bytes(),
        expected.as_bytes(),
    )) {
        return unauthorized("invalid_agent_secret");
    }
    next.run(req).await
}
