//! Admin token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use pmx_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carried the admin credential.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(_auth: AdminToken) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
///
/// Accepts `Authorization: Bearer <token>` as well as a bare
/// `Authorization: <token>`, matching what existing clients send. Any
/// failure yields a 401 with the fixed `Unauthorized access` message; the
/// body never reveals whether the header was missing or merely wrong.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unauthorized)?;

        let token = header.strip_prefix("Bearer ").unwrap_or(header);

        if !state.authenticator.verify(token) {
            return Err(unauthorized());
        }
        Ok(AdminToken)
    }
}

fn unauthorized() -> AppError {
    AppError::Core(CoreError::Unauthorized("Unauthorized access".into()))
}
