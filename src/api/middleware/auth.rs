use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use uuid::Uuid;

use super::session::SESSION_KEY_STAFF_ID;

/// Authentication error responses
#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    SessionError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required. Please log in.",
            )
                .into_response(),
            AuthError::SessionError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error occurred.").into_response()
            }
        }
    }
}

/// Middleware that requires a logged-in staff session
pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let staff_id: Option<Uuid> = session
        .get(SESSION_KEY_STAFF_ID)
        .await
        .map_err(|_| AuthError::SessionError)?;

    if staff_id.is_none() {
        return Err(AuthError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Extension type that holds the authenticated staff ID
#[derive(Debug, Clone)]
pub struct AuthenticatedStaff {
    pub staff_id: Uuid,
}

/// Extracts the authenticated staff ID from the session
pub async fn get_authenticated_staff(session: &Session) -> Result<AuthenticatedStaff, AuthError> {
    let staff_id: Uuid = session
        .get(SESSION_KEY_STAFF_ID)
        .await
        .map_err(|_| AuthError::SessionError)?
        .ok_or(AuthError::Unauthorized)?;

    Ok(AuthenticatedStaff { staff_id })
}
