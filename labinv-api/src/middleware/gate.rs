/// Authorization gate
///
/// Two middleware functions guard every protected route:
///
/// 1. [`require_session`] loads the [`SessionUser`] from the session and
///    inserts it into the request extensions, or answers 401
/// 2. [`require_roles`] checks that user's role against a [`RoleSet`], or
///    answers 403
///
/// Routes attach both with `route_layer`, role check first so the session
/// check wraps it:
///
/// ```text
/// Router::new()
///     .route("/api/usuarios", get(list_users))
///     .route_layer(from_fn_with_state(RoleSet::ADMIN, require_roles))
///     .route_layer(from_fn(require_session))
/// ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use labinv_shared::auth::{
    authorization::{authorize, RoleSet},
    session::{SessionUser, SESSION_USER_KEY},
};
use tower_sessions::Session;

use crate::error::{ApiError, ApiResult};

/// Reads the logged-in identity from the session
///
/// A session store failure is logged and treated as "not logged in".
pub async fn current_user(session: &Session) -> Option<SessionUser> {
    match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read session");
            None
        }
    }
}

/// Stage 1: rejects requests without a logged-in session (401)
pub async fn require_session(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user = current_user(&session)
        .await
        .ok_or(ApiError::Unauthenticated)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Stage 2: rejects sessions whose role is outside `allowed` (403)
///
/// Must run after [`require_session`].
pub async fn require_roles(
    State(allowed): State<RoleSet>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user = request
        .extensions()
        .get::<SessionUser>()
        .ok_or(ApiError::Unauthenticated)?;

    if let Err(e) = authorize(user, allowed) {
        tracing::debug!(correo = %user.correo, "{}", e);
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
