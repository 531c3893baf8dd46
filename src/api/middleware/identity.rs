//! Owner identity middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{error::AppError, state::AppState};

/// Name of the cookie carrying the signed owner id.
pub const OWNER_COOKIE: &str = "user_id";

/// Attaches the caller's [`Owner`](crate::domain::entities::Owner) to the
/// request.
///
/// # Cookie Format
///
/// ```text
/// Cookie: user_id=<owner>.<hex HMAC-SHA256>
/// ```
///
/// # Flow
///
/// 1. Read the `user_id` cookie, if any
/// 2. Verify its signature; a missing or forged cookie gets a fresh owner
/// 3. Insert the owner into request extensions for handlers
/// 4. Re-issue the signed cookie on the response
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/user/urls", get(user_links_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), identity::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookie_value(req.headers(), OWNER_COOKIE);
    let (owner, fresh) = st.identity.resolve(token)?;

    if fresh {
        debug!(owner = %owner, "Issued new owner identity");
    }

    let cookie = format!(
        "{OWNER_COOKIE}={}; Path=/; HttpOnly",
        st.identity.sign(&owner)
    );

    req.extensions_mut().insert(owner);
    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Returns the value of cookie `name` from the `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
