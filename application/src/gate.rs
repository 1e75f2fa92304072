//! Authentication gate guarding protected routes.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse as _, Response},
    Extension,
};
use http::{header, HeaderValue};
use service::command::{verify_access_token, Command as _, VerifyAccessToken};

use crate::Service;

/// Verified caller of a protected route.
///
/// Available as an [`Extension`] to every handler behind [`require_auth`].
pub type Session = verify_access_token::Output;

/// Middleware admitting only requests bearing a valid access token in their
/// `Authorization` header.
///
/// Any verification failure is answered with a bare
/// [`http::StatusCode::UNAUTHORIZED`], without telling its reason to the
/// client. Every response varies by `Authorization`.
pub async fn require_auth(
    Extension(service): Extension<Service>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|h| String::from_utf8_lossy(h.as_bytes()).into_owned());

    let mut resp = match service.execute(VerifyAccessToken::new(header)).await {
        Ok(session) => {
            drop(req.extensions_mut().insert::<Session>(session));
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("access token rejected: {}", e.as_ref());
            http::StatusCode::UNAUTHORIZED.into_response()
        }
    };

    _ = resp
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    resp
}
