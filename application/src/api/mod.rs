//! HTTP API definitions.

pub mod session;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;

use crate::{gate, Service};

/// Builds the [`Router`] of all the API endpoints served by the provided
/// [`Service`].
pub fn router(service: Service) -> Router {
    let admin = Router::new()
        .route("/session", get(session::current))
        .route_layer(middleware::from_fn(gate::require_auth));

    Router::new()
        .route("/", get(home))
        .route("/authenticate", post(session::authenticate))
        .route("/refresh", get(session::refresh))
        .route("/logout", get(session::logout))
        .nest("/admin", admin)
        .layer(Extension(service))
}

/// Status of the running server.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Status {
    /// Always `active`.
    pub status: &'static str,

    /// Greeting message.
    pub message: &'static str,

    /// Version of the running server.
    pub version: &'static str,
}

/// Answers with the [`Status`] of the running server.
#[expect(clippy::unused_async, reason = "handlers are `async`")]
pub async fn home() -> Json<Status> {
    Json(Status {
        status: "active",
        message: "Session authentication API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use axum::{body::Body, Router};
    use common::DateTime;
    use http::{header, Request, StatusCode};
    use service::{
        command::{Command as _, IssueTokenPair},
        domain::{session::TokenPair, user},
        infra::Postgres,
        jwt,
    };
    use tower::ServiceExt as _;

    use crate::{config, Service};

    fn service() -> Service {
        let auth = config::Auth {
            algorithm: jwt::HmacAlgorithm::Hs256,
            jwt_secret: "s3cret".into(),
            issuer: "api.example".into(),
            audience: "web.example".into(),
            ..config::Auth::default()
        };
        let postgres =
            Postgres::new(&config::Postgres::default().into()).unwrap();
        Service::new(auth.try_into().unwrap(), postgres)
    }

    fn principal() -> user::Principal {
        user::Principal {
            id: user::Id::from(7),
            first_name: user::Name::new("Ada").unwrap(),
            last_name: user::Name::new("Lovelace").unwrap(),
        }
    }

    async fn tokens(service: &Service, issued_at: DateTime) -> TokenPair {
        service
            .execute(IssueTokenPair {
                principal: principal(),
                issued_at,
            })
            .await
            .unwrap()
    }

    async fn send(
        router: Router,
        req: Request<Body>,
    ) -> (StatusCode, http::HeaderMap, String) {
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> http::request::Builder {
        Request::builder().method("GET").uri(uri)
    }

    #[tokio::test]
    async fn reports_status() {
        let (status, _, body) = send(
            super::router(service()),
            get("/").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "active");
    }

    #[tokio::test]
    async fn gate_admits_valid_access_token() {
        let service = service();
        let TokenPair { access_token, .. } =
            tokens(&service, DateTime::now()).await;

        let (status, headers, body) = send(
            super::router(service),
            get("/admin/session")
                .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::VARY], "Authorization");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["subject"], "7");
        assert_eq!(json["name"], "Ada Lovelace");
        assert_eq!(json["issuer"], "api.example");
    }

    #[tokio::test]
    async fn gate_rejects_with_bare_unauthorized() {
        let service = service();
        let TokenPair { access_token, .. } = tokens(
            &service,
            DateTime::now() - Duration::from_secs(16 * 60),
        )
        .await;

        for authorization in [
            None,
            Some(String::new()),
            Some(format!("Bearer  {access_token}")),
            Some(access_token.to_string()),
            Some(format!("Bearer {access_token}")),
            Some("Bearer not.a.token".to_owned()),
        ] {
            let mut req = get("/admin/session");
            if let Some(value) = &authorization {
                req = req.header(header::AUTHORIZATION, value);
            }

            let (status, headers, body) = send(
                super::router(service.clone()),
                req.body(Body::empty()).unwrap(),
            )
            .await;

            assert_eq!(
                status,
                StatusCode::UNAUTHORIZED,
                "authorization: {authorization:?}",
            );
            assert_eq!(headers[header::VARY], "Authorization");
            assert!(body.is_empty(), "body: {body}");
        }
    }

    #[tokio::test]
    async fn logout_revokes_cookie() {
        let (status, headers, _) = send(
            super::router(service()),
            get("/logout").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        let cookie = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("jwt-refresh_token=;"), "{cookie}");
        assert!(cookie.contains("Max-Age=-1"), "{cookie}");
        assert!(cookie.contains("HttpOnly"), "{cookie}");
        assert!(cookie.contains("Secure"), "{cookie}");
        assert!(cookie.contains("SameSite=Strict"), "{cookie}");
        assert!(cookie.contains("Path=/"), "{cookie}");
    }

    #[tokio::test]
    async fn refresh_requires_valid_cookie() {
        let service = service();
        let foreign = jwt::Codec::new(jwt::HmacAlgorithm::Hs256, "other");
        let forged = Service::new(
            service::Config {
                jwt: foreign,
                ..service.config().clone()
            },
            service.database().clone(),
        );
        let TokenPair { refresh_token, .. } =
            tokens(&forged, DateTime::now()).await;

        for cookie in [None, Some(format!("jwt-refresh_token={refresh_token}"))]
        {
            let mut req = get("/refresh");
            if let Some(value) = &cookie {
                req = req.header(header::COOKIE, value);
            }

            let (status, _, body) = send(
                super::router(service.clone()),
                req.body(Body::empty()).unwrap(),
            )
            .await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "cookie: {cookie:?}");
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(
                json,
                serde_json::json!({
                    "error": true,
                    "message": "invalid token",
                    "code": "INVALID_TOKEN",
                }),
            );
        }
    }

    #[tokio::test]
    async fn authenticate_rejects_malformed_requests() {
        for (body, message) in [
            (r#"{"email":"not-an-email","password":"x"}"#, "invalid credentials"),
            (r#"{"email":"#, ""),
        ] {
            let (status, _, resp) = send(
                super::router(service()),
                Request::builder()
                    .method("POST")
                    .uri("/authenticate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            let json: serde_json::Value = serde_json::from_str(&resp).unwrap();
            assert_eq!(json["error"], true);
            if !message.is_empty() {
                assert_eq!(json["message"], message);
            }
        }
    }
}
