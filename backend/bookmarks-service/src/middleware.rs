//! Request identity supplied by the upstream auth layer
use crate::domain::models::MAX_USERNAME_LEN;
use actix_web::{
    error::{ErrorBadRequest, ErrorUnauthorized},
    Error, FromRequest, HttpRequest,
};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Optional header carrying the authenticated user's display name
pub const USER_NAME_HEADER: &str = "X-User-Name";

/// Authenticated user making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerId {
    pub id: Uuid,
    pub username: Option<String>,
}

fn viewer_from_request(req: &HttpRequest) -> Result<ViewerId, Error> {
    let id = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| ErrorUnauthorized("Missing X-User-Id header"))?
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .ok_or_else(|| ErrorUnauthorized("Invalid user ID"))?;

    let username = match req.headers().get(USER_NAME_HEADER) {
        None => None,
        Some(value) => {
            let name = value
                .to_str()
                .map_err(|_| ErrorBadRequest("X-User-Name must be visible ASCII"))?
                .trim();
            if name.chars().count() > MAX_USERNAME_LEN {
                return Err(ErrorBadRequest("X-User-Name too long"));
            }
            (!name.is_empty()).then(|| name.to_string())
        }
    };

    Ok(ViewerId { id, username })
}

impl FromRequest for ViewerId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(viewer_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_extracts_viewer_from_headers() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .insert_header((USER_NAME_HEADER, " alice "))
            .to_http_request();
        let viewer = ViewerId::extract(&req).await.unwrap();
        assert_eq!(viewer.id, id);
        assert_eq!(viewer.username.as_deref(), Some("alice"));

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .to_http_request();
        assert_eq!(ViewerId::extract(&req).await.unwrap().username, None);
    }

    #[actix_web::test]
    async fn test_missing_or_bad_header_is_rejected() {
        let req = TestRequest::default().to_http_request();
        assert!(ViewerId::extract(&req).await.is_err());

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "nope"))
            .to_http_request();
        assert!(ViewerId::extract(&req).await.is_err());

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .insert_header((USER_NAME_HEADER, "x".repeat(MAX_USERNAME_LEN + 1)))
            .to_http_request();
        assert!(ViewerId::extract(&req).await.is_err());
    }
}
