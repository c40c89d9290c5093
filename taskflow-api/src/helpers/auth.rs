use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::database::{users, Database};
use crate::handlers::ApiError;
use crate::helpers::security::TokenService;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// The user behind the request's access token.
///
/// The token is read from the `access_token` cookie first, then from an
/// `Authorization: Bearer` header. The user must still exist.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

impl AuthenticatedUser {
    /// Path-scoped routes only serve the caller's own data
    pub fn ensure_owns(&self, user_id: Uuid, not_found: &str) -> Result<(), ApiError> {
        if self.id != user_id {
            return Err(ApiError::NotFound(not_found.to_string()));
        }
        Ok(())
    }
}

fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = extract_token(req);
        let tokens = req.app_data::<web::Data<TokenService>>().cloned();
        let db = req.app_data::<web::Data<Arc<Database>>>().cloned();

        Box::pin(async move {
            let token = token.ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;
            let (tokens, db) = match (tokens, db) {
                (Some(tokens), Some(db)) => (tokens, db),
                _ => return Err(ApiError::Internal("Authentication is not configured".into())),
            };

            let invalid = || ApiError::Unauthorized("Invalid authentication credentials".into());
            let user_id = tokens.verify_token(&token).ok_or_else(invalid)?;

            let user = users::get_user(db.async_connection.clone(), user_id)
                .await?
                .ok_or_else(invalid)?;

            Ok(AuthenticatedUser {
                id: user.id,
                email: user.email,
            })
        })
    }
}

fn same_site(config: &AuthConfig) -> SameSite {
    match config.cookie_same_site.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "lax" => SameSite::Lax,
        _ => SameSite::None,
    }
}

pub fn access_token_cookie(token: &str, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token.to_string())
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(same_site(config))
        .max_age(time::Duration::days(config.token_expiry_days))
        .path("/")
        .finish()
}

/// An expired, empty cookie that makes the browser drop the token
pub fn cleared_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, "")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(same_site(config))
        .max_age(time::Duration::ZERO)
        .path("/")
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_cookie_token_wins_over_header() {
        let req = TestRequest::default()
            .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"))
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();
        assert_eq!(extract_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_header_fallback() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(extract_token(&req).as_deref(), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert_eq!(extract_token(&req), None);
    }

    #[test]
    fn test_cookie_flags_follow_config() {
        let config = AuthConfig {
            cookie_secure: false,
            cookie_same_site: "Lax".to_string(),
            ..AuthConfig::default()
        };

        let cookie = access_token_cookie("tok", &config);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));

        let cleared = cleared_cookie(&config);
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
    }
}
