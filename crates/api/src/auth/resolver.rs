//! Identity resolution: bearer credential → user identity or anonymous.

use axum::http::HeaderMap;

use easel_core::identity::Identity;
use easel_db::repositories::user_repo::UserRepo;
use easel_db::DbPool;

use crate::auth::jwt::{validate_token, JwtConfig};

/// Extract a bearer token from the `Authorization` header.
///
/// Browser WebSocket clients cannot set headers, so callers fall back to a
/// `token` query parameter on the upgrade URL.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

/// Resolve a credential into an [`Identity`].
///
/// Never blocks event delivery and never rejects: a missing, malformed, or
/// expired token, an unknown subject, or a failed user lookup all downgrade
/// to [`Identity::Anonymous`]. The downgrade is logged so expired-token
/// churn stays visible to operators.
pub async fn resolve_identity(
    pool: &DbPool,
    config: &JwtConfig,
    token: Option<&str>,
) -> Identity {
    let Some(token) = token else {
        return Identity::Anonymous;
    };

    let claims = match validate_token(token, config) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Credential rejected, continuing as anonymous");
            return Identity::Anonymous;
        }
    };

    match UserRepo::find_by_id(pool, claims.sub).await {
        Ok(Some(user)) => Identity::User {
            id: user.id,
            name: user.name,
        },
        Ok(None) => {
            tracing::debug!(
                user_id = claims.sub,
                "Token subject not found, continuing as anonymous"
            );
            Identity::Anonymous
        }
        Err(e) => {
            tracing::warn!(error = %e, "User lookup failed, continuing as anonymous");
            Identity::Anonymous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "resolver-test-secret".to_string(),
            access_token_expiry_mins: 60,
        }
    }

    /// A pool that is never connected; resolution paths that would hit the
    /// database report a lookup failure, which must downgrade, not error.
    fn lazy_pool() -> DbPool {
        sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(50))
            .connect_lazy("postgres://localhost:1/unreachable")
            .expect("lazy pool construction is infallible")
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def".to_string()));

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None, "non-bearer schemes are ignored");
    }

    #[tokio::test]
    async fn test_missing_token_is_anonymous() {
        let identity = resolve_identity(&lazy_pool(), &test_config(), None).await;
        assert_matches!(identity, Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_garbage_token_is_anonymous() {
        let identity =
            resolve_identity(&lazy_pool(), &test_config(), Some("not-a-jwt")).await;
        assert_matches!(identity, Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_lookup_failure_downgrades_instead_of_rejecting() {
        // Valid token, unreachable user store: the connection still proceeds.
        let config = test_config();
        let token = crate::auth::jwt::generate_access_token(9, &config).unwrap();
        let identity = resolve_identity(&lazy_pool(), &config, Some(&token)).await;
        assert_matches!(identity, Identity::Anonymous);
    }
}
