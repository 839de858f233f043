/*!
 * # Authentication and Authorization Module
 *
 * JWT bearer authentication for the dashboard roles, with role-based
 * permission verification. Logins are role-scoped (`/auth/admin/login`,
 * `/auth/owner/login`, `/auth/staff/login`) so a staff credential can never
 * mint an owner session. Logout blacklists the token id until expiry.
 *
 * The authenticated context is an explicit `AuthUser` value extracted per
 * request and passed down into services; nothing here is ambient state.
 */

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::user;
use crate::errors::ServiceError;

mod permissions;

pub use permissions::{consts, is_permission_implied, permissions_for_role, UserRole};

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,                   // Subject (user ID)
    pub name: Option<String>,          // User's name
    pub email: Option<String>,         // User's email
    pub role: String,                  // Dashboard role
    pub permissions: Vec<String>,      // Permissions derived from the role
    pub restaurant_id: Option<String>, // Tenant partition
    pub jti: String,                   // JWT ID (unique identifier for this token)
    pub iat: i64,                      // Issued at time
    pub exp: i64,                      // Expiration time
    pub nbf: i64,                      // Not valid before time
    pub iss: String,                   // Issuer
    pub aud: String,                   // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub permissions: Vec<String>,
    pub restaurant_id: Option<String>,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Check if the user is a platform administrator
    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    /// Check if the user holds a permission, honoring wildcards
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin()
            || self
                .permissions
                .iter()
                .any(|p| is_permission_implied(p, permission))
    }

    /// The tenant this session is bound to, if any
    pub fn restaurant_id(&self) -> Option<Uuid> {
        self.restaurant_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            access_token_expiration,
        }
    }
}

/// Token blacklist entry
#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Authentication service that handles credential checks, token issuance
/// and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Verify credentials for one of the allowed roles and issue a token.
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
        allowed_roles: &[UserRole],
    ) -> Result<LoginResponse, AuthError> {
        let db = &*self.db;

        let user = user::Entity::find()
            .filter(user::Column::Email.eq(credentials.email.trim().to_ascii_lowercase()))
            .one(db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.active {
            warn!(user_id = %user.id, "Login attempt for deactivated account");
            return Err(AuthError::InvalidCredentials);
        }

        if !verify_password(&credentials.password, &user.password_hash)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let role = UserRole::from_str(&user.role)
            .ok_or_else(|| AuthError::InternalError(format!("Unknown role {}", user.role)))?;
        if !allowed_roles.contains(&role) {
            warn!(user_id = %user.id, role = %user.role, "Login attempt against wrong role portal");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.generate_token(&user)?;

        // Record the successful login; not fatal if the write fails.
        let user_id = user.id;
        let mut active: user::ActiveModel = user.clone().into();
        active.last_login = Set(Some(Utc::now()));
        if let Err(e) = active.update(db).await {
            warn!(user_id = %user_id, error = %e, "Failed to record last_login");
        }

        info!(user_id = %user_id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            user: UserInfo {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
                restaurant_id: user.restaurant_id,
            },
        })
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let role = UserRole::from_str(&user.role)
            .ok_or_else(|| AuthError::InternalError(format!("Unknown role {}", user.role)))?;
        let permissions = permissions_for_role(role)
            .into_iter()
            .map(String::from)
            .collect();

        let claims = Claims {
            sub: user.id.to_string(),
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            role: user.role.clone(),
            permissions,
            restaurant_id: user.restaurant_id.map(|id| id.to_string()),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and extract the claims
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_token_blacklisted(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Revoke a token (add it to the blacklist)
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.validate_token(token).await?;

        let expiry = Utc::now() + ChronoDuration::seconds(claims.exp - Utc::now().timestamp());
        let blacklisted_token = BlacklistedToken {
            jti: claims.jti,
            expiry,
        };

        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.push(blacklisted_token);

        // Drop entries that have expired anyway.
        let now = Utc::now();
        blacklist.retain(|t| t.expiry > now);

        Ok(())
    }

    /// Check if a token is blacklisted
    async fn is_token_blacklisted(&self, token_id: &str) -> bool {
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist.iter().any(|t| t.jti == token_id)
    }
}

/// Hash a password with Argon2 using a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

/// Verify a password against a stored Argon2 PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Successful login payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub restaurant_id: Option<Uuid>,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Authentication token has been revoked".to_string(),
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Internal server error".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::DatabaseError(_) | Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Extract the authenticated user from request extensions, falling back to
/// validating the bearer header directly when no middleware ran.
#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth_service = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or_else(|| {
                AuthError::InternalError("Authentication service not available".to_string())
            })?;

        extract_auth_from_headers(&parts.headers, &auth_service).await
    }
}

/// Extract authentication info from request headers
async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                let claims = auth_service.validate_token(token).await?;

                return Ok(AuthUser {
                    user_id: claims.sub,
                    name: claims.name,
                    email: claims.email,
                    role: claims.role,
                    permissions: claims.permissions,
                    restaurant_id: claims.restaurant_id,
                    token_id: claims.jti,
                });
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Authentication middleware that extracts and validates auth tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Permission middleware to check if a user has the required permission
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    if !user.has_permission(&required_permission) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

/// Authentication routes; role-scoped login portals plus verify/logout.
pub fn auth_routes() -> Router<Arc<AuthService>> {
    Router::new()
        .route("/admin/login", post(admin_login_handler))
        .route("/owner/login", post(owner_login_handler))
        .route("/staff/login", post(staff_login_handler))
        .route("/verify", get(verify_handler))
        .route("/logout", post(logout_handler))
        .layer(DefaultBodyLimit::max(1024 * 64)) // 64KB limit
}

async fn admin_login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    let response = auth_service
        .login(&credentials, &[UserRole::Admin])
        .await?;
    Ok(Json(response))
}

async fn owner_login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    let response = auth_service
        .login(&credentials, &[UserRole::Owner])
        .await?;
    Ok(Json(response))
}

/// Shared portal for on-premise roles.
async fn staff_login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    let response = auth_service
        .login(
            &credentials,
            &[UserRole::Manager, UserRole::Staff, UserRole::Kitchen],
        )
        .await?;
    Ok(Json(response))
}

/// Echo back the session bound to the presented token.
async fn verify_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<AuthUser>, AuthError> {
    let user = extract_auth_from_headers(&headers, &auth_service).await?;
    Ok(Json(user))
}

async fn logout_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                auth_service.revoke_token(token).await?;
                return Ok(Json(
                    serde_json::json!({ "message": "Successfully logged out" }),
                ));
            }
        }
    }

    Err(AuthError::MissingAuth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DatabaseConnection;

    fn test_service() -> AuthService {
        let config = AuthConfig::new(
            "test_secret_that_is_definitely_long_enough_for_hs256".to_string(),
            "rms-auth".to_string(),
            "rms-api".to_string(),
            Duration::from_secs(3600),
        );
        AuthService::new(config, Arc::new(DatabaseConnection::Disconnected))
    }

    fn test_user(role: &str) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            restaurant_id: Some(Uuid::new_v4()),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: String::new(),
            role: role.to_string(),
            active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn issued_tokens_validate_and_carry_tenant() {
        let service = test_service();
        let user = test_user("manager");

        let token = service.generate_token(&user).unwrap();
        let claims = service.validate_token(&token).await.unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "manager");
        assert_eq!(
            claims.restaurant_id,
            user.restaurant_id.map(|id| id.to_string())
        );
        assert!(!claims.permissions.is_empty());
    }

    #[tokio::test]
    async fn revoked_tokens_are_rejected() {
        let service = test_service();
        let user = test_user("staff");

        let token = service.generate_token(&user).unwrap();
        service.revoke_token(&token).await.unwrap();

        assert_matches::assert_matches!(
            service.validate_token(&token).await,
            Err(AuthError::RevokedToken)
        );
    }

    #[tokio::test]
    async fn garbage_tokens_are_invalid() {
        let service = test_service();
        assert_matches::assert_matches!(
            service.validate_token("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn tokens_from_a_different_secret_are_rejected() {
        let service = test_service();
        let other = AuthService::new(
            AuthConfig::new(
                "another_secret_that_is_also_long_enough_for_hs256".to_string(),
                "rms-auth".to_string(),
                "rms-api".to_string(),
                Duration::from_secs(3600),
            ),
            Arc::new(DatabaseConnection::Disconnected),
        );
        let token = other.generate_token(&test_user("owner")).unwrap();

        assert_matches::assert_matches!(
            service.validate_token(&token).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn password_hashing_round_trips() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn auth_user_permission_checks() {
        let user = AuthUser {
            user_id: Uuid::new_v4().to_string(),
            name: None,
            email: None,
            role: "staff".to_string(),
            permissions: permissions_for_role(UserRole::Staff)
                .into_iter()
                .map(String::from)
                .collect(),
            restaurant_id: None,
            token_id: "jti".to_string(),
        };

        assert!(user.has_permission(consts::ORDERS_CREATE));
        assert!(!user.has_permission(consts::MENU_MANAGE));

        let admin = AuthUser {
            role: "admin".to_string(),
            permissions: vec!["*".to_string()],
            ..user
        };
        assert!(admin.has_permission(consts::MENU_MANAGE));
    }
}
