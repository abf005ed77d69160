//! Registration, login and JWT issuance.

use bcrypt::{hash, verify, DEFAULT_COST};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use shared::{LoginRequest, RegisterRequest, UpdateDetailsRequest, UpdatePasswordRequest};

use crate::domain::dates::{now_rfc3339, now_utc};
use crate::domain::models::{User, UserRole};
use crate::error::AppError;
use crate::storage::UserRepository;

/// JWT payload: the user id plus issue/expiry timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt_secret: String,
    jwt_expire_days: i64,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt_secret: String, jwt_expire_days: i64) -> Self {
        Self {
            users,
            jwt_secret,
            jwt_expire_days,
        }
    }

    /// Create a user and return them with a signed token. The email unique
    /// index turns races on the same address into a duplicate error.
    pub async fn register(&self, request: RegisterRequest) -> Result<(User, String), AppError> {
        validate_name(&request.name)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash: hash(&request.password, DEFAULT_COST)?,
            role: UserRole::User,
            created_at: now_rfc3339(),
        };
        self.users.insert(&user).await?;
        info!("registered user {}", user.id);

        let token = self.sign_token(&user.id)?;
        Ok((user, token))
    }

    /// Verify credentials and return the user with a fresh token. Missing
    /// user and wrong password are deliberately indistinguishable.
    pub async fn login(&self, request: LoginRequest) -> Result<(User, String), AppError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest(
                "Please provide an email and password".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_email(&request.email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.sign_token(&user.id)?;
        Ok((user, token))
    }

    pub async fn me(&self, user_id: &str) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id of {user_id}")))
    }

    pub async fn update_details(
        &self,
        user_id: &str,
        request: UpdateDetailsRequest,
    ) -> Result<User, AppError> {
        let current = self.me(user_id).await?;
        let name = match request.name {
            Some(name) => {
                validate_name(&name)?;
                name.trim().to_string()
            }
            None => current.name,
        };
        let email = match request.email {
            Some(email) => {
                validate_email(&email)?;
                email.trim().to_lowercase()
            }
            None => current.email,
        };
        self.users.update_details(user_id, &name, &email).await?;
        self.me(user_id).await
    }

    /// Change the password after re-verifying the current one; returns a
    /// fresh token so old sessions can be dropped client-side.
    pub async fn update_password(
        &self,
        user_id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<String, AppError> {
        let user = self.me(user_id).await?;
        if !verify(&request.current_password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Password is incorrect".to_string()));
        }
        validate_password(&request.new_password)?;

        let new_hash = hash(&request.new_password, DEFAULT_COST)?;
        self.users.update_password_hash(user_id, &new_hash).await?;
        self.sign_token(user_id)
    }

    fn sign_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = now_utc().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.jwt_expire_days * 86_400,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.into()))
    }
}

/// Validate and decode a bearer token into its claims
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".to_string())
        }
        _ => AppError::Unauthorized("Invalid token".to_string()),
    })
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Please add a name".to_string()));
    }
    Ok(())
}

// Deliberately loose; the email only has to be deliverable, not RFC-perfect
fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    });
    if !valid {
        return Err(AppError::BadRequest("Please add a valid email".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;

    async fn service() -> AuthService {
        let db = DbConnection::init_test().await.unwrap();
        AuthService::new(UserRepository::new(db), "test-secret".to_string(), 30)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trips() {
        let auth = service().await;
        let (user, token) = auth.register(register_request("alice@example.com")).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(!token.is_empty());

        let claims = decode_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, user.id);

        let (logged_in, _) = auth
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let auth = service().await;
        auth.register(register_request("alice@example.com")).await.unwrap();

        let wrong_password = auth
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "nope-nope".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = auth
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), "Invalid credentials");
        assert_eq!(unknown_email.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn registration_rejects_bad_input() {
        let auth = service().await;
        let mut request = register_request("alice@example.com");
        request.password = "short".to_string();
        assert!(auth.register(request).await.is_err());

        let mut request = register_request("not-an-email");
        request.password = "hunter22".to_string();
        assert!(auth.register(request).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service().await;
        auth.register(register_request("alice@example.com")).await.unwrap();
        let err = auth
            .register(register_request("alice@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate field value entered");
    }

    #[tokio::test]
    async fn password_update_requires_the_current_password() {
        let auth = service().await;
        let (user, _) = auth.register(register_request("alice@example.com")).await.unwrap();

        let err = auth
            .update_password(
                &user.id,
                UpdatePasswordRequest {
                    current_password: "wrong-one".to_string(),
                    new_password: "new-password".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Password is incorrect");

        auth.update_password(
            &user.id,
            UpdatePasswordRequest {
                current_password: "hunter22".to_string(),
                new_password: "new-password".to_string(),
            },
        )
        .await
        .unwrap();

        auth.login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "new-password".to_string(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected() {
        let auth = AuthService {
            users: UserRepository::new(DbConnection::init_test().await.unwrap()),
            jwt_secret: "test-secret".to_string(),
            jwt_expire_days: -1,
        };
        let token = auth.sign_token("user-1").unwrap();
        let err = decode_token("test-secret", &token).unwrap_err();
        assert_eq!(err.to_string(), "Token expired");
    }
}
