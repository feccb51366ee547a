// src/services/auth.rs
//
// Registro, login e validação de sessão. Senhas com bcrypt (sempre em
// spawn_blocking, o custo do hash não pode bloquear o runtime) e sessões
// com JWT HS256 de 7 dias.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{Claims, LoginUserPayload, NewUser, RegisterUserPayload, User, UserRole},
};

const TOKEN_VALIDITY_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    /// Cria a conta e já devolve o usuário com um token de sessão.
    pub async fn register_user(
        &self,
        payload: RegisterUserPayload,
    ) -> Result<(User, String), AppError> {
        let password_hash = hash_password(payload.password).await?;

        let user = self
            .users
            .create(NewUser {
                username: payload.username,
                password_hash,
                email: payload.email,
                full_name: payload.full_name,
                phone: payload.phone,
                role: payload.role.unwrap_or(UserRole::Homeowner),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "✅ Novo usuário registrado");
        let token = self.create_token(&user)?;
        Ok((user, token))
    }

    pub async fn login_user(&self, payload: LoginUserPayload) -> Result<(User, String), AppError> {
        let user = self
            .users
            .find_by_email(&payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let hash = user.password_hash.clone();
        let password = payload.password;
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(anyhow::Error::from)??;

        if !matches {
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok((user, token))
    }

    /// Valida o Bearer token e carrega o usuário da sessão.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Auth)?;
        if !user.is_active {
            return Err(AppError::Auth);
        }
        Ok(user)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            iat: now.timestamp() as usize,
            exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp() as usize,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    // Token malformado, expirado ou com assinatura errada é tudo a mesma
    // coisa para o cliente: sessão inválida.
    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::Auth)?;
        Ok(data.claims)
    }
}

async fn hash_password(password: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(hash)
}
