use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use tracing::info;

use crate::{
    common::server_error::ServerError, config::config::CONFIG,
    system_log::builder::SystemLogBuilder,
};

pub struct AppState {
    pool: Pool<Postgres>,
    jwt_keys: JwtKeys,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub validation: Validation,
}

impl JwtKeys {
    pub fn from_secret(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl AppState {
    pub async fn from_connection_string(connection_string: &str) -> Result<Arc<Self>, ServerError> {
        let pool = PgPoolOptions::new()
            .max_connections(CONFIG.database.max_connections)
            .connect(connection_string)
            .await?;

        if CONFIG.database.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations applied");
        }

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Arc<Self> {
        let jwt_keys = JwtKeys::from_secret(&CONFIG.auth.jwt_secret, CONFIG.auth.issuer.as_deref());
        Arc::new(Self { pool, jwt_keys })
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn get_jwt_keys(&self) -> &JwtKeys {
        &self.jwt_keys
    }

    pub fn syslog(&self) -> SystemLogBuilder {
        SystemLogBuilder::new(&self.pool)
    }
}
