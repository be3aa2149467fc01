//! Client-side state that outlives a run: the last signed-in identity and the
//! theme preference. Entity records are never cached here.

pub mod db;

use anyhow::Result;
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::client::session::Identity;
use db::{connection, migrate, queries};

const LAST_IDENTITY: &str = "last_identity";
const THEME: &str = "theme";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub last_identity: Option<String>,
    pub theme: Option<String>,
}

#[derive(Clone)]
pub struct ClientStateStore {
    pool: Pool<Sqlite>,
}

impl ClientStateStore {
    pub async fn open(db_url: &str) -> Result<Self> {
        let pool = connection::get_db_pool(db_url).await?;
        migrate::run_migrations(&pool).await?;
        debug!(db_url, "client state store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn load(&self) -> Result<PersistedState> {
        Ok(PersistedState {
            last_identity: queries::get_value(&self.pool, LAST_IDENTITY).await?,
            theme: queries::get_value(&self.pool, THEME).await?,
        })
    }

    /// `None` forgets the identity (logout).
    pub async fn save_identity(&self, identity: Option<&Identity>) -> Result<()> {
        match identity {
            Some(id) => queries::set_value(&self.pool, LAST_IDENTITY, id.as_str()).await?,
            None => queries::delete_value(&self.pool, LAST_IDENTITY).await?,
        }
        Ok(())
    }

    pub async fn save_theme(&self, theme: &str) -> Result<()> {
        queries::set_value(&self.pool, THEME, theme).await?;
        Ok(())
    }
}
