//! Remote sync adapter: the backend's REST collections.
//!
//! `GET /<collection>?owner=<identity>`, `POST /<collection>`,
//! `PUT /<collection>/<id>`, `DELETE /<collection>/<id>`. Every failure is
//! reported as a `FinanceError` here; nothing from reqwest leaks past this module.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use super::session::{Identity, LoadTicket};
use crate::config::ClientConfig;
use crate::error::FinanceError;
use crate::models::{Budget, EntityKind, Expense, Income, RecordId, SavingsGoal};
use crate::store::Entity;

#[async_trait]
pub trait Remote: Send + Sync {
    async fn list<T: Entity>(&self, owner: &Identity) -> Result<Vec<T>, FinanceError>;

    /// Returns the record as stored. Its id may be blank if the backend did not assign one.
    async fn create<T: Entity>(&self, owner: &Identity, record: &T) -> Result<T, FinanceError>;

    /// Returns the record as the backend stored it, or `None` if the reply had no body.
    async fn update<T: Entity>(
        &self,
        id: &RecordId,
        patch: &T::Patch,
    ) -> Result<Option<T>, FinanceError>;

    async fn delete<T: Entity>(&self, id: &RecordId) -> Result<(), FinanceError>;
}

/// Body of a POST: the record plus the identity that owns it.
#[derive(Serialize)]
struct Owned<'a, T> {
    owner: &'a str,
    #[serde(flatten)]
    record: &'a T,
}

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FinanceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FinanceError::remote(format!("cannot build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, FinanceError> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.collection())
    }

    fn record_url(&self, kind: EntityKind, id: &RecordId) -> String {
        format!("{}/{}/{}", self.base_url, kind.collection(), id)
    }
}

#[async_trait]
impl Remote for Client {
    async fn list<T: Entity>(&self, owner: &Identity) -> Result<Vec<T>, FinanceError> {
        let url = self.collection_url(T::KIND);
        debug!(%url, owner = %owner, "GET");
        let resp = self
            .http
            .get(&url)
            .query(&[("owner", owner.as_str())])
            .send()
            .await
            .map_err(|e| transport("GET", &url, e))?;
        let resp = ensure_success("GET", &url, resp)?;
        resp.json::<Vec<T>>()
            .await
            .map_err(|e| FinanceError::remote(format!("GET {url}: malformed body: {e}")))
    }

    async fn create<T: Entity>(&self, owner: &Identity, record: &T) -> Result<T, FinanceError> {
        let url = self.collection_url(T::KIND);
        debug!(%url, owner = %owner, "POST");
        let body = Owned {
            owner: owner.as_str(),
            record,
        };
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport("POST", &url, e))?;
        let resp = ensure_success("POST", &url, resp)?;
        resp.json::<T>()
            .await
            .map_err(|e| FinanceError::remote(format!("POST {url}: malformed body: {e}")))
    }

    async fn update<T: Entity>(
        &self,
        id: &RecordId,
        patch: &T::Patch,
    ) -> Result<Option<T>, FinanceError> {
        let url = self.record_url(T::KIND, id);
        debug!(%url, "PUT");
        let resp = self
            .http
            .put(&url)
            .json(patch)
            .send()
            .await
            .map_err(|e| transport("PUT", &url, e))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(FinanceError::NotFound {
                kind: T::KIND,
                id: id.clone(),
            });
        }
        let resp = ensure_success("PUT", &url, resp)?;
        let body = resp.bytes().await.map_err(|e| transport("PUT", &url, e))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice::<T>(&body)
            .map(Some)
            .map_err(|e| FinanceError::remote(format!("PUT {url}: malformed body: {e}")))
    }

    async fn delete<T: Entity>(&self, id: &RecordId) -> Result<(), FinanceError> {
        let url = self.record_url(T::KIND, id);
        debug!(%url, "DELETE");
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| transport("DELETE", &url, e))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(FinanceError::NotFound {
                kind: T::KIND,
                id: id.clone(),
            });
        }
        ensure_success("DELETE", &url, resp)?;
        Ok(())
    }
}

fn transport(method: &str, url: &str, err: reqwest::Error) -> FinanceError {
    if err.is_timeout() {
        FinanceError::remote(format!("{method} {url}: timed out"))
    } else {
        FinanceError::remote(format!("{method} {url}: {err}"))
    }
}

fn ensure_success(method: &str, url: &str, resp: Response) -> Result<Response, FinanceError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(FinanceError::remote(format!("{method} {url} returned {status}")))
    }
}

/// Treats a call that does not finish within `timeout` as unavailable.
pub async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, FinanceError>
where
    F: Future<Output = Result<T, FinanceError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(FinanceError::remote(format!(
            "no response within {}ms",
            timeout.as_millis()
        ))),
    }
}

/// Results of one bulk load, per store. A failed store does not fail the others.
#[derive(Debug)]
pub struct Snapshot {
    pub ticket: LoadTicket,
    pub expenses: Result<Vec<Expense>, FinanceError>,
    pub incomes: Result<Vec<Income>, FinanceError>,
    pub budgets: Result<Vec<Budget>, FinanceError>,
    pub savings: Result<Vec<SavingsGoal>, FinanceError>,
}

/// Loads all four collections for the ticket's identity concurrently.
pub async fn fetch_snapshot<R: Remote>(remote: &R, ticket: LoadTicket, timeout: Duration) -> Snapshot {
    let owner = &ticket.identity;
    let (expenses, incomes, budgets, savings) = tokio::join!(
        bounded(timeout, remote.list::<Expense>(owner)),
        bounded(timeout, remote.list::<Income>(owner)),
        bounded(timeout, remote.list::<Budget>(owner)),
        bounded(timeout, remote.list::<SavingsGoal>(owner)),
    );
    Snapshot {
        ticket,
        expenses,
        incomes,
        budgets,
        savings,
    }
}
