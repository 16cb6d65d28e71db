//! Supabase row-level REST (PostgREST) backend.
//!
//! Uses only select/insert/update filtered by `email=eq.<value>`, authenticated with
//! the service-role key.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use configs::SupabaseConfig;

use crate::auth::domain::{AdminAccount, AdminChanges, NewAdmin};
use crate::auth::errors::AdminError;
use crate::auth::repository::AdminRepository;

const UNIQUE_VIOLATION: &str = "23505";

pub struct RestAdminRepository {
    client: Client,
    table_url: String,
}

/// Row shape as returned by PostgREST. Profile columns may be NULL in older rows.
#[derive(Debug, Deserialize)]
struct AdminRow {
    id: Uuid,
    email: String,
    #[serde(default)]
    password_hash: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdminRow> for AdminAccount {
    fn from(r: AdminRow) -> Self {
        AdminAccount {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash.unwrap_or_default(),
            first_name: r.first_name.unwrap_or_default(),
            last_name: r.last_name.unwrap_or_default(),
            phone: r.phone.unwrap_or_default(),
            address: r.address,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Serialize)]
struct InsertBody<'a> {
    email: &'a str,
    password_hash: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    phone: &'a str,
    address: Option<&'a str>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct PatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    password_hash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    updated_at: DateTime<Utc>,
}

/// PostgREST error payload
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a non-success response onto the error taxonomy.
fn classify_status(status: StatusCode, body: &str) -> AdminError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    if status == StatusCode::CONFLICT || parsed.code.as_deref() == Some(UNIQUE_VIOLATION) {
        return AdminError::DuplicateEmail;
    }
    let message = parsed.message.unwrap_or_else(|| body.chars().take(200).collect());
    match status {
        StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS => AdminError::StoreUnavailable(format!("store returned {status}: {message}")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AdminError::Repository(format!("store rejected the service key ({status}): {message}"))
        }
        _ => AdminError::Repository(format!("store returned {status}: {message}")),
    }
}

fn classify_transport(e: reqwest::Error) -> AdminError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        AdminError::StoreUnavailable(e.to_string())
    } else {
        AdminError::Repository(e.to_string())
    }
}

impl RestAdminRepository {
    /// Build a client with the service key attached to every request.
    pub fn new(cfg: &SupabaseConfig) -> Result<Self, AdminError> {
        let key = cfg.service_key.trim();
        let mut headers = HeaderMap::new();
        let mut apikey = HeaderValue::from_str(key).map_err(|e| AdminError::Validation(format!("service key: {e}")))?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| AdminError::Validation(format!("service key: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AdminError::Repository(e.to_string()))?;
        Ok(Self::with_client(client, &cfg.url, &cfg.table))
    }

    /// Use a prepared client (headers and timeout already set).
    pub fn with_client(client: Client, base_url: &str, table: &str) -> Self {
        let table_url = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table);
        Self { client, table_url }
    }

    async fn rows(&self, req: RequestBuilder) -> Result<Vec<AdminRow>, AdminError> {
        let resp = req.send().await.map_err(classify_transport)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            debug!(%status, code = err.code(), "store request failed");
            return Err(err);
        }
        resp.json::<Vec<AdminRow>>()
            .await
            .map_err(|e| AdminError::Repository(format!("unexpected store response: {e}")))
    }

    fn by_email(&self, req: RequestBuilder, email: &str) -> RequestBuilder {
        req.query(&[("email", format!("eq.{email}"))])
    }
}

#[async_trait::async_trait]
impl AdminRepository for RestAdminRepository {
    async fn insert(&self, a: NewAdmin) -> Result<AdminAccount, AdminError> {
        if a.password_hash.trim().is_empty() {
            return Err(AdminError::Validation("password hash required".into()));
        }
        let now = Utc::now();
        let body = InsertBody {
            email: &a.email,
            password_hash: &a.password_hash,
            first_name: &a.first_name,
            last_name: &a.last_name,
            phone: &a.phone,
            address: a.address.as_deref(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let req = self.client.post(&self.table_url).header("Prefer", "return=representation").json(&body);
        let mut rows = self.rows(req).await?;
        rows.pop()
            .map(AdminAccount::from)
            .ok_or_else(|| AdminError::Repository("insert returned no row".into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AdminError> {
        let req = self.by_email(self.client.get(&self.table_url), email).query(&[("select", "*")]);
        let mut rows = self.rows(req).await?;
        if rows.len() > 1 {
            warn!(matches = rows.len(), "email matched more than one admin row");
        }
        Ok(rows.pop().map(AdminAccount::from))
    }

    async fn update_by_email(&self, email: &str, changes: AdminChanges) -> Result<Option<AdminAccount>, AdminError> {
        if matches!(&changes.password_hash, Some(h) if h.trim().is_empty()) {
            return Err(AdminError::Validation("password hash required".into()));
        }
        let body = PatchBody {
            password_hash: changes.password_hash.as_deref(),
            is_active: changes.is_active,
            updated_at: Utc::now(),
        };
        let req = self
            .by_email(self.client.patch(&self.table_url), email)
            .header("Prefer", "return=representation")
            .json(&body);
        let mut rows = self.rows(req).await?;
        Ok(rows.pop().map(AdminAccount::from))
    }

    async fn list(&self) -> Result<Vec<AdminAccount>, AdminError> {
        let req = self.client.get(&self.table_url).query(&[("select", "*"), ("order", "created_at.desc")]);
        Ok(self.rows(req).await?.into_iter().map(AdminAccount::from).collect())
    }

    async fn ping(&self) -> Result<(), AdminError> {
        let resp = self
            .client
            .get(&self.table_url)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(classify_transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }
}
