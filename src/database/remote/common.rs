// Shared types and utilities for remote Supabase operations

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Error type for Supabase operations
#[derive(Debug)]
pub enum SyncError {
    /// HTTP request failed
    RequestFailed(String),
    /// Supabase API returned an error
    ApiError { status: u16, message: String },
    /// Failed to parse response
    ParseError(String),
    /// Missing required field
    MissingField(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            SyncError::ApiError { status, message } => {
                write!(f, "Supabase API error {}: {}", status, message)
            }
            SyncError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SyncError::MissingField(field) => write!(f, "Missing required field: {}", field),
        }
    }
}

impl std::error::Error for SyncError {}

/// Supabase client configuration
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn table_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        }
    }

    /// Fetch rows matching a PostgREST query string (e.g. `status=eq.approved&order=name.asc`)
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
        access_token: &str,
    ) -> Result<Vec<T>, SyncError> {
        let res = self
            .client
            .get(self.table_url(table, query))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SyncError::RequestFailed(e.to_string()))?;

        let res = ensure_success(res).await?;

        let body = res
            .text()
            .await
            .map_err(|e| SyncError::ParseError(e.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| SyncError::ParseError(format!("Failed to parse response: {}", e)))
    }

    /// Insert rows, merging into existing rows that collide on `on_conflict`
    pub async fn upsert<T: Serialize>(
        &self,
        table: &str,
        payload: &[T],
        on_conflict: &str,
        access_token: &str,
    ) -> Result<(), SyncError> {
        let url = self.table_url(table, &format!("on_conflict={}", on_conflict));

        // Upsert using POST with Prefer: resolution=merge-duplicates
        let res = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates")
            .json(payload)
            .send()
            .await
            .map_err(|e| SyncError::RequestFailed(e.to_string()))?;

        ensure_success(res).await?;
        Ok(())
    }

    /// Patch the record whose `id` column equals `id`
    pub async fn update<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        payload: &T,
        access_token: &str,
    ) -> Result<(), SyncError> {
        let url = self.table_url(table, &format!("id=eq.{}", id));

        let res = self
            .client
            .patch(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| SyncError::RequestFailed(e.to_string()))?;

        ensure_success(res).await?;
        Ok(())
    }
}

async fn ensure_success(res: Response) -> Result<Response, SyncError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status().as_u16();
    let text = res.text().await.unwrap_or_default();
    Err(SyncError::ApiError {
        status,
        message: text,
    })
}
