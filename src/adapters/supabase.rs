use crate::domain::model::{ChartRecord, Session, UploadRecord};
use crate::domain::ports::DashboardRepository;
use crate::utils::error::{DashError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

/// Client for the hosted Supabase project: GoTrue auth plus the PostgREST
/// table API. Row-level security on the server scopes every table to the
/// authenticated user; the client still filters by `user_id` explicitly,
/// matching the original helper queries.
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct PreferencesRow {
    preferences: serde_json::Value,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn sign_in_request(&self, url: String, email: &str, password: &str) -> Result<Session> {
        let payload = serde_json::json!({ "email": email, "password": password });

        // 登入失敗一律回籠統的 AuthFailed，細節只進日誌
        let response = match self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Auth transport failure: {}", e);
                return Err(DashError::AuthFailed);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Auth rejected: {} {}", status, body);
            return Err(DashError::AuthFailed);
        }

        match response.json::<AuthResponse>().await {
            Ok(auth) => Ok(Session {
                access_token: auth.access_token,
                user_id: auth.user.id,
            }),
            Err(e) => {
                tracing::error!("Auth response malformed: {}", e);
                Err(DashError::AuthFailed)
            }
        }
    }

    /// Password sign-in. Wrong password and unknown account are not
    /// distinguished in the result.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.sign_in_request(self.auth_url("token?grant_type=password"), email, password)
            .await
    }

    /// Account registration; answers with a usable session like sign-in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        self.sign_in_request(self.auth_url("signup"), email, password)
            .await
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
    }

    async fn check_store_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            // 原樣帶回 PostgREST 的錯誤內容
            let message = response.text().await.unwrap_or_default();
            Err(DashError::StoreError {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// The user's preferences blob, if a `user_data` row exists. The blob is
    /// opaque to this client.
    pub async fn get_preferences(&self, session: &Session) -> Result<Option<serde_json::Value>> {
        let user_filter = format!("eq.{}", session.user_id);
        let request = self
            .authed(self.http.get(self.rest_url("user_data")), session)
            .query(&[
                ("select", "preferences"),
                ("user_id", user_filter.as_str()),
            ]);

        let response = Self::check_store_response(request.send().await?).await?;
        let mut rows: Vec<PreferencesRow> = response.json().await?;
        Ok(rows.pop().map(|row| row.preferences))
    }

    /// Inserts or replaces the user's preferences blob.
    pub async fn upsert_preferences(
        &self,
        session: &Session,
        preferences: serde_json::Value,
    ) -> Result<()> {
        let payload = serde_json::json!([{
            "user_id": session.user_id,
            "preferences": preferences,
        }]);

        let request = self
            .authed(self.http.post(self.rest_url("user_data")), session)
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&payload);

        Self::check_store_response(request.send().await?).await?;
        Ok(())
    }
}

/// The four persistence operations of the dashboard, bound to one signed-in
/// session. A thin pass-through: no local validation, caching or retry.
pub struct SupabaseRepository {
    client: SupabaseClient,
    session: Session,
}

impl SupabaseRepository {
    pub fn new(client: SupabaseClient, session: Session) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn insert_row<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> Result<T> {
        let request = self
            .client
            .authed(self.client.http.post(self.client.rest_url(table)), &self.session)
            .header("Prefer", "return=representation")
            .json(&serde_json::Value::Array(vec![row]));

        let response = SupabaseClient::check_store_response(request.send().await?).await?;
        let status = response.status().as_u16();
        let mut rows: Vec<T> = response.json().await?;
        rows.pop().ok_or(DashError::StoreError {
            status,
            message: format!("insert into '{}' returned no representation", table),
        })
    }

    async fn list_rows<T: serde::de::DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let user_filter = format!("eq.{}", self.session.user_id);
        let request = self
            .client
            .authed(self.client.http.get(self.client.rest_url(table)), &self.session)
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.desc"),
            ]);

        let response = SupabaseClient::check_store_response(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DashboardRepository for SupabaseRepository {
    async fn create_upload_record(
        &self,
        filename: &str,
        file_path: &str,
        json_path: &str,
    ) -> Result<UploadRecord> {
        self.insert_row(
            "uploads",
            serde_json::json!({
                "user_id": self.session.user_id,
                "filename": filename,
                "file_path": file_path,
                "json_path": json_path,
            }),
        )
        .await
    }

    async fn create_chart_record(
        &self,
        upload_id: &str,
        chart_path: &str,
        chart_type: &str,
    ) -> Result<ChartRecord> {
        self.insert_row(
            "charts",
            serde_json::json!({
                "user_id": self.session.user_id,
                "upload_id": upload_id,
                "chart_path": chart_path,
                "chart_type": chart_type,
            }),
        )
        .await
    }

    async fn list_uploads(&self) -> Result<Vec<UploadRecord>> {
        self.list_rows("uploads").await
    }

    async fn list_charts(&self) -> Result<Vec<ChartRecord>> {
        self.list_rows("charts").await
    }
}
