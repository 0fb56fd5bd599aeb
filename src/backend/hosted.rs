use bevy::log::warn;
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};

use super::{
    auth::AuthHub,
    config::{HostedConfig, HostedConfigError},
    errors::{BackendErrorKind, BackendResult},
    memory::MemoryBackend,
    types::{AuthListener, ReadQuery, Record, Session, Table, WriteMode},
    BackendProviderKind, DataBackend,
};

const API_KEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "Prefer";
const UPSERT_HEADER: &str = "x-upsert";
const PREFER_INSERT: &str = "return=minimal";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";
const SINGLE_ROW_LIMIT: &str = "1";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Backend talking to the hosted REST API, or an in-memory store when no
/// endpoint is configured.
pub struct HostedBackend {
    mode: BackendMode,
}

enum BackendMode {
    Live(HostedLiveClient),
    Offline(MemoryBackend),
}

impl HostedBackend {
    pub fn new() -> Self {
        match HostedConfig::from_env() {
            Ok(config) => match HostedLiveClient::new(config) {
                Ok(client) => Self {
                    mode: BackendMode::Live(client),
                },
                Err(err) => {
                    warn!(
                        "Hosted backend running offline ({}). Check HTTP client configuration.",
                        err
                    );
                    Self::offline()
                }
            },
            Err(HostedConfigError::MissingUrl) | Err(HostedConfigError::MissingKey) => {
                warn!("SUPABASE_URL / SUPABASE_ANON_KEY not set; using the offline in-memory backend.");
                Self::offline()
            }
            Err(HostedConfigError::ClientBuild(message)) => {
                warn!(
                    "Failed to construct hosted HTTP client ({}). Falling back to the offline backend.",
                    message
                );
                Self::offline()
            }
        }
    }

    fn offline() -> Self {
        Self {
            mode: BackendMode::Offline(MemoryBackend::offline_demo()),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, BackendMode::Live(_))
    }

    fn inner(&self) -> &dyn DataBackend {
        match &self.mode {
            BackendMode::Live(client) => client,
            BackendMode::Offline(memory) => memory,
        }
    }
}

impl DataBackend for HostedBackend {
    fn provider_kind(&self) -> BackendProviderKind {
        self.inner().provider_kind()
    }

    fn current_session(&self) -> Option<Session> {
        self.inner().current_session()
    }

    fn read(&self, query: &ReadQuery) -> BackendResult<Option<Record>> {
        self.inner().read(query)
    }

    fn read_all(&self, query: &ReadQuery) -> BackendResult<Vec<Record>> {
        self.inner().read_all(query)
    }

    fn write(&self, table: Table, record: Record, mode: WriteMode) -> BackendResult<()> {
        self.inner().write(table, record, mode)
    }

    fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> BackendResult<String> {
        self.inner().upload_file(bucket, path, bytes)
    }

    fn on_auth_state_change(&self, listener: AuthListener) {
        self.inner().on_auth_state_change(listener)
    }

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        self.inner().sign_in(email, password)
    }

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Option<Session>> {
        self.inner().sign_up(email, password)
    }

    fn sign_out(&self) -> BackendResult<()> {
        self.inner().sign_out()
    }

    fn request_password_reset(&self, email: &str) -> BackendResult<()> {
        self.inner().request_password_reset(email)
    }

    fn update_password(&self, password: &str) -> BackendResult<()> {
        self.inner().update_password(password)
    }
}

struct HostedLiveClient {
    http: Client,
    config: HostedConfig,
    auth: AuthHub,
}

impl HostedLiveClient {
    fn new(config: HostedConfig) -> Result<Self, HostedConfigError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| HostedConfigError::ClientBuild(err.to_string()))?;

        Ok(Self {
            http,
            config,
            auth: AuthHub::default(),
        })
    }

    /// Adds the project key plus the user's token (or the anon key when signed out).
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self
            .auth
            .access_token()
            .unwrap_or_else(|| self.config.anon_key.clone());
        builder
            .header(API_KEY_HEADER, &self.config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", token))
    }

    fn send(&self, builder: RequestBuilder) -> BackendResult<Response> {
        let response = self
            .authorized(builder)
            .send()
            .map_err(|err| BackendErrorKind::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<HostedErrorBody>()
            .ok()
            .and_then(HostedErrorBody::into_message)
            .unwrap_or_else(|| format!("HTTP {} from backend", status));

        Err(BackendErrorKind::status(status.as_u16(), message))
    }

    fn query_rows(&self, query: &ReadQuery, limit: Option<&str>) -> BackendResult<Vec<Record>> {
        let mut params: Vec<(String, String)> = vec![("select".to_string(), query.fields.clone())];
        if let Some(filter) = &query.filter {
            params.push((filter.column.clone(), format!("eq.{}", filter.value)));
        }
        if let Some(order) = &query.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        let builder = self
            .http
            .get(self.config.table_url(query.table.as_str()))
            .query(&params);
        self.send(builder)?
            .json::<Vec<Record>>()
            .map_err(|err| BackendErrorKind::decode(err.to_string()))
    }

    fn session_from(&self, body: TokenResponse) -> Option<Session> {
        let token = body.access_token?;
        let user = body.user?;
        Some(Session::new(
            user.id,
            user.email.unwrap_or_default(),
            token,
        ))
    }
}

impl DataBackend for HostedLiveClient {
    fn provider_kind(&self) -> BackendProviderKind {
        BackendProviderKind::Hosted
    }

    fn current_session(&self) -> Option<Session> {
        self.auth.session()
    }

    fn read(&self, query: &ReadQuery) -> BackendResult<Option<Record>> {
        Ok(self
            .query_rows(query, Some(SINGLE_ROW_LIMIT))?
            .into_iter()
            .next())
    }

    fn read_all(&self, query: &ReadQuery) -> BackendResult<Vec<Record>> {
        self.query_rows(query, None)
    }

    fn write(&self, table: Table, record: Record, mode: WriteMode) -> BackendResult<()> {
        let mut builder = self.http.post(self.config.table_url(table.as_str()));
        builder = match mode {
            WriteMode::Insert => builder.header(PREFER_HEADER, PREFER_INSERT),
            WriteMode::Upsert { on_conflict } => builder
                .header(PREFER_HEADER, PREFER_UPSERT)
                .query(&[("on_conflict", on_conflict)]),
        };
        self.send(builder.json(&[record]))?;
        Ok(())
    }

    fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> BackendResult<String> {
        let builder = self
            .http
            .post(self.config.object_url(bucket, path))
            .header(UPSERT_HEADER, "true")
            .header(CONTENT_TYPE, content_type_for(path))
            .body(bytes);
        self.send(builder)?;
        Ok(self.config.public_object_url(bucket, path))
    }

    fn on_auth_state_change(&self, listener: AuthListener) {
        self.auth.subscribe(listener);
    }

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let builder = self
            .http
            .post(self.config.auth_url("token?grant_type=password"))
            .json(&Credentials { email, password });
        let body: TokenResponse = self
            .send(builder)
            .map_err(into_auth_error)?
            .json()
            .map_err(|err| BackendErrorKind::decode(err.to_string()))?;
        let session = self
            .session_from(body)
            .ok_or_else(|| BackendErrorKind::decode("token response without session"))?;
        self.auth.signed_in(session.clone());
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Option<Session>> {
        let builder = self
            .http
            .post(self.config.auth_url("signup"))
            .json(&Credentials { email, password });
        let body: TokenResponse = self
            .send(builder)
            .map_err(into_auth_error)?
            .json()
            .map_err(|err| BackendErrorKind::decode(err.to_string()))?;
        let session = self.session_from(body);
        if let Some(session) = &session {
            self.auth.signed_in(session.clone());
        }
        Ok(session)
    }

    fn sign_out(&self) -> BackendResult<()> {
        if self.auth.session().is_some() {
            let builder = self.http.post(self.config.auth_url("logout"));
            if let Err(err) = self.send(builder) {
                warn!(target: "backend", "Remote logout failed ({}); clearing local session", err);
            }
        }
        self.auth.signed_out();
        Ok(())
    }

    fn request_password_reset(&self, email: &str) -> BackendResult<()> {
        let builder = self
            .http
            .post(self.config.auth_url("recover"))
            .json(&EmailOnly { email });
        self.send(builder).map_err(into_auth_error)?;
        Ok(())
    }

    fn update_password(&self, password: &str) -> BackendResult<()> {
        if self.auth.session().is_none() {
            return Err(BackendErrorKind::NotSignedIn);
        }
        let builder = self
            .http
            .put(self.config.auth_url("user"))
            .json(&PasswordOnly { password });
        self.send(builder).map_err(into_auth_error)?;
        self.auth.password_updated();
        Ok(())
    }
}

/// Auth endpoints report every client error as a rejected credential.
fn into_auth_error(kind: BackendErrorKind) -> BackendErrorKind {
    match kind {
        BackendErrorKind::Status { code, message } if (400..500).contains(&code) => {
            BackendErrorKind::auth_rejected(message)
        }
        other => other,
    }
}

fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailOnly<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordOnly<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct HostedErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl HostedErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_mode_delegates_to_memory_store() {
        let backend = HostedBackend::offline();
        assert!(!backend.is_live());
        assert_eq!(backend.provider_kind(), BackendProviderKind::Memory);
        assert!(backend.current_session().is_some());
    }

    #[test]
    fn error_body_prefers_message_fields_in_order() {
        let body = HostedErrorBody {
            msg: Some("short".to_string()),
            error_description: Some("long".to_string()),
            ..Default::default()
        };
        assert_eq!(body.into_message().as_deref(), Some("short"));
        assert_eq!(HostedErrorBody::default().into_message(), None);
    }

    #[test]
    fn auth_client_errors_become_rejections() {
        let rejected = into_auth_error(BackendErrorKind::status(400, "Invalid login credentials"));
        assert!(matches!(rejected, BackendErrorKind::AuthRejected { .. }));

        let server = into_auth_error(BackendErrorKind::status(503, "down"));
        assert!(matches!(server, BackendErrorKind::Status { code: 503, .. }));
    }

    #[test]
    fn guesses_upload_content_types() {
        assert_eq!(content_type_for("u1.PNG"), "image/png");
        assert_eq!(content_type_for("u1.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("u1"), DEFAULT_CONTENT_TYPE);
    }
}
