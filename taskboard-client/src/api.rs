/// HTTP client for the Taskboard API
///
/// `register` and `login` store the returned token; every task call sends
/// it as a bearer token. `logout` only forgets the local token: tokens are
/// stateless and stay valid until they expire.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_client::{api::ApiClient, storage::MemoryTokenStorage};
/// use taskboard_shared::models::NewTask;
///
/// # async fn example() -> Result<(), taskboard_client::api::ClientError> {
/// let client = ApiClient::new("http://localhost:8080", Arc::new(MemoryTokenStorage::new()))?;
///
/// client.login("ada@example.com", "secret1").await?;
/// client.create_tasks(vec![NewTask::new("Buy milk")]).await?;
/// let tasks = client.list_tasks().await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use taskboard_shared::{
    models::{NewTask, Role, Task, TaskChanges, UserProfile},
    services::{LoginOutput, RegisterOutput},
};

use crate::storage::TokenStorage;

/// Error type for API calls
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure or undecodable response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No token stored; call `login` or `register` first
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct BulkCreateBody<'a> {
    tasks: &'a [NewTask],
}

/// Taskboard API client
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    storage: Arc<dyn TokenStorage>,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn TokenStorage>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            storage,
        })
    }

    /// Token storage shared with the navigation guard
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    pub fn is_authenticated(&self) -> bool {
        self.storage.has_token()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.storage.get().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    /// Turns non-2xx responses into [`ClientError::Api`]
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    text
                }
            });

        tracing::debug!(status = status.as_u16(), %message, "API call failed");

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Registers an account and stores its token
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> ClientResult<RegisterOutput> {
        let mut body = json!({ "name": name, "email": email, "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }

        let output: RegisterOutput =
            Self::send_json(self.request(Method::POST, "/auth/register").json(&body)).await?;

        self.storage.set(output.access_token.clone());
        tracing::info!(email, "Registered");
        Ok(output)
    }

    /// Logs in and stores the token
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginOutput> {
        let body = json!({ "email": email, "password": password });

        let output: LoginOutput =
            Self::send_json(self.request(Method::POST, "/auth/login").json(&body)).await?;

        self.storage.set(output.access_token.clone());
        tracing::info!(email, "Logged in");
        Ok(output)
    }

    /// Forgets the stored token
    pub fn logout(&self) {
        self.storage.clear();
    }

    /// Profile of the logged-in user
    pub async fn me(&self) -> ClientResult<UserProfile> {
        Self::send_json(self.authed(Method::GET, "/users/me")?).await
    }

    /// Active tasks, newest first
    pub async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        Self::send_json(self.authed(Method::GET, "/tasks")?).await
    }

    /// Creates all of `tasks` or none of them
    pub async fn create_tasks(&self, tasks: Vec<NewTask>) -> ClientResult<Vec<Task>> {
        let builder = self
            .authed(Method::POST, "/tasks/bulk")?
            .json(&BulkCreateBody { tasks: &tasks });

        let envelope: Envelope<Vec<Task>> = Self::send_json(builder).await?;
        Ok(envelope.data)
    }

    /// Applies the `Some` fields of `changes`
    pub async fn update_task(&self, id: Uuid, changes: TaskChanges) -> ClientResult<Task> {
        let builder = self
            .authed(Method::PATCH, &format!("/tasks/{}", id))?
            .json(&changes);

        let envelope: Envelope<Task> = Self::send_json(builder).await?;
        Ok(envelope.data)
    }

    /// Soft-deletes a task
    pub async fn delete_task(&self, id: Uuid) -> ClientResult<()> {
        let response = self
            .authed(Method::DELETE, &format!("/tasks/{}", id))?
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
