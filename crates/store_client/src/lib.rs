//! HTTP implementation of [`engine::RecordStore`].
//!
//! Every request is a JSON call under `{base_url}/records/{kind}` carrying the
//! project id and public key from [`StoreConfig`]:
//!
//! | operation | request                         |
//! |-----------|---------------------------------|
//! | fetch     | `POST records/{kind}/fetch`     |
//! | get       | `POST records/{kind}/{id}`      |
//! | create    | `POST records/{kind}`           |
//! | update    | `PUT records/{kind}`            |
//! | delete    | `DELETE records/{kind}`         |

use std::time::Duration;

use api_types::{
    Update,
    query::FetchParams,
    response::{DeleteRequest, Envelope, RecordResult, WriteRequest, WriteResponse},
};
use engine::{EngineError, EntityKind, RecordStore, ResultEngine};
use reqwest::{Method, Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub const PROJECT_ID_HEADER: &str = "x-project-id";
pub const PUBLIC_KEY_HEADER: &str = "x-public-key";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: &str, project_id: &str, public_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            project_id: project_id.to_string(),
            public_key: public_key.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base_url: {0}")]
    InvalidBaseUrl(String),
    #[error("missing {0}")]
    MissingCredential(&'static str),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("store reported failure: {0}")]
    Store(String),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ClientError> for EngineError {
    fn from(value: ClientError) -> Self {
        EngineError::Remote(value.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

#[derive(Clone, Debug)]
pub struct HttpStore {
    base_url: Url,
    http: reqwest::Client,
    project_id: String,
    public_key: String,
}

impl HttpStore {
    pub fn new(config: StoreConfig) -> Result<Self, ClientError> {
        if config.project_id.trim().is_empty() {
            return Err(ClientError::MissingCredential("project id"));
        }
        if config.public_key.trim().is_empty() {
            return Err(ClientError::MissingCredential("public key"));
        }

        // Without the trailing slash `Url::join` would drop the last path segment.
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))?;

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url,
            http,
            project_id: config.project_id,
            public_key: config.public_key,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))?;
        tracing::debug!("{method} {url}");

        let resp = self
            .http
            .request(method, url)
            .header(PROJECT_ID_HEADER, &self.project_id)
            .header(PUBLIC_KEY_HEADER, &self.public_key)
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => "server error".to_string(),
            };
            tracing::debug!("store answered {status}: {message}");
            return Err(ClientError::Server { status, message });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write<P, T>(
        &self,
        method: Method,
        kind: EntityKind,
        records: &[P],
    ) -> Result<Vec<RecordResult<T>>, ClientError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let resp = self
            .request(method, &format!("records/{}", kind.table()), &WriteRequest { records })
            .await?;
        let body: WriteResponse<T> = Self::read(resp).await?;
        if !body.success {
            return Err(store_failure(body.message));
        }
        Ok(body.results.unwrap_or_default())
    }
}

fn store_failure(message: Option<String>) -> ClientError {
    ClientError::Store(message.unwrap_or_else(|| "request failed".to_string()))
}

impl RecordStore for HttpStore {
    async fn fetch_records<T>(&self, kind: EntityKind, params: &FetchParams) -> ResultEngine<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let resp = self
            .request(Method::POST, &format!("records/{}/fetch", kind.table()), params)
            .await?;
        let body: Envelope<Vec<T>> = Self::read(resp).await?;
        if !body.success {
            return Err(store_failure(body.message).into());
        }
        Ok(body.data.unwrap_or_default())
    }

    async fn get_record_by_id<T>(
        &self,
        kind: EntityKind,
        id: i64,
        params: &FetchParams,
    ) -> ResultEngine<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let resp = self
            .request(Method::POST, &format!("records/{}/{id}", kind.table()), params)
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Envelope<T> = Self::read(resp).await?;
        if !body.success {
            return Err(store_failure(body.message).into());
        }
        Ok(body.data)
    }

    async fn create_records<P, T>(
        &self,
        kind: EntityKind,
        records: &[P],
    ) -> ResultEngine<Vec<RecordResult<T>>>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        Ok(self.write(Method::POST, kind, records).await?)
    }

    async fn update_records<P, T>(
        &self,
        kind: EntityKind,
        records: &[Update<P>],
    ) -> ResultEngine<Vec<RecordResult<T>>>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        Ok(self.write(Method::PUT, kind, records).await?)
    }

    async fn delete_records(&self, kind: EntityKind, ids: &[i64]) -> ResultEngine<Vec<RecordResult<Value>>> {
        let body = DeleteRequest {
            record_ids: ids.to_vec(),
        };
        let resp = self
            .request(Method::DELETE, &format!("records/{}", kind.table()), &body)
            .await?;
        let body: WriteResponse<Value> = Self::read(resp).await?;
        if !body.success {
            return Err(store_failure(body.message).into());
        }
        // A successful envelope without per-record results means every id went.
        Ok(body
            .results
            .unwrap_or_else(|| ids.iter().map(|id| RecordResult::ok(Value::from(*id))).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_keeps_its_path() {
        let store = HttpStore::new(StoreConfig::new("http://localhost:8080/api/v1", "p", "k")).unwrap();
        assert_eq!(
            store.base_url().join("records/crop").unwrap().as_str(),
            "http://localhost:8080/api/v1/records/crop"
        );
    }

    #[test]
    fn rejects_bad_config() {
        assert!(matches!(
            HttpStore::new(StoreConfig::new("not a url", "p", "k")),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpStore::new(StoreConfig::new("http://localhost", "", "k")),
            Err(ClientError::MissingCredential("project id"))
        ));
        assert!(matches!(
            HttpStore::new(StoreConfig::new("http://localhost", "p", " ")),
            Err(ClientError::MissingCredential("public key"))
        ));
    }

    #[test]
    fn client_errors_are_remote_failures() {
        let err = EngineError::from(ClientError::Store("quota exceeded".to_string()));
        assert_eq!(
            err,
            EngineError::Remote("store reported failure: quota exceeded".to_string())
        );
    }
}
