//! reqwest adapter for the remote blog API.

use async_trait::async_trait;
use folio_api_types::{ApiErrorBody, CreatePostRequest, PostEnvelope};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::remote::{ApiError, PostsApi, SessionCredential};
use crate::domain::posts::{BlogPost, NewPost, PostFilter, PostsEnvelope};
use crate::infra::error::InfraError;

const POSTS_PATH: &str = "posts";

#[derive(Clone, Debug)]
pub struct RemotePostsApi {
    client: Client,
    base: Url,
}

impl RemotePostsApi {
    pub fn new(base_url: &Url, user_agent: Option<&str>) -> Result<Self, InfraError> {
        let mut base = base_url.clone();
        if base.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "api base url `{base_url}` cannot carry paths"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(Self::user_agent()))
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn posts_url(&self) -> Result<Url, ApiError> {
        self.base
            .join(POSTS_PATH)
            .map_err(|err| ApiError::Request(err.to_string()))
    }

    fn post_url(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = self.posts_url()?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Request("api base url cannot carry paths".to_string()))?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(target: "folio::api_client", %method, %url, "calling blog API");
        self.client.request(method, url)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(ApiError::transport)
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }
        serde_json::from_slice(&bytes).map_err(ApiError::decode)
    }
}

/// Build the error for a non-success response, preferring the API's own message.
fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl PostsApi for RemotePostsApi {
    async fn list_posts(&self, filter: &PostFilter) -> Result<PostsEnvelope, ApiError> {
        let mut url = self.posts_url()?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        let response = Self::send(self.request(Method::GET, url)).await?;
        Self::handle(response).await
    }

    async fn find_post(&self, id: &str) -> Result<Option<BlogPost>, ApiError> {
        let url = self.post_url(id)?;
        let response = Self::send(self.request(Method::GET, url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: PostEnvelope = Self::handle(response).await?;
        Ok(envelope.data)
    }

    async fn create_post(
        &self,
        post: &NewPost,
        credential: &SessionCredential,
    ) -> Result<(), ApiError> {
        let body = CreatePostRequest::from(post.clone());
        let mut request = self.request(Method::POST, self.posts_url()?).json(&body);
        if let Some(cookie) = credential.cookie_header() {
            request = request.header(header::COOKIE, cookie.clone());
        }

        let response = Self::send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await.map_err(ApiError::transport)?;
        Err(status_error(status, &bytes))
    }
}
