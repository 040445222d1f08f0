mod credentials;
mod dashboard;
mod middleware;
mod public;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};

pub use credentials::credential_from_headers;
pub use middleware::{REQUEST_ID_HEADER, RequestContext, log_responses, set_request_context};

use crate::{
    application::{
        form::FormSessions,
        posts::{BlogReadService, BlogWriteAction},
        remote::PostsApi,
        server_form::ServerPostForm,
    },
    cache::{CacheTrigger, ReadCache},
    presentation::views::LayoutChrome,
};

/// Everything the page handlers need, cloned per request.
#[derive(Clone)]
pub struct HttpState {
    pub reads: BlogReadService,
    pub forms: Arc<FormSessions>,
    pub server_form: ServerPostForm,
    pub chrome: LayoutChrome,
}

impl HttpState {
    /// Wire the read service and both write paths onto one API client and cache.
    pub fn assemble(
        api: Arc<dyn PostsApi>,
        cache: Option<Arc<ReadCache>>,
        chrome: LayoutChrome,
    ) -> Self {
        let trigger = CacheTrigger::new(cache.clone());
        Self {
            reads: BlogReadService::new(Arc::clone(&api), cache),
            forms: Arc::new(FormSessions::new(Arc::new(BlogWriteAction::new(
                Arc::clone(&api),
                trigger.clone(),
            )))),
            server_form: ServerPostForm::new(api, trigger),
            chrome,
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .merge(public::routes())
        .merge(dashboard::routes())
        .route("/_health", get(health))
        .fallback(public::fallback)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
