use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    application::{error::HttpError, posts::CacheDirective},
    domain::posts::PostFilter,
    presentation::views::{
        HomeContext, IndexTemplate, LayoutContext, PostDetailContext, PostTemplate,
        render_not_found_response, render_post_not_found_response, render_template_response,
    },
};

use super::HttpState;

pub(super) fn routes() -> Router<HttpState> {
    Router::new()
        .route("/", get(index))
        .route("/blogs/{id}", get(post_detail))
}

/// Non-featured posts, always fetched fresh.
async fn index(State(state): State<HttpState>) -> Response {
    match state
        .reads
        .get_posts(&PostFilter::featured(false), CacheDirective::NoStore)
        .await
    {
        Ok(envelope) => {
            let content = HomeContext::from_posts(&envelope.data);
            let view = LayoutContext::new(state.chrome.clone(), content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    match state.reads.get_post_by_id(&id).await {
        Ok(Some(post)) => {
            let chrome = state.chrome.clone().with_title(&post.title);
            let view = LayoutContext::new(chrome, PostDetailContext::from(&post));
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_post_not_found_response(state.chrome.clone()),
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub(super) async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.clone())
}
