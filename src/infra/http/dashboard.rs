use axum::{
    Json, Router,
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    application::{
        error::{ErrorReport, HttpError},
        form::{FailureKind, FormEvent, FormPhase, FormSessions, FormSnapshot, FormState, reduce},
        posts::{CacheDirective, SubmitError},
        remote::SessionCredential,
        server_form::{RawPostFields, ServerSubmitOutcome},
    },
    domain::posts::{BlogDraft, PostField, PostFilter},
    presentation::views::{
        CreatePostContext, CreatePostServerTemplate, CreatePostTemplate, HistoryContext,
        HistoryTemplate, LayoutContext, ServerFormContext, render_template_response,
    },
};

use super::HttpState;

const SOURCE: &str = "infra::http::dashboard";

pub(super) fn routes() -> Router<HttpState> {
    Router::new()
        .route("/dashboard/history", get(history))
        .route(
            "/dashboard/create-blog",
            get(create_blog_page).post(create_blog_submit),
        )
        .route("/dashboard/create-blog/validate", post(validate_field))
        .route(
            "/dashboard/create-blog/server",
            get(server_form_page).post(server_form_submit),
        )
}

async fn history(State(state): State<HttpState>) -> Response {
    match state
        .reads
        .get_posts(&PostFilter::default(), CacheDirective::Default)
        .await
    {
        Ok(envelope) => {
            let chrome = state.chrome.clone().with_title("History");
            let view = LayoutContext::new(chrome, HistoryContext::from_posts(&envelope.data));
            render_template_response(HistoryTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn create_blog_page(State(state): State<HttpState>) -> Response {
    let snapshot = FormSnapshot::from(&FormState::default());
    render_create_form(&state, &snapshot, FormSessions::mint_id(), StatusCode::OK)
}

/// Create form body; `form_id` ties repeated POSTs to one form instance.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreatePostFields {
    title: String,
    content: String,
    tags: String,
    form_id: Option<String>,
}

async fn create_blog_submit(
    State(state): State<HttpState>,
    credential: SessionCredential,
    Form(fields): Form<CreatePostFields>,
) -> Response {
    let form_id = FormSessions::accept_id(fields.form_id.as_deref());
    let draft = BlogDraft {
        title: fields.title,
        content: fields.content,
        tags_raw: fields.tags,
    };
    let snapshot = state.forms.submit(&form_id, credential, draft).await;

    // A published form starts over as a new form instance.
    let form_id = if snapshot.phase == FormPhase::Success {
        FormSessions::mint_id()
    } else {
        form_id
    };
    let status = form_status(&snapshot);
    let mut response = render_create_form(&state, &snapshot, form_id, status);
    if status.is_client_error() || status.is_server_error() {
        let message = snapshot
            .notice
            .as_ref()
            .map(|notice| notice.text.clone())
            .unwrap_or_else(|| "post failed validation".to_string());
        ErrorReport::from_message(SOURCE, status, message).attach(&mut response);
    }
    response
}

fn form_status(snapshot: &FormSnapshot) -> StatusCode {
    match snapshot.phase {
        FormPhase::Success => return StatusCode::OK,
        FormPhase::Submitting => return StatusCode::ACCEPTED,
        _ => {}
    }
    match snapshot.failure {
        Some(FailureKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(FailureKind::Rejected { status }) => remote_status(status),
        Some(FailureKind::Transport) => StatusCode::BAD_GATEWAY,
        None => StatusCode::OK,
    }
}

/// Remote error statuses pass through; anything else reads as a gateway failure.
fn remote_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|code| code.is_client_error() || code.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

fn render_create_form(
    state: &HttpState,
    snapshot: &FormSnapshot,
    form_id: String,
    status: StatusCode,
) -> Response {
    let chrome = state.chrome.clone().with_title("Create Post");
    let view = LayoutContext::new(chrome, CreatePostContext::from(snapshot).with_form_id(form_id));
    render_template_response(CreatePostTemplate { view }, status)
}

#[derive(Debug, Deserialize)]
struct ValidateFieldRequest {
    field: PostField,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize)]
struct ValidateFieldResponse {
    field: PostField,
    errors: Vec<String>,
}

/// Blur-time validation for a single field.
async fn validate_field(Json(request): Json<ValidateFieldRequest>) -> Json<ValidateFieldResponse> {
    let (state, _) = reduce(
        FormState::default(),
        FormEvent::FieldChanged {
            field: request.field,
            value: request.value,
        },
    );
    let (state, _) = reduce(state, FormEvent::Blurred(request.field));

    Json(ValidateFieldResponse {
        field: request.field,
        errors: state.errors.messages(request.field).to_vec(),
    })
}

async fn server_form_page(State(state): State<HttpState>) -> Response {
    render_server_form(&state, ServerFormContext::default(), StatusCode::OK)
}

async fn server_form_submit(
    State(state): State<HttpState>,
    credential: SessionCredential,
    Form(fields): Form<RawPostFields>,
) -> Response {
    let echo = fields.clone();
    let (status, message) = match state.server_form.publish(fields, &credential).await {
        ServerSubmitOutcome::Published => {
            return Redirect::to("/dashboard/history").into_response();
        }
        ServerSubmitOutcome::Incomplete(field) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("{} is required", field_label(field)),
        ),
        ServerSubmitOutcome::Failed(err) => {
            let status = match &err {
                SubmitError::Rejected { status, .. } => remote_status(*status),
                SubmitError::Transport { .. } => StatusCode::BAD_GATEWAY,
            };
            (status, err.user_message().to_string())
        }
    };

    let context = ServerFormContext {
        title: echo.title,
        content: echo.content,
        tags: echo.tags,
        error: Some(message.clone()),
    };
    let mut response = render_server_form(&state, context, status);
    ErrorReport::from_message(SOURCE, status, message).attach(&mut response);
    response
}

fn render_server_form(state: &HttpState, context: ServerFormContext, status: StatusCode) -> Response {
    let chrome = state.chrome.clone().with_title("Create Post");
    let view = LayoutContext::new(chrome, context);
    render_template_response(CreatePostServerTemplate { view }, status)
}

fn field_label(field: PostField) -> &'static str {
    match field {
        PostField::Title => "Title",
        PostField::Content => "Content",
        PostField::Tags => "Tags",
    }
}
