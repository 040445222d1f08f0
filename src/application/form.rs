//! Create-post form state machine.
//!
//! [`reduce`] is pure; [`FormController`] owns one form instance and runs the
//! single effect the reducer can emit. [`FormSessions`] keeps submitting
//! controllers addressable by form id across requests.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::posts::{PostSubmitter, SubmitError};
use crate::application::remote::SessionCredential;
use crate::domain::posts::{BlogDraft, NewPost, PostField};
use crate::domain::validation::{FieldErrors, PostSchema};

pub const LOADING_NOTICE: &str = "Publishing your story...";
pub const SUCCESS_NOTICE: &str = "Post published successfully!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Loading,
    Success,
    Error,
}

/// Toast text shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Why the last submit attempt did not publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Rejected { status: u16 },
    Transport,
}

impl From<&SubmitError> for FailureKind {
    fn from(error: &SubmitError) -> Self {
        match error {
            SubmitError::Rejected { status, .. } => FailureKind::Rejected { status: *status },
            SubmitError::Transport { .. } => FailureKind::Transport,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub values: BlogDraft,
    pub errors: FieldErrors,
    pub touched: BTreeSet<PostField>,
    pub phase: FormPhase,
    pub notice: Option<Notice>,
    pub failure: Option<FailureKind>,
}

impl FormState {
    pub fn with_values(values: BlogDraft) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    FieldChanged { field: PostField, value: String },
    Blurred(PostField),
    Submitted,
    SubmitResolved(Result<(), SubmitError>),
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    Submit(NewPost),
}

pub fn reduce(mut state: FormState, event: FormEvent) -> (FormState, Option<FormEffect>) {
    match event {
        FormEvent::FieldChanged { field, value } => {
            if state.is_submitting() {
                return (state, None);
            }
            state.values.set(field, value);
            // Fields already flagged are re-checked so fixed input clears its error.
            if state.errors.has(field) {
                let messages = PostSchema::validate_field(field, state.values.get(field));
                state.errors.replace(field, messages);
            }
            (state, None)
        }
        FormEvent::Blurred(field) => {
            if state.is_submitting() {
                return (state, None);
            }
            state.touched.insert(field);
            let messages = PostSchema::validate_field(field, state.values.get(field));
            state.errors.replace(field, messages);
            (state, None)
        }
        FormEvent::Submitted => {
            if state.is_submitting() {
                return (state, None);
            }
            // A settled outcome counts as acknowledged once the author submits again.
            state.phase = FormPhase::Validating;
            match PostSchema::validate(&state.values) {
                Err(errors) => {
                    state.errors = errors;
                    state.touched.extend(PostField::ALL);
                    state.failure = Some(FailureKind::Validation);
                    state.notice = None;
                    state.phase = FormPhase::Idle;
                    (state, None)
                }
                Ok(valid) => {
                    state.errors.clear();
                    state.failure = None;
                    state.phase = FormPhase::Submitting;
                    state.notice = Some(Notice::new(NoticeKind::Loading, LOADING_NOTICE));
                    let post = valid.into_draft().into_new_post();
                    (state, Some(FormEffect::Submit(post)))
                }
            }
        }
        FormEvent::SubmitResolved(result) => {
            if !state.is_submitting() {
                return (state, None);
            }
            match result {
                Ok(()) => {
                    state = FormState {
                        phase: FormPhase::Success,
                        notice: Some(Notice::new(NoticeKind::Success, SUCCESS_NOTICE)),
                        ..FormState::default()
                    };
                }
                Err(err) => {
                    state.phase = FormPhase::Failure;
                    state.failure = Some(FailureKind::from(&err));
                    state.notice = Some(Notice::new(NoticeKind::Error, err.user_message()));
                }
            }
            (state, None)
        }
        FormEvent::Acknowledged => {
            if matches!(state.phase, FormPhase::Success | FormPhase::Failure) {
                state.phase = FormPhase::Idle;
                state.notice = None;
                state.failure = None;
            }
            (state, None)
        }
    }
}

/// Read model the create-post views render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub values: BlogDraft,
    pub errors: FieldErrors,
    pub phase: FormPhase,
    pub is_submitting: bool,
    pub can_submit: bool,
    pub notice: Option<Notice>,
    pub failure: Option<FailureKind>,
}

impl From<&FormState> for FormSnapshot {
    fn from(state: &FormState) -> Self {
        Self {
            values: state.values.clone(),
            errors: state.errors.clone(),
            phase: state.phase,
            is_submitting: state.is_submitting(),
            can_submit: state.can_submit(),
            notice: state.notice.clone(),
            failure: state.failure,
        }
    }
}

/// One create-post form instance bound to the author's credential.
pub struct FormController {
    submitter: Arc<dyn PostSubmitter>,
    credential: SessionCredential,
    state: Mutex<FormState>,
}

impl FormController {
    pub fn with_values(
        submitter: Arc<dyn PostSubmitter>,
        credential: SessionCredential,
        values: BlogDraft,
    ) -> Self {
        Self {
            submitter,
            credential,
            state: Mutex::new(FormState::with_values(values)),
        }
    }

    pub async fn dispatch(&self, event: FormEvent) -> Option<FormEffect> {
        let mut guard = self.state.lock().await;
        let current = std::mem::take(&mut *guard);
        let (next, effect) = reduce(current, event);
        *guard = next;
        effect
    }

    /// Validate the current values; `Some` means the form is now submitting.
    async fn begin(&self) -> Option<NewPost> {
        match self.dispatch(FormEvent::Submitted).await {
            Some(FormEffect::Submit(post)) => Some(post),
            None => {
                debug!(target: "folio::form", "submit ignored or blocked by validation");
                None
            }
        }
    }

    /// Send the post and record the outcome. The state lock is not held
    /// while the request is in flight.
    async fn publish(&self, post: NewPost) {
        let result = self.submitter.submit_post(&post, &self.credential).await;
        self.dispatch(FormEvent::SubmitResolved(result)).await;
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        FormSnapshot::from(&*self.state.lock().await)
    }
}

/// Longest form id accepted from a client; anything else gets a fresh id.
pub const MAX_FORM_ID_LEN: usize = 64;

/// Create-post forms with a submit in flight, keyed by the id the create
/// page embeds in the form.
///
/// A repeated POST for an id that is still publishing joins the running
/// controller and reports its state instead of issuing a second write.
pub struct FormSessions {
    submitter: Arc<dyn PostSubmitter>,
    in_flight: DashMap<String, Arc<FormController>>,
}

impl FormSessions {
    pub fn new(submitter: Arc<dyn PostSubmitter>) -> Self {
        Self {
            submitter,
            in_flight: DashMap::new(),
        }
    }

    pub fn mint_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Keep a well-formed client id, otherwise mint one.
    pub fn accept_id(raw: Option<&str>) -> String {
        match raw.map(str::trim) {
            Some(id)
                if !id.is_empty()
                    && id.len() <= MAX_FORM_ID_LEN
                    && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') =>
            {
                id.to_string()
            }
            _ => Self::mint_id(),
        }
    }

    pub async fn submit(
        &self,
        form_id: &str,
        credential: SessionCredential,
        values: BlogDraft,
    ) -> FormSnapshot {
        let controller = Arc::new(FormController::with_values(
            Arc::clone(&self.submitter),
            credential,
            values,
        ));
        let Some(post) = controller.begin().await else {
            return controller.snapshot().await;
        };

        let _in_flight = match self.claim(form_id, &controller) {
            Ok(guard) => guard,
            Err(running) => {
                debug!(target: "folio::form", form_id, "submit already in flight");
                return running.snapshot().await;
            }
        };

        controller.publish(post).await;
        controller.snapshot().await
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Register `controller` under `form_id`, or hand back the one already there.
    fn claim(
        &self,
        form_id: &str,
        controller: &Arc<FormController>,
    ) -> Result<InFlightForm<'_>, Arc<FormController>> {
        match self.in_flight.entry(form_id.to_string()) {
            Entry::Occupied(running) => Err(Arc::clone(running.get())),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(controller));
                Ok(InFlightForm {
                    sessions: self,
                    form_id: form_id.to_string(),
                })
            }
        }
    }

}

/// Frees a form id when its submit finishes or the request is dropped.
struct InFlightForm<'a> {
    sessions: &'a FormSessions,
    form_id: String,
}

impl Drop for InFlightForm<'_> {
    fn drop(&mut self) {
        self.sessions.in_flight.remove(&self.form_id);
    }
}
