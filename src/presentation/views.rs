use crate::application::error::{ErrorReport, HttpError};
use crate::application::form::{FormSnapshot, NoticeKind};
use crate::domain::posts::{BlogPost, PostField, author_initials, comment_count, post_tags};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

const EXCERPT_CHARS: usize = 160;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    render_error_page(
        chrome,
        ErrorPageView::not_found(),
        "presentation::views::render_not_found_response",
    )
}

/// Not-found view for a post id the blog API does not know.
pub fn render_post_not_found_response(chrome: LayoutChrome) -> Response {
    render_error_page(
        chrome,
        ErrorPageView::post_not_found(),
        "presentation::views::render_post_not_found_response",
    )
}

fn render_error_page(chrome: LayoutChrome, content: ErrorPageView, source: &'static str) -> Response {
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(source, StatusCode::NOT_FOUND, "Resource not found").attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

impl NavigationLinkView {
    fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

/// Site-wide page chrome shared by every template.
#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn for_site(title: &str) -> Self {
        Self {
            brand: BrandView {
                title: title.to_string(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries: vec![
                    NavigationLinkView::new("Home", "/"),
                    NavigationLinkView::new("History", "/dashboard/history"),
                    NavigationLinkView::new("Create", "/dashboard/create-blog"),
                ],
            },
            meta: PageMetaView {
                title: title.to_string(),
                description: format!("{title} blog"),
            },
        }
    }

    pub fn with_title(self, page_title: &str) -> Self {
        let title = format!("{page_title} | {}", self.brand.title);
        Self {
            meta: PageMetaView { title, ..self.meta },
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub iso_date: String,
    pub published: String,
    pub tags: Vec<String>,
    pub views: String,
    pub comments: u64,
}

impl From<&BlogPost> for PostCard {
    fn from(post: &BlogPost) -> Self {
        Self {
            href: format!("/blogs/{}", post.id),
            title: post.title.clone(),
            excerpt: excerpt(&post.content),
            iso_date: iso_date(post.created_at),
            published: display_date(post.created_at),
            tags: post_tags(post),
            views: group_thousands(post.views),
            comments: comment_count(post),
        }
    }
}

pub struct HomeContext {
    pub posts: Vec<PostCard>,
    pub has_results: bool,
}

impl HomeContext {
    pub fn from_posts(posts: &[BlogPost]) -> Self {
        let posts: Vec<PostCard> = posts.iter().map(PostCard::from).collect();
        Self {
            has_results: !posts.is_empty(),
            posts,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomeContext>,
}

pub struct PostDetailContext {
    pub title: String,
    pub content: String,
    pub published: String,
    pub iso_date: String,
    pub tags: Vec<String>,
    pub views: String,
    pub comments: u64,
    pub thumbnail: Option<String>,
    pub author_id: String,
    pub author_initials: String,
}

impl From<&BlogPost> for PostDetailContext {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            published: display_date(post.created_at),
            iso_date: iso_date(post.created_at),
            tags: post_tags(post),
            views: group_thousands(post.views),
            comments: comment_count(post),
            thumbnail: post
                .thumbnail
                .as_ref()
                .filter(|url| !url.trim().is_empty())
                .cloned(),
            author_id: post.author_id.clone(),
            author_initials: author_initials(&post.author_id),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct HistoryRow {
    pub title: String,
    pub tags: Vec<String>,
    pub views: String,
    pub comments: u64,
}

impl From<&BlogPost> for HistoryRow {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            tags: post_tags(post),
            views: group_thousands(post.views),
            comments: comment_count(post),
        }
    }
}

pub struct HistoryContext {
    pub rows: Vec<HistoryRow>,
}

impl HistoryContext {
    pub fn from_posts(posts: &[BlogPost]) -> Self {
        Self {
            rows: posts.iter().map(HistoryRow::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub view: LayoutContext<HistoryContext>,
}

pub struct NoticeView {
    pub class: &'static str,
    pub text: String,
}

/// One form field with its current value and messages.
pub struct FieldView {
    pub name: &'static str,
    pub value: String,
    pub errors: Vec<String>,
}

impl FieldView {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct CreatePostContext {
    pub form_id: String,
    pub title: FieldView,
    pub content: FieldView,
    pub tags: FieldView,
    pub notice: Option<NoticeView>,
    pub can_submit: bool,
    pub is_submitting: bool,
}

impl From<&FormSnapshot> for CreatePostContext {
    fn from(snapshot: &FormSnapshot) -> Self {
        let field_view = |field: PostField| FieldView {
            name: field.as_str(),
            value: snapshot.values.get(field).to_string(),
            errors: snapshot.errors.messages(field).to_vec(),
        };

        Self {
            form_id: String::new(),
            title: field_view(PostField::Title),
            content: field_view(PostField::Content),
            tags: field_view(PostField::Tags),
            notice: snapshot.notice.as_ref().map(|notice| NoticeView {
                class: match notice.kind {
                    NoticeKind::Loading => "notice notice-loading",
                    NoticeKind::Success => "notice notice-success",
                    NoticeKind::Error => "notice notice-error",
                },
                text: notice.text.clone(),
            }),
            can_submit: snapshot.can_submit,
            is_submitting: snapshot.is_submitting,
        }
    }
}

impl CreatePostContext {
    pub fn with_form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = form_id.into();
        self
    }
}

#[derive(Template)]
#[template(path = "create_post.html")]
pub struct CreatePostTemplate {
    pub view: LayoutContext<CreatePostContext>,
}

#[derive(Default)]
pub struct ServerFormContext {
    pub title: String,
    pub content: String,
    pub tags: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "create_post_server.html")]
pub struct CreatePostServerTemplate {
    pub view: LayoutContext<ServerFormContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn post_not_found() -> Self {
        Self {
            title: "Post not found".to_string(),
            message: "Post not found...".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to Articles".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

fn excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// `dd/mm/yyyy`, the day-first style of the article header.
pub fn display_date(at: OffsetDateTime) -> String {
    at.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| iso_date(at))
}

fn iso_date(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

/// Render a counter with `,` thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
