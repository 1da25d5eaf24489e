//! HTTP surface of the installer
//!
//! One page at `/`: `GET` shows the form, `POST` carries the `step` and
//! `directory` form fields. The display language comes from the `lang`
//! query parameter or the `Accept-Language` header.

pub mod render;

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT_LANGUAGE, USER_AGENT};
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::i18n::Locale;
use crate::workflow::{InstallRequest, InstallStep, InstallWorkflow};

/// Shared state of the installer server
pub struct AppState {
    pub workflow: InstallWorkflow,
    /// Signalled once an install succeeded; the installer has nothing left to do
    pub finished: Notify,
}

impl AppState {
    pub fn new(workflow: InstallWorkflow) -> Arc<Self> {
        Arc::new(Self {
            workflow,
            finished: Notify::new(),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Submitted form; `step` stays a string so malformed values reach the parser
#[derive(Debug, Deserialize, Default)]
pub struct InstallForm {
    pub directory: Option<String>,
    pub step: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit))
        .with_state(state)
}

fn header_str<'a>(headers: &'a HeaderMap, name: axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn request_locale(query: &LangQuery, headers: &HeaderMap) -> Locale {
    Locale::resolve(query.lang.as_deref(), header_str(headers, ACCEPT_LANGUAGE))
}

pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let locale = request_locale(&query, &headers);
    let outcome = state.workflow.show_form();
    Html(render::render_page(locale, &outcome))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
    Form(form): Form<InstallForm>,
) -> Html<String> {
    let locale = request_locale(&query, &headers);
    let step = InstallStep::from_input(form.step.as_deref());
    debug!("Installer request: step {:?}, locale {}", step, locale);

    let mut request = InstallRequest::new(step);
    request.directory = form.directory;
    request.user_agent = header_str(&headers, USER_AGENT).map(str::to_string);

    let outcome = state.workflow.handle(request).await;
    let page = render::render_page(locale, &outcome);

    if outcome.is_success() {
        info!("Install finished, shutting down after this response");
        state.finished.notify_one();
    }

    Html(page)
}

/// Serve the installer until an install succeeds or `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, workflow: InstallWorkflow, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::new(workflow);
    let finished = state.clone();

    if let Ok(addr) = listener.local_addr() {
        info!("Installer listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = finished.finished.notified() => {}
                _ = shutdown => {}
            }
        })
        .await
}
