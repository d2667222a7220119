//! The request pipeline.
//!
//! [`ClickApp::handle`] turns an `http::Request` into an `http::Response`:
//! build the context, look up the page, run it through the lifecycle, then
//! redirect, forward or render. Errors render the error page; every page
//! created is destroyed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error as _;
use std::sync::Arc;

use click_core::{
    normalize_path, ClickError, Context, LifecycleObserver, LifecyclePhase, MemorySessionStore,
    Messages, Navigation, Page, PageLifecycle, RequestParams, SessionStore,
};
use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode};
use serde_json::Value;

use crate::config::{AppConfig, PageConfig};
use crate::error::Result;
use crate::error_page::{ErrorPage, NotFoundPage, ERROR_ATTRIBUTE, ERROR_DETAIL_ATTRIBUTE};
use crate::logging::RequestLogger;
use crate::registry::PageRegistry;
use crate::render::{ShellRenderer, TemplateRenderer};

/// Most forwards a single request may follow.
pub const MAX_FORWARDS: usize = 8;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Logs every lifecycle phase at debug level.
#[derive(Debug)]
struct PhaseLogger;

impl LifecycleObserver for PhaseLogger {
    fn on_phase(&self, phase: &LifecyclePhase, elapsed: std::time::Duration) {
        tracing::debug!(
            phase = %phase,
            elapsed_us = elapsed.as_micros() as u64,
            "lifecycle phase"
        );
    }
}

enum Outcome {
    Respond(Response<String>),
    Forward(String),
}

/// Assembles a [`ClickApp`].
///
/// ```rust,ignore
/// let app = ClickApp::builder(AppConfig::new("shop"))
///     .mount("/home.htm", HomePage::new)
///     .build()?;
/// ```
pub struct ClickAppBuilder {
    config: AppConfig,
    registry: PageRegistry,
    mounts: Vec<PageConfig>,
    lifecycle: PageLifecycle,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    templates: HashMap<String, Arc<dyn TemplateRenderer>>,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl ClickAppBuilder {
    /// Register a named page factory, for routes in the config file.
    pub fn page<P, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.registry.register(name, factory);
        self
    }

    /// Register a page factory and route `path` to it.
    pub fn mount<P, F>(mut self, path: &str, factory: F) -> Self
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        let path = normalize_path(path);
        self.registry.register(path.clone(), factory);
        self.mounts.push(PageConfig::new(path.clone(), path));
        self
    }

    /// Page shown for unknown paths instead of the built-in one.
    pub fn not_found_page<P, F>(mut self, factory: F) -> Self
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.registry.set_not_found(factory);
        self
    }

    /// Page shown on errors instead of the built-in one.
    pub fn error_page<P, F>(mut self, factory: F) -> Self
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.registry.set_error(factory);
        self
    }

    /// Default renderer for every template.
    pub fn renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Renderer for one template name.
    pub fn template(
        mut self,
        template: impl Into<String>,
        renderer: impl TemplateRenderer + 'static,
    ) -> Self {
        self.templates.insert(template.into(), Arc::new(renderer));
        self
    }

    /// Notify an observer of every lifecycle phase.
    pub fn observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle = self.lifecycle.with_observer(observer);
        self
    }

    /// Use a custom session store.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    /// Validate the configuration and resolve every route.
    pub fn build(self) -> Result<ClickApp> {
        let Self {
            config,
            mut registry,
            mounts,
            mut lifecycle,
            renderer,
            templates,
            sessions,
        } = self;

        config.validate()?;
        for page in config.pages.iter().chain(mounts.iter()) {
            registry.add_route(page)?;
        }
        if config.mode.logs_phases() {
            lifecycle = lifecycle.with_observer(Arc::new(PhaseLogger));
        }

        let renderer =
            renderer.unwrap_or_else(|| Arc::new(ShellRenderer::new(config.charset.clone())));
        let sessions = sessions.unwrap_or_else(|| {
            Arc::new(MemorySessionStore::with_idle_timeout(chrono::Duration::seconds(
                config.session.idle_timeout_secs,
            )))
        });
        let messages = Arc::new(Messages::new().with_overrides(config.messages.clone()));

        tracing::info!(
            app = %config.name,
            mode = %config.mode,
            pages = registry.len(),
            "application ready"
        );

        Ok(ClickApp {
            config,
            registry,
            lifecycle,
            renderer,
            templates,
            sessions,
            messages,
        })
    }
}

/// A configured application: routes, renderers and session storage.
pub struct ClickApp {
    config: AppConfig,
    registry: PageRegistry,
    lifecycle: PageLifecycle,
    renderer: Arc<dyn TemplateRenderer>,
    templates: HashMap<String, Arc<dyn TemplateRenderer>>,
    sessions: Arc<dyn SessionStore>,
    messages: Arc<Messages>,
}

impl ClickApp {
    /// Start assembling an application.
    pub fn builder(config: AppConfig) -> ClickAppBuilder {
        ClickAppBuilder {
            config,
            registry: PageRegistry::new(),
            mounts: Vec::new(),
            lifecycle: PageLifecycle::new(),
            renderer: None,
            templates: HashMap::new(),
            sessions: None,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The page registry.
    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    /// The session store.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Drop expired sessions, returning how many were removed.
    pub fn purge_sessions(&self) -> usize {
        self.sessions.purge_expired()
    }

    /// Handle one request.
    pub fn handle(&self, request: Request<String>) -> Response<String> {
        let mut ctx = self.build_context(request);
        let logger = RequestLogger::new(ctx.request_id().clone())
            .with_app(self.config.name.clone())
            .with_path(ctx.resource_path())
            .with_format(self.config.log.format)
            .with_min_level(self.config.log_level());

        if self.config.mode.logs_parameters() {
            let params = ctx
                .params()
                .sorted()
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            logger
                .trace_builder("request parameters")
                .field("method", ctx.method().as_str())
                .field_value("params", Value::Object(params))
                .emit();
        }

        let mut response = self.dispatch(&mut ctx, &logger);
        self.set_session_cookie(&ctx, &mut response);

        if self.config.mode.logs_requests() {
            logger
                .info_builder("request handled")
                .field("method", ctx.method().as_str())
                .field_i64("status", i64::from(response.status().as_u16()))
                .duration_ms("elapsed_ms", logger.elapsed())
                .emit();
        }
        response
    }

    fn build_context(&self, request: Request<String>) -> Context {
        let (parts, body) = request.into_parts();
        let resource_path = self.strip_context_path(parts.uri.path());

        let mut params = parts
            .uri
            .query()
            .map(RequestParams::parse)
            .unwrap_or_default();
        if parts.method == Method::POST && is_form_body(&parts.headers) {
            params.extend(RequestParams::parse(&body));
        }

        let mut ctx = Context::new(parts.method.clone(), resource_path)
            .with_params(params)
            .with_context_path(self.config.context_path.clone())
            .with_session_store(self.sessions.clone())
            .with_messages(self.messages.clone());

        if let Some(session) = cookie_value(&parts.headers, &self.config.session.cookie_name)
            .and_then(|id| self.sessions.get(&id))
        {
            ctx = ctx.with_session(session);
        }
        if let Some(locale) = preferred_locale(&parts.headers) {
            ctx = ctx.with_locale(locale);
        }
        ctx.with_headers(parts.headers)
    }

    fn strip_context_path(&self, path: &str) -> String {
        let context_path = &self.config.context_path;
        if context_path.is_empty() {
            return normalize_path(path);
        }
        match path.strip_prefix(context_path.as_str()) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => normalize_path(path),
        }
    }

    fn dispatch(&self, ctx: &mut Context, logger: &RequestLogger) -> Response<String> {
        let mut path = ctx.resource_path().to_string();
        let mut visited = HashSet::new();

        for _ in 0..=MAX_FORWARDS {
            visited.insert(path.clone());
            let (mut page, route_headers) = match self.registry.create(&path) {
                Some((page, route)) => (page, route.headers.clone()),
                None if ctx.is_forward() => {
                    let err = ClickError::illegal_state(format!(
                        "forward target {} is not a registered page",
                        path
                    ));
                    return self.error_response(ctx, logger, &err);
                }
                None => {
                    logger
                        .debug_builder("page not found")
                        .field("path", path.clone())
                        .emit();
                    let page = self.registry.create_not_found(&path).unwrap_or_else(|| {
                        let mut page: Box<dyn Page> = Box::new(NotFoundPage::new());
                        page.state_mut().set_path(path.clone());
                        page
                    });
                    (page, BTreeMap::new())
                }
            };

            logger
                .debug_builder("processing page")
                .field("page", page.name())
                .emit();
            let outcome = self.run_page(page.as_mut(), ctx, &route_headers);
            self.lifecycle.destroy(page.as_mut(), ctx);

            match outcome {
                Ok(Outcome::Respond(response)) => return response,
                Ok(Outcome::Forward(target)) if visited.contains(&target) => {
                    let err = ClickError::illegal_state(format!(
                        "forward loop: {} forwards back to {}",
                        path, target
                    ));
                    return self.error_response(ctx, logger, &err);
                }
                Ok(Outcome::Forward(target)) => {
                    logger
                        .debug_builder("forwarding")
                        .field("from", path.clone())
                        .field("to", target.clone())
                        .emit();
                    ctx.forward_to(target.clone());
                    path = target;
                }
                Err(err) => return self.error_response(ctx, logger, &err),
            }
        }

        let err = ClickError::illegal_state(format!("more than {} forwards", MAX_FORWARDS));
        self.error_response(ctx, logger, &err)
    }

    fn run_page(
        &self,
        page: &mut dyn Page,
        ctx: &mut Context,
        route_headers: &BTreeMap<String, String>,
    ) -> click_core::Result<Outcome> {
        match self.lifecycle.process(page, ctx)? {
            Navigation::Redirect(location) => Ok(Outcome::Respond(self.redirect(ctx, &location))),
            Navigation::Forward(target) => Ok(Outcome::Forward(normalize_path(&target))),
            Navigation::Render => self.render(page, ctx, route_headers).map(Outcome::Respond),
        }
    }

    fn redirect(&self, ctx: &Context, location: &str) -> Response<String> {
        let location = if location.starts_with('/') && !location.starts_with("//") {
            format!("{}{}", ctx.context_path(), location)
        } else {
            location.to_string()
        };
        let mut response = Response::new(String::new());
        *response.status_mut() = StatusCode::FOUND;
        set_header(&mut response, LOCATION.as_str(), &location);
        response
    }

    fn render(
        &self,
        page: &mut dyn Page,
        ctx: &mut Context,
        route_headers: &BTreeMap<String, String>,
    ) -> click_core::Result<Response<String>> {
        let model = self.lifecycle.render_model(page, ctx)?;
        let renderer = model
            .template
            .as_deref()
            .and_then(|template| self.templates.get(template))
            .unwrap_or(&self.renderer);
        let body = renderer.render(&model, ctx)?;

        let state = page.state();
        let mut response = Response::new(body);
        *response.status_mut() = state.status().unwrap_or(StatusCode::OK);
        let content_type = state
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| format!("text/html; charset={}", self.config.charset));
        set_header(&mut response, CONTENT_TYPE.as_str(), &content_type);
        for headers in [&self.config.headers, route_headers, state.headers()] {
            for (name, value) in headers {
                set_header(&mut response, name, value);
            }
        }
        Ok(response)
    }

    fn error_response(
        &self,
        ctx: &mut Context,
        logger: &RequestLogger,
        err: &ClickError,
    ) -> Response<String> {
        logger
            .error_builder("page processing failed")
            .field("error", err.to_string())
            .emit();
        tracing::error!(
            request_id = %ctx.request_id(),
            path = %ctx.resource_path(),
            error = %err,
            "page processing failed"
        );
        self.lifecycle.error_occurred(ctx, err);

        ctx.set_request_attribute(ERROR_ATTRIBUTE, Value::String(err.to_string()));
        if !self.config.mode.is_production() {
            ctx.set_request_attribute(ERROR_DETAIL_ATTRIBUTE, Value::String(error_chain(err)));
        }

        let path = ctx.resource_path().to_string();
        let mut page = self.registry.create_error(&path).unwrap_or_else(|| {
            let mut page: Box<dyn Page> = Box::new(ErrorPage::new());
            page.state_mut().set_path(path.clone());
            page
        });
        let result = self
            .lifecycle
            .process(page.as_mut(), ctx)
            .and_then(|_| self.render(page.as_mut(), ctx, &BTreeMap::new()));
        let status_set = page.state().status().is_some();
        self.lifecycle.destroy(page.as_mut(), ctx);

        match result {
            Ok(mut response) => {
                if !status_set {
                    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                }
                response
            }
            Err(page_err) => {
                logger
                    .error_builder("error page failed")
                    .field("error", page_err.to_string())
                    .emit();
                let mut response = Response::new("Internal Server Error".to_string());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                set_header(&mut response, CONTENT_TYPE.as_str(), "text/plain");
                response
            }
        }
    }

    fn set_session_cookie(&self, ctx: &Context, response: &mut Response<String>) {
        let Some(session) = ctx.existing_session() else {
            return;
        };
        let cookie_path = if self.config.context_path.is_empty() {
            "/"
        } else {
            self.config.context_path.as_str()
        };
        let name = &self.config.session.cookie_name;
        let cookie = if session.is_invalidated() {
            format!("{}=; Path={}; Max-Age=0; HttpOnly", name, cookie_path)
        } else if ctx.session_created() {
            format!("{}={}; Path={}; HttpOnly", name, session.id(), cookie_path)
        } else {
            return;
        };
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(_) => tracing::warn!(cookie = %name, "invalid session cookie skipped"),
        }
    }
}

impl std::fmt::Debug for ClickApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickApp")
            .field("name", &self.config.name)
            .field("mode", &self.config.mode)
            .field("registry", &self.registry)
            .field("lifecycle", &self.lifecycle)
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn set_header(response: &mut Response<String>, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            response.headers_mut().insert(name, value);
        }
        _ => tracing::warn!(header = name, "invalid response header skipped"),
    }
}

fn is_form_body(headers: &HeaderMap) -> bool {
    match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some(content_type) => content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with(FORM_CONTENT_TYPE),
        None => true,
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

fn preferred_locale(headers: &HeaderMap) -> Option<String> {
    let header = headers
        .get(http::header::ACCEPT_LANGUAGE)?
        .to_str()
        .ok()?;
    let tag = header.split(',').next()?.split(';').next()?.trim();
    if tag.is_empty() || tag == "*" {
        None
    } else {
        Some(tag.to_string())
    }
}

fn error_chain(err: &ClickError) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(&format!("\ncaused by: {}", cause));
        source = cause.source();
    }
    detail
}
