//! Pages: the per-request root of the component tree.
//!
//! A [`Page`] owns a [`PageState`] holding its controls, render model and
//! navigation target. [`PageLifecycle`] drives a page through one request:
//! initialize, security check, bind and process controls, fire queued
//! action events, run the GET/POST hook, then resolve navigation.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use http::StatusCode;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::context::Context;
use crate::control::{Control, ControlRegistry};
use crate::dispatcher::ActionEventDispatcher;
use crate::error::{ClickError, Result};
use crate::lifecycle::{LifecycleObserver, LifecyclePhase};

/// Page model: named values handed to the template renderer.
pub type Model = IndexMap<String, Value>;

/// Model keys the framework always sets before rendering.
pub const RESERVED_MODEL_KEYS: &[&str] = &["context", "path", "request_id"];

/// Where a processed page sends the client next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the page itself.
    Render,
    /// Redirect the client to a location.
    Redirect(String),
    /// Forward the request to another page path.
    Forward(String),
}

/// State shared by every page: controls, model and navigation.
#[derive(Debug, Default)]
pub struct PageState {
    controls: ControlRegistry,
    model: Model,
    path: Option<String>,
    template: Option<String>,
    title: Option<String>,
    redirect: Option<String>,
    forward: Option<String>,
    headers: BTreeMap<String, String>,
    content_type: Option<String>,
    status: Option<StatusCode>,
}

impl PageState {
    /// Create an empty page state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a control to the page.
    ///
    /// The control's name must be unique among the page's controls and
    /// model values.
    pub fn add_control<C: Control>(&mut self, control: C) -> Result<()> {
        if self.model.contains_key(control.name()) {
            return Err(ClickError::DuplicateModel(control.name().to_string()));
        }
        self.controls.add(control)
    }

    /// The page's controls.
    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    /// The page's controls, mutably.
    pub fn controls_mut(&mut self) -> &mut ControlRegistry {
        &mut self.controls
    }

    /// Typed control lookup.
    pub fn control<T: Control>(&self, name: &str) -> Option<&T> {
        self.controls.get::<T>(name)
    }

    /// Typed mutable control lookup.
    pub fn control_mut<T: Control>(&mut self, name: &str) -> Option<&mut T> {
        self.controls.get_mut::<T>(name)
    }

    /// Add a model value. Fails if the name is already used.
    pub fn add_model(&mut self, name: impl Into<String>, value: impl Serialize) -> Result<()> {
        let name = name.into();
        if self.model.contains_key(&name) || self.controls.contains(&name) {
            return Err(ClickError::DuplicateModel(name));
        }
        self.model.insert(name, serde_json::to_value(value)?);
        Ok(())
    }

    /// The page model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The page model, mutably.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Page path, set by the host when the page is created.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Set the page path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    /// Template name; defaults to the page path.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref().or(self.path.as_deref())
    }

    /// Set the template name.
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    /// Page title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the page title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Redirect location, if set.
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Redirect the client after processing.
    pub fn set_redirect(&mut self, location: impl Into<String>) {
        self.redirect = Some(location.into());
    }

    /// Forward path, if set.
    pub fn forward(&self) -> Option<&str> {
        self.forward.as_deref()
    }

    /// Forward the request to another page path after processing.
    pub fn set_forward(&mut self, path: impl Into<String>) {
        self.forward = Some(path.into());
    }

    /// Response headers set by the page.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Set a response header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Response content type, if overridden.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Override the response content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// Response status, if overridden.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Override the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Resolve where the client goes next.
    pub fn navigation(&self) -> Result<Navigation> {
        match (&self.redirect, &self.forward) {
            (Some(_), Some(_)) => Err(ClickError::illegal_state(
                "page set both a redirect and a forward",
            )),
            (Some(location), None) if location.trim().is_empty() => {
                Err(ClickError::illegal_state("redirect location is empty"))
            }
            (Some(location), None) => Ok(Navigation::Redirect(location.clone())),
            (None, Some(path)) if path.trim().is_empty() => {
                Err(ClickError::illegal_state("forward path is empty"))
            }
            (None, Some(path)) if Some(path.as_str()) == self.path.as_deref() => Err(
                ClickError::illegal_state(format!("page {} forwards to itself", path)),
            ),
            (None, Some(path)) => Ok(Navigation::Forward(path.clone())),
            (None, None) => Ok(Navigation::Render),
        }
    }
}

/// The per-request root object of the component tree.
///
/// Implementors own a [`PageState`] and override the lifecycle hooks they
/// need. Listener names queued by controls are routed to
/// [`on_action`](Page::on_action).
///
/// ```rust,ignore
/// struct HelloPage {
///     state: PageState,
/// }
///
/// impl Page for HelloPage {
///     fn state(&self) -> &PageState { &self.state }
///     fn state_mut(&mut self) -> &mut PageState { &mut self.state }
///
///     fn on_action(&mut self, listener: &str, _source: &str, ctx: &mut Context) -> Result<bool> {
///         match listener {
///             "on_hello" => Ok(true),
///             _ => Err(self.unknown_listener(listener)),
///         }
///     }
/// }
/// ```
pub trait Page: Any {
    /// Page state.
    fn state(&self) -> &PageState;

    /// Page state, mutably.
    fn state_mut(&mut self) -> &mut PageState;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Called first, before any control is processed.
    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Return `false` to skip processing; set a redirect to send the
    /// client elsewhere.
    fn on_security_check(&mut self, _ctx: &mut Context) -> Result<bool> {
        Ok(true)
    }

    /// Called for non-POST requests after processing.
    fn on_get(&mut self, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Called for POST requests after processing.
    fn on_post(&mut self, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Called before the page is rendered.
    fn on_render(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Called when the request is finished, even after an error.
    fn on_destroy(&mut self) {}

    /// Invoke a listener queued by a control.
    ///
    /// Returns `false` to stop further processing.
    fn on_action(&mut self, listener: &str, _source: &str, _ctx: &mut Context) -> Result<bool> {
        Err(self.unknown_listener(listener))
    }

    /// Error for a listener name the page does not handle.
    fn unknown_listener(&self, listener: &str) -> ClickError {
        ClickError::UnknownListener {
            page: self.name().to_string(),
            listener: listener.to_string(),
        }
    }
}

/// Everything the template renderer needs from a processed page.
#[derive(Debug, Clone, Default)]
pub struct RenderModel {
    /// Page title.
    pub title: Option<String>,
    /// Template name.
    pub template: Option<String>,
    /// Page model, rendered controls and reserved entries.
    pub data: Model,
    /// Rendered HTML of each page control, in insertion order.
    pub controls: IndexMap<String, String>,
    /// Head imports required by the controls.
    pub imports: Vec<String>,
}

/// Drives a page through the request lifecycle.
#[derive(Default, Clone)]
pub struct PageLifecycle {
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl PageLifecycle {
    /// Create a lifecycle without observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify an observer of every phase.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    fn notify(&self, ctx: &mut Context, phase: LifecyclePhase) {
        ctx.timing_mut().mark_phase(&phase);
        let elapsed = ctx.timing().elapsed();
        for observer in &self.observers {
            observer.on_phase(&phase, elapsed);
        }
    }

    /// Process the page and resolve its navigation.
    pub fn process(&self, page: &mut dyn Page, ctx: &mut Context) -> Result<Navigation> {
        page.on_init(ctx)?;
        page.state_mut().controls_mut().init_all(ctx)?;
        self.notify(ctx, LifecyclePhase::Init);

        let mut continue_processing = page.on_security_check(ctx)?;
        self.notify(ctx, LifecyclePhase::SecurityCheck(continue_processing));

        if continue_processing && !ctx.is_forward() && !page.state().controls().is_empty() {
            continue_processing = page.state_mut().controls_mut().process_all(ctx);
            self.notify(ctx, LifecyclePhase::Process);

            if continue_processing {
                continue_processing = self.dispatch(page, ctx)?;
            } else {
                ctx.dispatcher_mut().clear();
            }
        }

        if continue_processing {
            if ctx.is_post() {
                page.on_post(ctx)?;
                self.notify(ctx, LifecyclePhase::Post);
            } else {
                page.on_get(ctx)?;
                self.notify(ctx, LifecyclePhase::Get);
            }
        }

        let navigation = page.state().navigation()?;
        match &navigation {
            Navigation::Redirect(location) => {
                self.notify(ctx, LifecyclePhase::Redirect(location.clone()))
            }
            Navigation::Forward(path) => self.notify(ctx, LifecyclePhase::Forward(path.clone())),
            Navigation::Render => {}
        }
        Ok(navigation)
    }

    /// Fire the action events queued during processing.
    ///
    /// Returns whether processing and rendering should continue. On error
    /// the remaining queue is discarded.
    pub fn dispatch(&self, page: &mut dyn Page, ctx: &mut Context) -> Result<bool> {
        let events = ctx.dispatcher_mut().take();
        let result = ActionEventDispatcher::fire_all(events, |event| {
            tracing::debug!(listener = %event.listener, source = %event.source, "firing listener");
            let result = page
                .on_action(&event.listener, &event.source, ctx)
                .map_err(|err| match err {
                    ClickError::Application(source) => ClickError::Listener {
                        listener: event.listener.clone(),
                        source,
                    },
                    other => other,
                });
            self.notify(ctx, LifecyclePhase::Action(event.listener.clone()));
            result
        });

        if result.is_err() {
            ctx.dispatcher_mut().error_occurred();
        }
        result
    }

    /// Build the render model of a processed page.
    pub fn render_model(&self, page: &mut dyn Page, ctx: &mut Context) -> Result<RenderModel> {
        page.on_render(ctx)?;
        page.state_mut().controls_mut().render_all(ctx);
        self.notify(ctx, LifecyclePhase::Render);

        let state = page.state();
        let controls: IndexMap<String, String> = state
            .controls()
            .iter()
            .map(|c| (c.name().to_string(), c.to_html(ctx)))
            .collect();

        let mut data = state.model().clone();
        for (name, html) in &controls {
            data.insert(name.clone(), Value::String(html.clone()));
        }
        let reserved = [
            ("context", Value::String(ctx.context_path().to_string())),
            (
                "path",
                state
                    .path()
                    .map(|p| Value::String(p.to_string()))
                    .unwrap_or(Value::Null),
            ),
            ("request_id", Value::String(ctx.request_id().to_string())),
        ];
        for (key, value) in reserved {
            if let Some(previous) = data.insert(key.to_string(), value) {
                tracing::warn!(
                    page = page.name(),
                    key,
                    replaced = %previous,
                    "page model value uses a reserved name and has been replaced"
                );
            }
        }

        Ok(RenderModel {
            title: state.title().map(str::to_string),
            template: state.template().map(str::to_string),
            data,
            controls,
            imports: state.controls().html_imports(ctx),
        })
    }

    /// Record a processing failure: pending events are dropped and
    /// observers see the error phase.
    pub fn error_occurred(&self, ctx: &mut Context, error: &ClickError) {
        ctx.dispatcher_mut().error_occurred();
        self.notify(ctx, LifecyclePhase::Error(error.to_string()));
    }

    /// Destroy the page and its controls.
    pub fn destroy(&self, page: &mut dyn Page, ctx: &mut Context) {
        page.state_mut().controls_mut().destroy_all();
        page.on_destroy();
        self.notify(ctx, LifecyclePhase::Destroy);
    }
}

impl std::fmt::Debug for PageLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageLifecycle")
            .field("observers", &self.observers.len())
            .finish()
    }
}
