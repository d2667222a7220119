//! End-to-end requests through `ClickApp::handle`.

use std::sync::atomic::{AtomicUsize, Ordering};

use click_controls::prelude::*;
use click_core::{ClickError, Context, Page, PageState, RenderModel, Result};
use click_server::{AppConfig, ClickApp, Mode, PageConfig};
use http::{header, Method, Request, Response, StatusCode};
use serde_json::Value;

static DESTROYED: AtomicUsize = AtomicUsize::new(0);

struct LoginPage {
    state: PageState,
}

impl LoginPage {
    fn new() -> Self {
        let mut form = Form::new("form");
        form.add(TextField::new("username").required(true)).unwrap();
        form.add(Submit::new("ok").with_listener("on_ok")).unwrap();
        let mut state = PageState::new().with_title("Login");
        state.add_control(form).unwrap();
        Self { state }
    }
}

impl Page for LoginPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_action(&mut self, listener: &str, _source: &str, ctx: &mut Context) -> Result<bool> {
        match listener {
            "on_ok" => {
                let Some(form) = self.state.control::<Form>("form") else {
                    return Ok(true);
                };
                if !form.is_valid() {
                    return Ok(true);
                }
                let user = form.field_value("username").unwrap_or_default().to_string();
                ctx.set_session_attribute("user", Value::String(user));
                self.state.set_redirect("/home.htm");
                Ok(false)
            }
            _ => Err(self.unknown_listener(listener)),
        }
    }

    fn on_destroy(&mut self) {
        DESTROYED.fetch_add(1, Ordering::SeqCst);
    }
}

struct HomePage {
    state: PageState,
}

impl HomePage {
    fn new() -> Self {
        Self {
            state: PageState::new().with_title("Home"),
        }
    }
}

impl Page for HomePage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_get(&mut self, ctx: &mut Context) -> Result<()> {
        let user = ctx
            .session_attribute("user")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "guest".to_string());
        self.state.add_model("user", user)?;
        self.state.set_header("X-Page", "home");
        Ok(())
    }
}

struct CounterPage {
    state: PageState,
    fired: Vec<String>,
}

impl CounterPage {
    fn new() -> Self {
        let mut state = PageState::new();
        state
            .add_control(ActionLink::new("increment").with_listener("on_increment"))
            .unwrap();
        state
            .add_control(ActionLink::new("decrement").with_listener("on_decrement"))
            .unwrap();
        state
            .add_control(ActionLink::new("explode").with_listener("on_explode"))
            .unwrap();
        Self {
            state,
            fired: Vec::new(),
        }
    }
}

impl Page for CounterPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_action(&mut self, listener: &str, _source: &str, _ctx: &mut Context) -> Result<bool> {
        match listener {
            "on_increment" | "on_decrement" => {
                self.fired.push(listener.to_string());
                Ok(true)
            }
            "on_explode" => Err(anyhow::anyhow!("counter storage unavailable").into()),
            _ => Err(self.unknown_listener(listener)),
        }
    }

    fn on_render(&mut self, _ctx: &Context) -> Result<()> {
        let fired = self.fired.join(",");
        self.state.add_model("fired", fired)
    }
}

/// Forwards to the path in the `to` parameter; `/forward-again.htm`
/// always forwards back to `/forward.htm`.
struct ForwardPage {
    state: PageState,
}

impl Page for ForwardPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_get(&mut self, ctx: &mut Context) -> Result<()> {
        let target = if self.state.path() == Some("/forward-again.htm") {
            "/forward.htm".to_string()
        } else {
            ctx.request_parameter("to").unwrap_or("/home.htm").to_string()
        };
        self.state.set_forward(target);
        Ok(())
    }
}

struct SecurePage {
    state: PageState,
}

impl Page for SecurePage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_security_check(&mut self, ctx: &mut Context) -> Result<bool> {
        if ctx.session_attribute("user").is_some() {
            return Ok(true);
        }
        self.state.set_redirect("/login.htm");
        Ok(false)
    }

    fn on_get(&mut self, _ctx: &mut Context) -> Result<()> {
        self.state.add_model("secret", "42")
    }
}

struct BrokenNavigationPage {
    state: PageState,
}

impl Page for BrokenNavigationPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_get(&mut self, _ctx: &mut Context) -> Result<()> {
        self.state.set_redirect("/home.htm");
        self.state.set_forward("/login.htm");
        Ok(())
    }
}

fn app(config: AppConfig) -> ClickApp {
    ClickApp::builder(config)
        .mount("/login.htm", LoginPage::new)
        .mount("/home.htm", HomePage::new)
        .mount("/counter.htm", CounterPage::new)
        .mount("/secure.htm", || SecurePage {
            state: PageState::new(),
        })
        .mount("/broken.htm", || BrokenNavigationPage {
            state: PageState::new(),
        })
        .page("forward", || ForwardPage {
            state: PageState::new(),
        })
        .build()
        .unwrap()
}

fn default_app() -> ClickApp {
    app(AppConfig::new("test")
        .with_context_path("/shop")
        .with_page("/forward.htm", "forward")
        .with_page("/forward-again.htm", "forward"))
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .unwrap()
}

fn header_value<'a>(response: &'a Response<String>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn session_cookie(response: &Response<String>) -> String {
    let cookie = header_value(response, "set-cookie").unwrap();
    cookie.split(';').next().unwrap().to_string()
}

// === Rendering Tests ===

#[test]
fn test_get_renders_page() {
    let response = default_app().handle(get("/shop/login.htm"));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, "content-type"),
        Some("text/html; charset=UTF-8")
    );
    let body = response.body();
    assert!(body.contains("<title>Login</title>"));
    assert!(body.contains("<form method=\"post\" name=\"form\" id=\"form\" action=\"/shop/login.htm\""));
    assert!(body.contains("name=\"username\""));
    assert!(!body.contains("class=\"errors\""));
    assert!(header_value(&response, "set-cookie").is_none());
}

#[test]
fn test_config_and_page_headers() {
    let config = AppConfig::new("test")
        .with_header("Cache-Control", "no-store")
        .with_page_config(
            PageConfig::new("/welcome.htm", "/home.htm").with_header("X-Route", "welcome"),
        );
    let app = app(config);

    let response = app.handle(get("/home.htm"));
    assert_eq!(header_value(&response, "cache-control"), Some("no-store"));
    assert_eq!(header_value(&response, "x-page"), Some("home"));
    assert!(header_value(&response, "x-route").is_none());
    assert!(response.body().contains("<div id=\"user\" class=\"model\">guest</div>"));

    let response = app.handle(get("/welcome.htm"));
    assert_eq!(header_value(&response, "x-route"), Some("welcome"));
}

#[test]
fn test_custom_template_renderer() {
    let app = ClickApp::builder(AppConfig::default())
        .mount("/home.htm", HomePage::new)
        .template("/home.htm", |model: &RenderModel, _ctx: &Context| -> Result<String> {
            Ok(format!(
                "user={} path={}",
                model.data["user"].as_str().unwrap_or(""),
                model.data["path"].as_str().unwrap_or("")
            ))
        })
        .build()
        .unwrap();

    let response = app.handle(get("/home.htm"));
    assert_eq!(response.body(), "user=guest path=/home.htm");
}

#[test]
fn test_unknown_path_is_not_found() {
    let response = default_app().handle(get("/shop/missing.htm"));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.body().contains("/shop/missing.htm"));
}

// === Form Submission Tests ===

#[test]
fn test_invalid_post_rerenders_with_errors() {
    let response = default_app().handle(post_form(
        "/shop/login.htm",
        "form_name=form&username=++&ok=OK",
    ));

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .body()
        .contains("You must enter a value for Username"));
}

#[test]
fn test_valid_post_redirects_and_sets_session() {
    let app = default_app();
    let response = app.handle(post_form(
        "/shop/login.htm",
        "form_name=form&username=alice&ok=OK",
    ));

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_value(&response, "location"), Some("/shop/home.htm"));
    let set_cookie = header_value(&response, "set-cookie").unwrap();
    assert!(set_cookie.starts_with("CLICKSESSIONID="));
    assert!(set_cookie.contains("Path=/shop"));
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = session_cookie(&response);
    let request = Request::builder()
        .uri("/shop/home.htm")
        .header(header::COOKIE, cookie)
        .body(String::new())
        .unwrap();
    let response = app.handle(request);

    assert!(response.body().contains("class=\"model\">alice</div>"));
    assert!(header_value(&response, "set-cookie").is_none());
}

#[test]
fn test_post_to_other_form_is_ignored() {
    let response = default_app().handle(post_form(
        "/shop/login.htm",
        "form_name=search&username=&ok=OK",
    ));

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.body().contains("You must enter a value"));
}

// === Action Event Tests ===

#[test]
fn test_one_listener_per_action_link() {
    let response = default_app().handle(get("/shop/counter.htm?actionLink=increment"));

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .body()
        .contains("<div id=\"fired\" class=\"model\">on_increment</div>"));
}

#[test]
fn test_no_action_parameter_fires_nothing() {
    let response = default_app().handle(get("/shop/counter.htm"));

    assert!(response
        .body()
        .contains("<div id=\"fired\" class=\"model\"></div>"));
}

#[test]
fn test_listener_error_renders_error_page() {
    let response = default_app().handle(get("/shop/counter.htm?actionLink=explode"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body().contains("listener on_explode failed"));
    assert!(response.body().contains("caused by: counter storage unavailable"));
}

#[test]
fn test_production_hides_error_detail() {
    let config = AppConfig::new("test").with_mode(Mode::Production);
    let response = app(config).handle(get("/counter.htm?actionLink=explode"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.body().contains("caused by"));
}

// === Navigation Tests ===

#[test]
fn test_security_check_redirects() {
    let response = default_app().handle(get("/shop/secure.htm"));

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_value(&response, "location"), Some("/shop/login.htm"));
    assert!(response.body().is_empty());
}

#[test]
fn test_forward_renders_target() {
    let response = default_app().handle(get("/shop/forward.htm?to=/login.htm"));

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body().contains("<title>Login</title>"));
}

#[test]
fn test_forward_skips_control_processing() {
    let response = default_app().handle(get(
        "/shop/forward.htm?to=/counter.htm&actionLink=increment",
    ));

    assert!(response
        .body()
        .contains("<div id=\"fired\" class=\"model\"></div>"));
}

#[test]
fn test_forward_to_unregistered_page_fails() {
    let response = default_app().handle(get("/shop/forward.htm?to=/nowhere.htm"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body().contains("not a registered page"));
}

#[test]
fn test_forward_loop_fails() {
    let response = default_app().handle(get("/shop/forward.htm?to=/forward-again.htm"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body().contains("forward loop"));
}

#[test]
fn test_redirect_and_forward_is_illegal() {
    let response = default_app().handle(get("/shop/broken.htm"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let expected = ClickError::illegal_state("page set both a redirect and a forward");
    assert!(response.body().contains(&expected.to_string()));
}

// === Destroy Tests ===

#[test]
fn test_destroy_runs_for_every_request() {
    let app = default_app();
    let before = DESTROYED.load(Ordering::SeqCst);

    app.handle(get("/shop/login.htm"));
    app.handle(post_form("/shop/login.htm", "form_name=form&username=bob&ok=OK"));
    app.handle(get("/shop/forward.htm?to=/login.htm"));

    assert!(DESTROYED.load(Ordering::SeqCst) >= before + 3);
}
