//! Send requests through the page pipeline.

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{bail, Context as _, Result};
use click_server::ClickApp;
use http::{header, HeaderName, HeaderValue, Method, Request, Response};
use serde::Serialize;

use super::RequestArgs;
use crate::context::Context;
use crate::output::{format_duration_us, status_badge};

/// Redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// One response as printed in JSON mode.
#[derive(Debug, Serialize)]
struct ResponseSummary {
    method: String,
    uri: String,
    status: u16,
    headers: BTreeMap<String, String>,
    body: String,
    elapsed_us: u128,
}

/// Run the request command.
pub fn run(args: RequestArgs, ctx: &Context) -> Result<()> {
    let app = click_examples::application(ctx.config.clone())?;
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;
    let params = parse_params(&args.params)?;
    let headers = parse_headers(&args.headers)?;

    let uri = request_uri(&ctx.config.context_path, &args.path);
    let mut request = build_request(method, &uri, &params, &headers, None)?;
    let mut summaries = Vec::new();
    let mut cookie: Option<String> = None;

    loop {
        let summary = send(&app, request);
        print_response(ctx, &summary, args.include);

        let location = summary
            .headers
            .get(header::LOCATION.as_str())
            .filter(|_| args.follow && is_redirect(summary.status))
            .cloned();
        if let Some(set_cookie) = summary.headers.get(header::SET_COOKIE.as_str()) {
            cookie = session_cookie(set_cookie);
        }
        summaries.push(summary);

        let Some(location) = location else {
            break;
        };
        if summaries.len() > MAX_REDIRECTS {
            bail!("Too many redirects (more than {})", MAX_REDIRECTS);
        }
        ctx.output.debug(&format!("Following redirect to {}", location));
        request = build_request(Method::GET, &location, &[], &headers, cookie.as_deref())?;
    }

    if ctx.output.is_json() {
        ctx.output.json(&summaries);
    }
    Ok(())
}

fn send(app: &ClickApp, request: Request<String>) -> ResponseSummary {
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let started = Instant::now();
    let response = app.handle(request);
    summarize(method, uri, response, started.elapsed().as_micros())
}

fn summarize(
    method: String,
    uri: String,
    response: Response<String>,
    elapsed_us: u128,
) -> ResponseSummary {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    ResponseSummary {
        method,
        uri,
        status,
        headers,
        body: response.into_body(),
        elapsed_us,
    }
}

fn print_response(ctx: &Context, summary: &ResponseSummary, include: bool) {
    if ctx.output.is_json() {
        return;
    }
    let status = http::StatusCode::from_u16(summary.status).unwrap_or(http::StatusCode::OK);
    ctx.output.header(&format!("{} {}", summary.method, summary.uri));
    ctx.output.kv("status", &status_badge(status));
    ctx.output.kv("elapsed", &format_duration_us(summary.elapsed_us));
    if include {
        for (name, value) in &summary.headers {
            ctx.output.kv(name, value);
        }
    }
    if !summary.body.is_empty() {
        ctx.output.raw("");
        ctx.output.raw(&summary.body);
    }
}

fn is_redirect(status: u16) -> bool {
    (300..400).contains(&status)
}

/// Prefix `path` with the context path unless it already carries it.
fn request_uri(context_path: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if context_path.is_empty()
        || path == context_path
        || path.starts_with(&format!("{}/", context_path))
    {
        path
    } else {
        format!("{}{}", context_path, path)
    }
}

fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|param| match param.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
            _ => bail!("Invalid parameter (expected name=value): {}", param),
        })
        .collect()
}

fn parse_headers(raw: &[String]) -> Result<Vec<(HeaderName, HeaderValue)>> {
    raw.iter()
        .map(|h| {
            let (name, value) = h
                .split_once(':')
                .with_context(|| format!("Invalid header (expected Name: value): {}", h))?;
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value.trim())
                .with_context(|| format!("Invalid header value: {}", value))?;
            Ok((name, value))
        })
        .collect()
}

/// Cookie pair from a `Set-Cookie` value; `None` when the cookie is cleared.
fn session_cookie(set_cookie: &str) -> Option<String> {
    if set_cookie.contains("Max-Age=0") {
        return None;
    }
    set_cookie.split(';').next().map(|pair| pair.trim().to_string())
}

/// Build a request: GET parameters go in the query string, anything else
/// sends them as a form body.
fn build_request(
    method: Method,
    uri: &str,
    params: &[(String, String)],
    headers: &[(HeaderName, HeaderValue)],
    cookie: Option<&str>,
) -> Result<Request<String>> {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    let (uri, body) = if params.is_empty() {
        (uri.to_string(), String::new())
    } else if method == Method::GET {
        let separator = if uri.contains('?') { '&' } else { '?' };
        (format!("{}{}{}", uri, separator, encoded), String::new())
    } else {
        (uri.to_string(), encoded)
    };

    let mut builder = Request::builder().method(method.clone()).uri(uri.as_str());
    if method != Method::GET && !body.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
        .body(body)
        .with_context(|| format!("Invalid request URI: {}", uri))
}
