//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use click_server::{generate_default_config, AppConfig};

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Validate => validate_config(ctx),
        ConfigCommand::Init { name, force } => init_config(name, force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    if ctx.output.is_json() {
        ctx.output.json(config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(built-in example routes)"),
    }
    ctx.output.kv("name", &config.name);
    ctx.output.kv("mode", &config.mode.to_string());
    ctx.output.kv("charset", &config.charset);
    if !config.context_path.is_empty() {
        ctx.output.kv("context_path", &config.context_path);
    }
    ctx.output.kv("session.cookie_name", &config.session.cookie_name);
    ctx.output.kv(
        "session.idle_timeout_secs",
        &config.session.idle_timeout_secs.to_string(),
    );
    ctx.output.kv("log.level", &config.log.level.to_string());

    for (name, value) in &config.headers {
        ctx.output.kv(&format!("headers.{}", name), value);
    }
    for (key, text) in &config.messages {
        ctx.output.kv(&format!("messages.{}", key), text);
    }
    ctx.output.kv("pages", &config.pages.len().to_string());

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let warnings = config_warnings(&ctx.config);
    // Building the application also resolves every route's page factory.
    if let Err(e) = click_examples::application(ctx.config.clone()) {
        bail!("Configuration is invalid: {}", e);
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }
    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "valid": true, "warnings": warnings }));
    } else if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }

    Ok(())
}

/// Settings that work but are probably mistakes.
fn config_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.pages.is_empty() {
        warnings.push("no pages are configured".to_string());
    }
    if !config.charset.eq_ignore_ascii_case("UTF-8") {
        warnings.push(format!("charset '{}' is not UTF-8", config.charset));
    }
    if config.mode.logs_parameters() {
        warnings.push("trace mode logs every request parameter, including passwords".to_string());
    }
    warnings
}

fn init_config(name: Option<String>, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.default_config_path();

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let name = name.unwrap_or_else(|| {
        ctx.cwd
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("click-app")
            .to_string()
    });
    fs::write(&config_path, generate_default_config(&name))?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}
