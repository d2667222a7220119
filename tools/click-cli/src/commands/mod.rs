//! CLI command implementations.

pub mod config;
pub mod pages;
pub mod request;

use clap::{Args, Subcommand};

/// Arguments for the request command.
#[derive(Args)]
pub struct RequestArgs {
    /// Request path, e.g. `/customers.htm`.
    pub path: String,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request parameter as `name=value`; repeatable.
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Request header as `Name: value`; repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Follow redirects, carrying the session cookie.
    #[arg(short = 'L', long)]
    pub follow: bool,

    /// Print response headers.
    #[arg(short, long)]
    pub include: bool,
}

/// Arguments for the pages command.
#[derive(Args)]
pub struct PagesArgs {
    /// Only list routes whose path starts with this prefix.
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the current configuration.
    Show,
    /// Validate the configuration and its page routes.
    Validate,
    /// Create a config file in the current directory.
    Init {
        /// Application name.
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}
