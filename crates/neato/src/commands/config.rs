//! Config command - configuration inspection and setup.

use anyhow::Result;
use clap::{Args, Subcommand};
use neato_config::{DEFAULT_REDIRECT_URI, DEFAULT_SCOPES, NeatoConfig, OAuthSection};
use serde_json::json;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,

    /// Show which config files were loaded, lowest precedence first
    Which,

    /// Write a user config file with defaults
    Init {
        /// Client id issued to the application
        #[arg(long)]
        client_id: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the user config file path
    Path,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Init { client_id, force } => cmd_init(ctx, client_id, force),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.json_output {
        println!(
            "{}",
            json!({
                "client_id": config.client_id(),
                "redirect_uri": config.redirect_uri(),
                "authorize_url": config.authorize_url(),
                "scopes": config.scopes(),
                "token_file": ctx.token_path(),
                "safety_margin_secs": config.safety_margin_secs(),
            })
        );
        return Ok(());
    }

    println!("[oauth]");
    println!("  client_id:     {}", config.client_id().unwrap_or("(not set)"));
    println!("  redirect_uri:  {}", config.redirect_uri());
    println!(
        "  authorize_url: {}",
        config
            .authorize_url()
            .unwrap_or(neato_auth::authorize::DEFAULT_AUTHORIZE_URL)
    );
    println!("  scopes:        {}", config.scopes().join(" "));
    println!("[storage]");
    println!("  token_file:    {}", ctx.token_path().display());
    println!("  safety_margin: {}s", config.safety_margin_secs());
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", json!({ "sources": ctx.sources }));
    } else if ctx.sources.is_empty() {
        println!("No config files loaded (using defaults)");
    } else {
        for path in &ctx.sources {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn cmd_init(ctx: &Context, client_id: Option<String>, force: bool) -> Result<()> {
    let path = ctx.config_dir.join("config.toml");
    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        println!("Use 'neato config init --force' to overwrite it.");
        return Ok(());
    }

    let config = NeatoConfig {
        oauth: Some(OAuthSection {
            client_id,
            redirect_uri: Some(DEFAULT_REDIRECT_URI.to_string()),
            authorize_url: None,
            scopes: Some(DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()),
        }),
        storage: None,
    };
    neato_config::save_config(&config, &path)?;
    tracing::info!(path = %path.display(), "Config file written");

    if ctx.json_output {
        println!("{}", json!({ "path": path }));
    } else {
        println!("Created {}", path.display());
    }
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.config_dir.join("config.toml").display());
    Ok(())
}
