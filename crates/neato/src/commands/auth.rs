//! Auth command - sign-in flow and token management.

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Args, Subcommand};
use neato_auth::{AuthResult, build_authorization_url, parse_redirect};
use serde_json::json;

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Print the sign-in URL to open in a browser
    Url,

    /// Complete sign-in with the redirect URI the browser landed on
    Callback {
        /// Full redirect URI, e.g. "neato-sdk://callback#access_token=..."
        uri: String,
    },

    /// Show authentication status
    Status,

    /// Print the stored access token
    Token,

    /// Remove the stored access token
    Logout,
}

/// Run the auth command.
pub fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Url => cmd_url(ctx),
        AuthCommand::Callback { uri } => cmd_callback(&uri, ctx),
        AuthCommand::Status => cmd_status(ctx),
        AuthCommand::Token => cmd_token(ctx),
        AuthCommand::Logout => cmd_logout(ctx),
    }
}

fn cmd_url(ctx: &Context) -> Result<()> {
    let url = build_authorization_url(&ctx.oauth_config()?);

    if ctx.json_output {
        println!("{}", json!({ "url": url }));
    } else {
        println!("Open this URL in your browser to sign in:");
        println!();
        println!("  {}", url);
        println!();
        println!("Then run 'neato auth callback <redirect-uri>' with the URI you were sent to.");
    }
    Ok(())
}

fn cmd_callback(uri: &str, ctx: &Context) -> Result<()> {
    let now = Utc::now();
    let result = parse_redirect(Some(uri), now);

    match &result {
        AuthResult::Token { .. } => {
            let mut store = ctx.token_store()?;
            store.commit(&result, now)?;

            let info = store.backend().token_info()?;
            if ctx.json_output {
                println!("{}", json!({ "status": "authenticated", "token": info }));
            } else {
                println!("Authentication successful!");
                if let Some(info) = info {
                    println!("Token expires in: {}", info.expires_in_display());
                }
            }
            Ok(())
        }
        AuthResult::Error { code, description } => {
            tracing::warn!(code = %code, "Authorization server refused sign-in");
            match description {
                Some(description) => bail!("Sign-in failed: {} ({})", code, description),
                None => bail!("Sign-in failed: {}", code),
            }
        }
        AuthResult::Invalid => {
            bail!("Not a valid authorization redirect. Expected a URI with #access_token=... or #error=...")
        }
    }
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let store = ctx.token_store()?;
    let authenticated = store.is_authenticated();
    let info = match store.backend().token_info() {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read token file");
            None
        }
    };

    if ctx.json_output {
        println!(
            "{}",
            json!({ "authenticated": authenticated, "token": info })
        );
        return Ok(());
    }

    println!("Authentication Status");
    println!("---------------------");
    match info {
        Some(info) if authenticated => {
            println!("Neato: authenticated");
            println!("  Expires: {}", info.expires_in_display());
            if let Some(stored_at) = info.stored_at {
                println!("  Signed in: {}", stored_at.to_rfc3339());
            }
        }
        Some(info) => {
            println!("Neato: not authenticated");
            println!("  Token: {}", info.expires_in_display());
            println!("  Run 'neato auth url' to sign in again");
        }
        None => {
            println!("Neato: not authenticated");
            println!("  Run 'neato auth url' to sign in");
        }
    }
    if ctx.verbose {
        println!("  Token file: {}", ctx.token_path().display());
    }

    Ok(())
}

fn cmd_token(ctx: &Context) -> Result<()> {
    let store = ctx.token_store()?;
    if !store.is_authenticated() {
        bail!("Not authenticated. Run 'neato auth url' to sign in.");
    }
    match store.get_token() {
        Some(token) => {
            println!("{}", token);
            Ok(())
        }
        None => bail!("No access token stored"),
    }
}

fn cmd_logout(ctx: &Context) -> Result<()> {
    let mut store = ctx.token_store()?;
    let had_token = store.get_token().is_some();
    store.clear()?;

    if ctx.json_output {
        println!("{}", json!({ "removed": had_token }));
    } else if had_token {
        println!("Access token removed.");
    } else {
        println!("No access token found.");
    }
    Ok(())
}
