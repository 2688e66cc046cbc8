//! jira-auth - log in to a JIRA instance with a cookie session.
//!
//! `login` opens a session and reports the login statistics, `whoami` fetches
//! the current user fresh from the server and logs out again unless told to
//! keep the session, and `forget` removes a password stored in the keychain.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jira_auth_core::{AuthenticationService, Client, Config, CredentialStore, Session, Transport};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_PASSWORD: &str = "JIRA_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "jira-auth", version, about = "Cookie-session login for JIRA")]
struct Cli {
    /// Base URL of the JIRA instance, e.g. https://jira.example.com
    #[arg(long, global = true)]
    url: Option<String>,

    /// Username to log in as (defaults to the last one used)
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Store the password in the OS keychain after a successful login
    #[arg(long, global = true)]
    save_password: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a session and print the login statistics
    Login,
    /// Print the current user as reported by the server
    Whoami {
        /// Leave the session open instead of logging out afterwards
        #[arg(long)]
        keep: bool,
    },
    /// Delete the stored password for the user
    Forget,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    config.apply_env();
    if let Some(url) = cli.url.clone() {
        config.base_url = Some(url);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    let base_url = config
        .base_url
        .clone()
        .context("No JIRA URL configured; pass --url or set JIRA_URL")?;
    let credentials = CredentialStore::for_instance(&base_url);
    let username = resolve_username(cli.username.clone(), &config)?;

    let whoami = match cli.command {
        Command::Forget => {
            credentials.delete(&username)?;
            println!("Removed stored password for {}", username);
            return Ok(());
        }
        Command::Login => None,
        Command::Whoami { keep } => Some(keep),
    };

    let password = resolve_password(&credentials, &username)?;
    let client = Client::from_config(&config).context("Failed to create JIRA client")?;
    let auth = client.authentication();

    info!(url = %base_url, username = %username, "Logging in");
    auth.acquire_session_cookie(&username, &password)
        .await
        .context("Login failed")?;

    if cli.save_password {
        credentials.store(&username, &password)?;
    }
    config.last_username = Some(username);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    match whoami {
        None => {
            if let Some(session) = client.session().await {
                print_session(&session);
            }
        }
        Some(keep) => {
            let me = whoami_session(&auth, keep).await?;
            print_session(&me);
        }
    }

    Ok(())
}

/// Fetch the current user, then log out unless `keep` is set. The logout is
/// attempted even when the lookup fails.
async fn whoami_session<T: Transport>(
    auth: &AuthenticationService<T>,
    keep: bool,
) -> Result<Session> {
    let me = auth.current_user().await;
    if !keep {
        match auth.logout().await {
            Ok(()) => info!("Logged out"),
            Err(e) if me.is_err() => warn!(error = %e, "Logout failed"),
            Err(e) => return Err(e).context("Logout failed"),
        }
    }
    me.context("Failed to fetch current user")
}

fn resolve_username(flag: Option<String>, config: &Config) -> Result<String> {
    if let Some(username) = flag.filter(|u| !u.trim().is_empty()) {
        return Ok(username);
    }

    match config.last_username {
        Some(ref last_user) => {
            print!("Username [{}]: ", last_user);
            io::stdout().flush()?;
            let input = read_line()?;
            if input.is_empty() {
                Ok(last_user.clone())
            } else {
                Ok(input)
            }
        }
        None => {
            print!("Username: ");
            io::stdout().flush()?;
            read_line()
        }
    }
}

fn resolve_password(credentials: &CredentialStore, username: &str) -> Result<String> {
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        return Ok(password);
    }
    if credentials.has_credentials(username) {
        return credentials.get_password(username);
    }
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn print_session(session: &Session) {
    println!("User:            {}", session.username().unwrap_or("(unknown)"));
    if let Some(ref url) = session.self_url {
        println!("Profile:         {}", url);
    }
    if let Some(ref token) = session.token {
        println!("Session cookie:  {}", token.name);
    }

    let info = &session.login_info;
    println!("Login count:     {}", info.login_count);
    println!("Failed logins:   {}", info.failed_login_count);
    if let Some(at) = info.previous_login_at() {
        println!("Previous login:  {}", at.format("%Y-%m-%d %H:%M %z"));
    }
    if let Some(at) = info.last_failed_login_at() {
        println!("Last failure:    {}", at.format("%Y-%m-%d %H:%M %z"));
    }
}
