//! CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use fundraiser_core::{FileStore, Session, UserProfile};
use fundraiser_http::client::request::ApiRequest;
use fundraiser_http::types::{DonationRequest, RegisterRequest};
use fundraiser_http::{FundraiserClient, FundraiserClientBuilder, Method};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config;
use crate::logging;
use crate::navigator::TerminalNavigator;

/// Page a command stands in for when none is more specific
const DEFAULT_PAGE: &str = "/";

/// Values resolved from global flags before a command runs
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub data_dir: PathBuf,
    pub base_url: Option<String>,
}

impl CommandContext {
    /// Build a client whose session lives in the data directory
    fn client(&self, page: &str) -> Result<FundraiserClient> {
        let config = config::load_client_config(&self.data_dir, self.base_url.clone())?;
        debug!(
            base_url = %config.base_url,
            refresh_mode = ?config.refresh_mode,
            "Loaded client configuration"
        );

        let store = FileStore::new(config::session_file_path(&self.data_dir));
        let client = FundraiserClientBuilder::from_config(&config)
            .session(Session::new(Arc::new(store)))
            .navigator(Arc::new(TerminalNavigator::new(page)))
            .build()?;
        Ok(client)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with username and password
    Login {
        username: String,

        /// Account password
        #[arg(long, env = "FUNDRAISER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// One-time password sign-in for guests
    Otp {
        #[command(subcommand)]
        command: OtpCommands,
    },

    /// Create an account
    Register {
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "FUNDRAISER_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// End the session and forget stored credentials
    Logout,

    /// Synchronize and show the session state
    Status,

    /// Show the signed-in user's profile
    Profile,

    /// Birthday campaigns
    Campaign {
        #[command(subcommand)]
        command: CampaignCommands,
    },

    /// Send an arbitrary request through the authenticated gateway
    Request {
        /// HTTP method
        method: String,

        /// Path relative to the backend origin, or an absolute URL
        path: String,

        /// JSON body
        #[arg(long)]
        json: Option<String>,
    },

    /// Generate default configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Inspect local state
    Debug {
        #[command(subcommand)]
        command: DebugCommands,
    },
}

#[derive(Subcommand)]
pub enum OtpCommands {
    /// Email a one-time password
    Send { email: String },

    /// Exchange a one-time password for a session
    Verify { email: String, otp: String },
}

#[derive(Subcommand)]
pub enum CampaignCommands {
    /// Show a campaign and its donations
    Show { id: u64 },

    /// Donate to a campaign
    Donate {
        id: u64,

        /// Amount in rupees
        #[arg(long)]
        amount: Decimal,

        /// Donor name (defaults to the signed-in user)
        #[arg(long)]
        name: Option<String>,

        /// Donor email (defaults to the signed-in user)
        #[arg(long)]
        email: Option<String>,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        message: String,

        #[arg(long)]
        anonymous: bool,

        /// Submit as a multipart form instead of JSON
        #[arg(long)]
        form: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate the client configuration file
    Init {
        /// Output file path (defaults to FUNDRAISER_STATE_DIR/config.toml)
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DebugCommands {
    /// Show resolved paths and configuration
    Info,

    /// Print the CLI log file
    Logs {
        /// Truncate the log file instead of printing it
        #[arg(long)]
        clear: bool,
    },
}

impl Commands {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        match self {
            Commands::Login { username, password } => {
                let client = context.client(DEFAULT_PAGE)?;
                let user = client
                    .login(username, password)
                    .await
                    .context("Login failed")?;
                println!("Logged in as {}", user.display_name());
                Ok(())
            }
            Commands::Otp { command } => command.execute(context).await,
            Commands::Register {
                username,
                email,
                password,
                first_name,
                last_name,
                phone,
                address,
            } => {
                let client = context.client(DEFAULT_PAGE)?;
                let response = client
                    .register(&RegisterRequest {
                        username,
                        email,
                        password,
                        first_name,
                        last_name,
                        phone,
                        address,
                    })
                    .await
                    .context("Registration failed")?;
                println!("{}", response.message);
                println!("Run `fundraiser login` to sign in.");
                Ok(())
            }
            Commands::Logout => {
                context.client(DEFAULT_PAGE)?.logout().await?;
                println!("Logged out");
                Ok(())
            }
            Commands::Status => {
                let client = context.client(DEFAULT_PAGE)?;
                match client.auth_status().await? {
                    Some(user) => println!("Signed in as {}", user.display_name()),
                    None => println!("Not signed in"),
                }
                Ok(())
            }
            Commands::Profile => {
                let client = context.client("/guest/profile/")?;
                let user = client.profile().await.context("Could not load profile")?;
                println!("{}", serde_json::to_string_pretty(user.as_json())?);
                Ok(())
            }
            Commands::Campaign { command } => command.execute(context).await,
            Commands::Request { method, path, json } => {
                send_raw_request(context, &method, path, json).await
            }
            Commands::Config { command } => command.execute(context),
            Commands::Debug { command } => command.execute(context).await,
        }
    }
}

impl OtpCommands {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let client = context.client(DEFAULT_PAGE)?;
        match self {
            OtpCommands::Send { email } => {
                let message = client.send_otp(email).await?;
                println!("{message}");
            }
            OtpCommands::Verify { email, otp } => {
                let user = client.verify_otp(email, otp).await?;
                println!("Signed in as {}", user.display_name());
            }
        }
        Ok(())
    }
}

impl CampaignCommands {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        match self {
            CampaignCommands::Show { id } => {
                let client = context.client(&format!("/campaigns/{id}/"))?;
                let campaign = client.campaign(id).await?;

                println!("{} ({})", campaign.title, campaign.full_name);
                println!("  Birthday: {}", campaign.birthday_date);
                println!(
                    "  Raised: Rs. {} of Rs. {} ({:.1}%)",
                    campaign.current_amount, campaign.target_amount, campaign.progress_percentage
                );
                println!("  Donors: {}", campaign.donors_count);
                println!("  Status: {}", campaign.status);
                if !campaign.description.is_empty() {
                    println!();
                    println!("{}", campaign.description);
                }
                for donation in &campaign.donations {
                    println!(
                        "  - {} gave Rs. {} on {}",
                        donation.donor_name, donation.amount, donation.date
                    );
                }
                Ok(())
            }
            CampaignCommands::Donate {
                id,
                amount,
                name,
                email,
                phone,
                message,
                anonymous,
                form,
            } => {
                let client = context.client(&format!("/campaigns/{id}/donate/"))?;
                if !client.session().is_authenticated().await? {
                    anyhow::bail!("Please log in to make a donation");
                }
                let user = client.session().user().await?;

                let donation = DonationRequest {
                    donor_name: name
                        .or_else(|| user.as_ref().map(UserProfile::display_name))
                        .unwrap_or_default(),
                    donor_email: email
                        .or_else(|| user.as_ref().and_then(|u| u.email()).map(String::from))
                        .unwrap_or_default(),
                    donor_phone: phone,
                    amount,
                    message,
                    is_anonymous: anonymous,
                };

                let receipt = if form {
                    client.donate_form(id, &donation).await?
                } else {
                    client.donate(id, &donation).await?
                };

                info!(campaign_id = id, "Donation submitted");
                match receipt.donation_id {
                    Some(donation_id) => println!("Donation #{donation_id} recorded"),
                    None => println!("Donation recorded"),
                }
                if let Some(url) = receipt.payment_url {
                    println!("Complete payment at: {url}");
                }
                Ok(())
            }
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, context: CommandContext) -> Result<()> {
        match self {
            ConfigCommands::Init { output } => {
                let config_path =
                    output.unwrap_or_else(|| config::config_file_path(&context.data_dir));
                config::generate_default_config(&config_path)?;
                println!(
                    "Generated client configuration at: {}",
                    config_path.display()
                );
                Ok(())
            }
        }
    }
}

impl DebugCommands {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        match self {
            DebugCommands::Info => {
                let config = config::load_client_config(&context.data_dir, context.base_url)?;
                println!("Data directory: {}", context.data_dir.display());
                println!(
                    "Config file: {}",
                    config::config_file_path(&context.data_dir).display()
                );
                println!(
                    "Session file: {}",
                    config::session_file_path(&context.data_dir).display()
                );
                println!(
                    "Log file: {}",
                    logging::log_file_path(&context.data_dir).display()
                );

                let store = FileStore::new(config::session_file_path(&context.data_dir));
                let session = Session::new(Arc::new(store));
                println!(
                    "Access token: {}",
                    token_presence(session.access_token().await?.as_deref())
                );
                println!(
                    "Refresh token: {}",
                    token_presence(session.refresh_token().await?.as_deref())
                );
                match session.user().await? {
                    Some(user) => println!("Cached user: {}", user.display_name()),
                    None => println!("Cached user: none"),
                }

                println!();
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
            DebugCommands::Logs { clear } => {
                let log_path = logging::log_file_path(&context.data_dir);
                if clear {
                    if log_path.exists() {
                        std::fs::write(&log_path, "")?;
                    }
                    println!("Cleared {}", log_path.display());
                } else if log_path.exists() {
                    print!("{}", std::fs::read_to_string(&log_path)?);
                } else {
                    println!("No log file at {}", log_path.display());
                }
                Ok(())
            }
        }
    }
}

fn token_presence(token: Option<&str>) -> &'static str {
    if token.is_some() { "present" } else { "none" }
}

async fn send_raw_request(
    context: CommandContext,
    method: &str,
    path: String,
    json: Option<String>,
) -> Result<()> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {method}"))?;
    let mut request = ApiRequest::new(method, path);
    if let Some(json) = json {
        let body: serde_json::Value =
            serde_json::from_str(&json).context("--json is not valid JSON")?;
        request = request.json(&body)?;
    }

    let client = context.client(DEFAULT_PAGE)?;
    let response = client.send(request).await?;
    let status = response.status();
    let text = response.text().await?;

    eprintln!("{status}");
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{text}"),
    }

    if !status.is_success() {
        anyhow::bail!("Request failed with status {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_presence_hides_value() {
        assert_eq!(token_presence(Some("secret-access")), "present");
        assert_eq!(token_presence(None), "none");
    }
}
