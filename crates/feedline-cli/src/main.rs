use anyhow::Result;
use clap::{Parser, Subcommand};
use feedline_application::FeedlineClient;
use feedline_core::navigation::RecordingNavigator;
use feedline_infrastructure::ConfigService;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

const DEFAULT_LOG_FILTER: &str = "feedline=info";

#[derive(Parser)]
#[command(name = "feedline")]
#[command(about = "Feedline - social feed client", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config and FEEDLINE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session for later commands
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        alias: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date_of_birth: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored and still valid
    Status,
    /// Show the signed-in user's profile
    Whoami,
    /// Show your personalised feed
    Feed,
    /// Show every post
    Posts,
    /// Publish a post
    Post { message: String },
    /// Like a post, or unlike it if already liked
    Like { post_id: i64 },
    /// Delete a post (administrators only)
    Delete { post_id: i64 },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ConfigService::new().get_config();
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let navigator = Arc::new(RecordingNavigator::new());
    let client = FeedlineClient::connect(&config, navigator)?;
    client.start().await;

    let result = match cli.command {
        Commands::Login { email, password } => commands::auth::login(&client, &email, password).await,
        Commands::Register {
            email,
            first_name,
            last_name,
            alias,
            date_of_birth,
            password,
        } => {
            commands::auth::register(
                &client,
                commands::auth::Registration {
                    email,
                    first_name,
                    last_name,
                    alias,
                    date_of_birth,
                },
                password,
            )
            .await
        }
        Commands::Logout => commands::auth::logout(&client).await,
        Commands::Status => commands::auth::status(&client),
        Commands::Whoami => commands::auth::whoami(&client).await,
        Commands::Feed => commands::feed::feed(&client).await,
        Commands::Posts => commands::feed::posts(&client).await,
        Commands::Post { message } => commands::feed::post(&client, &message).await,
        Commands::Like { post_id } => commands::feed::like(&client, post_id).await,
        Commands::Delete { post_id } => commands::feed::delete(&client, post_id).await,
    };

    commands::output::print_notifications(&client);
    result
}
