use clap::{error::ErrorKind, Parser};
use create_test_user::{
    config::ProvisionConfig,
    db,
    error::{ProvisionError, Result},
    password::HashScheme,
    repositories::user_repository::SqliteUserRepository,
    services::{PreparedAccount, ProvisionOutcome, ProvisionService},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: create-test-user <email> <password>";
const EXAMPLE: &str = "Example: create-test-user test@example.com password123";

#[derive(Parser, Debug)]
#[command(name = "create-test-user", version)]
#[command(
    about = "Create a pre-verified test account in the application's user store",
    long_about = None
)]
#[command(after_help = EXAMPLE)]
struct Cli {
    /// Email address of the account
    #[arg(allow_hyphen_values = true)]
    email: String,

    /// Plaintext password (only its hash is stored)
    #[arg(allow_hyphen_values = true)]
    password: String,

    /// SQLite store to write to [default: $DATABASE_URL or sqlite://data/app.db]
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Password hashing algorithm
    #[arg(long, value_enum, default_value_t = HashScheme::Bcrypt)]
    hash_scheme: HashScheme,

    /// Overwrite the password of an existing account instead of failing
    #[arg(long)]
    reset_password: bool,
}

fn parse_cli() -> Result<Cli> {
    match Cli::try_parse() {
        Ok(cli) => Ok(cli),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                std::process::exit(0);
            }
            _ => Err(ProvisionError::Usage(err.to_string().trim_end().to_string())),
        },
    }
}

async fn run(email: &str, password: &str, config: &ProvisionConfig) -> Result<ProvisionOutcome> {
    // Hash before the store is opened
    let account = PreparedAccount::new(email, password, config.hash_scheme)?;

    let pool = db::create_pool(&config.database_url).await?;

    let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let service = ProvisionService::new(repository).with_reset_existing(config.reset_password);

    let result = service.provision(account).await;

    // Released on success, duplicate and failure alike
    pool.close().await;

    result
}

fn report_success(outcome: &ProvisionOutcome) {
    let user = outcome.user();
    match outcome {
        ProvisionOutcome::Created(_) => println!("✅ Created user: {}", user.email),
        ProvisionOutcome::PasswordReset(_) => println!("✅ Reset password for user: {}", user.email),
    }
    println!("  ID: {}", user.id);
    println!("  Email verified: yes (email_verified = 1)");
    println!("This account can log in now.");
}

fn report_failure(err: &ProvisionError) {
    eprintln!("❌ {}", err);
    if let ProvisionError::Usage(_) = err {
        eprintln!();
        eprintln!("{}", USAGE);
        eprintln!("{}", EXAMPLE);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for the result summary
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "create_test_user=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(err) => {
            report_failure(&err);
            std::process::exit(err.exit_code());
        }
    };
    let config = ProvisionConfig::resolve(cli.database_url, cli.hash_scheme, cli.reset_password);

    tracing::debug!(
        "Provisioning {} into {} ({})",
        cli.email,
        config.database_url,
        config.hash_scheme
    );

    let code = match run(&cli.email, &cli.password, &config).await {
        Ok(outcome) => {
            report_success(&outcome);
            0
        }
        Err(err) => {
            if err.is_infrastructure() {
                tracing::error!("Provisioning failed: {}", err);
            }
            report_failure(&err);
            err.exit_code()
        }
    };

    std::process::exit(code);
}
