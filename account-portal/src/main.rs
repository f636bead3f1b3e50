use account_portal::config::get_configuration;
use account_portal::models::{Credentials, OAuthCallback, RegisterData};
use account_portal::startup::{build_account_client, build_bridge, build_session};
use account_portal::LoginOutcome;
use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, Secret};
use service_core::observability::init_tracing;

/// Quiz Solver account tools
#[derive(Parser)]
#[command(name = "quiz-solver", version, about = "Quiz Solver account and extension tools")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the Quiz Solver extension is installed and responding
    Probe,

    /// Sign in and hand the session to the extension
    Login {
        #[arg(long, env = "QUIZ_SOLVER_EMAIL")]
        email: String,
        #[arg(long, env = "QUIZ_SOLVER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and hand the session to the extension
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, env = "QUIZ_SOLVER_EMAIL")]
        email: String,
        #[arg(long, env = "QUIZ_SOLVER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Print the URL that starts a Google sign-in
    GoogleUrl,

    /// Finish a Google sign-in with the parameters of the callback URL
    OauthCallback {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        error: Option<String>,
    },

    /// Exchange a refresh token and print the new pair as JSON
    Refresh {
        #[arg(long, env = "QUIZ_SOLVER_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: String,
    },

    /// List plan durations and prices, and the plans held by a signed-in user
    Pricing {
        #[arg(long, env = "QUIZ_SOLVER_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
    },

    /// Revoke the session and sign the extension out
    Logout {
        #[arg(long, env = "QUIZ_SOLVER_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
        #[arg(long, env = "QUIZ_SOLVER_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let log_level = if cli.verbose {
        "debug"
    } else {
        settings.telemetry.log_level.as_str()
    };
    init_tracing(
        "quiz-solver",
        log_level,
        settings.telemetry.otlp_endpoint.as_deref(),
    )?;

    match cli.command {
        Commands::Probe => {
            let bridge = build_bridge(&settings);
            if bridge.is_installed().await {
                println!("Extension is installed and responding!");
                println!("Extension ID: {}", bridge.extension_id());
            } else {
                println!("Extension not found or not responding");
                println!("Extension ID tried: {}", bridge.extension_id());
            }
        }
        Commands::Login { email, password } => {
            let session = build_session(&settings)?;
            let outcome = session
                .login(&Credentials {
                    email,
                    password: Secret::new(password),
                })
                .await?;
            report_login(&outcome);
        }
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let session = build_session(&settings)?;
            let outcome = session
                .register(&RegisterData {
                    first_name,
                    last_name,
                    email,
                    password: Secret::new(password),
                })
                .await?;
            report_login(&outcome);
        }
        Commands::GoogleUrl => {
            let session = build_session(&settings)?;
            println!("{}", session.google_sign_in_url());
        }
        Commands::OauthCallback { token, error } => {
            let session = build_session(&settings)?;
            let outcome = session
                .complete_oauth(OAuthCallback { token, error })
                .await?;
            report_login(&outcome);
        }
        Commands::Refresh { refresh_token } => {
            let session = build_session(&settings)?;
            session
                .restore(None, Some(Secret::new(refresh_token)), None)
                .await;
            session.refresh().await?;

            let access_token = session.access_token().await;
            let refresh_token = session.refresh_token().await;
            println!(
                "{}",
                serde_json::json!({
                    "accessToken": access_token.as_ref().map(|t| t.expose_secret()),
                    "refreshToken": refresh_token.as_ref().map(|t| t.expose_secret()),
                })
            );
        }
        Commands::Pricing { access_token } => {
            let client = build_account_client(&settings)?;
            let pricing = client.pricing().await?;

            println!("Durations:");
            for duration in pricing.active_durations() {
                println!(
                    "  {} ({} months, {}% off)",
                    duration.name, duration.duration_in_months, duration.discount_percentage
                );
            }
            println!("Plans:");
            for payment in pricing.active_payments() {
                println!("  {}: {}/month", payment.plan_type, payment.monthly_cost);
            }

            if let Some(token) = access_token {
                let plans = client.my_plans(&Secret::new(token)).await?;
                println!("Your plans: {}", serde_json::to_string_pretty(&plans)?);
            }
        }
        Commands::Logout {
            access_token,
            refresh_token,
        } => {
            let session = build_session(&settings)?;
            session
                .restore(
                    access_token.map(Secret::new),
                    refresh_token.map(Secret::new),
                    None,
                )
                .await;

            if session.logout().await {
                println!("Logged out from Quiz Solver extension");
            } else {
                println!("Logged out; extension not installed or did not respond");
            }
        }
    }

    Ok(())
}

fn report_login(outcome: &LoginOutcome) {
    match &outcome.user {
        Some(user) => println!("Signed in as {} <{}>", user.name(), user.email),
        None => println!("Signed in (profile unavailable)"),
    }

    if outcome.extension_synced {
        println!("Quiz Solver extension authenticated successfully!");
    } else {
        println!("Extension authentication failed or extension not installed");
    }
}
