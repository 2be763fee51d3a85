mod api;
mod auth;
mod cli_messages;
mod config;
mod consts;
mod dashboard;
mod environment;
mod error_classifier;
mod events;
mod logging;
mod storage;

use crate::api::{ApiClient, AuthApi, DashboardApi};
use crate::auth::models::{Credentials, RegisterData, User};
use crate::auth::service::AuthService;
use crate::auth::session::{SessionPhase, SessionStore};
use crate::config::ApiConfig;
use crate::consts::cli_consts::EVENT_QUEUE_SIZE;
use crate::dashboard::DashboardLoader;
use crate::dashboard::alerts::{AlertQuery, SeverityFilter};
use crate::dashboard::cost::CostPeriod;
use crate::dashboard::render;
use crate::events::Event;
use crate::storage::{FileStorage, Storage, default_storage_path};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line client for the CloudOps monitoring API
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,

        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long, value_name = "NAME")]
        name: String,

        #[arg(long, value_name = "EMAIL")]
        email: String,

        #[arg(long, value_name = "PASSWORD")]
        password: String,

        /// Must match the password.
        #[arg(long, value_name = "PASSWORD")]
        confirm_password: String,
    },
    /// End the session and clear stored credentials
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Confirm the stored session with the server.
        #[arg(long)]
        verify: bool,
    },
    /// Re-fetch the signed-in user's profile
    RefreshUser,
    /// Exchange the stored token for a fresh one
    RefreshToken,
    /// Request a password reset email
    ForgotPassword {
        #[arg(long, value_name = "EMAIL")]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        #[arg(long, value_name = "TOKEN")]
        token: String,

        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Headline numbers across all cards
    Dashboard {
        /// Show sample data without contacting the API.
        #[arg(long)]
        mock: bool,
    },
    /// Active and recent alerts
    Alerts {
        /// One of: all, critical, warning, info.
        #[arg(long, default_value = "all")]
        severity: SeverityFilter,

        #[arg(long)]
        mock: bool,
    },
    /// Compliance standards and open issues
    Compliance {
        /// Show a single standard in detail.
        #[arg(long, value_name = "ID")]
        standard: Option<String>,

        #[arg(long)]
        mock: bool,
    },
    /// Cost analysis and optimization suggestions
    Cost {
        /// One of: 7d, 30d, 90d.
        #[arg(long, default_value = "7d")]
        period: CostPeriod,

        /// Show only the server-side summary.
        #[arg(long)]
        summary: bool,

        #[arg(long)]
        mock: bool,
    },
    /// Cloud resources grouped by provider
    Topology {
        /// Show a single resource in detail.
        #[arg(long, value_name = "ID")]
        resource: Option<String>,

        #[arg(long)]
        mock: bool,
    },
    /// CI/CD pipeline runs
    Pipelines {
        #[arg(long)]
        mock: bool,
    },
}

/// Everything a command needs, wired once per invocation.
struct Context {
    service: AuthService,
    session: SessionStore,
    dashboard_api: Arc<dyn DashboardApi>,
    events: events::EventSender,
    event_receiver: mpsc::Receiver<Event>,
}

impl Context {
    fn new() -> Result<Self, Box<dyn Error>> {
        let file_storage = FileStorage::new(default_storage_path()?);
        log::debug!("Session storage at {}", file_storage.path().display());
        let storage: Arc<dyn Storage> = Arc::new(file_storage);

        let client = Arc::new(ApiClient::new(ApiConfig::from_env(), storage.clone())?);
        log::debug!("Using API at {}", client.config().base_url());
        let auth_api: Arc<dyn AuthApi> = client.clone();
        let dashboard_api: Arc<dyn DashboardApi> = client;

        let (event_sender, event_receiver) = mpsc::channel::<Event>(EVENT_QUEUE_SIZE);
        let events = events::EventSender::new(event_sender);

        let service = AuthService::new(auth_api, storage);
        let session = SessionStore::new(service.clone()).with_events(events.clone());

        Ok(Self {
            service,
            session,
            dashboard_api,
            events,
            event_receiver,
        })
    }

    /// Card data comes from the API only behind a verified session.
    async fn loader(&self, mock: bool) -> Result<DashboardLoader, Box<dyn Error>> {
        if mock {
            return Ok(DashboardLoader::offline().with_events(self.events.clone()));
        }
        match self.session.initialize().await {
            SessionPhase::Authenticated { .. } => {
                Ok(DashboardLoader::live(self.dashboard_api.clone())
                    .with_events(self.events.clone()))
            }
            phase => {
                log::debug!("Card access refused in phase {}", phase);
                print_cmd_error!(
                    "Not logged in",
                    "Run `cloudops login` first, or pass --mock to view sample data"
                );
                Err(Box::from("Authentication required"))
            }
        }
    }

    /// Print queued events worth showing. Status lines already cover successes.
    fn flush_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            if event.event_type != events::EventType::Success && event.should_display() {
                eprintln!("{}", event);
            }
        }
    }
}

fn describe_user(user: &User) -> String {
    format!("{} <{}> ({})", user.name, user.email, user.role)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    let args = Args::parse();

    let mut context = Context::new()?;
    let result = run(args.command, &context).await;
    context.flush_events();
    result
}

async fn run(command: Command, context: &Context) -> Result<(), Box<dyn Error>> {
    let session = &context.session;
    match command {
        Command::Login { email, password } => {
            match session.login(&Credentials::new(email, password)).await {
                Ok(user) => {
                    print_cmd_success!("Logged in", "as {}", describe_user(&user));
                    Ok(())
                }
                Err(e) => {
                    print_cmd_error!("Login failed", e.user_message().as_str());
                    Err(e.into())
                }
            }
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            if password != confirm_password {
                print_cmd_error!("Registration failed", "Passwords do not match");
                return Err(Box::from("Passwords do not match"));
            }
            let data = RegisterData {
                name,
                email,
                password,
                confirm_password,
            };
            match session.register(&data).await {
                Ok(user) => {
                    print_cmd_success!("Account created", "signed in as {}", describe_user(&user));
                    Ok(())
                }
                Err(e) => {
                    print_cmd_error!("Registration failed", e.user_message().as_str());
                    Err(e.into())
                }
            }
        }
        Command::Logout => {
            print_cmd_info!("Logging out", "clearing stored session");
            session.logout().await;
            print_cmd_success!("Logged out", "");
            Ok(())
        }
        Command::Whoami { verify } => {
            if verify {
                session.initialize().await;
            } else {
                session.restore().await;
            }
            match session.snapshot().user() {
                Some(user) => println!("{}", describe_user(user)),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::RefreshUser => {
            session.restore().await;
            if !session.snapshot().is_authenticated() {
                println!("Not logged in");
                return Ok(());
            }
            match session.refresh_user().await {
                Some(user) => {
                    print_cmd_success!("User refreshed", "{}", describe_user(&user));
                    Ok(())
                }
                None => {
                    print_cmd_warn!("User refresh failed", "keeping the stored profile");
                    Ok(())
                }
            }
        }
        Command::RefreshToken => {
            session.restore().await;
            match session.refresh_token().await {
                Ok(()) => {
                    print_cmd_success!("Token refreshed", "");
                    Ok(())
                }
                Err(e) => {
                    print_cmd_error!("Token refresh failed", e.user_message().as_str());
                    Err(e.into())
                }
            }
        }
        Command::ForgotPassword { email } => {
            match context.service.forgot_password(&email).await {
                Ok(()) => {
                    print_cmd_success!("Reset requested", "check {} for instructions", email);
                    Ok(())
                }
                Err(e) => {
                    print_cmd_error!("Reset request failed", e.user_message().as_str());
                    Err(e.into())
                }
            }
        }
        Command::ResetPassword { token, password } => {
            match context.service.reset_password(&token, &password).await {
                Ok(()) => {
                    print_cmd_success!("Password reset", "log in with the new password");
                    Ok(())
                }
                Err(e) => {
                    print_cmd_error!("Password reset failed", e.user_message().as_str());
                    Err(e.into())
                }
            }
        }
        Command::Dashboard { mock } => {
            let loader = context.loader(mock).await?;
            print!("{}", render::render_stats(&loader.stats().await));
            Ok(())
        }
        Command::Alerts { severity, mock } => {
            let loader = context.loader(mock).await?;
            let alerts = loader.alerts(&AlertQuery::default()).await;
            print!("{}", render::render_alerts(&alerts, severity, Utc::now()));
            Ok(())
        }
        Command::Compliance { standard, mock } => {
            let loader = context.loader(mock).await?;
            match standard {
                Some(id) => match loader.compliance_standard(&id).await.data {
                    Some(standard) => {
                        print!("{}", render::render_standard(&standard));
                        Ok(())
                    }
                    None => Err(format!("Unknown compliance standard: {}", id).into()),
                },
                None => {
                    print!("{}", render::render_compliance(&loader.compliance().await));
                    Ok(())
                }
            }
        }
        Command::Cost {
            period,
            summary,
            mock,
        } => {
            let loader = context.loader(mock).await?;
            if summary {
                print!("{}", render::render_cost_summary(&loader.cost_summary().await));
            } else {
                print!("{}", render::render_cost(&loader.cost(period).await, period));
            }
            Ok(())
        }
        Command::Topology { resource, mock } => {
            let loader = context.loader(mock).await?;
            let topology = loader.topology().await;
            match resource {
                Some(id) => match topology.data.select_resource(&id) {
                    Some(resource) => {
                        print!("{}", render::render_resource(resource));
                        Ok(())
                    }
                    None => Err(format!("Unknown resource: {}", id).into()),
                },
                None => {
                    print!("{}", render::render_topology(&topology));
                    Ok(())
                }
            }
        }
        Command::Pipelines { mock } => {
            let loader = context.loader(mock).await?;
            print!("{}", render::render_pipelines(&loader.pipelines().await));
            Ok(())
        }
    }
}
