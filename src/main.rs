//! NutriHub CLI
//!
//! Command-line front end for the NutriHub marketplace:
//! - Log in and out
//! - Admin, nutritionist and client dashboards
//! - Contact mail and the body metrics calculator

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nutrihub::api;
use nutrihub::calculator::{self, Sex};
use nutrihub::config::{generate_default_config, LoggingConfig};
use nutrihub::dashboard::{
    AdminDashboard, ClientDashboard, ClientRow, Dashboard, DashboardError, NoticeLevel,
    NutritionistDashboard,
};
use nutrihub::forms::{
    AppointmentForm, ClientForm, FormInput, GoalForm, LoginForm, MailForm, MealPlanForm,
    MessageForm, NutritionistForm, ProgressForm,
};
use nutrihub::models::{
    Appointment, AppointmentStatus, Client, Goal, GoalStatus, MealPlanEntry, Message, Nutritionist,
    ProgressEntry,
};
use nutrihub::{
    ApiClient, ApiError, Config, FileSessionStore, GuardDecision, RedirectReason, Role, Route,
    RouteGuard, Session,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "nutrihub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the NutriHub nutrition-services marketplace")]
#[command(long_about = "NutriHub connects clients with nutritionists.\nLog in once, then manage your dashboard from the command line.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Send a message to the NutriHub team
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        message: String,
    },

    /// Body mass index
    Bmi {
        /// Height in centimetres
        height: f64,
        /// Weight in kilograms
        weight: f64,
    },

    /// Basal metabolic rate (kcal/day)
    Bmr {
        /// male or female
        sex: String,
        /// Weight in kilograms
        weight: f64,
        /// Height in centimetres
        height: f64,
        /// Age in years
        age: u32,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Admin dashboard
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Nutritionist dashboard
    #[command(subcommand)]
    Nutritionist(NutritionistCommand),

    /// Client dashboard
    #[command(subcommand)]
    Client(ClientCommand),
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Marketplace totals
    Overview,
    /// List nutritionists
    Nutritionists,
    /// List clients with their nutritionist
    Clients,
    AddNutritionist(NutritionistArgs),
    EditNutritionist {
        id: String,
        #[command(flatten)]
        fields: NutritionistArgs,
    },
    RemoveNutritionist {
        id: String,
    },
    AddClient(ClientArgs),
    EditClient {
        id: String,
        #[command(flatten)]
        fields: ClientArgs,
    },
    RemoveClient {
        id: String,
    },
}

#[derive(Subcommand)]
enum NutritionistCommand {
    /// Client and appointment totals
    Overview,
    /// List your clients
    Clients,
    /// Upcoming appointments
    Appointments {
        /// Include past and cancelled appointments
        #[arg(long)]
        all: bool,
    },
    /// Schedule an appointment with a client
    Schedule {
        #[arg(long)]
        client: String,
        /// "2026-03-01 14:30" or RFC 3339
        #[arg(long)]
        at: String,
        #[arg(long, default_value = "Consultation")]
        kind: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// scheduled, completed or cancelled
    SetAppointmentStatus {
        id: String,
        status: String,
    },
    /// Conversation with a client
    Messages {
        client: String,
    },
    Send {
        client: String,
        message: String,
    },
    /// Send one message to every client
    Broadcast {
        message: String,
    },
    /// Set a goal for a client
    Goal {
        #[arg(long)]
        client: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        target: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Show a client's progress, or record a measurement with --weight
    Progress {
        #[arg(long)]
        client: String,
        #[command(flatten)]
        entry: ProgressArgs,
    },
    /// Add a meal plan entry for a client
    Meal {
        #[arg(long)]
        client: String,
        #[arg(long)]
        day: String,
        /// breakfast, lunch, dinner or snack
        #[arg(long)]
        meal: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        calories: Option<String>,
    },
}

#[derive(Subcommand)]
enum ClientCommand {
    /// Profile summary
    Overview,
    Goals,
    AddGoal {
        #[arg(long)]
        title: String,
        #[arg(long)]
        target: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
    },
    CompleteGoal {
        id: String,
    },
    RemoveGoal {
        id: String,
    },
    /// Progress history
    Progress,
    LogProgress {
        #[command(flatten)]
        entry: ProgressArgs,
    },
    MealPlan {
        /// Only this day
        #[arg(long)]
        day: Option<String>,
    },
    Appointments,
    /// Request an appointment with your nutritionist
    Book {
        /// "2026-03-01 14:30" or RFC 3339
        #[arg(long)]
        at: String,
        #[arg(long, default_value = "Consultation")]
        kind: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Conversation with your nutritionist
    Messages,
    Send {
        message: String,
    },
}

#[derive(Args)]
struct NutritionistArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    specialization: Option<String>,
    /// active or inactive
    #[arg(long)]
    status: Option<String>,
    /// Initial password for the new account
    #[arg(long)]
    password: Option<String>,
}

impl NutritionistArgs {
    /// Overlay the given flags on a form
    fn apply(self, mut form: NutritionistForm) -> NutritionistForm {
        overlay(&mut form.name, self.name);
        overlay(&mut form.email, self.email);
        overlay(&mut form.phone, self.phone);
        overlay(&mut form.address, self.address);
        overlay(&mut form.specialization, self.specialization);
        overlay(&mut form.status, self.status);
        overlay(&mut form.password, self.password);
        form
    }
}

#[derive(Args)]
struct ClientArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    /// Nutritionist id
    #[arg(long)]
    nutritionist: Option<String>,
    #[arg(long)]
    plan: Option<String>,
    /// active or inactive
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

impl ClientArgs {
    fn apply(self, mut form: ClientForm) -> ClientForm {
        overlay(&mut form.name, self.name);
        overlay(&mut form.email, self.email);
        overlay(&mut form.phone, self.phone);
        overlay(&mut form.address, self.address);
        overlay(&mut form.age, self.age);
        overlay(&mut form.gender, self.gender);
        overlay(&mut form.nutritionist_id, self.nutritionist);
        overlay(&mut form.plan, self.plan);
        overlay(&mut form.status, self.status);
        overlay(&mut form.password, self.password);
        form
    }
}

#[derive(Args)]
struct ProgressArgs {
    /// YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,
    /// Kilograms
    #[arg(long)]
    weight: Option<String>,
    /// Percent
    #[arg(long)]
    body_fat: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl ProgressArgs {
    fn into_form(self, client_id: String) -> ProgressForm {
        ProgressForm {
            client_id,
            date: self
                .date
                .unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string()),
            weight: self.weight.unwrap_or_default(),
            body_fat: self.body_fat.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        }
    }
}

fn overlay(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Why a dashboard command was refused
#[derive(Debug, thiserror::Error)]
enum AccessError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session expired, please log in again")]
    Rejected,

    #[error("Signed in as {actual}; this command needs the {required} dashboard")]
    WrongRole { required: Role, actual: Role },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if needs_login(&e) {
                eprintln!("Run `nutrihub login --email <EMAIL> --password <PASSWORD>` to sign in.");
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nutrihub={}", config.level)));

    // stdout carries command output, so logs go to stderr or a file
    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .try_init()?;
    }
    Ok(())
}

fn needs_login(e: &anyhow::Error) -> bool {
    if let Some(e) = e.downcast_ref::<DashboardError>() {
        return matches!(e, DashboardError::SessionExpired);
    }
    if let Some(e) = e.downcast_ref::<ApiError>() {
        return e.is_session_expired();
    }
    matches!(
        e.downcast_ref::<AccessError>(),
        Some(AccessError::NotLoggedIn | AccessError::Rejected)
    )
}

struct App {
    config: Config,
    client: Arc<ApiClient>,
    format: Format,
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let store = Arc::new(FileSessionStore::new(config.session.file_path()));
    let client = Arc::new(ApiClient::new(&config.api, store)?);
    tracing::debug!(base_url = %client.base_url(), "API client ready");

    let app = App {
        config,
        client,
        format: cli.format,
    };

    match cli.command {
        Commands::Login { email, password } => app.login(email, password).await,
        Commands::Logout => {
            api::auth::logout(&app.client)?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => app.whoami().await,
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let request = MailForm {
                name,
                email,
                subject,
                message,
            }
            .validate()?;
            api::auth::send_mail(&app.client, &request).await?;
            println!("Message sent, we will get back to you soon");
            Ok(())
        }
        Commands::Bmi { height, weight } => {
            let report = calculator::bmi(height, weight)?;
            if app.format == Format::Table {
                println!("{} ({})", report, report.category);
                Ok(())
            } else {
                let value = (report.value * 100.0).round() / 100.0;
                render_summary(
                    app.format,
                    &serde_json::json!({ "bmi": value, "category": report.category.to_string() }),
                )
            }
        }
        Commands::Bmr {
            sex,
            weight,
            height,
            age,
        } => {
            let sex: Sex = sex.parse().map_err(anyhow::Error::msg)?;
            let kcal = calculator::bmr(sex, weight, height, age)?;
            if app.format == Format::Table {
                println!("Your BMR is {:.0} kcal/day", kcal);
                Ok(())
            } else {
                render_summary(app.format, &serde_json::json!({ "bmr_kcal": kcal.round() }))
            }
        }
        Commands::Config { output } => {
            let config = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
            Ok(())
        }
        Commands::Admin(command) => app.admin_dashboard(command).await,
        Commands::Nutritionist(command) => app.nutritionist_dashboard(command).await,
        Commands::Client(command) => app.client_dashboard(command).await,
    }
}

impl App {
    async fn login(&self, email: String, password: String) -> anyhow::Result<()> {
        let request = LoginForm { email, password }.validate()?;
        let session = api::auth::login(&self.client, &request).await?;
        println!(
            "Logged in as {} ({}), dashboard: {}",
            session.user.email,
            session.role(),
            session.role().dashboard_path()
        );
        Ok(())
    }

    async fn whoami(&self) -> anyhow::Result<()> {
        let session = self
            .client
            .current_session()?
            .ok_or(AccessError::NotLoggedIn)?;
        if self.config.api.verify_session {
            api::auth::verify(&self.client).await?;
        }
        render_summary(
            self.format,
            &serde_json::json!({
                "email": session.user.email,
                "role": session.role(),
                "dashboard": session.role().dashboard_path(),
            }),
        )
    }

    /// Pass the guard for a role dashboard
    async fn enter(&self, role: Role) -> anyhow::Result<Session> {
        let guard = RouteGuard::new(&self.client).verify_with_server(self.config.api.verify_session);

        match guard.authorize(Route::RoleDashboard(role)).await? {
            GuardDecision::Allow(session) => Ok(session),
            GuardDecision::Redirect { to, reason } => {
                tracing::debug!(%to, ?reason, "Guard redirected");
                let err = match (reason, Route::parse(&to)) {
                    (RedirectReason::WrongRole, Route::RoleDashboard(actual)) => AccessError::WrongRole {
                        required: role,
                        actual,
                    },
                    (RedirectReason::SessionRejected, _) => AccessError::Rejected,
                    _ => AccessError::NotLoggedIn,
                };
                Err(err.into())
            }
            GuardDecision::Public => bail!("{} is not a dashboard route", role.dashboard_path()),
        }
    }

    async fn admin_dashboard(&self, command: AdminCommand) -> anyhow::Result<()> {
        self.enter(Role::Admin).await?;
        let mut admin = AdminDashboard::new(self.client.clone());
        admin.load().await?;

        match command {
            AdminCommand::Overview => render_summary(self.format, &admin.stats()),
            AdminCommand::Nutritionists => {
                let data = admin.data().ok_or(DashboardError::NotLoaded)?;
                render(self.format, data.nutritionists.as_slice())
            }
            AdminCommand::Clients => render(self.format, &admin.client_rows()),
            AdminCommand::AddNutritionist(fields) => {
                let form = fields.apply(NutritionistForm::default());
                let created = admin.add_nutritionist(&form).await?;
                report_notices(&mut admin);
                render(self.format, std::slice::from_ref(&created))
            }
            AdminCommand::EditNutritionist { id, fields } => {
                let form = {
                    let data = admin.data().ok_or(DashboardError::NotLoaded)?;
                    let current = data
                        .nutritionists
                        .get(&id)
                        .ok_or_else(|| DashboardError::UnknownRecord(id.clone()))?;
                    fields.apply(NutritionistForm::from(current))
                };
                let updated = admin.update_nutritionist(&id, &form).await?;
                report_notices(&mut admin);
                render(self.format, std::slice::from_ref(&updated))
            }
            AdminCommand::RemoveNutritionist { id } => {
                admin.delete_nutritionist(&id).await?;
                report_notices(&mut admin);
                Ok(())
            }
            AdminCommand::AddClient(fields) => {
                let form = fields.apply(ClientForm::default());
                let created = admin.add_client(&form).await?;
                report_notices(&mut admin);
                render(self.format, std::slice::from_ref(&created))
            }
            AdminCommand::EditClient { id, fields } => {
                let form = {
                    let data = admin.data().ok_or(DashboardError::NotLoaded)?;
                    let current = data
                        .clients
                        .get(&id)
                        .ok_or_else(|| DashboardError::UnknownRecord(id.clone()))?;
                    fields.apply(ClientForm::from(current))
                };
                let updated = admin.update_client(&id, &form).await?;
                report_notices(&mut admin);
                render(self.format, std::slice::from_ref(&updated))
            }
            AdminCommand::RemoveClient { id } => {
                admin.delete_client(&id).await?;
                report_notices(&mut admin);
                Ok(())
            }
        }
    }

    async fn nutritionist_dashboard(&self, command: NutritionistCommand) -> anyhow::Result<()> {
        self.enter(Role::Nutritionist).await?;
        let mut dashboard = NutritionistDashboard::new(self.client.clone());
        dashboard.load().await?;
        let now = Utc::now();

        match command {
            NutritionistCommand::Overview => render_summary(self.format, &dashboard.stats(now)),
            NutritionistCommand::Clients => {
                let data = dashboard.data().ok_or(DashboardError::NotLoaded)?;
                render(self.format, data.clients.as_slice())
            }
            NutritionistCommand::Appointments { all } => {
                if all {
                    let data = dashboard.data().ok_or(DashboardError::NotLoaded)?;
                    let mut appointments: Vec<&Appointment> = data.appointments.iter().collect();
                    appointments.sort_by_key(|a| a.date_time);
                    render(self.format, &appointments)
                } else {
                    render(self.format, &dashboard.upcoming_appointments(now))
                }
            }
            NutritionistCommand::Schedule {
                client,
                at,
                kind,
                notes,
            } => {
                let form = AppointmentForm {
                    client_id: client,
                    date_time: at,
                    kind,
                    notes: notes.unwrap_or_default(),
                };
                let created = dashboard.schedule(&form).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&created))
            }
            NutritionistCommand::SetAppointmentStatus { id, status } => {
                let status: AppointmentStatus = status.parse().map_err(anyhow::Error::msg)?;
                let updated = dashboard.set_appointment_status(&id, status).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&updated))
            }
            NutritionistCommand::Messages { client } => {
                let messages = dashboard.conversation(&client).await?;
                render(self.format, messages)
            }
            NutritionistCommand::Send { client, message } => {
                dashboard.send_message(&client, &MessageForm::new(message)).await?;
                report_notices(&mut dashboard);
                Ok(())
            }
            NutritionistCommand::Broadcast { message } => {
                let report = dashboard.broadcast(&MessageForm::new(message)).await?;
                report_notices(&mut dashboard);
                for (client, error) in &report.failed {
                    eprintln!("  {}: {}", client, error);
                }
                if !report.is_complete() {
                    bail!(
                        "{} of {} deliveries failed",
                        report.failed.len(),
                        report.failed.len() + report.sent.len()
                    );
                }
                Ok(())
            }
            NutritionistCommand::Goal {
                client,
                title,
                target,
                deadline,
            } => {
                let form = GoalForm {
                    client_id: client,
                    title,
                    target: target.unwrap_or_default(),
                    deadline: deadline.unwrap_or_default(),
                };
                let goal = dashboard.set_goal(&form).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&goal))
            }
            NutritionistCommand::Progress { client, entry } => {
                if entry.weight.is_none() {
                    let history = dashboard.client_progress(&client).await?;
                    return render(self.format, &history);
                }
                let form = entry.into_form(client);
                let recorded = dashboard.record_progress(&form).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&recorded))
            }
            NutritionistCommand::Meal {
                client,
                day,
                meal,
                description,
                calories,
            } => {
                let form = MealPlanForm {
                    client_id: client,
                    day,
                    meal,
                    description,
                    calories: calories.unwrap_or_default(),
                };
                let entry = dashboard.add_meal(&form).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&entry))
            }
        }
    }

    async fn client_dashboard(&self, command: ClientCommand) -> anyhow::Result<()> {
        self.enter(Role::Client).await?;
        let mut dashboard = ClientDashboard::new(self.client.clone());
        dashboard.load().await?;

        match command {
            ClientCommand::Overview => {
                let data = dashboard.data().ok_or(DashboardError::NotLoaded)?;
                let now = Utc::now();
                render_summary(
                    self.format,
                    &serde_json::json!({
                        "name": data.profile.name,
                        "email": data.profile.email,
                        "plan": data.profile.plan,
                        "nutritionist": data.profile.nutritionist_id,
                        "open_goals": data.goals.iter().filter(|g| g.status == GoalStatus::InProgress).count(),
                        "latest_weight": dashboard.latest_progress().map(|p| p.weight),
                        "upcoming_appointments": data.appointments.iter().filter(|a| a.is_upcoming(now)).count(),
                    }),
                )
            }
            ClientCommand::Goals => {
                let data = dashboard.data().ok_or(DashboardError::NotLoaded)?;
                render(self.format, data.goals.as_slice())
            }
            ClientCommand::AddGoal {
                title,
                target,
                deadline,
            } => {
                let form = GoalForm {
                    client_id: String::new(),
                    title,
                    target: target.unwrap_or_default(),
                    deadline: deadline.unwrap_or_default(),
                };
                let goal = dashboard.add_goal(&form).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&goal))
            }
            ClientCommand::CompleteGoal { id } => {
                let goal = dashboard.complete_goal(&id).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&goal))
            }
            ClientCommand::RemoveGoal { id } => {
                dashboard.delete_goal(&id).await?;
                report_notices(&mut dashboard);
                Ok(())
            }
            ClientCommand::Progress => render(self.format, dashboard.progress_history()),
            ClientCommand::LogProgress { entry } => {
                let form = entry.into_form(String::new());
                let recorded = dashboard.record_progress(&form).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&recorded))
            }
            ClientCommand::MealPlan { day } => match day {
                Some(day) => render(self.format, &dashboard.meal_plan_for(&day)),
                None => {
                    let data = dashboard.data().ok_or(DashboardError::NotLoaded)?;
                    render(self.format, data.meal_plan.as_slice())
                }
            },
            ClientCommand::Appointments => {
                let data = dashboard.data().ok_or(DashboardError::NotLoaded)?;
                let mut appointments: Vec<&Appointment> = data.appointments.iter().collect();
                appointments.sort_by_key(|a| a.date_time);
                render(self.format, &appointments)
            }
            ClientCommand::Book { at, kind, notes } => {
                let form = AppointmentForm {
                    client_id: String::new(),
                    date_time: at,
                    kind,
                    notes: notes.unwrap_or_default(),
                };
                let created = dashboard.request_appointment(&form).await?;
                report_notices(&mut dashboard);
                render(self.format, std::slice::from_ref(&created))
            }
            ClientCommand::Messages => {
                let messages = dashboard.conversation().await?;
                render(self.format, messages)
            }
            ClientCommand::Send { message } => {
                dashboard.send_message(&MessageForm::new(message)).await?;
                report_notices(&mut dashboard);
                Ok(())
            }
        }
    }
}

/// Print success toasts; failures surface through the returned error
fn report_notices(dashboard: &mut impl Dashboard) {
    for notice in dashboard.notices_mut().drain() {
        if notice.level == NoticeLevel::Success {
            eprintln!("{}", notice.message);
        }
    }
}

// ---- output ----

/// A record that can be shown as one table or CSV row
trait Tabular: Serialize {
    const HEADERS: &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

impl<T: Tabular> Tabular for &T {
    const HEADERS: &'static [&'static str] = T::HEADERS;

    fn row(&self) -> Vec<String> {
        (**self).row()
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl Tabular for Nutritionist {
    const HEADERS: &'static [&'static str] =
        &["ID", "NAME", "EMAIL", "PHONE", "SPECIALIZATION", "STATUS", "CLIENTS"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.specialization.clone(),
            self.status.to_string(),
            self.client_count.to_string(),
        ]
    }
}

impl Tabular for ClientRow {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "EMAIL", "PLAN", "STATUS", "NUTRITIONIST"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.plan.clone(),
            self.status.to_string(),
            self.nutritionist.clone(),
        ]
    }
}

impl Tabular for Client {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "EMAIL", "PHONE", "AGE", "PLAN", "STATUS"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            opt(&self.age),
            opt(&self.plan),
            self.status.to_string(),
        ]
    }
}

impl Tabular for Appointment {
    const HEADERS: &'static [&'static str] = &["ID", "CLIENT", "WHEN", "TYPE", "STATUS", "NOTES"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.client_id.clone(),
            self.date_time.format("%Y-%m-%d %H:%M").to_string(),
            self.kind.clone(),
            self.status.to_string(),
            opt(&self.notes),
        ]
    }
}

impl Tabular for Message {
    const HEADERS: &'static [&'static str] = &["TIME", "FROM", "TO", "MESSAGE"];

    fn row(&self) -> Vec<String> {
        vec![
            self.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            self.sender_id.clone(),
            self.receiver_id.clone(),
            self.content.clone(),
        ]
    }
}

impl Tabular for Goal {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "TARGET", "DEADLINE", "STATUS"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            opt(&self.target),
            opt(&self.deadline),
            self.status.to_string(),
        ]
    }
}

impl Tabular for ProgressEntry {
    const HEADERS: &'static [&'static str] = &["DATE", "WEIGHT (KG)", "BODY FAT (%)", "NOTES"];

    fn row(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            format!("{:.1}", self.weight),
            self.body_fat.map(|bf| format!("{:.1}", bf)).unwrap_or_else(|| "-".to_string()),
            opt(&self.notes),
        ]
    }
}

impl Tabular for MealPlanEntry {
    const HEADERS: &'static [&'static str] = &["ID", "DAY", "MEAL", "DESCRIPTION", "CALORIES"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.day.clone(),
            self.meal.to_string(),
            self.description.clone(),
            opt(&self.calories),
        ]
    }
}

fn render<T: Tabular>(format: Format, items: &[T]) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(items)?),
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(T::HEADERS)?;
            for item in items {
                writer.write_record(item.row())?;
            }
            writer.flush()?;
        }
        Format::Table => {
            if items.is_empty() {
                println!("No records");
            } else {
                let rows: Vec<Vec<String>> = items.iter().map(|item| item.row()).collect();
                print_table(T::HEADERS, &rows);
            }
        }
    }
    Ok(())
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.to_vec());
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
}

/// Show one record as key/value pairs
fn render_summary<T: Serialize>(format: Format, value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value)?;
    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let fields: Vec<(String, String)> = match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => "-".to_string(),
                    other => other.to_string(),
                };
                (key.replace('_', " "), text)
            })
            .collect(),
        other => vec![("value".to_string(), other.to_string())],
    };

    if format == Format::Csv {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        writer.write_record(["field", "value"])?;
        for (key, text) in &fields {
            writer.write_record([key, text])?;
        }
        writer.flush()?;
    } else {
        let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, text) in fields {
            println!("{:<width$}  {}", key, text, width = width);
        }
    }
    Ok(())
}
