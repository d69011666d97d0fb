//! Student Portal - command-line front-end
//!
//! Renders the portal's screens in the terminal. The session persists
//! between invocations in the configured token file.

use student_portal::api::HttpGateway;
use student_portal::auth::{resolve, FileTokenStore, GuardDecision, Role, Route, SessionStore, Status, StatusFilter};
use student_portal::console::{self, AssumeYes, PromptConfirm};
use student_portal::core::{Config, ConfigOverrides, Logger};
use student_portal::views::dashboard::{self, AdminDashboard, Dashboard};
use student_portal::views::{Confirm, LoginForm, MutationOutcome, ProfileViewModel, RecordForm, RegisterForm};

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "student-portal", version, about = "Student records portal")]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show the landing screen for the signed-in role
    Dashboard,
    /// View or edit your own profile (students)
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Manage student records (admins)
    #[command(subcommand)]
    Roster(RosterCommand),
    /// Show aggregate counts by status (admins)
    Stats,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    /// Prompted for when omitted
    #[arg(long)]
    password: Option<String>,
    #[arg(long, default_value = "student")]
    role: Role,
    #[arg(long)]
    course: Option<String>,
    #[arg(long)]
    enrollment_year: Option<i32>,
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    Show,
    Edit {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Pass an empty string to clear
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        enrollment_year: Option<i32>,
    },
}

#[derive(Debug, Subcommand)]
enum RosterCommand {
    List {
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, Active, Graduated or Dropped
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    Add(RecordArgs),
    Edit {
        id: String,
        #[command(flatten)]
        fields: RecordArgs,
        /// Skip the confirmation prompt for a role change
        #[arg(short, long)]
        yes: bool,
    },
    Status {
        id: String,
        status: Status,
    },
    Role {
        id: String,
        role: Role,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct RecordArgs {
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Leave out on edit to keep the current password
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    role: Option<Role>,
    #[arg(long)]
    course: Option<String>,
    #[arg(long)]
    enrollment_year: Option<i32>,
    #[arg(long)]
    status: Option<Status>,
}

impl RecordArgs {
    fn apply(self, form: &mut RecordForm) {
        if let Some(v) = self.full_name {
            form.full_name = v;
        }
        if let Some(v) = self.email {
            form.email = v;
        }
        if let Some(v) = self.phone {
            form.phone = v;
        }
        if let Some(v) = self.password {
            form.password = v;
        }
        if let Some(v) = self.role {
            form.role = v;
        }
        if let Some(v) = self.course {
            form.course = v;
        }
        if let Some(v) = self.enrollment_year {
            form.enrollment_year = v;
        }
        if let Some(v) = self.status {
            form.status = v;
        }
    }
}

struct App {
    config: Config,
    session: SessionStore,
    gateway: HttpGateway,
}

impl App {
    /// Apply the route guard before rendering a screen
    fn enter(&self, route: Route) -> Result<()> {
        match resolve(self.session.identity().as_ref(), route) {
            GuardDecision::Render(_) => Ok(()),
            GuardDecision::Redirect(Route::Login) => {
                bail!("Not logged in. Run `student-portal login` first.")
            }
            GuardDecision::Redirect(to) => {
                debug!(from = %route, to = %to, "Route guard redirect");
                bail!("Not available for your role. Run `student-portal dashboard` instead.")
            }
        }
    }

    async fn admin_dashboard(&self) -> Result<AdminDashboard> {
        self.enter(Route::Roster)?;
        let mut admin = AdminDashboard::new(self.config.roster.page_size);
        admin.roster.load(&self.gateway).await;
        if let Some(error) = admin.roster.error() {
            bail!("{}", error);
        }
        Ok(admin)
    }

    async fn run(&self, command: Command) -> Result<()> {
        let mut out = io::stdout().lock();

        match command {
            Command::Login { email, password } => {
                self.enter(Route::Login)?;
                let password = match password {
                    Some(password) => password,
                    None => console::read_line("Password")?,
                };
                let mut form = LoginForm::new();
                form.set_email(email);
                form.set_password(password);
                if form.submit(&self.gateway, &self.session).await.is_none() {
                    bail!("{}", form.error().unwrap_or(REQUEST_FAILED));
                }
                if let Some(identity) = self.session.identity() {
                    console::notice(&mut out, &format!("Logged in as {} ({})", identity.full_name, identity.role))?;
                }
            }
            Command::Register(args) => {
                self.enter(Route::Register)?;
                let password = match args.password {
                    Some(password) => password,
                    None => console::read_line("Password")?,
                };
                let mut form = RegisterForm::new();
                form.full_name = args.full_name;
                form.email = args.email;
                form.phone = args.phone;
                form.password = password;
                form.role = args.role;
                form.course = args.course.unwrap_or_default();
                if let Some(year) = args.enrollment_year {
                    form.enrollment_year = year;
                }
                if form.submit(&self.gateway).await.is_none() {
                    bail!("{}", form.error().unwrap_or(REQUEST_FAILED));
                }
                if let Some(notice) = form.notice() {
                    console::notice(&mut out, notice)?;
                }
            }
            Command::Logout => {
                dashboard::logout(&self.session);
                console::notice(&mut out, "Logged out")?;
            }
            Command::Whoami => match self.session.identity() {
                Some(identity) => console::identity(&mut out, &identity)?,
                None => console::notice(&mut out, "Not logged in")?,
            },
            Command::Dashboard => {
                self.enter(Route::Dashboard)?;
                let identity = self
                    .session
                    .identity()
                    .ok_or_else(|| anyhow!("Not logged in"))?;
                match Dashboard::for_identity(&identity, self.config.roster.page_size) {
                    Dashboard::Student(_) => console::identity(&mut out, &identity)?,
                    Dashboard::Admin(mut admin) => {
                        admin.refresh(&self.gateway).await;
                        match admin.stats() {
                            Some(stats) => console::stats(&mut out, stats)?,
                            None => console::notice(&mut out, admin.stats_error().unwrap_or(REQUEST_FAILED))?,
                        }
                        if let Some(error) = admin.roster.error() {
                            console::notice(&mut out, error)?;
                        }
                        console::roster_page(&mut out, &admin.roster.current_page())?;
                    }
                }
            }
            Command::Profile(ProfileCommand::Show) => {
                self.enter(Route::Profile)?;
                if let Some(identity) = self.session.identity() {
                    console::identity(&mut out, &identity)?;
                }
            }
            Command::Profile(ProfileCommand::Edit {
                full_name,
                phone,
                course,
                enrollment_year,
            }) => {
                self.enter(Route::Profile)?;
                let mut profile = ProfileViewModel::new();
                if !profile.begin_edit(&self.session) {
                    bail!("Not logged in");
                }
                profile.update_draft(|draft| {
                    if let Some(v) = full_name {
                        draft.full_name = v;
                    }
                    if let Some(v) = phone {
                        draft.phone = v;
                    }
                    if let Some(v) = course {
                        draft.course = v;
                    }
                    if let Some(v) = enrollment_year {
                        draft.enrollment_year = v;
                    }
                });
                match profile.submit(&self.gateway, &self.session).await {
                    MutationOutcome::Applied => {
                        console::notice(&mut out, profile.success().unwrap_or_default())?;
                        if let Some(identity) = self.session.identity() {
                            console::identity(&mut out, &identity)?;
                        }
                    }
                    _ => bail!("{}", profile.error().unwrap_or(REQUEST_FAILED)),
                }
            }
            Command::Roster(RosterCommand::List { search, status, page }) => {
                let mut admin = self.admin_dashboard().await?;
                admin.roster.set_search_term(search);
                admin.roster.set_status_filter(status);
                admin.roster.go_to_page(page);
                console::roster_page(&mut out, &admin.roster.current_page())?;
            }
            Command::Roster(RosterCommand::Add(fields)) => {
                let mut admin = self.admin_dashboard().await?;
                admin.roster.begin_add();
                if let Some(form) = admin.roster.form_mut() {
                    fields.apply(form);
                }
                let outcome = admin.roster.submit_form(&self.gateway, confirmer(false)).await;
                self.finish(&mut admin, outcome, "Student added", &mut out).await?;
            }
            Command::Roster(RosterCommand::Edit { id, fields, yes }) => {
                let mut admin = self.admin_dashboard().await?;
                if !admin.roster.begin_edit(&id) {
                    bail!("No student with id {}", id);
                }
                if let Some(form) = admin.roster.form_mut() {
                    fields.apply(form);
                }
                let outcome = admin.roster.submit_form(&self.gateway, confirmer(yes)).await;
                self.finish(&mut admin, outcome, "Student updated", &mut out).await?;
            }
            Command::Roster(RosterCommand::Status { id, status }) => {
                let mut admin = self.admin_dashboard().await?;
                let outcome = admin.roster.change_status(&self.gateway, &id, status).await;
                self.finish(&mut admin, outcome, "Status updated", &mut out).await?;
            }
            Command::Roster(RosterCommand::Role { id, role, yes }) => {
                let mut admin = self.admin_dashboard().await?;
                let outcome = admin
                    .roster
                    .change_role(&self.gateway, &id, role, confirmer(yes))
                    .await;
                self.finish(&mut admin, outcome, "Role updated", &mut out).await?;
            }
            Command::Roster(RosterCommand::Delete { id, yes }) => {
                let mut admin = self.admin_dashboard().await?;
                let outcome = admin
                    .roster
                    .delete_record(&self.gateway, &id, confirmer(yes))
                    .await;
                self.finish(&mut admin, outcome, "Student deleted", &mut out).await?;
            }
            Command::Stats => {
                self.enter(Route::Stats)?;
                let mut admin = AdminDashboard::new(self.config.roster.page_size);
                if !admin.refresh_stats(&self.gateway).await {
                    bail!("{}", admin.stats_error().unwrap_or(REQUEST_FAILED));
                }
                if let Some(stats) = admin.stats() {
                    console::stats(&mut out, stats)?;
                }
            }
        }

        Ok(())
    }

    /// Report a roster mutation and reload after it was applied
    async fn finish(
        &self,
        admin: &mut AdminDashboard,
        outcome: MutationOutcome,
        applied: &str,
        out: &mut impl io::Write,
    ) -> Result<()> {
        match outcome {
            MutationOutcome::Applied => {
                admin.settle(&self.gateway, outcome).await;
                console::notice(out, applied)?;
                console::roster_page(out, &admin.roster.current_page())?;
                Ok(())
            }
            MutationOutcome::Declined => {
                console::notice(out, "Cancelled")?;
                Ok(())
            }
            MutationOutcome::Rejected => {
                bail!("{}", admin.roster.error().unwrap_or(REQUEST_FAILED))
            }
        }
    }
}

fn confirmer(assume_yes: bool) -> &'static dyn Confirm {
    if assume_yes {
        &AssumeYes
    } else {
        &PromptConfirm
    }
}

const REQUEST_FAILED: &str = "Request failed";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (defaults, file, env vars, then flags)
    let config = match Config::load(&cli.overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    debug!(version = student_portal::VERSION, "Starting student portal");
    info!(
        base_url = %config.api.base_url,
        token_file = ?config.session.token_file,
        "Configuration loaded"
    );

    let tokens = Arc::new(FileTokenStore::new(
        config.session.token_file.clone(),
        config.session.token_key.clone(),
    ));
    let session = SessionStore::new(tokens);
    session.initialize();

    let gateway = HttpGateway::new(&config.api, session.token_store())?;
    let app = App {
        config,
        session,
        gateway,
    };

    app.run(cli.command).await
}
