use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::Write;
use uuid::Uuid;

use shared_types::LoginRequest;
use taskflow_client::calendar::CalendarMonth;
use taskflow_client::config::ClientConfig;
use taskflow_client::forms::{
    parse_local_datetime, resolve_color, ProjectForm, RegisterForm, ResetPasswordForm, TaskForm,
};
use taskflow_client::pages::analytics::AnalyticsView;
use taskflow_client::pages::calendar::CalendarView;
use taskflow_client::pages::dashboard::DashboardView;
use taskflow_client::pages::projects::{ProjectFilter, ProjectsView};
use taskflow_client::pages::tasks::{TaskFilter, TaskListOptions, TaskSort, TasksView};
use taskflow_client::pages::PageState;
use taskflow_client::{render, ApiClient, ClientError, Session, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "taskflow", author, version, about = "TaskFlow task and project manager")]
struct Cli {
    /// Overrides `api_base_url` from client.toml
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Task statistics overview
    Dashboard,
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
    /// Month view with the tasks due on the selected day
    Calendar {
        /// Month to display, as YYYY-MM
        #[arg(long)]
        month: Option<CalendarMonth>,
        /// Day to select, as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Analytics,
}

#[derive(Subcommand, Debug)]
enum TasksCommand {
    List {
        #[arg(long, value_enum, default_value_t = TaskFilter::All)]
        filter: TaskFilter,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = TaskSort::Id)]
        sort: TaskSort,
        #[arg(long)]
        desc: bool,
    },
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// YYYY-MM-DD [HH:MM] in local time, or RFC 3339
        #[arg(long, value_parser = parse_local_datetime)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        project: Option<Uuid>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_local_datetime)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        project: Option<Uuid>,
    },
    Toggle {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectsCommand {
    List {
        #[arg(long, value_enum, default_value_t = ProjectFilter::All)]
        filter: ProjectFilter,
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Palette name (blue, purple, green, ...) or hex code
        #[arg(long)]
        color: Option<String>,
        #[arg(long, value_parser = parse_local_datetime)]
        deadline: Option<DateTime<Utc>>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, value_parser = parse_local_datetime)]
        deadline: Option<DateTime<Utc>>,
    },
    Delete {
        id: Uuid,
    },
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(password: Option<String>, label: &str) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt(label),
    }
}

/// Print a page or its failure. Returns an error so the exit code reflects it.
fn show<V>(result: taskflow_client::Result<V>, render: impl Fn(&V) -> String) -> anyhow::Result<()> {
    if let Err(e) = &result {
        if e.is_unauthorized() {
            eprintln!("Your session is missing or expired. Run `taskflow login` first.");
        }
    }

    match PageState::from_result(result) {
        PageState::Ready(view) => {
            print!("{}", render(&view));
            Ok(())
        }
        PageState::Failed(message) => {
            bail!("{message}\nRun the command again to retry.")
        }
        PageState::Loading => Ok(()),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, config_path) = ClientConfig::load().context("Failed to load client config")?;
    tracing::debug!("Loaded config from {:?}", config_path);

    let base_url = cli.api_url.unwrap_or(config.api_base_url);
    let api = ApiClient::new(base_url)?;
    let store = SessionStore::open_default()?;
    let now = Utc::now();

    match cli.command {
        Command::Register { email, password } => {
            let password = password_or_prompt(password, "Password")?;
            let confirm_password = prompt("Confirm password")?;
            let request = RegisterForm {
                email,
                password,
                confirm_password,
            }
            .into_request()?;
            let response = api.register(&request).await?;
            println!("{} ({})", response.message, response.email);
            println!("Run `taskflow login {}` to sign in.", response.email);
        }
        Command::Login { email, password } => {
            let password = password_or_prompt(password, "Password")?;
            let response = api
                .login(&LoginRequest {
                    email: email.trim().to_string(),
                    password,
                })
                .await?;
            let session = Session::from(response);
            store.save(&session)?;
            tracing::info!("Saved session to {:?}", store.path());
            println!("Login successful. Welcome, {}", session.user.email);
        }
        Command::Logout => {
            if let Some(session) = store.load()? {
                if let Err(e) = api.logout(&session).await {
                    tracing::warn!("Server logout failed: {}", e);
                }
            }
            store.clear()?;
            println!("Logged out successfully");
        }
        Command::Whoami => {
            let session = store.require()?;
            let user = api.me(&session).await?;
            println!("{} ({})", user.email, user.id);
        }
        Command::ForgotPassword { email } => {
            let response = api.forgot_password(email.trim()).await?;
            println!("{}", response.message);
        }
        Command::ResetPassword { email, password } => {
            let new_password = password_or_prompt(password, "New password")?;
            let confirm_password = prompt("Confirm password")?;
            let request = ResetPasswordForm {
                email,
                new_password,
                confirm_password,
            }
            .into_request()?;
            let response = api.reset_password(&request).await?;
            println!("{}", response.message);
        }
        Command::Dashboard => {
            let session = store.require()?;
            show(DashboardView::load(&api, &session).await, render::dashboard)?;
        }
        Command::Tasks { command } => {
            let session = store.require()?;
            run_tasks(&api, &session, command, now).await?;
        }
        Command::Projects { command } => {
            let session = store.require()?;
            run_projects(&api, &session, command).await?;
        }
        Command::Calendar { month, date } => {
            let session = store.require()?;
            let today = now.with_timezone(&Local).date_naive();
            let result = CalendarView::load(&api, &session, today).await.map(|mut view| {
                if let Some(date) = date {
                    view.select(date);
                }
                if let Some(month) = month {
                    view.show_month(month);
                }
                view
            });
            show(result, |view| render::calendar(view, now))?;
        }
        Command::Analytics => {
            let session = store.require()?;
            show(AnalyticsView::load(&api, &session, now).await, render::analytics)?;
        }
    }

    Ok(())
}

async fn run_tasks(
    api: &ApiClient,
    session: &Session,
    command: TasksCommand,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    match command {
        TasksCommand::List {
            filter,
            search,
            sort,
            desc,
        } => {
            let options = TaskListOptions {
                filter,
                search,
                sort,
                descending: desc,
            };
            show(TasksView::load(api, session).await, |view| {
                render::task_sections(&view.sections(&options), now)
            })?;
        }
        TasksCommand::Add {
            title,
            description,
            due,
            project,
        } => {
            let request = TaskForm {
                title,
                description: description.unwrap_or_default(),
                due_date: due,
                project_id: project,
            }
            .into_create()?;
            let task = api.create_task(session, &request).await?;
            println!("Created {}", render::task_line(&task, now));
        }
        TasksCommand::Edit {
            id,
            title,
            description,
            due,
            project,
        } => {
            let existing = api.get_task(session, id).await?;
            let mut form = TaskForm::from_task(&existing);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if due.is_some() {
                form.due_date = due;
            }
            if project.is_some() {
                form.project_id = project;
            }
            let task = api.update_task(session, id, &form.into_update()?).await?;
            println!("Updated {}", render::task_line(&task, now));
        }
        TasksCommand::Toggle { id } => {
            let task = api.toggle_task(session, id).await?;
            println!("{}", render::task_line(&task, now));
        }
        TasksCommand::Delete { id } => {
            api.delete_task(session, id).await?;
            println!("Task deleted successfully");
        }
    }
    Ok(())
}

async fn run_projects(
    api: &ApiClient,
    session: &Session,
    command: ProjectsCommand,
) -> anyhow::Result<()> {
    match command {
        ProjectsCommand::List { filter, search } => {
            show(ProjectsView::load(api, session).await, |view| {
                let stats = view.stats();
                let mut out = format!(
                    "Projects: {} total, {} completed, {} active\n\n",
                    stats.total, stats.completed, stats.active
                );
                for entry in view.filtered(filter, search.as_deref()) {
                    out.push_str(&render::project_line(entry));
                    out.push('\n');
                }
                out
            })?;
        }
        ProjectsCommand::Add {
            name,
            description,
            color,
            deadline,
        } => {
            let mut form = ProjectForm {
                name,
                description: description.unwrap_or_default(),
                deadline,
                ..Default::default()
            };
            if let Some(color) = color {
                form.color = resolve_color(&color);
            }
            let project = api.create_project(session, &form.into_create()?).await?;
            println!("Created project {} ({})", project.name, project.id);
        }
        ProjectsCommand::Edit {
            id,
            name,
            description,
            color,
            deadline,
        } => {
            let existing = api.get_project(session, id).await?;
            let mut form = ProjectForm::from_project(&existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(color) = color {
                form.color = resolve_color(&color);
            }
            if deadline.is_some() {
                form.deadline = deadline;
            }
            let project = api.update_project(session, id, &form.into_update()?).await?;
            println!("Updated project {} ({})", project.name, project.id);
        }
        ProjectsCommand::Delete { id } => {
            let response = api.delete_project(session, id).await?;
            println!("{}", response.message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if let Some(ClientError::NotAuthenticated) = e.downcast_ref::<ClientError>() {
            eprintln!("Error: {e}. Run `taskflow login` first.");
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
