use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::{prelude::*, EnvFilter};

use intellitask::cli::{folder, list, print_log, settings, task};
use intellitask::config::Config;
use intellitask::model::{ActiveView, TaskDraft, TaskPriority, TaskStatus};
use intellitask::store::TaskStore;
use intellitask::webhook::WebhookClient;
use intellitask::TaskService;

#[derive(Parser)]
#[command(name = "intellitask")]
#[command(about = "Local-first Kanban task manager with webhook sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "intellitask.yaml")]
    config: String,

    /// Do not print the operation log after the command
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        #[command(flatten)]
        fields: TaskFields,

        /// Active view: all, today, or a folder (id or name) that scopes the new task
        #[arg(long, default_value = "all")]
        view: String,
    },

    /// Update a task
    Update {
        /// Task ID (full or prefix)
        task: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: TaskFields,

        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,

        /// Remove the scheduled date
        #[arg(long, conflicts_with = "scheduled")]
        clear_schedule: bool,
    },

    /// Delete a task (local only)
    Delete {
        /// Task ID (full or prefix)
        task: String,
    },

    /// List tasks
    List {
        /// View: all, today, or a folder id or name
        #[arg(long, default_value = "all")]
        view: String,

        /// Filter by tag (case-insensitive substring)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show tasks as Kanban columns
    Board {
        /// View: all, today, or a folder id or name
        #[arg(long, default_value = "all")]
        view: String,

        /// Filter by tag (case-insensitive substring)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Tasks scheduled for today or overdue, grouped by folder
    Today {
        /// Filter by tag (case-insensitive substring)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Folder management
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },

    /// Webhook settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Args)]
struct TaskFields {
    /// Description
    #[arg(short, long)]
    description: Option<String>,

    /// Status (backlog, doing, blocked, done)
    #[arg(short, long)]
    status: Option<TaskStatus>,

    /// Priority (low, med, high)
    #[arg(short, long)]
    priority: Option<TaskPriority>,

    /// Tag (repeatable); replaces the task's tags
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Folder id or name
    #[arg(short, long)]
    folder: Option<String>,

    /// Scheduled date (YYYY-MM-DD)
    #[arg(long)]
    scheduled: Option<NaiveDate>,

    /// Minutes tracked in this session
    #[arg(short, long, default_value_t = 0)]
    minutes: i64,
}

#[derive(Subcommand)]
enum FolderCommands {
    /// Create a folder
    Add {
        /// Folder name
        name: String,
    },
    /// List all folders
    List,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show the current settings
    Show,
    /// Set the webhook URL
    SetWebhook {
        /// Google Apps Script (or any HTTP) endpoint
        url: String,
    },
    /// Clear the webhook URL (local-only mode)
    ClearWebhook,
}

impl TaskFields {
    fn into_draft(self, service: &TaskService, title: Option<String>) -> Result<TaskDraft> {
        let folder_id = match self.folder {
            Some(query) => Some(
                service
                    .store()
                    .find_folder(&query)?
                    .map(|f| f.folder_id)
                    .ok_or_else(|| anyhow!("Folder not found: {}", query))?,
            ),
            None => None,
        };

        Ok(TaskDraft {
            task_id: None,
            title,
            description: self.description.map(Some),
            status: self.status,
            priority: self.priority,
            tags: if self.tags.is_empty() {
                None
            } else {
                Some(self.tags)
            },
            folder_id,
            scheduled_for: self.scheduled.map(Some),
        })
    }
}

fn resolve_view(service: &TaskService, view: &str) -> Result<ActiveView> {
    match view.parse::<ActiveView>() {
        Ok(ActiveView::Folder(query)) => service
            .store()
            .find_folder(&query)?
            .map(|f| ActiveView::Folder(f.folder_id))
            .ok_or_else(|| anyhow!("Folder not found: {}", query)),
        Ok(view) => Ok(view),
        Err(never) => match never {},
    }
}

fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,intellitask={}", config.logging.level))
    });
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config_path = Config::resolve_path(&cli.config);
    let mut config = Config::load(&cli.config)?;
    init_tracing(&config);

    // Initialize store and service
    let store = TaskStore::open(&config.database_path())?;
    let client = WebhookClient::new(config.webhook_timeout())?;
    let mut service = TaskService::new(store, Box::new(client), config.webhook_url());

    let outcome = run(&mut service, &mut config, &config_path, cli.command).await;

    if !cli.quiet {
        print_log(service.log());
    }
    outcome
}

async fn run(
    service: &mut TaskService,
    config: &mut Config,
    config_path: &Path,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Add {
            title,
            fields,
            view,
        } => {
            let view = resolve_view(service, &view)?;
            service.set_active_view(view);
            let minutes = fields.minutes;
            let draft = fields.into_draft(service, Some(title))?;
            task::add(service, draft, minutes).await?;
        }
        Commands::Update {
            task: task_query,
            title,
            fields,
            clear_description,
            clear_schedule,
        } => {
            let minutes = fields.minutes;
            let mut draft = fields.into_draft(service, title)?;
            if clear_description {
                draft.description = Some(None);
            }
            if clear_schedule {
                draft.scheduled_for = Some(None);
            }
            task::update(service, &task_query, draft, minutes).await?;
        }
        Commands::Delete { task: task_query } => {
            task::delete(service, &task_query)?;
        }
        Commands::List { view, tag } => {
            let view = resolve_view(service, &view)?;
            service.set_active_view(view);
            list::run(service, tag)?;
        }
        Commands::Board { view, tag } => {
            let view = resolve_view(service, &view)?;
            service.set_active_view(view);
            list::board(service, tag)?;
        }
        Commands::Today { tag } => {
            service.set_active_view(ActiveView::Today);
            list::today(service, tag)?;
        }
        Commands::Folder { command } => match command {
            FolderCommands::Add { name } => {
                folder::add(service, name).await?;
            }
            FolderCommands::List => {
                folder::list(service)?;
            }
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show => {
                settings::show(config, config_path)?;
            }
            SettingsCommands::SetWebhook { url } => {
                settings::set_webhook(config, config_path, url)?;
                service.set_webhook_url(config.webhook_url());
            }
            SettingsCommands::ClearWebhook => {
                settings::clear_webhook(config, config_path)?;
                service.set_webhook_url(None);
            }
        },
    }

    Ok(())
}
