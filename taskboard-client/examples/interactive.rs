use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use taskboard_client::{
    connectivity_channel, ClientConfig, ClientError, ClientEvent, SyncController,
};
use taskboard_core::{Connectivity, Priority, Task};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Interactive local-first task board", long_about = None)]
struct Cli {
    /// Remote task API base address
    #[arg(short, long, default_value = "http://localhost:5000/api")]
    api_url: String,

    /// Database file name (will auto-create in databases/ directory)
    #[arg(short, long, default_value = "taskboard")]
    database: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (only show warnings and errors)
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let cli = Cli::parse();

    std::fs::create_dir_all("databases")?;
    let db_file = format!("databases/{}.sqlite3", cli.database);
    let db_url = format!("sqlite:{}?mode=rwc", db_file);

    println!("{}", "📌 Taskboard".bold().cyan());
    println!("{}", "============".cyan());
    println!("📁 Database: {}", db_file.green());
    println!("🌐 Server: {}", cli.api_url.blue());
    println!();

    // The notifier stands in for the platform's network-change events;
    // here the user toggles it by hand.
    let (notifier, connectivity_rx) = connectivity_channel();

    println!("⏳ Loading tasks...");
    let controller = SyncController::new(
        ClientConfig::new(&cli.api_url).with_database_url(&db_url),
        connectivity_rx,
    )
    .await?;

    if controller.connectivity() == Connectivity::Offline {
        println!(
            "{}",
            "⚠️  Offline - changes are saved locally and replaced by the server's view on reconnect"
                .yellow()
        );
    }

    controller.events().subscribe(|event| match event {
        ClientEvent::ConnectivityChanged(Connectivity::Online) => {
            println!("{}", "🔗 Back online - server state adopted".green());
        }
        ClientEvent::ConnectivityChanged(Connectivity::Offline) => {
            println!("{}", "🔗 Connection lost - working from local state".yellow());
        }
        ClientEvent::RefreshFailed(reason) => {
            println!("{} {}", "⚠️  Refresh failed:".yellow(), reason.yellow());
        }
        _ => {}
    });

    loop {
        println!();
        print_board(&controller);

        let connectivity_label = match controller.connectivity() {
            Connectivity::Online => "🔌 Go offline",
            Connectivity::Offline => "🔌 Go online",
        };
        let choices = vec![
            "➕ Add task",
            "✏️  Edit task",
            "🔀 Change priority",
            "🗑️  Delete task",
            "🔄 Refresh from server",
            connectivity_label,
            "❌ Exit",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()?;

        let outcome = match selection {
            0 => add_task(&controller).await,
            1 => edit_task(&controller).await,
            2 => change_priority(&controller).await,
            3 => delete_task(&controller).await,
            4 => {
                controller.refresh().await;
                Ok(())
            }
            5 => {
                match controller.connectivity() {
                    Connectivity::Online => notifier.notify_unreachable(),
                    Connectivity::Offline => notifier.notify_reachable(),
                }
                Ok(())
            }
            6 => {
                if Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Are you sure you want to exit?")
                    .default(false)
                    .interact()?
                {
                    controller.shutdown();
                    println!("👋 Goodbye!");
                    break;
                }
                Ok(())
            }
            _ => unreachable!(),
        };

        if let Err(e) = outcome {
            println!("{} {}", "⚠️".yellow(), e.to_string().yellow());
        }
    }

    Ok(())
}

fn print_board(controller: &SyncController) {
    let status = match controller.connectivity() {
        Connectivity::Online => "online".green(),
        Connectivity::Offline => "offline".yellow(),
    };
    println!("Status: {status}");

    for priority in Priority::ALL {
        let bucket = controller.tasks_by_priority(priority);
        let header = format!("── {priority} ({}) ──", bucket.len());
        println!("{}", header.bold());
        for task in bucket {
            let marker = if task.id.is_local() {
                "● (local)".yellow()
            } else {
                "●".green()
            };
            println!("  {marker} {}", task.text);
        }
    }
}

async fn add_task(controller: &SyncController) -> Result<(), ClientError> {
    let text: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Task")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();

    let priority = pick_priority("Priority", 0);

    controller.set_pending_text(text);
    controller.set_pending_priority(priority);
    match controller.submit_task().await? {
        Some(id) => println!("✅ Created {}", id.to_string().green()),
        None => println!("{}", "Nothing to add".dimmed()),
    }
    Ok(())
}

async fn edit_task(controller: &SyncController) -> Result<(), ClientError> {
    let Some(task) = pick_task(controller, "Select task to edit") else {
        return Ok(());
    };

    let new_text: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("New text")
        .with_initial_text(task.text.clone())
        .interact_text()
        .unwrap_or(task.text.clone());

    controller.select_task(&task.id)?;
    controller.edit_selected(new_text).await
}

async fn change_priority(controller: &SyncController) -> Result<(), ClientError> {
    let Some(task) = pick_task(controller, "Select task to reprioritize") else {
        return Ok(());
    };

    let default = Priority::ALL
        .iter()
        .position(|p| *p == task.priority)
        .unwrap_or(0);
    let priority = pick_priority("New priority", default);

    controller.select_task(&task.id)?;
    controller.reprioritize_selected(&priority.to_string()).await
}

async fn delete_task(controller: &SyncController) -> Result<(), ClientError> {
    let Some(task) = pick_task(controller, "Select task to delete") else {
        return Ok(());
    };

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Delete \"{}\"?", task.text))
        .default(false)
        .interact()
        .unwrap_or(false);
    if !confirmed {
        return Ok(());
    }

    controller.select_task(&task.id)?;
    controller.delete_selected().await
}

fn pick_priority(prompt: &str, default: usize) -> Priority {
    let labels: Vec<String> = Priority::ALL.iter().map(|p| p.to_string()).collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()
        .unwrap_or(default);
    Priority::ALL[index]
}

fn pick_task(controller: &SyncController, prompt: &str) -> Option<Task> {
    let tasks = controller.tasks();
    if tasks.is_empty() {
        println!("{}", "No tasks yet".dimmed());
        return None;
    }

    let labels: Vec<String> = tasks
        .iter()
        .map(|t| format!("[{}] {}", t.priority, t.text))
        .collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .ok()?;
    tasks.into_iter().nth(index)
}
