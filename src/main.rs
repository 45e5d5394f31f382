use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use todostore::{Config, FileSlot, Filter, SystemClock, Task, TaskId, TaskStore};
use tracing::Level;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "todostore - to-do list manager with local persistence")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task slot (overrides config)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Toggle a task between active and completed
    Toggle { id: String },

    /// Delete a task
    Remove { id: String },

    /// List tasks
    List {
        #[arg(short, long, value_enum)]
        filter: Option<Filter>,
    },

    /// Show remaining and total task counts
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let store_path = cli.store_path.unwrap_or_else(|| config.store_path.clone());

    let slot = FileSlot::new(&store_path, &config.slot_name)?;
    let mut store = TaskStore::load_with(slot, config.id_scheme.generator(), SystemClock);

    match cli.command {
        Commands::Add { text } => {
            let text = text.join(" ");
            match store.add(&text)? {
                Some(id) => println!("Added task {}", id.to_string().cyan()),
                None => println!("Nothing to add: task text is empty"),
            }
        }
        Commands::Toggle { id } => {
            let id = TaskId::from(id);
            if store.toggle(&id)? {
                if let Some(task) = store.get(&id) {
                    print_task(task);
                }
            } else {
                println!("No task with id {}", id);
            }
        }
        Commands::Remove { id } => {
            let id = TaskId::from(id);
            if store.remove(&id)? {
                println!("Removed task {}", id.to_string().cyan());
            } else {
                println!("No task with id {}", id);
            }
        }
        Commands::List { filter } => {
            let filter = filter.unwrap_or(config.default_filter);
            let tasks = store.filtered_view(filter);
            if tasks.is_empty() {
                println!("{}", "No tasks found".dimmed());
            }
            for task in tasks {
                print_task(task);
            }
        }
        Commands::Stats => {
            let counts = store.counts();
            println!("{} tasks remaining", counts.remaining);
            println!("{} total tasks", counts.total);
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    if task.completed {
        println!(
            "{} {} {}",
            "[x]".green(),
            task.id.to_string().dimmed(),
            task.text.strikethrough().dimmed()
        );
    } else {
        println!("{} {} {}", "[ ]".yellow(), task.id.to_string().dimmed(), task.text);
    }
}
