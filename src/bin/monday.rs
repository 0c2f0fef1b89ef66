//! `monday` - command-line access to the monday.com GraphQL API.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use monday_cli::{
    BoardFilter, BoardState, ConfigError, DocContent, MondayClient, MondayError, Settings,
    WorkspaceFilter, WorkspaceMembership,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "monday")]
#[command(about = "CLI tool to interact with the monday.com API")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// API token
    #[arg(long, global = true, env = "MONDAY_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API endpoint URL
    #[arg(long, global = true, env = "MONDAY_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a raw GraphQL query or mutation
    Query {
        /// GraphQL document
        query: String,
        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,
    },

    /// Show the remaining complexity budget
    Complexity,

    /// Manage items
    Items {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Manage subitems
    Subitems {
        #[command(subcommand)]
        command: SubitemCommands,
    },

    /// Manage updates
    Updates {
        #[command(subcommand)]
        command: UpdateCommands,
    },

    /// Manage boards
    Boards {
        #[command(subcommand)]
        command: BoardCommands,
    },

    /// Manage groups
    Groups {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Manage workspaces
    Workspaces {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },

    /// Read docs stored in doc columns
    Docs {
        #[command(subcommand)]
        command: DocCommands,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Get all information for an item
    Get { item_id: u64 },

    /// Create an item on a board
    Create {
        board_id: u64,
        item_name: String,
        /// Group ID
        #[arg(short, long)]
        group_id: Option<String>,
        /// Column values as JSON (e.g. '{"status":{"index":1}}')
        #[arg(short, long)]
        column_values: Option<String>,
    },

    /// List all columns of the item's board
    ListColumns { item_id: u64 },

    /// List status columns and their labels for the item's board
    ListStatuses { item_id: u64 },

    /// Set a status column by label
    UpdateStatus {
        item_id: u64,
        column_id: String,
        status_label: String,
    },
}

#[derive(Subcommand)]
enum SubitemCommands {
    /// Create a subitem under a parent item
    Create {
        parent_item_id: u64,
        item_name: String,
        /// Column values as JSON
        #[arg(short, long)]
        column_values: Option<String>,
    },

    /// List the subitems of a parent item
    List { parent_item_id: u64 },

    /// List all columns of the subitem board
    ListColumns { subitem_id: u64 },

    /// List status columns and their labels for the subitem board
    ListStatuses { subitem_id: u64 },

    /// Set a subitem status column by label
    UpdateStatus {
        subitem_id: u64,
        column_id: String,
        status_label: String,
    },
}

#[derive(Subcommand)]
enum UpdateCommands {
    /// Post an update on an item or subitem
    Create { item_id: u64, body: String },
}

#[derive(Subcommand)]
enum BoardCommands {
    /// List boards
    List {
        /// Boards per page (max 100)
        #[arg(short, long, default_value = "25")]
        limit: u32,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Board state: active, archived, deleted, all
        #[arg(short, long, default_value = "active")]
        state: BoardState,
        /// Filter by workspace ID
        #[arg(long)]
        workspace_id: Vec<u64>,
    },

    /// List a board's items, following pagination
    Items {
        board_id: u64,
        /// Items per page
        #[arg(short, long, default_value = "100")]
        limit: u32,
        /// Stop after this many items
        #[arg(short, long)]
        max: Option<usize>,
    },
}

#[derive(Subcommand)]
enum GroupCommands {
    /// List the groups of a board
    List {
        #[arg(short, long)]
        board_id: u64,
    },
}

#[derive(Subcommand)]
enum WorkspaceCommands {
    /// List workspaces available to you
    List {
        /// Number of workspaces to return
        #[arg(short, long, default_value = "100")]
        limit: u32,
        /// Membership filter: all, member
        #[arg(short, long, default_value = "all")]
        membership_kind: WorkspaceMembership,
        /// Filter by workspace ID
        #[arg(short, long)]
        workspace_id: Vec<u64>,
    },
}

#[derive(Subcommand)]
enum DocCommands {
    /// Print a doc as Markdown
    Get {
        /// Item containing the doc column
        #[arg(short, long)]
        item_id: u64,
        /// Title of the doc column
        #[arg(short = 'n', long)]
        column_name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "monday_cli=debug"
    } else if cli.verbose {
        "monday_cli=info"
    } else {
        "monday_cli=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_lookup(|key| match key {
        "MONDAY_API_TOKEN" => cli.token.clone(),
        "MONDAY_API_URL" => cli.api_url.clone(),
        other => std::env::var(other).ok(),
    })?;
    let client = MondayClient::from_settings(&settings);

    match cli.command {
        Commands::Query { query, variables } => {
            let variables = variables.as_deref().map(parse_json).transpose()?;
            let data = client.execute(&query, variables.as_ref()).await?;
            print_json(&data)
        }
        Commands::Complexity => print_json(&client.complexity().await?),
        Commands::Items { command } => run_items(&client, command).await,
        Commands::Subitems { command } => run_subitems(&client, command).await,
        Commands::Updates {
            command: UpdateCommands::Create { item_id, body },
        } => print_json(&client.create_update(item_id, &body).await?),
        Commands::Boards { command } => run_boards(&client, command).await,
        Commands::Groups {
            command: GroupCommands::List { board_id },
        } => {
            let groups = client.board_groups(board_id).await?;
            print_json(&serde_json::json!({
                "board_id": board_id.to_string(),
                "total_groups": groups.len(),
                "groups": groups,
            }))
        }
        Commands::Workspaces {
            command:
                WorkspaceCommands::List {
                    limit,
                    membership_kind,
                    workspace_id,
                },
        } => {
            let filter = WorkspaceFilter {
                limit,
                ids: workspace_id,
                membership: membership_kind,
            };
            let workspaces = client.list_workspaces(&filter).await?;
            print_json(&serde_json::json!({
                "total_returned": workspaces.len(),
                "workspaces": workspaces,
            }))
        }
        Commands::Docs {
            command:
                DocCommands::Get {
                    item_id,
                    column_name,
                },
        } => match client.export_doc(item_id, &column_name).await? {
            DocContent::Markdown(markdown) => {
                println!("{markdown}");
                Ok(())
            }
            DocContent::Blocks(doc) => print_json(&doc),
        },
    }
}

async fn run_items(client: &MondayClient, command: ItemCommands) -> anyhow::Result<()> {
    match command {
        ItemCommands::Get { item_id } => print_json(&client.get_item(item_id).await?),
        ItemCommands::Create {
            board_id,
            item_name,
            group_id,
            column_values,
        } => {
            let column_values = column_values.as_deref().map(parse_json).transpose()?;
            let created = client
                .create_item(
                    board_id,
                    &item_name,
                    group_id.as_deref(),
                    column_values.as_ref(),
                )
                .await?;
            print_json(&created)
        }
        ItemCommands::ListColumns { item_id } => print_columns(client, item_id, "item_id").await,
        ItemCommands::ListStatuses { item_id } => {
            print_statuses(client, item_id, "item_id").await
        }
        ItemCommands::UpdateStatus {
            item_id,
            column_id,
            status_label,
        } => print_json(
            &client
                .update_status(item_id, &column_id, &status_label)
                .await?,
        ),
    }
}

async fn run_subitems(client: &MondayClient, command: SubitemCommands) -> anyhow::Result<()> {
    match command {
        SubitemCommands::Create {
            parent_item_id,
            item_name,
            column_values,
        } => {
            let column_values = column_values.as_deref().map(parse_json).transpose()?;
            let created = client
                .create_subitem(parent_item_id, &item_name, column_values.as_ref())
                .await?;
            print_json(&created)
        }
        SubitemCommands::List { parent_item_id } => {
            let subitems = client.item_subitems(parent_item_id).await?;
            print_json(&serde_json::json!({
                "parent_item_id": parent_item_id.to_string(),
                "total_subitems": subitems.len(),
                "subitems": subitems,
            }))
        }
        SubitemCommands::ListColumns { subitem_id } => {
            print_columns(client, subitem_id, "subitem_id").await
        }
        SubitemCommands::ListStatuses { subitem_id } => {
            print_statuses(client, subitem_id, "subitem_id").await
        }
        SubitemCommands::UpdateStatus {
            subitem_id,
            column_id,
            status_label,
        } => print_json(
            &client
                .update_status(subitem_id, &column_id, &status_label)
                .await?,
        ),
    }
}

async fn print_columns(client: &MondayClient, item_id: u64, id_key: &str) -> anyhow::Result<()> {
    let board = client.item_board(item_id).await?;
    let columns = client.board_column_summaries(board.board_id).await?;
    print_json(&serde_json::json!({
        "board_id": board.board_id.to_string(),
        "board_name": board.board_name,
        id_key: item_id.to_string(),
        "columns": columns,
    }))
}

async fn print_statuses(client: &MondayClient, item_id: u64, id_key: &str) -> anyhow::Result<()> {
    let board = client.item_board(item_id).await?;
    let columns = client.board_status_columns(board.board_id).await?;
    print_json(&serde_json::json!({
        "board_id": board.board_id.to_string(),
        "board_name": board.board_name,
        id_key: item_id.to_string(),
        "status_columns": columns,
    }))
}

async fn run_boards(client: &MondayClient, command: BoardCommands) -> anyhow::Result<()> {
    match command {
        BoardCommands::List {
            limit,
            page,
            state,
            workspace_id,
        } => {
            let filter = BoardFilter {
                limit,
                page,
                state,
                workspace_ids: workspace_id,
            };
            let boards = client.list_boards(&filter).await?;
            print_json(&serde_json::json!({
                "total_returned": boards.len(),
                "page": page,
                "limit": limit,
                "boards": boards,
            }))
        }
        BoardCommands::Items {
            board_id,
            limit,
            max,
        } => print_json(&client.board_items(board_id, limit, max).await?),
    }
}

fn parse_json(text: &str) -> Result<Value, MondayError> {
    serde_json::from_str(text)
        .map_err(|err| MondayError::Validation(format!("invalid JSON argument: {err}")))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_error(err: &anyhow::Error) -> String {
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return match config {
            ConfigError::Missing(name) | ConfigError::Empty(name) => {
                format!("Error: {config}. Set {name} or pass the matching option.")
            }
            ConfigError::Invalid { name, .. } => {
                format!("Error: {config}. Fix or unset {name}.")
            }
        };
    }
    match err.downcast_ref::<MondayError>() {
        Some(MondayError::Authentication) => {
            "Error: Invalid API token. Set MONDAY_API_TOKEN environment variable.".to_owned()
        }
        Some(err @ MondayError::RateLimited { .. }) => format!("Error: {err}"),
        Some(MondayError::Complexity(message)) => format!(
            "Error: query complexity too high, narrow the query and try again: {message}"
        ),
        Some(MondayError::Network(message)) => format!("Network error: {message}"),
        Some(MondayError::Api { message, .. }) => format!("API Error: {message}"),
        Some(MondayError::Validation(message)) => format!("Error: {message}"),
        None => format!("Unexpected error: {err:#}"),
    }
}
