//! Command-line front end over `spacetree_core`.
//!
//! # Responsibility
//! - Resolve database/export locations from `SpaceTreeConfig`, overridable per call.
//! - Run one export, import, duplicate or tree resolution and print its JSON result.

use clap::{Args, Parser, Subcommand};
use log::warn;
use serde_json::Value;
use spacetree_core::{
    duplicate_page, export_workspace_pages, import_workspace_pages, init_logging, open_db,
    resolve_page_tree, DuplicatePageRequest, ExportOptions, ImportWorkspacePagesRequest,
    ResolveOptions, SnapshotSource, SpaceTreeConfig, SqliteWorkspaceStore,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

/// Page tree tools for SpaceTree workspaces
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to database file (overrides SPACETREE_DB_PATH)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Snapshot directory (overrides SPACETREE_EXPORT_DIR)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every page forest of a space
    Export(ExportArgs),
    /// Import a snapshot into a space
    Import(ImportArgs),
    /// Duplicate one page
    Duplicate(DuplicateArgs),
    /// Print a page with its ancestors and subtree
    Tree(TreeArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Space id or domain
    space: String,

    /// Store the snapshot as <export-dir>/<NAME>
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Target space id or domain
    space: String,

    /// Snapshot JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "name", required_unless_present = "name")]
    file: Option<PathBuf>,

    /// Named snapshot inside the export directory
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Existing page to import under
    #[arg(long, value_name = "PAGE_ID")]
    parent: Option<Uuid>,

    /// Append " (copy)" to imported root titles
    #[arg(long)]
    update_title: bool,

    /// Keep the snapshot's grants
    #[arg(long)]
    include_permissions: bool,

    /// Regenerate every page path
    #[arg(long)]
    reset_paths: bool,
}

#[derive(Args, Debug)]
struct DuplicateArgs {
    page_id: Uuid,

    /// Acting user, owner of the copy
    #[arg(long, value_name = "USER_ID")]
    user: Uuid,

    /// Parent of the copy (default: the source page's parent)
    #[arg(long, value_name = "PAGE_ID")]
    parent: Option<Uuid>,
}

#[derive(Args, Debug)]
struct TreeArgs {
    page_id: Uuid,

    #[arg(long)]
    include_deleted: bool,

    /// Keep page content in the output
    #[arg(long)]
    full_page: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = SpaceTreeConfig::from_env();
    if let Some(logging) = config.logging() {
        if let Err(err) = init_logging(&logging) {
            eprintln!("logging disabled: {err}");
        }
    }

    let db_path = cli.database.unwrap_or_else(|| config.db_path.clone());
    let export_dir = cli.export_dir.unwrap_or_else(|| config.export_dir.clone());
    let conn = open_db(&db_path)?;
    let store = SqliteWorkspaceStore::try_new(&conn)?;

    let output = match cli.command {
        Command::Export(args) => {
            let options = ExportOptions {
                snapshot_name: args.name,
                export_dir: Some(export_dir),
            };
            serde_json::to_value(export_workspace_pages(&store, &args.space, &options)?)?
        }
        Command::Import(args) => {
            let source = match (args.file, args.name) {
                (Some(file), _) => {
                    let text = std::fs::read_to_string(&file)?;
                    SnapshotSource::Inline(serde_json::from_str::<Value>(&text)?)
                }
                (None, Some(name)) => SnapshotSource::Named(name),
                (None, None) => return Err("either --file or --name is required".into()),
            };
            let mut request = ImportWorkspacePagesRequest::new(args.space, source);
            request.export_dir = Some(export_dir);
            request.parent_id = args.parent;
            request.update_title = args.update_title;
            request.include_permissions = args.include_permissions;
            request.reset_paths = args.reset_paths;
            let result = import_workspace_pages(&store, &request)?;
            if result.total_pages == 0 {
                warn!("event=cli_import module=cli status=ok imported=0");
            }
            serde_json::to_value(result)?
        }
        Command::Duplicate(args) => {
            let request = DuplicatePageRequest {
                page_id: args.page_id,
                user_id: args.user,
                parent_id: args.parent,
            };
            serde_json::to_value(duplicate_page(&store, &request)?)?
        }
        Command::Tree(args) => {
            let options = ResolveOptions {
                include_deleted: args.include_deleted,
                full_page: args.full_page,
            };
            serde_json::to_value(resolve_page_tree(&store, args.page_id, options)?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
