use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use recfolders::api::{visible_folders, FolderApi, HttpFolderApi};
use recfolders::config::Config;
use recfolders::dispatcher::{DispatchEvent, Intent, MutationDispatcher};
use recfolders::error::FolderError;
use recfolders::expand_state::ExpansionState;
use recfolders::folder::{FolderId, FolderNode};
use recfolders::i18n::Messages;
use recfolders::logging;
use recfolders::render_tree::{build_render_view, RenderView, Selection};
use recfolders::tree::FolderTree;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "recfolders", version, about = "Manage recording folders")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the folder tree
    Tree {
        /// Print nested JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },
    /// Create a folder
    Create {
        name: String,
        #[arg(long)]
        parent: Option<FolderId>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Rename a folder
    Rename { id: FolderId, name: String },
    /// Delete a folder; its recordings move to the parent folder
    Delete {
        id: FolderId,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_stderr()?;
    cli.config.validate()?;

    let messages = Messages::for_locale(cli.config.locale);
    let api = Arc::new(HttpFolderApi::from_config(&cli.config)?);
    // Mutation plus the follow-up reload, each bounded by the request timeout.
    let wait = Duration::from_secs(cli.config.timeout_secs.saturating_mul(2).saturating_add(1));

    match cli.command {
        Command::Tree { json } => {
            let folders = visible_folders(api.list_folders().context("listing folders")?);
            print_tree(&folders, json, messages)?;
        }
        Command::Create {
            name,
            parent,
            color,
            icon,
        } => {
            let intent = Intent::Create {
                parent_id: parent,
                name,
                color,
                icon,
            };
            run_mutation(api, intent, messages, wait)?;
        }
        Command::Rename { id, name } => {
            run_mutation(api, Intent::Rename { id, name }, messages, wait)?;
        }
        Command::Delete { id, yes } => {
            if !yes {
                let folders = visible_folders(api.list_folders().context("listing folders")?);
                let folder = folders
                    .iter()
                    .find(|f| f.id == id)
                    .ok_or(FolderError::NotFound { id })?;
                if !confirm(&messages.delete_confirmation(&folder.name))? {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            run_mutation(api, Intent::Delete { id }, messages, wait)?;
        }
    }

    Ok(())
}

fn run_mutation(
    api: Arc<HttpFolderApi>,
    intent: Intent,
    messages: &Messages,
    wait: Duration,
) -> anyhow::Result<()> {
    let dispatcher = MutationDispatcher::new(api);
    dispatcher.dispatch(intent)?;

    loop {
        match dispatcher.next_timeout(wait) {
            Some(DispatchEvent::Mutated { intent, result, .. }) => {
                result.with_context(|| format!("{:?} failed", intent.kind()))?;
                eprintln!("{}", success_message(&intent, messages));
            }
            Some(DispatchEvent::Loaded { result, .. }) => {
                let folders = result.context("reloading folders")?;
                return print_tree(&folders, false, messages);
            }
            None => bail!("timed out waiting for the server"),
        }
    }
}

fn success_message(intent: &Intent, messages: &Messages) -> &'static str {
    match intent {
        Intent::Create { .. } => messages.folder_created,
        Intent::Rename { .. } => messages.folder_renamed,
        Intent::Delete { .. } => messages.folder_deleted,
    }
}

fn print_tree(folders: &[FolderNode], json: bool, messages: &Messages) -> anyhow::Result<()> {
    let tree = FolderTree::build(folders);
    if json {
        println!("{}", serde_json::to_string_pretty(&tree.to_branches())?);
        return Ok(());
    }

    match build_render_view(&tree, &ExpansionState::default(), &Selection::default()) {
        RenderView::Empty => println!("{}", messages.no_folders),
        RenderView::Rows(rows) => {
            for row in rows {
                println!("{:>6}  {}", row.id, row.to_line());
            }
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{} [y/N] ", prompt)?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| anyhow!("reading confirmation: {}", e))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
