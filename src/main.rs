mod api;
mod commands;
mod config;
mod routes;
mod session;
mod state;
mod tree;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use config::{Config, StoreKind};
use routes::ConsoleNavigator;
use session::Lang;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "docvault", version, about = "Command-line client for the docvault document API")]
struct Cli {
    /// API base URL (falls back to DOCVAULT_API_URL, then VITE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where to keep the session
    #[arg(long, global = true, value_enum, env = "DOCVAULT_STORE", default_value_t = StoreKind::File)]
    store: StoreKind,

    /// Session file for `--store file`
    #[arg(long, global = true, env = "DOCVAULT_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "DOCVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show or set the interface language (en, ar)
    Lang { lang: Option<Lang> },
    #[command(subcommand)]
    Folders(FolderCommand),
    #[command(subcommand)]
    Docs(DocCommand),
    #[command(subcommand)]
    Share(ShareCommand),
    /// Search documents and folders
    Search { query: String },
}

#[derive(Subcommand, Debug)]
enum FolderCommand {
    /// List a folder's subfolders and documents
    Ls {
        #[arg(default_value = tree::ROOT_ID)]
        id: String,
    },
    /// Print the whole folder tree
    Tree,
    /// Print the path from the top level to a folder
    Path { id: String },
    /// Create a folder
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    Rename { id: String, name: String },
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum DocCommand {
    /// Show metadata and versions
    Show { id: String },
    /// Edit title, description or tags
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated
        #[arg(long)]
        tags: Option<String>,
    },
    /// Upload a PDF into a folder
    Upload {
        file: PathBuf,
        #[arg(long)]
        folder: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated
        #[arg(long)]
        tags: Option<String>,
    },
    /// Download the latest version
    Download {
        id: String,
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    Versions { id: String },
    /// Upload a new version of a document
    AddVersion { id: String, file: PathBuf },
    DownloadVersion {
        id: String,
        version_id: String,
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ShareCommand {
    /// Create a public link
    Create {
        id: String,
        #[arg(long, default_value_t = api::share::DEFAULT_EXPIRY_HOURS)]
        hours: u32,
    },
    /// Print the public URL for a token
    Url { token: String },
    /// Download a shared document
    Open {
        token: String,
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env(cli.api_url.clone(), cli.store, cli.session_file.clone());
    log::debug!("API base URL: {}", config.api_url);

    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    let state = AppState::new(config, store, Arc::new(ConsoleNavigator));

    if let Err(e) = run(&state, cli.command).await {
        log::debug!("Command failed: {:?}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), api::ApiError> {
    match command {
        Command::Login { email, password } => commands::login(state, &email, password).await,
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => commands::register(state, name, email, password, confirm_password).await,
        Command::Logout => {
            commands::logout(state);
            Ok(())
        }
        Command::Whoami => commands::whoami(state),
        Command::Lang { lang } => commands::lang(state, lang),
        Command::Folders(cmd) => match cmd {
            FolderCommand::Ls { id } => commands::folders_ls(state, &id).await,
            FolderCommand::Tree => commands::folders_tree(state).await,
            FolderCommand::Path { id } => commands::folders_path(state, &id).await,
            FolderCommand::Mkdir { name, parent } => {
                commands::folders_mkdir(state, &name, parent.as_deref()).await
            }
            FolderCommand::Rename { id, name } => commands::folders_rename(state, &id, &name).await,
            FolderCommand::Rm { id } => commands::folders_rm(state, &id).await,
        },
        Command::Docs(cmd) => match cmd {
            DocCommand::Show { id } => commands::docs_show(state, &id).await,
            DocCommand::Edit {
                id,
                title,
                description,
                tags,
            } => commands::docs_edit(state, &id, title, description, tags).await,
            DocCommand::Upload {
                file,
                folder,
                title,
                description,
                tags,
            } => commands::docs_upload(state, &file, &folder, title, description, tags).await,
            DocCommand::Download { id, out } => commands::docs_download(state, &id, out).await,
            DocCommand::Versions { id } => commands::docs_versions(state, &id).await,
            DocCommand::AddVersion { id, file } => commands::docs_add_version(state, &id, &file).await,
            DocCommand::DownloadVersion { id, version_id, out } => {
                commands::docs_download_version(state, &id, &version_id, out).await
            }
        },
        Command::Share(cmd) => match cmd {
            ShareCommand::Create { id, hours } => commands::share_create(state, &id, hours).await,
            ShareCommand::Url { token } => {
                commands::share_url(state, &token);
                Ok(())
            }
            ShareCommand::Open { token, out } => commands::share_open(state, &token, out).await,
        },
        Command::Search { query } => commands::search(state, &query).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_folder_ls_defaults_to_root() {
        let cli = Cli::parse_from(["docvault", "folders", "ls"]);
        match cli.command {
            Command::Folders(FolderCommand::Ls { id }) => assert_eq!(id, "root"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_lang_value_parses() {
        let cli = Cli::parse_from(["docvault", "lang", "en"]);
        assert!(matches!(cli.command, Command::Lang { lang: Some(Lang::En) }));
    }
}
