//! Command handlers for the docvault CLI.
//!
//! Each handler maps one subcommand onto the API modules and prints the
//! result. Everything except login, register, lang, `share url` and
//! `share open` requires a stored session.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::documents::{self, NewDocument, PdfFile};
use crate::api::types::{Document, Folder};
use crate::api::{auth, folders, search, share, ApiError, UploadProgress};
use crate::routes::Route;
use crate::session::Lang;
use crate::state::AppState;
use crate::tree;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Sign in. The password is read from stdin when not given.
pub async fn login(state: &AppState, email: &str, password: Option<String>) -> Result<(), ApiError> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ").await?,
    };

    let login = auth::signin(&state.api, email, &password).await?;
    let name = login
        .user
        .as_ref()
        .and_then(|u| u.name.clone().or_else(|| u.email.clone()))
        .unwrap_or_else(|| email.trim().to_string());
    println!("Signed in as {}", name);
    state.api.navigator().replace(Route::home());
    Ok(())
}

pub async fn register(
    state: &AppState,
    name: Option<String>,
    email: String,
    password: Option<String>,
    confirm_password: Option<String>,
) -> Result<(), ApiError> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ").await?,
    };

    let registration = auth::Registration {
        name,
        email,
        password,
        confirm_password,
    };
    auth::signup(&state.api, &registration).await?;
    println!("Account created for {}", registration.display_name());
    state.api.navigator().replace(Route::Login);
    Ok(())
}

pub fn logout(state: &AppState) {
    auth::logout(&state.api);
    println!("Signed out");
}

pub fn whoami(state: &AppState) -> Result<(), ApiError> {
    state.require_session()?;
    match state.session().user()? {
        Some(user) => {
            let name = user.name.as_deref().unwrap_or("(no name)");
            match user.email.as_deref() {
                Some(email) => println!("{} <{}>", name, email),
                None => println!("{}", name),
            }
        }
        None => println!("Signed in"),
    }
    println!("API: {}", state.config.api_url);
    Ok(())
}

/// Show the language, or switch to `lang` when given.
pub fn lang(state: &AppState, lang: Option<Lang>) -> Result<(), ApiError> {
    match lang {
        Some(lang) => {
            state.session().set_lang(lang)?;
            println!("Language set to {} ({})", lang, lang.dir());
        }
        None => {
            let lang = state.session().lang();
            println!("{} ({})", lang, lang.dir());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

/// Show a folder page: breadcrumb, subfolders and documents.
pub async fn folders_ls(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.require_session()?;
    let view = folders::open(&state.api, id).await?;

    if view.id == tree::ROOT_ID {
        println!("/");
    } else {
        println!("{} (up: {})", view.name, view.parent_id);
    }
    print_folders(&view.folders);
    if view.id != tree::ROOT_ID {
        print_documents(&view.documents);
    }
    Ok(())
}

pub async fn folders_tree(state: &AppState) -> Result<(), ApiError> {
    state.require_session()?;
    let nodes = folders::tree(&state.api).await?;
    if nodes.is_empty() {
        println!("No folders");
    } else {
        print!("{}", tree::render(&nodes));
    }
    Ok(())
}

/// Breadcrumb from the top level down to `id`.
pub async fn folders_path(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.require_session()?;
    let nodes = folders::tree(&state.api).await?;
    let trail = tree::path_to(&nodes, id);
    if trail.is_empty() {
        return Err(ApiError::Invalid(format!("Folder {} not found", id)));
    }
    let names: Vec<&str> = trail.iter().map(|node| node.name.as_str()).collect();
    println!("/{}", names.join("/"));
    Ok(())
}

pub async fn folders_mkdir(state: &AppState, name: &str, parent: Option<&str>) -> Result<(), ApiError> {
    state.require_session()?;
    let folder = folders::create(&state.api, name, parent).await?;
    println!("Created {} ({})", folder.name, folder.id);
    Ok(())
}

pub async fn folders_rename(state: &AppState, id: &str, name: &str) -> Result<(), ApiError> {
    state.require_session()?;
    let folder = folders::rename(&state.api, id, name).await?;
    println!("Renamed to {}", folder.name);
    Ok(())
}

pub async fn folders_rm(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.require_session()?;
    if folders::remove(&state.api, id).await? {
        println!("Deleted {}", id);
        Ok(())
    } else {
        Err(ApiError::Invalid(format!("Folder {} was not deleted", id)))
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub async fn docs_show(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.require_session()?;
    let doc = documents::detail(&state.api, id).await?;
    let versions = documents::list_versions(&state.api, id).await?;

    println!("{} ({})", doc.title, doc.id);
    if let Some(description) = doc.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {}", description);
    }
    if !doc.tags.is_empty() {
        println!("  tags: {}", doc.tags.join(", "));
    }
    if let Some(size) = doc.size {
        println!("  size: {}", documents::format_bytes(size));
    }
    println!("Versions:");
    for version in &versions {
        println!(
            "  v{}  {}  {}  {}",
            version.version_number,
            version.id,
            version.size.map(documents::format_bytes).unwrap_or_default(),
            version.created_at.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

/// Update metadata. Fields not given keep their current value.
pub async fn docs_edit(
    state: &AppState,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    tags: Option<String>,
) -> Result<(), ApiError> {
    state.require_session()?;
    let current = documents::detail(&state.api, id).await?;

    let title = title.unwrap_or(current.title);
    let description = description.or(current.description).unwrap_or_default();
    let tags = match tags {
        Some(raw) => documents::parse_tags(&raw),
        None => current.tags,
    };

    let doc = documents::update_meta(&state.api, id, title.trim(), description.trim(), tags).await?;
    println!("Updated {} ({})", doc.title, doc.id);
    Ok(())
}

pub async fn docs_upload(
    state: &AppState,
    file: &Path,
    folder_id: &str,
    title: Option<String>,
    description: Option<String>,
    tags: Option<String>,
) -> Result<(), ApiError> {
    state.require_session()?;
    let file = PdfFile::read(file).await?;
    println!("Uploading {} ({})", file.file_name, documents::format_bytes(file.len() as u64));

    let document = NewDocument {
        folder_id: folder_id.to_string(),
        title,
        description,
        tags: tags.as_deref().map(documents::parse_tags).unwrap_or_default(),
        file,
    };
    let result = documents::upload(&state.api, &document, Some(progress_bar())).await;
    eprintln!();

    let uploaded = result?;
    println!("Uploaded {} ({})", uploaded.document.title, uploaded.document.id);
    state.api.navigator().replace(Route::Document(uploaded.document.id));
    Ok(())
}

pub async fn docs_download(state: &AppState, id: &str, out: Option<PathBuf>) -> Result<(), ApiError> {
    state.require_session()?;
    let out = match out {
        Some(out) => out,
        None => {
            let doc = documents::detail(&state.api, id).await?;
            PathBuf::from(documents::download_file_name(Some(&doc.title)))
        }
    };
    let bytes = documents::download_latest(&state.api, id).await?;
    save(&out, &bytes).await
}

pub async fn docs_versions(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.require_session()?;
    let versions = documents::list_versions(&state.api, id).await?;
    if versions.is_empty() {
        println!("No versions");
    }
    for version in versions {
        println!(
            "v{}  {}  {}",
            version.version_number,
            version.id,
            version.created_at.unwrap_or_default()
        );
    }
    Ok(())
}

pub async fn docs_add_version(state: &AppState, id: &str, file: &Path) -> Result<(), ApiError> {
    state.require_session()?;
    let file = PdfFile::read(file).await?;
    let result = documents::add_version(&state.api, id, &file, Some(progress_bar())).await;
    eprintln!();

    let version = result?;
    println!("Added version {} ({})", version.version_number, version.id);
    Ok(())
}

pub async fn docs_download_version(
    state: &AppState,
    id: &str,
    version_id: &str,
    out: Option<PathBuf>,
) -> Result<(), ApiError> {
    state.require_session()?;
    let out = match out {
        Some(out) => out,
        None => {
            let doc = documents::detail(&state.api, id).await?;
            PathBuf::from(documents::version_file_name(Some(&doc.title), version_id))
        }
    };
    let bytes = documents::download_version(&state.api, version_id).await?;
    save(&out, &bytes).await
}

// ---------------------------------------------------------------------------
// Share & search
// ---------------------------------------------------------------------------

pub async fn share_create(state: &AppState, id: &str, hours: u32) -> Result<(), ApiError> {
    state.require_session()?;
    let link = share::create(&state.api, id, hours).await?;
    let url = link
        .url
        .clone()
        .unwrap_or_else(|| share::public_url(state.api.base_url(), &link.token));
    println!("{}", url);
    if let Some(expires_at) = link.expires_at.as_deref() {
        println!("Expires {}", expires_at);
    }
    state.api.navigator().replace(Route::PublicPreview(link.token));
    Ok(())
}

pub fn share_url(state: &AppState, token: &str) {
    println!("{}", share::public_url(state.api.base_url(), token));
}

/// Download a shared document. Works signed out.
pub async fn share_open(state: &AppState, token: &str, out: Option<PathBuf>) -> Result<(), ApiError> {
    let bytes = share::fetch_public(&state.api, token).await?;
    let out = out.unwrap_or_else(|| PathBuf::from(documents::download_file_name(None)));
    save(&out, &bytes).await
}

pub async fn search(state: &AppState, query: &str) -> Result<(), ApiError> {
    state.require_session()?;
    let results = search::search(&state.api, query).await?;
    if results.documents.is_empty() && results.folders.is_empty() {
        println!("No results for \"{}\"", query.trim());
        return Ok(());
    }
    print_folders(&results.folders);
    print_documents(&results.documents);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_folders(folders: &[Folder]) {
    for folder in folders {
        println!("  [dir] {}  ({})", folder.name, folder.id);
    }
}

fn print_documents(docs: &[Document]) {
    for doc in docs {
        let size = doc.size.map(documents::format_bytes).unwrap_or_default();
        let tags = if doc.tags.is_empty() {
            String::new()
        } else {
            format!("  #{}", doc.tags.join(" #"))
        };
        println!("  [pdf] {}  ({})  {}{}", doc.title, doc.id, size, tags);
    }
}

fn progress_bar() -> UploadProgress {
    UploadProgress::new(|pct| eprint!("\rUploading... {:>3}%", pct))
}

async fn save(path: &Path, bytes: &[u8]) -> Result<(), ApiError> {
    tokio::fs::write(path, bytes).await?;
    println!(
        "Saved {} ({})",
        path.display(),
        documents::format_bytes(bytes.len() as u64)
    );
    Ok(())
}

async fn prompt(label: &str) -> Result<String, ApiError> {
    eprint!("{}", label);
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
