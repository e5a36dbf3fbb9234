//! # signup-rs Registration Demo
//!
//! Fills the registration form from a JSON draft and an avatar file, submits
//! it, and prints either the registered record or the errors shown on the
//! form.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package registration-demo -- \
//!     --draft draft.json --avatar me.png --settings signup.toml
//! ```
//!
//! A draft looks like:
//!
//! ```json
//! {
//!   "name": "grace hopper",
//!   "email": "grace@github.com",
//!   "password": "cobol!",
//!   "techs": [{"title": "COBOL", "knowledge": 100}, {"title": "Fortran", "knowledge": "60"}]
//! }
//! ```
//!
//! Exit codes: 0 on success, 1 when validation fails, 2 when the upload fails.

mod draft;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use signup::core::logging::setup_logging;
use signup::core::settings_loader;
use signup::core::SignupError;
use signup::forms::schema::{AVATAR, TECHS};
use signup::forms::{FormState, SubmissionHandler};
use signup::storage::UploadedFile;

/// Submit a registration from the command line.
#[derive(Debug, Parser)]
#[command(name = "registration", version, about)]
struct Args {
    /// JSON draft with name, email, password and techs.
    #[arg(long)]
    draft: PathBuf,

    /// Avatar file to attach.
    #[arg(long)]
    avatar: Option<PathBuf>,

    /// MIME type of the avatar; guessed from the extension when omitted.
    #[arg(long)]
    content_type: Option<String>,

    /// Settings file (TOML, or JSON by extension). SIGNUP_* variables apply on top.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Remove the technology at this position before submitting. Repeatable.
    #[arg(long = "remove-tech")]
    remove_tech: Vec<usize>,
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

async fn read_avatar(path: &Path, content_type: Option<&str>) -> anyhow::Result<UploadedFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading avatar {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("avatar path {} has no file name", path.display()))?;
    let content_type = content_type.unwrap_or_else(|| guess_content_type(path));
    Ok(UploadedFile::new(name, content_type, bytes))
}

fn print_form_errors(form: &FormState) {
    for message in form.non_field_errors() {
        eprintln!("error: {message}");
    }
    for (path, message) in form.errors() {
        eprintln!("{path}: {message}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => settings_loader::from_file_with_env(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => settings_loader::from_env(),
    };
    setup_logging(&settings);
    tracing::info!(
        backend = ?settings.storage.backend,
        bucket = %settings.storage.bucket,
        "registration demo configured"
    );

    let draft_text = tokio::fs::read_to_string(&args.draft)
        .await
        .with_context(|| format!("reading draft {}", args.draft.display()))?;
    let draft: serde_json::Value = serde_json::from_str(&draft_text).context("parsing draft")?;

    let mut form = FormState::registration();
    draft::fill(&mut form, draft)?;

    if let Some(path) = &args.avatar {
        let file = read_avatar(path, args.content_type.as_deref()).await?;
        form.set_field(AVATAR, file)?;
    }

    let mut removals = args.remove_tech.clone();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    if let Some(techs) = form.array_mut(TECHS) {
        for index in removals {
            if techs.remove_at(index).is_none() {
                tracing::warn!(index, "no technology at this position");
            }
        }
    }

    let handler = SubmissionHandler::from_settings(&settings);
    match handler.submit(&mut form).await {
        Ok(submission) => {
            tracing::info!(id = %submission.id, key = %submission.key, "avatar stored");
            println!("{}", submission.output);
            Ok(ExitCode::SUCCESS)
        }
        Err(SignupError::Validation(_)) => {
            print_form_errors(&form);
            Ok(ExitCode::from(1))
        }
        Err(SignupError::Upload(_)) => {
            print_form_errors(&form);
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}
