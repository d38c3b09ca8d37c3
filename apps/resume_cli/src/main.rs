use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ActionOutcome, ControllerOptions, FileSessionStore, HttpResumeApi, Persistence, UploadFile,
    ViewController,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod screen;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "resume-cli", about = "Terminal front end for the resume upload page")]
struct Args {
    /// Backend base URL; overrides config and environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Where the session token is kept.
    #[arg(long, global = true)]
    session_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the section the page opens on.
    Status,
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Upload {
        path: PathBuf,
    },
    MyResumes,
    Logout,
    /// Switch to a section by element id, e.g. `register-section`.
    Show {
        section: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings()?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(session_path) = args.session_path {
        settings.session_path = session_path;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let api = HttpResumeApi::new(&settings.server_url)
        .with_context(|| format!("bad server url '{}'", settings.server_url))?;
    let session = FileSessionStore::new(&settings.session_path);
    let options = ControllerOptions {
        notice_ttl: settings.notice_ttl(),
        inline_persistence: Persistence::Sticky,
        prevent_duplicate_submissions: settings.prevent_duplicate_submissions,
    };
    let controller = ViewController::with_options(api, session, options);

    let initial = controller.init().await;
    info!(
        server_url = %settings.server_url,
        session_path = %settings.session_path.display(),
        view = %initial,
        "page initialised"
    );

    let outcome = match args.command {
        Command::Status => ActionOutcome::Completed,
        Command::Login { username, password } => controller.login(&username, &password).await,
        Command::Register { username, password } => {
            controller.register(&username, &password).await
        }
        Command::Upload { path } => {
            let file = UploadFile::from_path(&path).await?;
            controller.choose_file(Some(file)).await;
            controller.submit_upload().await
        }
        Command::MyResumes => controller.show_my_resumes().await,
        Command::Logout => controller.logout().await,
        Command::Show { section } => {
            if controller.navigate_to(&section).await {
                ActionOutcome::Completed
            } else {
                anyhow::bail!("no section with id '{section}'");
            }
        }
    };

    print!("{}", screen::render_page(&*controller.page().await));
    finish(outcome)
}

/// Turns a failed action into an error so `main` exits non-zero.
fn finish(outcome: ActionOutcome) -> Result<()> {
    if let ActionOutcome::Failed(err) = outcome {
        if err.requires_reauth() {
            eprintln!("session rejected; run `resume-cli login` again");
        }
        anyhow::bail!("{}", err.message());
    }
    Ok(())
}
