mod config;
mod terminal;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use client::{
    CommentController, FieldAccessor, HttpTransport, MemoryPage, SubmitOutcome,
    UploadController, UploadOutcome,
};
use config::Settings;
use domain::ids;
use terminal::{Prompter, TerminalNotifier, TerminalPage};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// URL of the blog page the form lives on (overrides blog.base_url)
    #[arg(long, env = "RTFBLOG_PAGE_URL")]
    page_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post a comment, answering captcha prompts from stdin
    Comment {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        website: String,
        #[arg(long)]
        text: String,
    },
    /// Upload an image from the post editor and print the updated post body
    Upload {
        /// Image to upload
        file: PathBuf,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        url: String,
        /// Current post body the upload markup is appended to
        #[arg(long, default_value = "")]
        body: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::new().context("Failed to load configuration")?;
    let page_url = cli
        .page_url
        .unwrap_or_else(|| settings.blog.base_url.clone());

    let transport = Arc::new(build_transport(&settings, &page_url)?);
    info!("Using page {}", transport.page_url());

    match cli.command {
        Command::Comment {
            name,
            email,
            website,
            text,
        } => run_comment(transport, &name, &email, &website, &text).await,
        Command::Upload {
            file,
            title,
            url,
            body,
        } => run_upload(transport, file, &title, &url, &body).await,
    }
}

fn build_transport(settings: &Settings, page_url: &str) -> anyhow::Result<HttpTransport> {
    let mut builder = reqwest::Client::builder().user_agent(&settings.transport.user_agent);
    if let Some(secs) = settings.transport.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let http = builder.build().context("Failed to build HTTP client")?;

    HttpTransport::with_client(http, page_url)
        .with_context(|| format!("Invalid page URL: {}", page_url))
}

async fn run_comment(
    transport: Arc<HttpTransport>,
    name: &str,
    email: &str,
    website: &str,
    text: &str,
) -> anyhow::Result<()> {
    let page = Arc::new(TerminalPage::new(MemoryPage::comment_form()));
    page.set_value(ids::NAME, name)?;
    page.set_value(ids::EMAIL, email)?;
    page.set_value("website", website)?;
    page.set_value(ids::TEXT, text)?;

    let controller = CommentController::new(
        transport.clone(),
        page.clone(),
        Arc::new(TerminalNotifier),
    );
    let mut prompter = Prompter::new();

    loop {
        let outcome = controller
            .submit()
            .outcome()
            .await
            .context("Submission task panicked")?;

        let task = match outcome {
            SubmitOutcome::Navigated { url } => {
                let target = transport.page_url().join(&url)?;
                println!("Comment posted: {}", target);
                return Ok(());
            }
            SubmitOutcome::CaptchaPrompted { task, .. } => task,
            SubmitOutcome::CaptchaCleared => {
                eprintln!("Wrong answer, try again.");
                page.inner()
                    .element(ids::CAPTCHA_TASK_TEXT)
                    .map(|e| e.text)
                    .unwrap_or_default()
            }
            SubmitOutcome::Failed(e) => bail!("Comment not posted: {}", e),
        };

        let Some(answer) = prompter.ask(&task).await? else {
            bail!("No captcha answer given");
        };
        page.set_value(ids::CAPTCHA_INPUT, &answer)?;
    }
}

async fn run_upload(
    transport: Arc<HttpTransport>,
    file: PathBuf,
    title: &str,
    url: &str,
    body: &str,
) -> anyhow::Result<()> {
    let page = Arc::new(TerminalPage::new(MemoryPage::edit_post_form()));
    page.set_value(ids::TITLE, title)?;
    page.set_value(ids::URL, url)?;
    page.set_value(ids::POST_TEXTAREA, body)?;

    let controller = UploadController::new(transport, page.clone(), Arc::new(TerminalNotifier));
    controller.open_file_picker()?;
    page.inner().select_file(ids::FILE_INPUT, file.clone())?;

    let input_value = file.display().to_string();
    let Some(dispatch) = controller.on_file_selected(&input_value) else {
        bail!("No file selected");
    };

    match dispatch.outcome().await.context("Upload task panicked")? {
        UploadOutcome::Appended { seq, .. } => {
            info!("Upload #{} done", seq);
            println!("{}", page.value_by_id(ids::POST_TEXTAREA)?);
            Ok(())
        }
        UploadOutcome::Failed(e) => bail!("Upload failed: {}", e),
    }
}
