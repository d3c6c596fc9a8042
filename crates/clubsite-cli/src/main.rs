use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clubsite_client::ApiClient;
use clubsite_config::Config;
use clubsite_engine::api::BoardCode;
use clubsite_engine::blocks::ContentBlock;
use clubsite_engine::blocks::meta::file_meta;
use clubsite_engine::blocks::ops::sorted;
use clubsite_engine::editing::PostEditor;
use clubsite_engine::render::{TextStyling, hydrate_link_cards, render_blocks_with, render_html};
use clubsite_engine::upload::PendingFile;
use clubsite_engine::{normalize_external_url, resolve_download};

#[derive(Parser)]
#[command(name = "clubsite", version, about = "Render, upload and fetch club website posts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a block list as HTML
    Render(RenderArgs),

    /// Upload files into a post and save it
    Upload(UploadArgs),

    /// Print the download URL of a FILE block
    Download(DownloadArgs),

    /// Print the link preview for a URL
    Preview(PreviewArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// JSON file holding a block array
    #[arg(conflicts_with = "post", required_unless_present = "post")]
    file: Option<PathBuf>,

    /// Render a post fetched from the API instead
    #[arg(long)]
    post: Option<i64>,

    /// Write styles inline instead of data-rt-* annotations
    #[arg(long)]
    styled: bool,

    /// Skip link preview fetches
    #[arg(long)]
    offline: bool,
}

#[derive(clap::Args)]
struct UploadArgs {
    /// Board the post belongs to (NOTICE or QA)
    #[arg(long)]
    board: BoardCode,

    #[arg(long)]
    post: i64,

    /// Files to upload, in the order their blocks should appear
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(clap::Args)]
struct DownloadArgs {
    #[arg(long)]
    post: i64,

    /// Block position within the post
    #[arg(long)]
    block: usize,
}

#[derive(clap::Args)]
struct PreviewArgs {
    url: String,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default().with_context(|| {
        format!(
            "Failed to load config file at {}",
            Config::config_path().display()
        )
    })?;
    log::debug!("Using API at {}", config.api_base_url);

    match cli.command {
        Command::Render(args) => render(&config, args).await,
        Command::Upload(args) => upload(&config, args).await,
        Command::Download(args) => download(&config, args).await,
        Command::Preview(args) => preview(&config, args).await,
    }
}

async fn render(config: &Config, args: RenderArgs) -> Result<()> {
    let needs_client = args.post.is_some() || !args.offline;
    let client = if needs_client {
        Some(ApiClient::from_config(config)?)
    } else {
        None
    };

    let blocks = match (args.post, &args.file, &client) {
        (Some(id), _, Some(client)) => client.get_post(id).await?.blocks,
        (None, Some(path), _) => read_blocks(path)?,
        _ => bail!("Either a blocks file or --post is required"),
    };

    let styling = if args.styled {
        TextStyling::Inline
    } else {
        TextStyling::Annotated
    };
    let mut nodes = render_blocks_with(&blocks, styling);
    if !args.offline
        && let Some(client) = &client
    {
        let hydrated = hydrate_link_cards(&mut nodes, client).await;
        log::info!("Hydrated {hydrated} link card(s)");
    }

    print!("{}", render_html(&nodes));
    Ok(())
}

async fn upload(config: &Config, args: UploadArgs) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    let post = client.get_post(args.post).await?;
    if post.board_code != args.board {
        bail!(
            "Post {} belongs to {}, not {}",
            post.id,
            post.board_code.as_str(),
            args.board.as_str()
        );
    }

    let files = args
        .files
        .iter()
        .map(|path| read_pending_file(path))
        .collect::<Result<Vec<_>>>()?;

    let mut editor = PostEditor::from_post(&post);
    let batch = editor.upload_files(files, None, &client).await?;
    for id in &batch.failed {
        if let Some(item) = editor.uploads().get(*id) {
            eprintln!(
                "Failed: {} ({})",
                item.file.name,
                item.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    if batch.inserted.is_empty() {
        bail!("No files were uploaded");
    }

    client
        .update_post(post.id, &editor.to_upsert_request())
        .await
        .context("Uploaded files but failed to save the post")?;
    println!(
        "Added {} block(s) to post {}",
        batch.inserted.len(),
        post.id
    );
    Ok(())
}

async fn download(config: &Config, args: DownloadArgs) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    let post = client.get_post(args.post).await?;
    let blocks = sorted(&post.blocks);
    let Some(block) = blocks.get(args.block) else {
        bail!("Post {} has {} block(s)", post.id, blocks.len());
    };
    if !block.block_type.is_uploadable() {
        bail!(
            "Block {} is {}, not a file",
            args.block,
            block.block_type.as_str()
        );
    }

    let meta = file_meta(block.block_type, block.meta.as_deref());
    let action = resolve_download(block.url_source(), meta.as_ref(), &client).await?;
    println!("{}", action.url());
    Ok(())
}

async fn preview(config: &Config, args: PreviewArgs) -> Result<()> {
    let Some(url) = normalize_external_url(&args.url) else {
        bail!("Refusing to preview {}", args.url);
    };
    let client = ApiClient::from_config(config)?;
    let preview = clubsite_engine::LinkPreviewSource::link_preview(&client, &url).await?;
    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}

fn read_blocks(path: &Path) -> Result<Vec<ContentBlock>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON block array", path.display()))
}

fn read_pending_file(path: &Path) -> Result<PendingFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    Ok(PendingFile::new(name, content_type_for(path), bytes))
}

/// MIME type from the file extension; empty when unknown.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        _ => "",
    }
}
