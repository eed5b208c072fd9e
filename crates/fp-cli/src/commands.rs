use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use bytes::Bytes;
use colored::Colorize;

use fp_index::{DocumentIndex, FilesystemReconciler};
use fp_server::{FlowerpressServer, ServerConfig};
use fp_service::{AssetUpload, StorageService, DEFAULT_MEDIA_TYPE};
use fp_store::{BackendKind, FsProvider};

use crate::cli::*;

/// What offline commands need: a service over the filesystem root.
struct Context {
    service: StorageService,
    root: PathBuf,
    format: OutputFormat,
}

impl Context {
    fn new(root: Option<PathBuf>, format: OutputFormat) -> Self {
        let config = ServerConfig::default().with_env();
        let root = root.unwrap_or(config.storage.root);
        let provider = Arc::new(FsProvider::new(&root, config.base_url));
        Self {
            service: StorageService::new(provider, config.limits),
            root,
            format,
        }
    }

    fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        root,
        ..
    } = cli;
    let ctx = Context::new(root.clone(), format);
    match command {
        Command::Serve(args) => cmd_serve(args, root).await,
        Command::Save(args) => cmd_save(&ctx, args).await,
        Command::Cat(args) => cmd_cat(&ctx, args).await,
        Command::Upload(args) => cmd_upload(&ctx, args).await,
        Command::Assets(args) => cmd_assets(&ctx, args).await,
        Command::Scan(args) => cmd_scan(&ctx, args).await,
    }
}

async fn cmd_serve(args: ServeArgs, root: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_env();
    if let Some(root) = root {
        config.storage.root = root;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.memory {
        config.storage.backend = BackendKind::Memory;
    }
    println!(
        "{} Flowerpress on {} ({} storage)",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.storage.backend.to_string().cyan()
    );
    FlowerpressServer::new(config)?.serve().await?;
    Ok(())
}

async fn cmd_save(ctx: &Context, args: SaveArgs) -> anyhow::Result<()> {
    let markdown = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let receipt = ctx
        .service
        .save_markdown_if(&args.space, &args.slug, &markdown, args.if_etag.as_deref())
        .await?;
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{} Saved {}/{}", "✓".green().bold(), args.space, args.slug.yellow());
        println!("  Version: {}", receipt.version);
        println!("  Etag: {}", receipt.etag.cyan());
    }
    Ok(())
}

async fn cmd_cat(ctx: &Context, args: DocArgs) -> anyhow::Result<()> {
    let body = ctx.service.get_markdown(&args.space, &args.slug).await?;
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", body.markdown);
    }
    Ok(())
}

async fn cmd_upload(ctx: &Context, args: UploadArgs) -> anyhow::Result<()> {
    let content = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = args
        .content_type
        .unwrap_or_else(|| guess_content_type(&args.file).to_string());
    let receipt = ctx
        .service
        .upload_asset(
            &args.space,
            &args.slug,
            AssetUpload {
                name,
                content: Bytes::from(content),
                content_type,
            },
        )
        .await?;
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{} Uploaded {}", "✓".green().bold(), receipt.rel_path.yellow());
        println!("  Type: {}", receipt.media_type);
        println!("  Hash: {}", receipt.hash.cyan());
        println!("  URL: {}", receipt.url.blue());
    }
    Ok(())
}

async fn cmd_assets(ctx: &Context, args: DocArgs) -> anyhow::Result<()> {
    let assets = ctx.service.list_assets(&args.space, &args.slug).await?;
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&assets)?);
    } else if assets.is_empty() {
        println!("No assets.");
    } else {
        for asset in &assets {
            println!("  {}  {}", asset.rel_path.yellow(), asset.url.dimmed());
        }
    }
    Ok(())
}

async fn cmd_scan(ctx: &Context, args: ScanArgs) -> anyhow::Result<()> {
    let index = DocumentIndex::new();
    let report = FilesystemReconciler::new(&ctx.root)
        .reconcile(&args.space, &index)
        .await?;
    let docs = index.documents_in_space(&args.space);
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&docs)?);
    } else {
        println!(
            "{} {} documents in {} ({} skipped)",
            "✓".green().bold(),
            report.discovered.to_string().bold(),
            args.space.yellow(),
            report.skipped
        );
        for doc in &docs {
            println!("  {}  {}", doc.slug.yellow(), doc.title);
        }
    }
    Ok(())
}

/// Media type for an uploaded file, from its extension.
fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "csv" => "text/csv",
        "md" | "markdown" => "text/markdown",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => DEFAULT_MEDIA_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_guessing() {
        assert_eq!(guess_content_type(Path::new("a/chart.CSV")), "text/csv");
        assert_eq!(guess_content_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("LICENSE")), DEFAULT_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn offline_commands_share_a_root() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("plan.md");
        std::fs::write(&src, "# Launch Plan\n").unwrap();
        let store = dir.path().join("store");
        let ctx = Context::new(Some(store.clone()), OutputFormat::Json);

        cmd_save(
            &ctx,
            SaveArgs {
                space: "s1".into(),
                slug: "plan".into(),
                file: src.clone(),
                if_etag: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(store.join("spaces/s1/plan/README.md")).unwrap(),
            "# Launch Plan\n"
        );

        cmd_upload(
            &ctx,
            UploadArgs {
                space: "s1".into(),
                slug: "plan".into(),
                file: src,
                content_type: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(ctx.service.list_assets("s1", "plan").await.unwrap().len(), 1);

        cmd_scan(&ctx, ScanArgs { space: "s1".into() }).await.unwrap();
    }

    #[tokio::test]
    async fn save_with_stale_etag_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.md");
        std::fs::write(&src, "# A\n").unwrap();
        let ctx = Context::new(Some(dir.path().join("store")), OutputFormat::Text);
        let result = cmd_save(
            &ctx,
            SaveArgs {
                space: "s1".into(),
                slug: "a".into(),
                file: src,
                if_etag: Some("0000000000000000".into()),
            },
        )
        .await;
        assert!(result.is_err());
    }
}
