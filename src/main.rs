use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use inkframe::api;
use inkframe::models::config::CONFIG_FILE_ENV;
use inkframe::models::AppConfig;
use inkframe::rendering::ImageProcessor;
use inkframe::server;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Parser)]
#[command(name = "inkframe")]
#[command(about = "Photo gallery server for 6-color e-paper picture frames")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Convert a photo into a panel-ready frame without the server
    Convert {
        /// Input image (any format the image crate decodes)
        input: PathBuf,

        /// Output file; the format follows the extension (.bmp, .png, ...)
        #[arg(short, long)]
        output: PathBuf,

        /// Write perceptual colors (what the panel looks like) instead of
        /// raw device colors
        #[arg(long)]
        preview: bool,

        /// Also write the gallery thumbnail to this path
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },
    /// Print configuration and gallery status
    Status,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inkframe API",
        description = "Photo gallery and display control for 6-color e-paper frames",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::list_images,
        api::upload_image,
        api::delete_image,
        api::get_thumbnail,
        api::set_image_category,
        api::show_image,
        api::display_status,
        api::clear_display,
        api::list_categories,
        api::create_category,
        api::delete_category,
        api::unlock,
        api::hide_category,
        api::unhide_category,
    ),
    components(schemas(
        api::ImageResponse,
        api::ImageListResponse,
        api::SetCategoryRequest,
        api::DisplayStatusResponse,
        api::CategoryListResponse,
        api::CategoryResponse,
        api::CreateCategoryRequest,
        api::UnlockRequest,
        api::UnlockResponse,
        api::StatusResponse,
    )),
    tags(
        (name = "Images", description = "Upload, list and organize photos"),
        (name = "Display", description = "Panel control"),
        (name = "Categories", description = "Gallery categories"),
        (name = "Vault", description = "Password-protected hidden categories")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            preview,
            thumbnail,
        }) => run_convert_command(&input, &output, preview, thumbnail.as_deref()),
        Some(Commands::Status) => {
            init_cli_tracing();
            run_status_command();
            Ok(())
        }
        Some(Commands::Serve) | None => run_server().await,
    }
}

/// Minimal logging for CLI commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkframe=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Run the upload pipeline on one file (no server, no panel)
fn run_convert_command(
    input: &Path,
    output: &Path,
    preview: bool,
    thumbnail: Option<&Path>,
) -> anyhow::Result<()> {
    init_cli_tracing();

    let config = AppConfig::from_env();
    let processor = ImageProcessor::from_config(&config, config.panel_spec())
        .map_err(|e| anyhow::anyhow!("Invalid palette configuration: {e}"))?;

    let bytes = std::fs::read(input)?;
    let prepared = processor
        .prepare(&bytes)
        .map_err(|e| anyhow::anyhow!("{}: {e}", input.display()))?;

    let frame = if preview {
        &prepared.preview
    } else {
        &prepared.device
    };
    frame.save(output)?;
    println!(
        "Converted {} -> {} ({}x{}, {} colors)",
        input.display(),
        output.display(),
        frame.width(),
        frame.height(),
        if preview { "perceptual" } else { "device" }
    );

    if let Some(path) = thumbnail {
        prepared.thumbnail.save(path)?;
        println!(
            "Thumbnail {} ({}x{})",
            path.display(),
            prepared.thumbnail.width(),
            prepared.thumbnail.height()
        );
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var(CONFIG_FILE_ENV).ok();
    let config = AppConfig::from_env();

    println!("Inkframe v{VERSION}");
    println!("Photo gallery server for 6-color e-paper picture frames\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.unwrap_or_else(|| format!("{DEFAULT_BIND_ADDR} (default)"))
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );

    println!("\nConfiguration:");
    println!("  Data dir:   {}", config.data_dir.display());
    println!(
        "  Panel:      {}x{} (frames written to {})",
        config.panel.width,
        config.panel.height,
        config.panel_output_dir().display()
    );
    println!(
        "  Thumbnails: {}x{}",
        config.thumbnail.max_width, config.thumbnail.max_height
    );
    println!(
        "  Dither:     {}{}",
        config.dither.algorithm,
        if config.dither.serpentine {
            " (serpentine)"
        } else {
            ""
        }
    );
    match config.build_palette() {
        Ok(palette) => {
            let table: Vec<String> = palette
                .perceptual_table()
                .iter()
                .zip(palette.device_table())
                .map(|(p, d)| format!("{}->{}", p.to_hex(), d.to_hex()))
                .collect();
            println!("  Palette:    {}", table.join(" "));
        }
        Err(e) => println!("  Palette:    INVALID ({e})"),
    }
    println!(
        "  Vault:      {}",
        if config.vault.password.is_some() {
            "password set"
        } else {
            "no password (hidden categories cannot be unlocked)"
        }
    );

    let images = std::fs::read_dir(config.images_dir())
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "bmp"))
                .count()
        })
        .unwrap_or(0);
    println!("\nGallery:");
    println!("  {images} stored image(s)");

    println!("\nCommands:");
    println!("  inkframe serve     Start the HTTP server");
    println!("  inkframe convert   Convert a photo to a panel frame");
    println!("  inkframe status    Show this information");
    println!("\nRun 'inkframe --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkframe=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let config = AppConfig::from_env();

    let state = server::create_app_state(config)?;

    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Inkframe server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
