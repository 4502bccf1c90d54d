use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use epaper_art::models::{AppConfig, ArtRequest, ColorInput};
use epaper_art::server::{self, ApiDoc};
use epaper_art::services::ImageRegistry;

#[derive(Parser)]
#[command(name = "epaper-art")]
#[command(about = "Art server for e-paper displays")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Transform one image and write the packed bytes to a file
    Render {
        /// Image name (file name or stem) from the image directory
        #[arg(short, long)]
        image: String,

        /// Target width in pixels (requires --height)
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Target height in pixels (requires --width)
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// Palette as comma-separated colors (e.g. "#000000,#FFFFFF,red")
        #[arg(long)]
        colors: Option<String>,

        /// Pixels packed into each byte: 1, 2, 4 or 8
        #[arg(short, long, default_value_t = 1)]
        pixels_per_byte: u32,

        /// Error diffusion: floyd-steinberg, atkinson or none
        #[arg(short, long)]
        dither: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List the images that would be served
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Render {
            image,
            width,
            height,
            colors,
            pixels_per_byte,
            dither,
            output,
        }) => {
            let request = ArtRequest {
                image_name: Some(image),
                palette: colors.as_deref().map(split_colors),
                dimensions: width.zip(height).map(|(w, h)| [w, h]),
                pixels_per_byte,
                dither,
            };
            run_render_command(request, &output)
        }
        Some(Commands::List) => run_list_command(),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epaper_art=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Split on commas that are not inside `rgb(...)`.
fn split_colors(colors: &str) -> Vec<ColorInput> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in colors.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&colors[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&colors[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ColorInput::from)
        .collect()
}

/// Run the pipeline once, without the cache (no server needed)
fn run_render_command(request: ArtRequest, output: &Path) -> anyhow::Result<()> {
    init_cli_logging();

    let options = request.validate()?;
    let config = AppConfig::from_env();
    let registry = ImageRegistry::scan(&config.image_location)?;

    let name = request.image_name.as_deref().unwrap_or_default();
    let handle = registry.get(name)?;

    let bytes = art_pipeline::render(handle.image(), &options)?;
    std::fs::write(output, &bytes)?;
    println!(
        "Rendered {} -> {} ({} bytes)",
        handle.id(),
        output.display(),
        bytes.len()
    );

    Ok(())
}

fn run_list_command() -> anyhow::Result<()> {
    init_cli_logging();

    let config = AppConfig::from_env();
    let registry = ImageRegistry::scan(&config.image_location)?;

    for handle in registry.iter() {
        let image = handle.image();
        println!(
            "  {:<32} {:>5}x{:<5} {:?}",
            handle.id().as_str(),
            image.width(),
            image.height(),
            image.color()
        );
    }
    println!(
        "\n{} image{} in {}",
        registry.len(),
        if registry.len() == 1 { "" } else { "s" },
        config.image_location.display()
    );

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config_file = std::env::var("CONFIG_FILE").ok();
    let config = AppConfig::from_env();

    println!("epaper-art v{VERSION}");
    println!("Art server for e-paper displays\n");

    println!("Environment Variables:");
    for key in ["CONFIG_FILE", "IMAGE_LOCATION", "BIND_ADDR", "CACHE_MAX_ENTRIES"] {
        let value = std::env::var(key).ok();
        println!("  {key:<17} = {}", value.as_deref().unwrap_or("(not set)"));
    }

    println!("\nEffective Configuration:");
    println!(
        "  Config file:  {}",
        config_file.as_deref().unwrap_or("(defaults)")
    );
    println!("  Images:       {}", config.image_location.display());
    println!("  Bind address: {}", config.bind_addr);
    match config.cache.max_entries {
        0 => println!("  Cache:        unbounded"),
        n => println!("  Cache:        {n} entries (LRU)"),
    }

    println!("\nCommands:");
    println!("  epaper-art serve    Start the HTTP server");
    println!("  epaper-art render   Transform one image to a file");
    println!("  epaper-art list     List available images");
    println!("\nRun 'epaper-art --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "epaper_art=debug,art_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        images = %config.image_location.display(),
        bind_addr = %config.bind_addr,
        cache_max_entries = config.cache.max_entries,
        "Configuration loaded"
    );

    // An empty image set is fatal: never bind without something to serve
    let state = server::create_app_state(&config)?;

    let app = server::build_router(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "epaper-art server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
