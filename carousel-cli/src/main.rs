use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use carousel_core::catalog::{FileCatalog, WallpaperCatalog};
use carousel_core::config::Config;
use carousel_core::ipc::{self, DaemonStatus, IpcRequest, IpcResponse};
use carousel_core::models::WallpaperItem;
use carousel_core::paths::CarouselPaths;

#[derive(Parser)]
#[command(name = "carousel", about = "Rotate through a page of cached wallpapers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon status
    Status,
    /// Show the current wallpaper
    Current,
    /// Advance to the next wallpaper
    Next,
    /// Toggle the liked flag of a cached wallpaper
    Like {
        /// Wallpaper ID
        id: String,
    },
    /// Reload config and catalog
    Reload,
    /// Drop every cached wallpaper
    Evict,
    /// Check a catalog file without talking to the daemon
    Check {
        /// Path to a JSON catalog
        path: PathBuf,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Stop the daemon
    Quit,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carousel=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let resp = send(IpcRequest::Status).await?;
            print_data(resp, |data| {
                let status: DaemonStatus = serde_json::from_value(data)?;
                Ok(format_status(&status))
            })?;
        }
        Commands::Current => {
            let resp = send(IpcRequest::Current).await?;
            print_item(resp)?;
        }
        Commands::Next => {
            let resp = send(IpcRequest::Next).await?;
            if let IpcResponse::Error { message } = resp {
                anyhow::bail!(message);
            }
            let resp = send(IpcRequest::Current).await?;
            print_item(resp)?;
        }
        Commands::Like { id } => {
            let resp = send(IpcRequest::Like { id }).await?;
            print_data(resp, |_| Ok("ok".into()))?;
        }
        Commands::Reload => {
            let resp = send(IpcRequest::Reload).await?;
            print_data(resp, |_| Ok("ok".into()))?;
        }
        Commands::Evict => {
            let resp = send(IpcRequest::Evict).await?;
            print_data(resp, |_| Ok("ok".into()))?;
        }
        Commands::Check { path } => {
            let wallpapers = FileCatalog::new(path).fetch().await?;
            let liked = wallpapers.iter().filter(|wp| wp.liked).count();
            println!("wallpapers: {}", wallpapers.len());
            println!("liked:      {liked}");
        }
        Commands::Config { action } => {
            let paths = CarouselPaths::new()?;
            match action {
                ConfigAction::Init { force } => {
                    let path = init_config(&paths, force)?;
                    println!("wrote {}", path.display());
                }
                ConfigAction::Path => println!("{}", paths.config_file().display()),
            }
        }
        Commands::Quit => {
            let resp = send(IpcRequest::Quit).await?;
            print_data(resp, |_| Ok("ok".into()))?;
        }
    }

    Ok(())
}

async fn send(request: IpcRequest) -> Result<IpcResponse> {
    ipc::send_request(&request)
        .await
        .map_err(|e| anyhow::anyhow!("daemon not running. start with: carousel-daemon\n  ({e})"))
}

fn init_config(paths: &CarouselPaths, force: bool) -> Result<PathBuf> {
    let path = paths.config_file();
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    paths.ensure_dirs()?;
    Config::default().save(paths)?;
    Ok(path)
}

fn print_item(resp: IpcResponse) -> Result<()> {
    print_data(resp, |data| {
        let item: WallpaperItem = serde_json::from_value(data)?;
        Ok(format_item(&item))
    })
}

fn print_data<F>(resp: IpcResponse, render: F) -> Result<()>
where
    F: FnOnce(serde_json::Value) -> Result<String>,
{
    match resp {
        IpcResponse::Ok { data } => {
            println!("{}", render(data.unwrap_or_default())?);
            Ok(())
        }
        IpcResponse::Error { message } => anyhow::bail!(message),
    }
}

fn format_item(item: &WallpaperItem) -> String {
    let mut out = format!("{}  {}", item.id, item.attribution);
    if let Some(resolution) = &item.resolution {
        out.push_str(&format!(" ({resolution})"));
    }
    if item.liked {
        out.push_str(" [liked]");
    }
    if !item.image_uri.is_empty() {
        out.push_str(&format!("\n  {}", item.image_uri));
    }
    out
}

fn format_status(status: &DaemonStatus) -> String {
    let mut lines = vec![format!("cache:     {}", status.state)];
    if let Some(count) = status.count {
        lines.push(format!("count:     {count}"));
    }
    match (&status.current, &status.last_error) {
        (Some(item), _) => lines.push(format!("current:   {}", format_item(item))),
        (None, Some(err)) => lines.push(format!("error:     {err}")),
        (None, None) => {}
    }
    lines.push(format!(
        "next:      {}",
        if status.has_next { "available" } else { "none" }
    ));
    lines.push(format!("rotations: {}", status.rotations));
    if let Some(at) = &status.last_rotation {
        lines.push(format!("last:      {at}"));
    }
    lines.join("\n")
}
