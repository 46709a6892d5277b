use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use croplab_core::{Config, Croplab, DOWNLOAD_FILE_NAME, LogoPosition, SelectionRect, init};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Override the service base URL (CROPLAB_API_URL otherwise)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request a low-resolution preview of a crop
    Preview {
        /// Source image file
        image: PathBuf,

        /// Selection as percentages of the image: x,y,width,height
        #[arg(long, value_parser = parse_selection)]
        select: SelectionRect,

        /// Also write the preview image to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the full-quality crop and save it
    Generate {
        /// Source image file
        image: PathBuf,

        /// Selection as percentages of the image: x,y,width,height
        #[arg(long, value_parser = parse_selection)]
        select: SelectionRect,

        /// Configuration id for the logo overlay
        #[arg(long)]
        config: Option<i64>,

        /// Output file for the generated image
        #[arg(short, long, default_value = DOWNLOAD_FILE_NAME)]
        output: PathBuf,
    },

    /// Manage logo-overlay configurations
    #[command(subcommand)]
    Configs(ConfigsCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigsCommand {
    /// List configurations known to the service
    List,

    /// Create a new configuration
    Create {
        /// Scale factor for the logo, between 0.01 and 0.25
        #[arg(long)]
        scale_down: f64,

        /// top-left, top-right, bottom-left, bottom-right or center
        #[arg(long)]
        position: LogoPosition,

        /// PNG file to use as the logo
        #[arg(long)]
        logo: Option<PathBuf>,
    },
}

/// Parses `x,y,w,h` percentage values into a selection rectangle.
fn parse_selection(s: &str) -> std::result::Result<SelectionRect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, w, h] = parts.as_slice() else {
        return Err(format!("expected x,y,width,height (got '{s}')"));
    };
    let parse = |v: &str| -> std::result::Result<f64, String> {
        let value: f64 = v.parse().map_err(|_| format!("'{v}' is not a number"))?;
        if !(0.0..=100.0).contains(&value) {
            return Err(format!("'{v}' is outside 0-100"));
        }
        Ok(value)
    };
    Ok(SelectionRect::new(
        parse(x)?,
        parse(y)?,
        parse(w)?,
        parse(h)?,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    init();
    let args = Args::parse();

    let config = match &args.api_url {
        Some(url) => Config::with_url(url)?,
        None => Config::load()?,
    };
    let mut app = Croplab::with_config(config).context("Failed to create service client")?;

    match args.command {
        Command::Preview {
            image,
            select,
            output,
        } => {
            app.choose_file(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            app.set_selection(select);

            app.preview().await?;
            if let Some(err) = app.session().error() {
                bail!("{err}");
            }
            let preview = app
                .session()
                .preview()
                .context("Service returned no preview image")?;

            match image::load_from_memory(preview) {
                Ok(img) => println!("Preview received: {}x{} pixels", img.width(), img.height()),
                Err(_) => println!("Preview received: {} bytes", preview.len()),
            }
            if let Some(path) = output {
                fs::write(&path, preview)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Saved preview to {}", path.display());
            }
        }

        Command::Generate {
            image,
            select,
            config,
            output,
        } => {
            // the selected configuration must exist in the fetched list
            if config.is_some() {
                app.load_configurations().await;
            }
            app.select_configuration(config)?;

            app.choose_file(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            app.set_selection(select);

            app.generate().await?;
            if let Some(err) = app.session().error() {
                bail!("{err}");
            }
            let generated = app
                .session()
                .generated()
                .context("Service returned no image")?;

            fs::write(&output, generated)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved {}", output.display());

            if let Some(cfg) = app.store().selected() {
                println!(
                    "Logo overlay applied: {} (scale: {})",
                    cfg.logo_position, cfg.scale_down
                );
            }
        }

        Command::Configs(cmd) => match cmd {
            ConfigsCommand::List => {
                app.load_configurations().await;
                if app.store().all().is_empty() {
                    println!("No configurations found");
                }
                for cfg in app.store().all() {
                    println!(
                        "{:>4}  {:<12}  scale {}",
                        cfg.id, cfg.logo_position, cfg.scale_down
                    );
                }
            }
            ConfigsCommand::Create {
                scale_down,
                position,
                logo,
            } => {
                let logo_png = match logo {
                    Some(path) => Some(
                        fs::read(&path)
                            .with_context(|| format!("Failed to read {}", path.display()))?,
                    ),
                    None => None,
                };
                let created = app
                    .create_configuration(scale_down, position, logo_png)
                    .await?;
                println!(
                    "Created configuration {} - {} (scale: {})",
                    created.id, created.logo_position, created.scale_down
                );
            }
        },
    }

    Ok(())
}
