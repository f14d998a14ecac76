use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gridtap_lib::config::{load_config, load_filters, AppConfig};
use gridtap_lib::device::replay::ReplayDevice;
use gridtap_lib::errors::{GridTapError, GridTapResult};
use gridtap_lib::executor::dispatcher::ToolDispatcher;
use gridtap_lib::executor::responses::{
    Coordinates, ElementsResponse, ErrorResponse, LocateResponse, Status,
};
use gridtap_lib::perception::extractor::extract_from_source;
use gridtap_lib::perception::grid::GridOverlay;
use gridtap_lib::perception::overlay::render_overlay;

#[derive(Parser, Debug)]
#[command(
    name = "gridtap",
    version,
    about = "Screen element extraction and grid cell addressing for mobile UI agents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file (default: gridtap.toml next to the binary, in the
    /// working directory, or in the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Grid columns (overrides config)
    #[arg(long, global = true)]
    cols: Option<u32>,

    /// Grid rows (overrides config)
    #[arg(long, global = true)]
    rows: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract indexed screen elements from a UI hierarchy dump
    Elements {
        /// Page source XML file
        xml: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Keep non-interactive, unlabelled nodes too
        #[arg(long)]
        include_all: bool,
        /// JSON filter file, merged with configured filters
        #[arg(long)]
        filters: Option<PathBuf>,
    },

    /// Pixel centre of a grid cell
    Cell {
        label: String,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },

    /// Grid cell containing a pixel
    Locate {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },

    /// Draw the grid onto a screenshot
    Overlay {
        input: PathBuf,
        output: PathBuf,
    },

    /// Print the grid prompt text for a screen size
    Describe {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },

    /// Run one agent tool against a captured snapshot
    Call {
        /// Tool name, e.g. tap_cell
        tool: String,
        /// JSON arguments
        #[arg(default_value = "{}")]
        args: String,
        #[arg(long)]
        xml: Option<PathBuf>,
        #[arg(long)]
        screenshot: Option<PathBuf>,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    gridtap_lib::init_tracing(level);

    let ok = match run(cli).await {
        Ok(ok) => ok,
        Err(e) => {
            print_json(&ErrorResponse::new(e.to_string()))?;
            false
        }
    };
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Load the config (with CLI overrides) and run the subcommand.
async fn run(cli: Cli) -> GridTapResult<bool> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(cols) = cli.cols {
        config.grid.cols = cols;
    }
    if let Some(rows) = cli.rows {
        config.grid.rows = rows;
    }
    execute(cli.command, &config).await
}

/// Returns `false` when the command produced an error record.
async fn execute(command: Commands, config: &AppConfig) -> GridTapResult<bool> {
    match command {
        Commands::Elements {
            xml,
            width,
            height,
            include_all,
            filters,
        } => {
            let mut options = config.extract_options()?;
            options.include_all |= include_all;
            if let Some(path) = filters {
                options.filters = options.filters.merge(load_filters(&path)?);
            }
            let source = std::fs::read_to_string(&xml)?;
            match extract_from_source(&source, width, height, &options) {
                Ok(session) => {
                    print_json(&ElementsResponse::from(&session))?;
                    Ok(true)
                }
                Err(e) => {
                    print_json(&ErrorResponse::new(e.to_string()).with_empty_elements())?;
                    Ok(false)
                }
            }
        }
        Commands::Cell {
            label,
            width,
            height,
        } => {
            let grid = grid_for(config, width, height)?;
            let (x, y) = grid.cell_to_pixel(&label)?;
            print_json(&LocateResponse {
                status: Status::Success,
                cell: label.trim().to_ascii_uppercase(),
                coordinates: Coordinates { x, y },
            })?;
            Ok(true)
        }
        Commands::Locate {
            x,
            y,
            width,
            height,
        } => {
            let grid = grid_for(config, width, height)?;
            print_json(&LocateResponse {
                status: Status::Success,
                cell: grid.pixel_to_cell(x, y),
                coordinates: Coordinates { x, y },
            })?;
            Ok(true)
        }
        Commands::Overlay { input, output } => {
            let bytes = std::fs::read(&input)?;
            let (width, height) = image::image_dimensions(&input)
                .map_err(|e| GridTapError::ImageDecode(format!("{}: {e}", input.display())))?;
            let grid = grid_for(config, width, height)?;
            let png = render_overlay(&grid, &bytes, &config.grid.overlay)?;
            std::fs::write(&output, png)?;
            tracing::info!(output = %output.display(), "overlay written");
            Ok(true)
        }
        Commands::Describe { width, height } => {
            println!("{}", grid_for(config, width, height)?.describe());
            Ok(true)
        }
        Commands::Call {
            tool,
            args,
            xml,
            screenshot,
            width,
            height,
        } => {
            let device =
                ReplayDevice::from_files(xml.as_deref(), screenshot.as_deref(), width, height)
                    .await?;
            let mut dispatcher =
                ToolDispatcher::connect(device, &config.grid, config.extract_options()?).await?;
            let result = dispatcher.dispatch(&tool, &args).await;
            print_json(&result)?;
            Ok(result.get("status").and_then(|s| s.as_str()) == Some("success"))
        }
    }
}

fn grid_for(config: &AppConfig, width: u32, height: u32) -> GridTapResult<GridOverlay> {
    GridOverlay::new(width, height, config.grid.cols, config.grid.rows)
}

fn print_json<T: serde::Serialize>(value: &T) -> GridTapResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
