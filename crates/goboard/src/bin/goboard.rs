//! goboard CLI: recognize board photographs, draw diagrams, check datasets.

use clap::{Args, Parser, Subcommand, ValueEnum};
use goboard::dataset::scan_dataset;
use goboard::io::{board_path_for, load_image, load_params, params_path_for, save_params, BoardRecord};
use goboard::render::{default_geometry, placed_marker};
use goboard::{
    draw_detections, process, render_view, synthesize, BoardCoord, DebugImageKind, Marker,
    ParameterSet, ProcessOptions, StoneColor, ValidationPolicy, ViewFilter,
};
use log::{info, LevelFilter};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "goboard")]
#[command(about = "Recognize Go boards in photographs and render board diagrams")]
#[command(version)]
struct Cli {
    /// Log verbosity.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize the board in an image.
    Process(ProcessArgs),

    /// Draw a canonical board diagram.
    Synthesize(SynthesizeArgs),

    /// List images of a directory with the state of their sidecars.
    Status {
        /// Directory with *.png / *.jpg images.
        #[arg(long)]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct ProcessArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Parameter file; defaults to the `<image>.json` sidecar when present.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Fail on out-of-range parameters instead of clamping them.
    #[arg(long)]
    reject: bool,

    /// Write the effective parameters to the `<image>.json` sidecar.
    #[arg(long)]
    save_params: bool,

    /// Write the recognized board to the `<image>.jgf` sidecar.
    #[arg(long)]
    export: bool,

    /// Render the recognized board as a diagram.
    #[arg(long)]
    render: Option<PathBuf>,

    /// Outline detections on the rendered diagram.
    #[arg(long)]
    boxes: bool,

    /// Leave black stones out of the rendered diagram.
    #[arg(long)]
    hide_black: bool,

    /// Leave white stones out of the rendered diagram.
    #[arg(long)]
    hide_white: bool,

    /// Directory for the intermediate masks (`<stem>.<kind>.png`).
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct SynthesizeArgs {
    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Board size (lines per side).
    #[arg(long, default_value_t = 19)]
    size: u32,

    /// Black stones in Go notation, comma separated (e.g. D16,Q4).
    #[arg(long, value_delimiter = ',')]
    black: Vec<String>,

    /// White stones in Go notation, comma separated.
    #[arg(long, value_delimiter = ',')]
    white: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    match cli.command {
        Commands::Process(args) => run_process(&args),
        Commands::Synthesize(args) => run_synthesize(&args),
        Commands::Status { dir } => run_status(&dir),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(level: LogLevel) -> CliResult<()> {
    goboard::core::init_tracing(false, level.into());
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LogLevel) -> CliResult<()> {
    goboard::core::init_with_level(level.into())?;
    Ok(())
}

// ── process ────────────────────────────────────────────────────────────

fn run_process(args: &ProcessArgs) -> CliResult<()> {
    let policy = if args.reject {
        ValidationPolicy::Reject
    } else {
        ValidationPolicy::Clamp
    };

    info!("loading image: {}", args.image.display());
    let img = load_image(&args.image)?;

    let sidecar = params_path_for(&args.image);
    let params = match &args.params {
        Some(path) => load_params(path, policy)?,
        None if sidecar.is_file() => {
            info!("using parameters from {}", sidecar.display());
            load_params(&sidecar, policy)?
        }
        None => ParameterSet::defaults(),
    };

    let options = ProcessOptions {
        debug: if args.debug_dir.is_some() {
            DebugImageKind::ALL.into_iter().collect()
        } else {
            Default::default()
        },
    };
    let result = process(&img, &params, &options)?;

    println!(
        "board {}x{}: {} black, {} white",
        result.geometry.board_size,
        result.geometry.board_size,
        result.black.len(),
        result.white.len()
    );
    for color in StoneColor::ALL {
        let labels: Vec<String> = result
            .markers(color)
            .iter()
            .map(|m| stone_label(m, result.geometry.board_size))
            .collect();
        println!("{color}: {}", labels.join(" "));
    }

    if args.save_params {
        save_params(&sidecar, &params)?;
        info!("parameters saved to {}", sidecar.display());
    }

    if args.export {
        let path = board_path_for(&args.image);
        BoardRecord::from_result(&result, Some(args.image.as_path())).write_json(&path)?;
        info!("board saved to {}", path.display());
    }

    if let Some(out) = &args.render {
        let view = result.view(ViewFilter {
            show_black: !args.hide_black,
            show_white: !args.hide_white,
        });
        let mut diagram = render_view(&view, None);
        if args.boxes {
            let shown: Vec<Marker> = view.black.iter().chain(view.white).copied().collect();
            diagram = draw_detections(&diagram, &shown);
        }
        diagram.save(out)?;
        info!("diagram written to {}", out.display());
    }

    if let Some(dir) = &args.debug_dir {
        std::fs::create_dir_all(dir)?;
        let stem = args
            .image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        for (kind, mask) in &result.debug {
            let path = dir.join(format!("{stem}.{kind}.png"));
            mask.save(&path)?;
            info!("debug image written to {}", path.display());
        }
    }

    Ok(())
}

fn stone_label(m: &Marker, board_size: u32) -> String {
    m.coord
        .label(board_size)
        .unwrap_or_else(|| format!("({},{})", m.coord.col, m.coord.row))
}

// ── synthesize ─────────────────────────────────────────────────────────

fn run_synthesize(args: &SynthesizeArgs) -> CliResult<()> {
    let geometry = default_geometry(args.size);
    let black = parse_stones(&args.black, StoneColor::Black, args.size)?;
    let white = parse_stones(&args.white, StoneColor::White, args.size)?;
    let stones = |coords: &[BoardCoord], color| -> Vec<Marker> {
        coords
            .iter()
            .map(|&c| placed_marker(c, color, &geometry))
            .collect()
    };

    let img = synthesize(
        Some(&geometry),
        &stones(&black, StoneColor::Black),
        &stones(&white, StoneColor::White),
    );
    img.save(&args.out)?;
    info!(
        "{}x{} diagram written to {}",
        args.size,
        args.size,
        args.out.display()
    );
    Ok(())
}

fn parse_stones(labels: &[String], color: StoneColor, size: u32) -> CliResult<Vec<BoardCoord>> {
    labels
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            BoardCoord::parse_label(s, size)
                .ok_or_else(|| -> CliError {
                    format!("invalid {color} stone `{s}` for a {size}x{size} board").into()
                })
        })
        .collect()
}

// ── status ─────────────────────────────────────────────────────────────

fn run_status(dir: &Path) -> CliResult<()> {
    let entries = scan_dataset(dir)?;
    println!("{:<32} json jgf", "image");
    for e in &entries {
        println!("{:<32} {:^4} {:^3}", e.file_name(), e.params.symbol(), e.board.symbol());
    }
    Ok(())
}
