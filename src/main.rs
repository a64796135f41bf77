use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level as LogLevel;
use tracing_subscriber::FmtSubscriber;

use piece_generator::ascii;
use piece_generator::config::{Difficulty, LevelParams};
use piece_generator::export;
use piece_generator::geometry::Winding;
use piece_generator::mesh::{build_level_meshes, MeshOptions, PieceMesh, UvFrame};
use piece_generator::pieces::{check_partition, generate_level, generate_level_pack, LevelGeneration};
use piece_generator::seeds::LevelSeeds;

#[derive(Parser, Debug)]
#[command(name = "piece_generator")]
#[command(about = "Generate puzzle levels: a square board partitioned into connected pieces, with one mesh per piece")]
struct Args {
    /// Difficulty preset (easy, medium, hard)
    #[arg(short, long, default_value = "easy")]
    difficulty: String,

    /// Load generation parameters from a JSON file (overrides the preset)
    #[arg(long)]
    config: Option<String>,

    /// Board side length in cells
    #[arg(short = 'b', long)]
    board_size: Option<usize>,

    /// Maximum number of pieces
    #[arg(short = 'p', long)]
    pieces: Option<usize>,

    /// Smallest piece size drawn per piece
    #[arg(long)]
    min_size: Option<usize>,

    /// Largest piece size drawn per piece
    #[arg(long)]
    max_size: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// World units per cell in the meshes
    #[arg(long, default_value = "1.0")]
    cell_size: f32,

    /// Emit counter-clockwise triangles instead of clockwise
    #[arg(long)]
    ccw: bool,

    /// Map texture coordinates over the whole board instead of each piece
    #[arg(long)]
    board_uv: bool,

    /// Number of levels to generate (each from its own derived seed)
    #[arg(short = 'n', long, default_value = "1")]
    levels: usize,

    /// Export level and meshes as JSON (e.g., "level.json")
    #[arg(long)]
    export_json: Option<String>,

    /// Export the board as a PNG (e.g., "level.png")
    #[arg(long)]
    export_png: Option<String>,

    /// Pixels per cell in the PNG export
    #[arg(long, default_value = "32")]
    png_cell_px: u32,

    /// Export an ASCII rendering of the board (e.g., "level.txt")
    #[arg(long)]
    export_ascii: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => LogLevel::TRACE,
        "debug" => LogLevel::DEBUG,
        "info" => LogLevel::INFO,
        "warn" => LogLevel::WARN,
        "error" => LogLevel::ERROR,
        _ => LogLevel::WARN,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let params = resolve_params(args)?;
    params.validate().map_err(|e| e.to_string())?;

    let options = MeshOptions {
        cell_size: args.cell_size,
        simplify: true,
        winding: if args.ccw { Winding::CounterClockwise } else { Winding::Clockwise },
        uv_frame: if args.board_uv {
            UvFrame::Board { board_size: params.board_size }
        } else {
            UvFrame::Piece
        },
    };
    options.validate().map_err(|e| e.to_string())?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let seeds = LevelSeeds::from_master(seed);

    println!("Generating level with seed: {}", seed);
    println!(
        "Board: {}x{}, up to {} pieces of {}-{} cells",
        params.board_size,
        params.board_size,
        params.piece_count,
        params.min_piece_size,
        params.max_piece_size
    );
    if !params.can_cover_board() {
        println!("Note: piece budget cannot cover the whole board");
    }

    let generations = if args.levels > 1 {
        println!("Generating {} levels...", args.levels);
        generate_level_pack(&params, &seeds, args.levels).map_err(|e| e.to_string())?
    } else {
        let mut rng = seeds.layout_rng();
        vec![generate_level(&params, &mut rng).map_err(|e| e.to_string())?]
    };

    let batch = generations.len() > 1;
    for (i, generation) in generations.iter().enumerate() {
        if batch {
            println!();
            println!("=== Level {} (seed {}) ===", i, seeds.level(i));
        }

        println!("Building piece meshes...");
        let meshes = build_level_meshes(&generation.level, &options);
        report_level(generation, &meshes);

        let level_seed = if batch { seeds.level(i) } else { seed };
        export_level(args, generation, &meshes, level_seed, batch.then_some(i))?;
    }

    Ok(())
}

/// Preset, then config file, then individual flags.
fn resolve_params(args: &Args) -> Result<LevelParams, String> {
    let mut params = match &args.config {
        Some(path) => {
            println!("Loading parameters from {}", path);
            LevelParams::load_json(path).map_err(|e| e.to_string())?
        }
        None => Difficulty::from_str(&args.difficulty)
            .ok_or_else(|| format!("Unknown difficulty '{}'", args.difficulty))?
            .params(),
    };

    if let Some(board_size) = args.board_size {
        params.board_size = board_size;
    }
    if let Some(pieces) = args.pieces {
        params.piece_count = pieces;
    }
    if let Some(min_size) = args.min_size {
        params.min_piece_size = min_size;
    }
    if let Some(max_size) = args.max_size {
        params.max_piece_size = max_size;
    }

    Ok(params)
}

fn report_level(generation: &LevelGeneration, meshes: &[PieceMesh]) {
    let level = &generation.level;
    println!("Created {} pieces, coverage: {}", level.pieces.len(), generation.coverage);

    for (piece, mesh) in level.pieces.iter().zip(meshes) {
        let status = if mesh.is_complete() { "" } else { " (incomplete)" };
        println!(
            "  {} {:>2} cells  {}  {:>3} vertices {:>3} triangles{}",
            piece.id,
            piece.len(),
            piece.color,
            mesh.vertex_count(),
            mesh.triangle_count(),
            status
        );
    }

    let report = check_partition(level);
    if !report.is_valid() {
        println!("Warning: level failed partition check: {:?}", report);
    }

    print!("{}", ascii::render_level(level));
}

fn export_level(
    args: &Args,
    generation: &LevelGeneration,
    meshes: &[PieceMesh],
    seed: u64,
    index: Option<usize>,
) -> Result<(), String> {
    let level = &generation.level;

    if let Some(path) = &args.export_json {
        let path = indexed_path(path, index);
        println!("Exporting JSON to {}...", path);
        export::export_level_json(level, meshes, seed, &path).map_err(|e| e.to_string())?;
    }

    if let Some(path) = &args.export_png {
        let path = indexed_path(path, index);
        println!("Exporting PNG to {}...", path);
        export::export_level_png(level, args.png_cell_px, &path).map_err(|e| e.to_string())?;
    }

    if let Some(path) = &args.export_ascii {
        let path = indexed_path(path, index);
        println!("Exporting ASCII map to {}...", path);
        ascii::export_level_text(level, seed, &path).map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// `level.json` becomes `level_3.json` for the fourth level of a batch.
fn indexed_path(path: &str, index: Option<usize>) -> String {
    let Some(i) = index else {
        return path.to_string();
    };
    let p = Path::new(path);
    let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("level");
    let file = match p.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, i, ext),
        None => format!("{}_{}", stem, i),
    };
    p.with_file_name(file).to_string_lossy().into_owned()
}
