//! Biome map renderer: builds a world map and paints it to a PNG.
//!
//! Usage: cargo run --release --bin render_map -- [OPTIONS]
//!
//! Options:
//!   --seed <SEED>      Map seed (default: "biomap")
//!   --tile <SIZE>      Tile size in world units (default: 64)
//!   --width <PX>       Image width in pixels (default: 1024)
//!   --height <PX>      Image height in pixels (default: 1024)
//!   --scale <UNITS>    World units per pixel (default: 1.0)
//!   --out <PATH>       Output PNG (default: biomap.png)
//!   --catalog <PATH>   Biome catalog JSON (default: built-in catalog)
//!   --config <PATH>    Map config JSON; --tile overrides its tile size
//!
//! The image is centred on the world origin. Each pixel takes the colour of
//! the biome of its nearest point, which fills Voronoi cells exactly; cell
//! borders are darkened.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use biomap::core::logging;
use biomap::math::Rect;
use biomap::terrain::BiomeCatalog;
use biomap::world::{GridPoint, MapConfig, WorldMap};

const BORDER_SHADE: f32 = 0.6;
const MISSING_COLOR: [u8; 3] = [0, 0, 0];

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("render_map failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let seed = parse_str_arg(&args, "--seed").unwrap_or_else(|| "biomap".to_string());
    let width = parse_u32_arg(&args, "--width").unwrap_or(1024);
    let height = parse_u32_arg(&args, "--height").unwrap_or(1024);
    let scale = parse_f64_arg(&args, "--scale").unwrap_or(1.0);
    let out = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "biomap.png".to_string()));

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => MapConfig::load(&PathBuf::from(path))?,
        None => MapConfig::default(),
    };
    if let Some(tile) = parse_f64_arg(&args, "--tile") {
        config.tile_size = tile;
    }

    let catalog = match parse_str_arg(&args, "--catalog") {
        Some(path) => BiomeCatalog::load(&PathBuf::from(path))?,
        None => BiomeCatalog::builtin()?,
    };

    if width == 0 || height == 0 || !(scale > 0.0) {
        return Err(format!("invalid image size {}x{} at scale {}", width, height, scale).into());
    }

    let half_w = width as f64 * scale * 0.5;
    let half_h = height as f64 * scale * 0.5;
    // One extra pixel so border detection can look right and down.
    let bounds = Rect::new(-half_w, half_w + scale, -half_h, half_h + scale);

    println!("=== Biomap Renderer ===");
    println!("Seed:   {}", seed);
    println!("Tile:   {}", config.tile_size);
    println!("Image:  {} x {} px at {} units/px", width, height, scale);
    println!("Output: {}", out.display());
    println!();

    let start = Instant::now();
    let map = WorldMap::with_config(&seed, bounds, config, Arc::new(catalog))?;
    println!(
        "Generated {} blocks, {} points, {} triangles in {:.2}s",
        map.block_count(),
        map.view_point_count(),
        map.triangulation().triangle_count(),
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let row_bytes = width as usize * 3;
    let mut pixels = vec![0u8; row_bytes * height as usize];
    pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(py, row)| render_row(&map, py, row, width, scale, half_w, half_h));

    let img = image::RgbImage::from_raw(width, height, pixels)
        .ok_or("pixel buffer does not match image size")?;
    img.save(&out)?;

    println!("Rendered in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn render_row(map: &WorldMap, py: usize, row: &mut [u8], width: u32, scale: f64, half_w: f64, half_h: f64) {
    let y = py as f64 * scale - half_h;

    for px in 0..width as usize {
        let x = px as f64 * scale - half_w;
        let here = map.nearest_point(x, y);

        let border = [(x + scale, y), (x, y + scale)]
            .iter()
            .any(|&(nx, ny)| !same_cell(here, map.nearest_point(nx, ny)));

        let mut rgb = here
            .and_then(|p| map.biome(p))
            .map(|b| b.rgb())
            .unwrap_or(MISSING_COLOR);
        if border {
            for c in &mut rgb {
                *c = (*c as f32 * BORDER_SHADE) as u8;
            }
        }
        row[px * 3..px * 3 + 3].copy_from_slice(&rgb);
    }
}

fn same_cell(a: Option<&GridPoint>, b: Option<&GridPoint>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.row == b.row && a.col == b.col,
        (None, None) => true,
        _ => false,
    }
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
