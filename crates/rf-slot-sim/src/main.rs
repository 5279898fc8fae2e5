//! ReelForge Slot Simulator
//!
//! Usage:
//!   rf-slot-sim --spins 100 --seed 42
//!   rf-slot-sim --config game.yaml --assets ./public --json

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use rf_slot_core::{
    AssetLoader, AssetProvider, FileFetcher, PerformanceMonitor, RenderingCounts, SlotConfig,
    SlotMachine, SpinOutcome, symbol_texture_key,
};
use rf_sprite_pool::{GroupOptions, HandleId, RenderHandle, RenderOptimizer, ResourcePool, Sprite};

const SYMBOL_POOL: &str = "symbols";
const EFFECT_POOL: &str = "effects";
const REEL_GROUP: &str = "reels";

const SYMBOL_SIZE: f32 = 150.0;
const VIEWPORT: (f32, f32) = (1280.0, 720.0);

#[derive(Parser)]
#[command(name = "rf-slot-sim", about = "ReelForge headless slot simulator")]
struct Cli {
    /// Number of spins to run
    #[arg(short = 'n', long, default_value_t = 10)]
    spins: u64,

    /// Seed for a reproducible run (OS entropy otherwise)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Game config (.json, .yaml, .yml); built-in classic game otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the asset manifest paths are resolved against
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Only print the final report
    #[arg(short, long)]
    quiet: bool,
}

/// Sprites standing in for the rendered reel window
struct Presentation {
    pool: ResourcePool<Sprite>,
    optimizer: RenderOptimizer,
    on_screen: Vec<HandleId>,
}

impl Presentation {
    fn new(columns: usize, rows: usize) -> Self {
        let mut pool = ResourcePool::new();
        pool.create_pool(SYMBOL_POOL, || Sprite::new(SYMBOL_SIZE, SYMBOL_SIZE), columns * rows);
        pool.create_pool(EFFECT_POOL, || Sprite::new(SYMBOL_SIZE, SYMBOL_SIZE), 10);

        let mut optimizer = RenderOptimizer::new(VIEWPORT.0, VIEWPORT.1);
        optimizer.create_render_group(REEL_GROUP, GroupOptions::default());

        Self {
            pool,
            optimizer,
            on_screen: Vec::new(),
        }
    }

    /// Swap the previous grid's sprites for the new grid, flash the wins
    ///
    /// Returns what a renderer would have drawn for the frame.
    fn show(&mut self, outcome: &SpinOutcome) -> Result<RenderingCounts> {
        for id in std::mem::take(&mut self.on_screen) {
            self.optimizer.remove_from_group(REEL_GROUP, id)?;
        }
        self.pool.return_all_sprites(SYMBOL_POOL)?;

        for (row, symbols) in outcome.grid.rows().iter().enumerate() {
            for (column, symbol) in symbols.iter().enumerate() {
                let id = self.pool.get_sprite(SYMBOL_POOL)?.id;
                if let Some(sprite) = self.pool.handle_mut(SYMBOL_POOL, id) {
                    sprite.set_position(column as f32 * SYMBOL_SIZE, row as f32 * SYMBOL_SIZE);
                    sprite.set_texture(symbol_texture_key(symbol));
                }
                self.optimizer.add_to_group(REEL_GROUP, id)?;
                self.on_screen.push(id);
            }
        }

        let mut highlights = Vec::new();
        for win in &outcome.wins.win_details {
            for _ in 0..win.count {
                highlights.push(self.pool.get_sprite(EFFECT_POOL)?.id);
            }
        }

        let frame_start = Instant::now();
        self.optimizer.tick(&mut self.pool);
        self.optimizer.record_frame_time(frame_start.elapsed());

        let counts = self.rendering_counts(highlights.len() as u64);

        for id in highlights {
            self.pool.return_sprite(EFFECT_POOL, id)?;
        }
        Ok(counts)
    }

    /// One draw call per visible sprite; a swap whenever the texture changes
    /// between consecutive draws
    fn rendering_counts(&self, highlights: u64) -> RenderingCounts {
        let mut draw_calls = highlights;
        let mut texture_swaps = 0;
        let mut batches = u64::from(highlights > 0);
        let mut bound: Option<&str> = None;

        for &id in &self.on_screen {
            let Some(sprite) = self.pool.handle(SYMBOL_POOL, id) else {
                continue;
            };
            if !sprite.is_visible() {
                continue;
            }
            draw_calls += 1;
            let texture = sprite.state.texture.as_deref();
            if bound.is_some() && bound != texture {
                texture_swaps += 1;
            }
            if bound != texture {
                batches += 1;
            }
            bound = texture;
        }

        RenderingCounts {
            draw_calls,
            texture_swaps,
            vertices_drawn: draw_calls * 4,
            batches_drawn: batches,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting ReelForge slot simulator...");

    let config = match &cli.config {
        Some(path) => SlotConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlotConfig::classic(),
    };

    if let Some(root) = &cli.assets {
        let mut loader = AssetLoader::new(&config.assets, FileFetcher::new(root));
        loader.set_progress_callback(|percent| log::debug!("Assets {percent}%"));
        let textures = loader
            .load_all()
            .with_context(|| format!("Failed to load assets from {}", root.display()))?;
        log::info!("Loaded {} textures", textures.len());
    }

    let monitor = Arc::new(PerformanceMonitor::new());
    let mut machine = match cli.seed {
        Some(seed) => SlotMachine::seeded(&config, seed, monitor.clone()),
        None => SlotMachine::new(&config, monitor.clone()),
    }
    .context("Failed to build slot machine")?;

    let mut presentation = Presentation::new(config.grid.columns, config.grid.rows);
    let mut total_won = 0.0;
    let mut winning_spins = 0u64;

    for _ in 0..cli.spins {
        let frame_start = Instant::now();
        let outcome = machine.spin().context("Spin evaluation failed")?;
        let rendering = presentation.show(&outcome)?;
        monitor.record_rendering(rendering);
        monitor.record_frame(frame_start.elapsed());

        total_won += outcome.total_wins();
        if outcome.wins.is_win() {
            winning_spins += 1;
        }

        if !cli.quiet && !cli.json {
            println!("{} {:?}", outcome.spin_id, outcome.positions);
            for row in outcome.grid.rows() {
                let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
                println!("  {}", cells.join(" "));
            }
            print!("{}", outcome.display);
            if !outcome.display.ends_with('\n') {
                println!();
            }
        }
    }

    for name in [SYMBOL_POOL, EFFECT_POOL] {
        presentation.pool.optimize_pool(name)?;
    }

    let performance = monitor.metrics();
    let warnings = monitor.warnings();
    for warning in &warnings {
        log::warn!("{warning}");
    }
    let counts = performance.game;
    let stats = presentation.pool.stats();
    let pools = presentation.pool.all_pools_info();
    let render = presentation.optimizer.metrics();

    if cli.json {
        let report = serde_json::json!({
            "spins": machine.spin_count(),
            "winning_spins": winning_spins,
            "total_won": total_won,
            "events": counts,
            "performance": performance,
            "warnings": warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "pool_stats": stats,
            "efficiency": stats.efficiency(),
            "pools": pools,
            "render": render,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!();
        println!(
            "Spins: {}  Winning: {}  Total won: {}",
            machine.spin_count(),
            winning_spins,
            total_won
        );
        println!(
            "Events: {} spins, {} symbol updates, {} evaluations",
            counts.spins_performed, counts.symbols_updated, counts.wins_calculated
        );
        println!(
            "Pool: created {}, reused {}, returned {}, efficiency {:.1}%",
            stats.created,
            stats.reused,
            stats.returned,
            stats.efficiency()
        );
        for info in &pools {
            println!(
                "  {}: {} available, {} active, {} created (max {})",
                info.name, info.available, info.active, info.total_created, info.max_size
            );
        }
        println!(
            "Render: {} frames, {} culled, {:.0} fps",
            render.frame_count, render.culled, render.average_fps
        );
        let rate = performance.frame_rate;
        println!(
            "Frame rate: current {:.0}, average {:.0}, min {:.0}, max {:.0} over {} frames in {:.2}s",
            rate.current,
            rate.average,
            rate.min,
            rate.max,
            performance.total_frames,
            performance.uptime_secs
        );
        println!(
            "Last frame: {} draw calls, {} texture swaps, {} batches",
            performance.rendering.draw_calls,
            performance.rendering.texture_swaps,
            performance.rendering.batches_drawn
        );
        for warning in &warnings {
            println!("Warning: {warning}");
        }
    }

    Ok(())
}
