use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use yardgrid::config::FileConfig;
use yardgrid::domain::{
    EngineType, MotorcycleDetails, MotorcycleId, SectorId, SectorTypeId, SpotId, YardId,
};
use yardgrid::geometry::{Boundary, PolygonPoint};
use yardgrid::ops::{self, GenerationMode};
use yardgrid::store::MemoryStore;

/// Lay out parking spots over yard sectors and track which motorcycle sits where
///
/// Examples:
///   # Create a yard and a sector inside it
///   yardgrid yard add "North lot" "0,0 40,0 40,20 0,20"
///   yardgrid sector-type add Parking
///   yardgrid sector add <YARD_ID> <TYPE_ID> "0,0 20,0 20,20 0,20"
///
///   # Fill the sector with 2x1 spots, then park a motorcycle
///   yardgrid sector generate <SECTOR_ID> --width 2 --height 1
///   yardgrid motorcycle add "Pop 110i" combustion ABC1D23 2025-01-15 --spot <SPOT_ID>
///
///   # Move it elsewhere, or release it
///   yardgrid motorcycle move <MOTORCYCLE_ID> --spot <SPOT_ID>
///   yardgrid motorcycle move <MOTORCYCLE_ID>
#[derive(Parser, Debug)]
#[command(name = "yardgrid")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches yardgrid.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot file holding the yard state (defaults to yardgrid.json)
    #[arg(short = 's', long, global = true)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage yards
    #[command(subcommand)]
    Yard(YardCommand),

    /// Manage sector types
    #[command(subcommand)]
    SectorType(SectorTypeCommand),

    /// Manage sectors and their spots
    #[command(subcommand)]
    Sector(SectorCommand),

    /// Manage motorcycles and their spot assignments
    #[command(subcommand)]
    Motorcycle(MotorcycleCommand),

    /// Print every yard, sector and motorcycle in the store
    Show,
}

#[derive(Subcommand, Debug)]
enum YardCommand {
    /// Create a yard from a boundary like "0,0 10,0 10,10 0,10"
    Add { name: String, boundary: String },
}

#[derive(Subcommand, Debug)]
enum SectorTypeCommand {
    Add { name: String },
}

#[derive(Subcommand, Debug)]
enum SectorCommand {
    /// Create a sector inside a yard. Spots are not generated.
    Add {
        yard: YardId,
        sector_type: SectorTypeId,
        boundary: String,
    },

    /// Generate a grid of spots inside the sector
    Generate {
        sector: SectorId,

        /// Spot width (defaults to spot_width from config, else 2.0)
        #[arg(long)]
        width: Option<f64>,

        /// Spot height (defaults to spot_height from config, else 1.0)
        #[arg(long)]
        height: Option<f64>,

        /// Discard the existing spots first
        #[arg(long)]
        replace: bool,
    },

    /// Delete a sector and all of its spots
    Delete { sector: SectorId },
}

#[derive(Subcommand, Debug)]
enum MotorcycleCommand {
    /// Register a motorcycle, optionally parking it right away
    Add {
        model: String,
        engine_type: EngineType,
        plate: String,
        /// Last revision date, YYYY-MM-DD
        last_revision_date: NaiveDate,
        #[arg(long)]
        spot: Option<SpotId>,
    },

    /// Move a motorcycle to a spot, or release it when --spot is omitted
    Move {
        motorcycle: MotorcycleId,
        #[arg(long)]
        spot: Option<SpotId>,
    },

    /// Release a motorcycle's spot and delete it
    Delete { motorcycle: MotorcycleId },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            Some(
                FileConfig::load_from(config_path)
                    .context(format!("Failed to read config file: {:?}", config_path))?,
            )
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };
    let file_config = file_config.unwrap_or_default();

    let store_path = args.store.clone().unwrap_or_else(|| file_config.store.clone());
    let verbose = args.verbose || file_config.verbose;

    if verbose {
        println!("Configuration:");
        println!("  Store: {}", store_path.display());
        println!(
            "  Default spot footprint: {} x {}",
            file_config.spot_width, file_config.spot_height
        );
        println!();
    }

    let spinner = create_spinner("Loading yard state...");
    let start = Instant::now();
    let store = MemoryStore::open(&store_path)
        .context(format!("Failed to load store: {}", store_path.display()))?;
    spinner.finish_with_message(format!(
        "Loaded {} sector(s), {} spot(s), {} motorcycle(s) [{:.1}s]",
        store.sectors().len(),
        store.spot_count(),
        store.motorcycles().len(),
        start.elapsed().as_secs_f32()
    ));

    let changed = match args.command {
        Command::Yard(YardCommand::Add { name, boundary }) => {
            let boundary = Boundary::new(parse_boundary(&boundary)?);
            let yard = ops::create_yard(&store, &name, boundary).context("Failed to create yard")?;
            println!("Created yard {} ({})", yard.id(), yard.name());
            if verbose {
                println!("  Area: {:.2}", yard.boundary().area());
            }
            true
        }
        Command::SectorType(SectorTypeCommand::Add { name }) => {
            let sector_type =
                ops::create_sector_type(&store, &name).context("Failed to create sector type")?;
            println!("Created sector type {} ({})", sector_type.id(), sector_type.name());
            true
        }
        Command::Sector(SectorCommand::Add {
            yard,
            sector_type,
            boundary,
        }) => {
            let points = parse_boundary(&boundary)?;
            let sector = ops::create_sector(&store, yard, sector_type, points)
                .context("Failed to create sector")?;
            println!("Created sector {}", sector.id());
            if verbose {
                println!("  Vertices: {}", sector.boundary().len());
                println!("  Area: {:.2}", sector.boundary().area());
            }
            true
        }
        Command::Sector(SectorCommand::Generate {
            sector,
            width,
            height,
            replace,
        }) => {
            let width = width.unwrap_or(file_config.spot_width);
            let height = height.unwrap_or(file_config.spot_height);
            let mode = if replace {
                GenerationMode::Replace
            } else {
                GenerationMode::Append
            };

            let spinner = create_spinner("Generating spots...");
            let start = Instant::now();
            let spots = ops::generate_sector_spots(&store, sector, width, height, mode)
                .context("Failed to generate spots")?;
            spinner.finish_with_message(format!(
                "Generated {} spot(s) of {} x {} [{:.1}s]",
                spots.len(),
                width,
                height,
                start.elapsed().as_secs_f32()
            ));
            if verbose {
                for spot in &spots {
                    println!("  {} at ({:.3}, {:.3})", spot.id(), spot.x(), spot.y());
                }
            }
            true
        }
        Command::Sector(SectorCommand::Delete { sector }) => {
            ops::delete_sector(&store, sector).context("Failed to delete sector")?;
            println!("Deleted sector {}", sector);
            true
        }
        Command::Motorcycle(MotorcycleCommand::Add {
            model,
            engine_type,
            plate,
            last_revision_date,
            spot,
        }) => {
            let details = MotorcycleDetails {
                model,
                engine_type,
                plate,
                last_revision_date,
            };
            let motorcycle = ops::create_motorcycle(&store, details, spot)
                .context("Failed to create motorcycle")?;
            println!("Created motorcycle {} ({})", motorcycle.id(), motorcycle.plate());
            if let Some(spot) = motorcycle.spot_id() {
                println!("  Parked on spot {}", spot);
            }
            true
        }
        Command::Motorcycle(MotorcycleCommand::Move { motorcycle, spot }) => {
            let moved = ops::relocate_motorcycle(&store, motorcycle, spot)
                .context("Failed to relocate motorcycle")?;
            match moved.spot_id() {
                Some(spot) => println!("Motorcycle {} is now on spot {}", moved.id(), spot),
                None => println!("Motorcycle {} released its spot", moved.id()),
            }
            if verbose {
                for movement in store.movements_for(moved.id()) {
                    println!("  {} {}", movement.created_at.to_rfc3339(), movement.message);
                }
            }
            true
        }
        Command::Motorcycle(MotorcycleCommand::Delete { motorcycle }) => {
            ops::delete_motorcycle(&store, motorcycle).context("Failed to delete motorcycle")?;
            println!("Deleted motorcycle {}", motorcycle);
            true
        }
        Command::Show => {
            show(&store, verbose);
            false
        }
    };

    if changed {
        let spinner = create_spinner("Saving yard state...");
        store
            .save_snapshot(&store_path)
            .context(format!("Failed to write store: {}", store_path.display()))?;
        spinner.finish_with_message(format!("Saved {}", store_path.display()));
    }

    if verbose {
        println!("Done in {:.1}s", total_start.elapsed().as_secs_f32());
    }

    Ok(())
}

fn show(store: &MemoryStore, verbose: bool) {
    let sector_types = store.sector_types();
    let type_name = |id: SectorTypeId| {
        sector_types
            .iter()
            .find(|t| t.id() == id)
            .map(|t| t.name().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    };

    for yard in store.yards() {
        println!("Yard {} ({})", yard.id(), yard.name());
        for sector in store.sectors_in_yard(yard.id()) {
            println!(
                "  Sector {} [{}]: {} spot(s), {} occupied",
                sector.id(),
                type_name(sector.sector_type_id()),
                sector.spots().len(),
                sector.occupied_count()
            );
            if verbose {
                for spot in sector.spots() {
                    match spot.occupant() {
                        Some(m) => {
                            println!("    {} ({:.3}, {:.3}) -> {}", spot.id(), spot.x(), spot.y(), m)
                        }
                        None => println!("    {} ({:.3}, {:.3})", spot.id(), spot.x(), spot.y()),
                    }
                }
            }
        }
    }

    let motorcycles = store.motorcycles();
    if !motorcycles.is_empty() {
        println!("Motorcycles:");
    }
    for motorcycle in motorcycles {
        let place = motorcycle
            .spot_id()
            .map(|s| format!("spot {}", s))
            .unwrap_or_else(|| "unassigned".to_string());
        println!(
            "  {} {} {} ({}, revised {}) - {}",
            motorcycle.id(),
            motorcycle.plate(),
            motorcycle.model(),
            motorcycle.engine_type(),
            motorcycle.last_revision_date(),
            place
        );
    }
}

/// Parse `"x,y x,y ..."` into ordered boundary points
fn parse_boundary(input: &str) -> Result<Vec<PolygonPoint>> {
    let mut points = Vec::new();
    for (order, pair) in input.split_whitespace().enumerate() {
        let Some((x, y)) = pair.split_once(',') else {
            bail!("Invalid boundary point {:?}, expected x,y", pair);
        };
        let x: f64 = x
            .trim()
            .parse()
            .context(format!("Invalid x coordinate in {:?}", pair))?;
        let y: f64 = y
            .trim()
            .parse()
            .context(format!("Invalid y coordinate in {:?}", pair))?;
        points.push(PolygonPoint::new(order as i32, x, y));
    }
    if points.len() < 3 {
        bail!(
            "Boundary needs at least 3 points, got {}: {:?}",
            points.len(),
            input
        );
    }
    Ok(points)
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
