//! Battery Pack Designer
//!
//! Finds and ranks series/parallel battery packs for a set of requirements.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pack_designer::explorer::CellFilter;
use pack_designer::requirements::{RawValue, RequirementsInput, find_preset};
use pack_designer::{Catalogue, db, design, import, report};

#[derive(Parser)]
#[command(name = "pack-designer")]
#[command(about = "Battery pack configuration search over a cell and component catalogue")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "pack_data.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Replace the stored catalogue with the built-in one
    LoadSample,

    /// Import cells.json / components.json files from a directory tree
    Import {
        /// Directory to scan
        source_dir: PathBuf,

        /// Clear existing catalogue before import
        #[arg(long)]
        clear: bool,
    },

    /// List cells, optionally filtered
    Cells(CellArgs),

    /// Show details for a specific cell
    Cell {
        /// Cell model number (e.g. "LF280K")
        model: String,

        /// Use the built-in catalogue instead of the database
        #[arg(long)]
        builtin: bool,
    },

    /// List fuses, relays, cables, BMS and shunts
    Components {
        #[arg(long)]
        builtin: bool,
    },

    /// List requirement presets
    Presets,

    /// Search for pack configurations
    Design(DesignArgs),
}

#[derive(Args)]
struct CellArgs {
    #[arg(long)]
    brand: Option<String>,
    /// Chemistry, e.g. LFP or NMC
    #[arg(long)]
    chemistry: Option<String>,
    /// Text to look for in brand or model
    #[arg(short, long)]
    query: Option<String>,
    /// Minimum capacity (Ah)
    #[arg(long)]
    min_capacity: Option<f64>,
    /// Maximum capacity (Ah)
    #[arg(long)]
    max_capacity: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    /// Minimum continuous discharge C-rate
    #[arg(long)]
    min_discharge: Option<f64>,
    #[arg(long)]
    builtin: bool,
}

#[derive(Args)]
struct DesignArgs {
    /// Start from a named preset (see `presets`)
    #[arg(short, long)]
    preset: Option<String>,

    /// JSON file with requirement values
    #[arg(short, long)]
    requirements: Option<PathBuf>,

    /// Minimum nominal pack voltage (V)
    #[arg(long)]
    min_voltage: Option<String>,
    /// Maximum nominal pack voltage (V)
    #[arg(long)]
    max_voltage: Option<String>,
    /// Minimum energy (Wh)
    #[arg(long)]
    min_energy: Option<String>,
    /// Minimum continuous power (W)
    #[arg(long)]
    min_power: Option<String>,
    /// Maximum weight (kg)
    #[arg(long)]
    max_weight: Option<String>,
    #[arg(long)]
    max_price: Option<String>,
    /// Maximum footprint along X (mm)
    #[arg(long)]
    max_width: Option<String>,
    /// Maximum footprint along Y (mm)
    #[arg(long)]
    max_length: Option<String>,
    /// Maximum height (mm)
    #[arg(long)]
    max_height: Option<String>,
    /// Ambient temperature (°C)
    #[arg(long)]
    ambient_temp: Option<String>,

    /// Use the built-in catalogue instead of the database
    #[arg(long)]
    builtin: bool,

    /// Print the ranked result as JSON
    #[arg(long)]
    json: bool,

    /// Include search statistics
    #[arg(long)]
    stats: bool,

    /// Number of configurations to print
    #[arg(short, long, default_value = "30")]
    limit: usize,

    /// Show a full breakdown of the best configuration
    #[arg(short, long)]
    verbose: bool,
}

impl DesignArgs {
    /// Requirement values given directly on the command line
    fn flag_input(&self) -> RequirementsInput {
        let text = |v: &Option<String>| v.as_deref().map(RawValue::from);
        RequirementsInput {
            min_voltage: text(&self.min_voltage),
            max_voltage: text(&self.max_voltage),
            min_energy: text(&self.min_energy),
            min_continuous_power: text(&self.min_power),
            max_weight: text(&self.max_weight),
            max_price: text(&self.max_price),
            max_width: text(&self.max_width),
            max_length: text(&self.max_length),
            max_height: text(&self.max_height),
            ambient_temp: text(&self.ambient_temp),
        }
    }

    /// Preset, then requirements file, then flags
    fn requirements_input(&self) -> Result<RequirementsInput> {
        let mut input = RequirementsInput::default();

        if let Some(name) = &self.preset
            && let Some(preset) = find_preset(name)?
        {
            info!(preset = preset.name, "applying preset");
            input = input.overlay(preset.to_input());
        }

        if let Some(path) = &self.requirements {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let from_file: RequirementsInput = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            input = input.overlay(from_file);
        }

        Ok(input.overlay(self.flag_input()))
    }
}

/// The stored catalogue, or the built-in one if asked for or nothing is stored
fn load_catalogue(conn: &Connection, builtin: bool) -> Result<Catalogue> {
    if builtin {
        return Ok(Catalogue::builtin());
    }
    if db::count_cells(conn)? == 0 {
        info!("database holds no cells, using built-in catalogue");
        return Ok(Catalogue::builtin());
    }

    let catalogue = db::load_catalogue(conn).context("Failed to load catalogue")?;
    for violation in catalogue.validate() {
        warn!(%violation, "catalogue record breaks an invariant");
    }
    Ok(catalogue)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let catalogue = Catalogue::builtin();
            db::clear_catalogue(&conn)?;
            db::store_catalogue(&mut conn, &catalogue)?;
            println!(
                "Loaded {} cells and {} components.",
                catalogue.cells.len(),
                catalogue.components.len()
            );
        }

        Commands::Import { source_dir, clear } => {
            if !source_dir.is_dir() {
                bail!("{} is not a directory", source_dir.display());
            }
            if clear {
                println!("Clearing existing catalogue...");
                db::clear_catalogue(&conn)?;
            }

            let stats = import::import_to_database(&mut conn, &source_dir)?;
            println!("\n{}", stats);
        }

        Commands::Cells(args) => {
            let catalogue = load_catalogue(&conn, args.builtin)?;
            let filter = CellFilter {
                brand: args.brand,
                chemistry: args.chemistry,
                query: args.query,
                min_capacity_ah: args.min_capacity,
                max_capacity_ah: args.max_capacity,
                max_price: args.max_price,
                min_discharge_rate: args.min_discharge,
            };
            let cells = filter.apply(&catalogue.cells);
            if cells.is_empty() {
                println!("No cells match.");
            } else {
                print!("{}", report::format_cell_table(&cells));
                println!("\n{} of {} cells", cells.len(), catalogue.cells.len());
            }
        }

        Commands::Cell { model, builtin } => {
            let catalogue = load_catalogue(&conn, builtin)?;
            match catalogue.find_cell(&model) {
                Some(cell) => print!("{}", report::format_cell(cell)),
                None => println!("Cell '{}' not found", model),
            }
        }

        Commands::Components { builtin } => {
            let catalogue = load_catalogue(&conn, builtin)?;
            print!("{}", report::format_components(&catalogue.components));
        }

        Commands::Presets => {
            print!("{}", report::format_presets());
        }

        Commands::Design(args) => {
            let requirements = args.requirements_input()?.resolve()?;
            let catalogue = load_catalogue(&conn, args.builtin)?;
            info!(
                cells = catalogue.cells.len(),
                components = catalogue.components.len(),
                "searching"
            );

            let result = design(&requirements, &catalogue, args.stats);

            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            print!("{}", report::format_results(&result, args.limit));
            if args.verbose
                && let Some(best) = result.results.first()
            {
                println!("\nBest configuration:\n");
                print!("{}", report::format_configuration(best));
            }
            if let Some(stats) = &result.stats {
                println!("\n{}", stats);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn design_args(args: &[&str]) -> DesignArgs {
        let argv = ["pack-designer", "design"].iter().chain(args).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Design(args) => args,
            _ => panic!("not a design command"),
        }
    }

    #[test]
    fn flags_override_preset() {
        let args = design_args(&["--preset", "solar_48v", "--min-voltage", "46V"]);
        let resolved = args.requirements_input().unwrap().resolve().unwrap();
        assert_relative_eq!(resolved.min_voltage, 46.0);
        assert_relative_eq!(resolved.max_voltage, 56.0);
        assert_relative_eq!(resolved.max_weight, 100.0);
    }

    #[test]
    fn custom_preset_keeps_defaults() {
        let args = design_args(&["--preset", "custom"]);
        let resolved = args.requirements_input().unwrap().resolve().unwrap();
        assert_eq!(resolved, pack_designer::requirements::DEFAULT_REQUIREMENTS);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let args = design_args(&["--preset", "forklift"]);
        assert!(args.requirements_input().is_err());
    }
}
