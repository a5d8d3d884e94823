//! Figure generator for engine results
//!
//! Usage:
//!   cargo run --bin plot_results -- time results/curated/coopfight_time_<fragment>.json
//!   cargo run --bin plot_results -- events results/curated/coopfight_events_<fragment>.json --export-csv events.csv
//!   cargo run --bin plot_results -- --config plot.toml global results/curated/coopfight_global_10000.csv

use clap::{Parser, Subcommand};
use coopfight::config::{load_json_file, PlotConfig};
use coopfight::events::{
    assemble_fight_events_to_columns, assemble_fight_events_to_table, load_fight_results,
};
use coopfight::plots::{
    plot_panel_fighting_events_density, plot_panel_fighting_events_scatter,
    plot_panel_fighting_events_time_series, plot_panel_global_fractions, plot_panel_time_series,
};
use coopfight::stats::compute_win_fractions;
use coopfight::table::ParameterTable;
use coopfight::TimeSeries;
use naming::{decode_game, fragment_from_file_name};
use std::path::{Path, PathBuf};

type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "plot_results")]
#[command(about = "Render the standard coopfight figures from engine result files")]
struct Cli {
    /// Plot configuration (TOML); defaults apply when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Population fractions and payoffs over time
    Time {
        /// `coopfight_time_*.json` result file
        input: PathBuf,

        /// Game fragment, instead of the one in the file name
        #[arg(long)]
        fragment: Option<String>,
    },

    /// Fighting event density, scatter and win fractions
    Events {
        /// `coopfight_events_*.json` result file
        input: PathBuf,

        /// Discard events at or before this step [default: te from the fragment, else 0]
        #[arg(long)]
        t_equilibrium: Option<usize>,

        /// Also write the retained events as CSV
        #[arg(long)]
        export_csv: Option<PathBuf>,

        #[arg(long)]
        fragment: Option<String>,
    },

    /// Heatmaps over two control parameters from a parameter sweep table
    Global {
        /// `coopfight_global_*.csv` sweep table
        input: PathBuf,

        #[arg(long)]
        fragment: Option<String>,
    },
}

fn resolve_fragment(input: &Path, header: &str, fragment: Option<String>) -> BoxResult<String> {
    if let Some(fragment) = fragment {
        return Ok(fragment);
    }
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("cannot read file name of {}", input.display()))?;
    let fragment = fragment_from_file_name(file_name, header).ok_or_else(|| {
        format!(
            "{} does not start with `{}_`; pass --fragment",
            file_name, header
        )
    })?;
    Ok(fragment.to_string())
}

fn run(cli: Cli) -> BoxResult<Vec<PathBuf>> {
    let config = match &cli.config {
        Some(path) => PlotConfig::load(path)?,
        None => PlotConfig::default(),
    };
    let style = &config.style;

    let mut written = Vec::new();
    match cli.command {
        Commands::Time { input, fragment } => {
            let fragment = resolve_fragment(&input, "coopfight_time", fragment)?;
            let series: TimeSeries = load_json_file(&input)?;
            written.extend(plot_panel_time_series(&series, &fragment, style)?);
        }
        Commands::Events {
            input,
            t_equilibrium,
            export_csv,
            fragment,
        } => {
            let fragment = resolve_fragment(&input, "coopfight_events", fragment)?;
            let t_equilibrium = t_equilibrium
                .or_else(|| {
                    decode_game(&fragment)
                        .get("t_equilibrium")
                        .and_then(|v| v.as_f64())
                        .map(|t| t as usize)
                })
                .unwrap_or(0);
            log::info!("discarding events at or before t={}", t_equilibrium);

            let results = load_fight_results(&input)?;
            let table = assemble_fight_events_to_table(&results, t_equilibrium);
            let columns = assemble_fight_events_to_columns(&results, t_equilibrium);
            log::info!("{} events retained", table.len());

            if let Some(path) = export_csv {
                table.write_csv(&path)?;
                log::info!("events written to {}", path.display());
            }

            let settings = &config.event_panel;
            written.extend(plot_panel_fighting_events_density(
                &table, &fragment, settings, style,
            )?);
            written.extend(plot_panel_fighting_events_scatter(
                &columns, &fragment, style,
            )?);
            written.extend(plot_panel_fighting_events_time_series(
                &compute_win_fractions(&table),
                &fragment,
                style,
            )?);
        }
        Commands::Global { input, fragment } => {
            let fragment = resolve_fragment(&input, "coopfight_global", fragment)?;
            let table = ParameterTable::from_csv_path(&input)?;
            written.extend(plot_panel_global_fractions(
                &table,
                &fragment,
                &config.global_panel,
                style,
            )?);
        }
    }
    Ok(written)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(written) => {
            for path in written {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
