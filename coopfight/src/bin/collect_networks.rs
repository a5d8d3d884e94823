//! Network file collector
//!
//! Prints the names of the generated network files that match the
//! parameters configured for a model, one per line.
//!
//! Usage:
//!   cargo run --bin collect_networks -- LatticePBC adjacency-list

use clap::Parser;
use coopfight::config::NetrustPaths;
use coopfight::locator::collect_network_filenames;
use naming::{NetworkFormat, NetworkModel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "collect_networks")]
#[command(about = "Collect network files for simulations")]
struct Cli {
    /// Network model whose samples to collect
    #[arg(value_enum)]
    id_network: NetworkModel,

    /// Network file format
    #[arg(value_enum)]
    id_format: NetworkFormat,

    /// Project directory; the generator is expected in `<root>/../netrust`
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Network configuration file, overriding the generator's
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to search, overriding the generator's output directory
    #[arg(long)]
    networks_dir: Option<PathBuf>,
}

impl Cli {
    fn paths(&self) -> NetrustPaths {
        let defaults = NetrustPaths::from_project_root(&self.project_root);
        NetrustPaths {
            config_file: self.config.clone().unwrap_or(defaults.config_file),
            networks_dir: self.networks_dir.clone().unwrap_or(defaults.networks_dir),
        }
    }
}

fn run(cli: &Cli) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let filenames = collect_network_filenames(&cli.paths(), cli.id_network, cli.id_format)?;
    log::info!("{} files for {} ({})", filenames.len(), cli.id_network, cli.id_format);
    Ok(filenames)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(filenames) => {
            for filename in filenames {
                println!("{}", filename);
            }
        }
        Err(e) => {
            eprintln!("Error collecting networks: {}", e);
            std::process::exit(1);
        }
    }
}
