/// Octopus Deploy provider plugin
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use thiserror::Error;

use octopusdeploy::config;
use octopusdeploy::provider::{OctopusDeployProvider, PROVIDER_NAME};

/// Manage Octopus Deploy with Terraform. Run without a command to serve the plugin.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a provider defaults file. `octopusdeploy.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the type names of every resource and data source.
    Resources,
    /// Print the effective provider defaults, including any user configuration file.
    Defaults,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration file: {0}")]
    ConfigParse(#[from] config::file::Error),

    #[error("plugin server: {0}")]
    Serve(String),
}

/// Read configuration file from disk and merge it with the
/// `default.toml` [built-in config](../default.toml).
///
/// If a configuration file name is not set explicitly, this function will
/// detect whether a config file with the default file name exists on disk.
/// If it does, it is used implicitly.
fn read_config(args: &Cli) -> Result<config::file::File, Error> {
    const DEFAULT_CONFIG_FILE: &str = "octopusdeploy.toml";

    let config_file = match &args.config {
        None => std::fs::metadata(DEFAULT_CONFIG_FILE)
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
            .then(|| DEFAULT_CONFIG_FILE.to_string()),
        Some(path) => Some(path.clone()),
    };

    Ok(match config_file {
        Some(config_file) => {
            debug!("reading provider defaults from {config_file}");
            config::file::File::default_with_user_config_file(&config_file)?
        }
        None => config::file::File::default(),
    })
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(_) => std::process::exit(0),
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1)
        }
    }
}

async fn run() -> Result<(), Error> {
    env_logger::init();

    let args = Cli::parse();
    let cfg_file = read_config(&args)?;
    let provider = OctopusDeployProvider::new(cfg_file.clone());

    match args.command {
        None => {
            info!("terraform-provider-octopusdeploy {}", env!("CARGO_PKG_VERSION"));
            tf_provider::serve(PROVIDER_NAME, provider)
                .await
                .map_err(|err| Error::Serve(err.to_string()))
        }
        Some(Commands::Resources) => {
            let (resources, data_sources) = provider.type_names();
            for name in resources {
                println!("resource    {name}");
            }
            for name in data_sources {
                println!("data source {name}");
            }
            Ok(())
        }
        Some(Commands::Defaults) => {
            println!("{}", cfg_file.to_toml()?);
            Ok(())
        }
    }
}
