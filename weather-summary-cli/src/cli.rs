use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password};
use log::{debug, info};
use weather_summary_core::{Config, Coordinates, create_weather_summary, provider_from_config};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-summary", version, about = "Daily weather summary for a location")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default reporting location.
    Configure,

    /// Print today's weather summary.
    Report {
        /// Reporting latitude in decimal degrees; defaults to the configured location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Reporting longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// OpenWeather API key; overrides the configured one.
        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Print the path of the config file.
    ConfigPath,
}

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Report { lat, lon, api_key } => {
                // Flags are validated before touching the config file.
                let flag_location = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                    _ => None,
                };

                let mut config = Config::load()?;
                if let Some(key) = api_key {
                    config.set_api_key(key);
                }

                let location = match flag_location {
                    Some(location) => location,
                    None => config.reporting_location()?,
                };

                debug!("reporting location {location}");
                let provider = provider_from_config(&config)?;

                let summary = create_weather_summary(provider.as_ref(), location)
                    .await
                    .context("Failed to create weather summary")?;
                print!("{summary}");
            }
            Command::ConfigPath => println!("{}", Config::config_file_path()?.display()),
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://openweathermap.org/api")
        .prompt()?;
    config.set_api_key(api_key);

    let default_location = config.location;
    let latitude = prompt_degrees("Default latitude:", default_location.map(|l| l.latitude))?;
    let longitude = prompt_degrees("Default longitude:", default_location.map(|l| l.longitude))?;
    config.set_location(Coordinates::new(latitude, longitude)?);

    config.save()?;
    let path = Config::config_file_path()?;
    info!("configuration written to {}", path.display());
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn prompt_degrees(message: &str, default: Option<f64>) -> anyhow::Result<f64> {
    let prompt = CustomType::<f64>::new(message)
        .with_error_message("Please type a number in decimal degrees");

    let value = match default {
        Some(d) => prompt.with_default(d).prompt()?,
        None => prompt.prompt()?,
    };

    Ok(value)
}
