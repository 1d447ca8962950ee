use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weaaqi_dashboard::config::Config;
use weaaqi_dashboard::generator::Generator;
use weaaqi_dashboard::rules::RuleSet;
use weaaqi_dashboard::weather::openweather::OpenWeatherClient;
use weaaqi_dashboard::weather::sample::SampleWeatherSource;
use weaaqi_dashboard::weather::WeatherSource;

#[derive(Parser, Debug)]
#[command(name = "weaaqi-dashboard")]
#[command(about = "Generate the weather and air quality dashboard data", long_about = None)]
struct Args {
    /// Keep regenerating on the refresh interval
    #[arg(short, long)]
    watch: bool,

    /// Output directory (overrides OUTPUT_DIR)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Use built-in sample data instead of calling OpenWeather
    #[arg(long)]
    sample: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weaaqi_dashboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(out_dir) = args.out_dir {
        config.output_dir = out_dir;
    }

    let rules = match &config.rules_file {
        Some(path) => {
            tracing::info!("Loading rule tables from {}", path.display());
            RuleSet::from_json_file(path)?
        }
        None => RuleSet::default(),
    };

    let source = match (&config.openweather_api_key, args.sample) {
        (Some(api_key), false) => {
            WeatherSource::Live(OpenWeatherClient::new(config.clone(), api_key.clone())?)
        }
        (None, false) => {
            tracing::warn!("OPENWEATHER_API_KEY not set, using sample data");
            WeatherSource::Sample(SampleWeatherSource::new())
        }
        (_, true) => WeatherSource::Sample(SampleWeatherSource::new()),
    };

    let generator = Generator::new(config, rules, source)?;

    if args.watch {
        generator.watch().await?;
    } else {
        generator.generate().await?;
    }

    Ok(())
}
