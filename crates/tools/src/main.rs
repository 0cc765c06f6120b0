use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foundation::math::GeoPoint;
use formats::{CountryCollection, GlobeConfig, load_countries, load_countries_with_fingerprint};
use scene::DeviceClass;
use serde::Serialize;
use tools::{PickRequest, inspect, locate, pick, pins};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Country globe geometry and picking tools")]
struct Args {
    /// JSON file overriding any subset of the globe constants
    #[arg(long, global = true, env = "GLOBE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build fills and borders for a dataset and summarize them
    Inspect {
        /// GeoJSON FeatureCollection of countries
        dataset: PathBuf,

        /// Country that has markers (repeatable; default: all)
        #[arg(long = "marker-country")]
        marker_countries: Vec<String>,
    },

    /// Find the country containing a point
    Locate {
        dataset: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// Lay out marker rings around a centroid
    Pins {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long)]
        count: u32,

        /// Camera distance from the globe centre
        #[arg(long, default_value_t = 2.5)]
        distance: f64,
    },

    /// Resolve a screen position to a country
    Pick {
        dataset: PathBuf,

        #[arg(long)]
        x: f64,

        #[arg(long)]
        y: f64,

        #[arg(long, default_value_t = 800.0)]
        width: f64,

        #[arg(long, default_value_t = 600.0)]
        height: f64,

        /// Latitude the camera looks down on
        #[arg(long, allow_hyphen_values = true)]
        focus_lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        focus_lng: f64,

        #[arg(long, default_value_t = 2.5)]
        distance: f64,

        /// Use the mobile field of view and zoom limits
        #[arg(long)]
        mobile: bool,
    },
}

#[derive(Serialize)]
struct Fingerprinted<'a, T: Serialize> {
    fingerprint: &'a str,
    #[serde(flatten)]
    report: T,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Inspect {
            dataset,
            marker_countries,
        } => {
            let (countries, fingerprint) =
                load_countries_with_fingerprint(&dataset, &config.dataset)
                    .with_context(|| format!("loading dataset {}", dataset.display()))?;
            print_json(&Fingerprinted {
                fingerprint: &fingerprint,
                report: inspect(&countries, &config, &marker_countries),
            })
        }
        Command::Locate { dataset, lat, lng } => {
            check_point(lat, lng)?;
            let countries = load_dataset(&dataset, &config)?;
            print_json(&locate(&countries, lat, lng))
        }
        Command::Pins {
            lat,
            lng,
            count,
            distance,
        } => {
            check_point(lat, lng)?;
            let snap = pins(&config, GeoPoint::new(lat, lng), count, distance)
                .context("invalid zoom_rings table")?;
            print_json(&snap)
        }
        Command::Pick {
            dataset,
            x,
            y,
            width,
            height,
            focus_lat,
            focus_lng,
            distance,
            mobile,
        } => {
            check_point(focus_lat, focus_lng)?;
            let countries = load_dataset(&dataset, &config)?;
            let req = PickRequest {
                x,
                y,
                width,
                height,
                focus: GeoPoint::new(focus_lat, focus_lng),
                distance,
                device: if mobile {
                    DeviceClass::Mobile
                } else {
                    DeviceClass::Desktop
                },
            };
            print_json(&pick(&countries, &config, &req))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GlobeConfig> {
    let Some(path) = path else {
        return Ok(GlobeConfig::default());
    };
    let config = GlobeConfig::load(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    info!(path = %path.display(), "loaded globe config");
    Ok(config)
}

fn load_dataset(path: &Path, config: &GlobeConfig) -> Result<CountryCollection> {
    load_countries(path, &config.dataset)
        .with_context(|| format!("loading dataset {}", path.display()))
}

fn check_point(lat: f64, lng: f64) -> Result<()> {
    if !GeoPoint::new(lat, lng).is_valid() {
        anyhow::bail!("coordinates out of range: lat {lat}, lng {lng}");
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serializing report")?;
    println!("{out}");
    Ok(())
}
