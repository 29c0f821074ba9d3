use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use trip_mapper::sink::{day_color, days_present, navigation_url, route_for_day};
use trip_mapper::{
    resolve_itinerary_text, summary_from_text, BudgetEstimate, PlannerConfig, ResolvedMarker,
    TripPlanner,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// AMap web service key (overrides config.toml)
    #[arg(long, env = "AMAP_KEY")]
    amap_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an itinerary and place its POIs on the map
    Plan { request: String },
    /// Resolve the POIs of a saved itinerary text
    Resolve {
        file: PathBuf,
        /// Print one line per marker with its day color and navigation link
        #[arg(long)]
        verbose: bool,
    },
    /// Show the budget of a saved itinerary text
    Budget {
        file: PathBuf,
        /// Ask the language model for an itemised estimate
        #[arg(long)]
        estimate: bool,
    },
}

fn print_markers(
    markers: &[ResolvedMarker],
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !verbose {
        println!("{}", serde_json::to_string_pretty(markers)?);
        return Ok(());
    }
    for marker in markers {
        println!(
            "{} {} ({}, {}) {}",
            day_color(marker.day),
            marker.name,
            marker.lng,
            marker.lat,
            navigation_url(marker)
        );
    }
    for day in days_present(markers) {
        if let Some(route) = route_for_day(markers, day) {
            println!(
                "day {}: {} -> {} via {} stops",
                day,
                route.origin.name,
                route.destination.name,
                route.waypoints.len()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = PlannerConfig::load()?;
    if cli.amap_key.is_some() {
        config.amap.key = cli.amap_key;
    }

    match cli.command {
        Commands::Plan { request } => {
            let planner = TripPlanner::builder().config(config).build()?;
            let outcome = planner.plan(&request).await?;
            println!("{}", outcome.text);
            outcome.pending.wait().await;
            print_markers(&planner.markers().await, false)?;
        }
        Commands::Resolve { file, verbose } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let markers = resolve_itinerary_text(&text, &config).await?;
            info!("{} markers for {}", markers.len(), file.display());
            print_markers(&markers, verbose)?;
        }
        Commands::Budget { file, estimate } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let budget = if estimate {
                let planner = TripPlanner::builder().config(config).build()?;
                planner.estimate_budget(&text).await?
            } else {
                BudgetEstimate::from_summary(&summary_from_text(&text))
            };
            println!("{}", serde_json::to_string_pretty(&budget)?);
        }
    }

    Ok(())
}
