use runroute::config::Config;
use runroute::export::{build_maps_link, export_gpx, is_approximate_distance};
use runroute::models::{
    Coordinates, Preference, PreferenceSet, RouteRequest, RouteShape, SynthesisStatus,
};
use runroute::services::route_synthesizer::randomness::seeded_rng;
use runroute::AppState;
use std::env;
use std::process;
use time::OffsetDateTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        "\
Usage: synthesize --lat=LAT --lng=LNG --distance=KM [OPTIONS]

Options:
  --lat=LAT             Start latitude
  --lng=LNG             Start longitude
  --distance=KM         Target distance in kilometers
  --shape=SHAPE         loop (default) or one_way
  --dest-lat=LAT        Destination latitude (one_way only, with --dest-lng)
  --dest-lng=LNG        Destination longitude
  --prefer=LIST         Comma-separated preferences, e.g. scenery,flat,minimize_turns
  --allow-repetition    Allow the route to retrace segments
  --seed=N              Fixed RNG seed for a reproducible search
  --format=FORMAT       json (default), gpx or link
  --help                Show this help message"
    );
}

fn arg<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().find_map(|a| a.strip_prefix(name))
}

fn parse_f64(args: &[String], name: &str) -> Result<Option<f64>, String> {
    arg(args, name)
        .map(|raw| raw.parse::<f64>().map_err(|_| format!("Invalid value for {}{}", name, raw)))
        .transpose()
}

fn parse_request(args: &[String]) -> Result<RouteRequest, String> {
    let lat = parse_f64(args, "--lat=")?.ok_or("--lat is required")?;
    let lng = parse_f64(args, "--lng=")?.ok_or("--lng is required")?;
    let distance = parse_f64(args, "--distance=")?.ok_or("--distance is required")?;

    let shape: RouteShape = match arg(args, "--shape=") {
        Some(raw) => raw.parse()?,
        None => RouteShape::Loop,
    };

    let preferences: PreferenceSet = match arg(args, "--prefer=") {
        Some(raw) => raw
            .split(',')
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.trim().parse::<Preference>())
            .collect::<Result<PreferenceSet, String>>()?,
        None => PreferenceSet::new(),
    };

    let mut request = RouteRequest::new(Coordinates::new(lat, lng)?, distance, shape)
        .with_preferences(preferences)
        .with_avoid_repetition(!args.iter().any(|a| a == "--allow-repetition"));

    match (parse_f64(args, "--dest-lat=")?, parse_f64(args, "--dest-lng=")?) {
        (Some(dest_lat), Some(dest_lng)) => {
            request = request.with_destination(Coordinates::new(dest_lat, dest_lng)?);
        }
        (None, None) => {}
        _ => return Err("--dest-lat and --dest-lng must be given together".to_string()),
    }

    request.validate()?;
    Ok(request)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (quiet by default, output goes to stdout)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runroute=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let request = match parse_request(&args) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            print_help();
            process::exit(2);
        }
    };
    let format = arg(&args, "--format=").unwrap_or("json");
    if !matches!(format, "json" | "gpx" | "link") {
        eprintln!("Error: unknown format '{}'\n", format);
        print_help();
        process::exit(2);
    }

    let mut config = Config::from_env().map_err(|e| format!("Config error: {}", e))?;
    if let Some(seed) = arg(&args, "--seed=") {
        config.seed = Some(seed.parse().map_err(|_| format!("Invalid seed: {}", seed))?);
    }

    let state = AppState::from_config(&config);
    let mut rng = seeded_rng(config.seed);
    let result = state.synthesizer.synthesize(&request, &mut rng).await?;

    let route = match result.route {
        Some(ref route) if result.status != SynthesisStatus::NoRoute => route,
        _ => {
            eprintln!("No route found after {} attempts", result.attempts);
            process::exit(1);
        }
    };

    if is_approximate_distance(route.distance_km, request.target_distance_km) {
        eprintln!(
            "Warning: route is {:.2}km for a {:.2}km target",
            route.distance_km, request.target_distance_km
        );
    }

    match format {
        "gpx" => {
            let gpx = export_gpx(&route.coordinates, route.distance_km, OffsetDateTime::now_utc())?;
            println!("{}", gpx);
        }
        "link" => println!("{}", build_maps_link(&route.coordinates)?),
        _ => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}
