mod api;
mod course;
mod display;
mod error;
mod notify;
mod registry;
mod session;
mod snapshot;
mod web;

use api::{normalize_pool_response, BackendClient, PoolPayload};
use display::{print_pool_summary, print_week_grid, write_week_grid_to_file};
use notify::{LogNotifier, Notifier};
use registry::SchedulerState;
use session::TokenStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    // Web mode: serve the scheduling workbench UI
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let backend_url =
            std::env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:9090".to_string());
        let session_secret = std::env::var("SESSION_SECRET").unwrap_or_default();

        println!("Starting workbench on port {}...", port);
        println!("Backend API: {}", backend_url);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, backend_url, session_secret).await?;
        return Ok(());
    }

    // CLI mode: upload the given schedule files, then print the pool and
    // this week's availability grid
    if args.len() < 2 {
        eprintln!("Usage: duty-scheduler <schedule files...> | duty-scheduler web [port]");
        std::process::exit(1);
    }

    let backend_url =
        std::env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:9090".to_string());
    let week: u32 = std::env::var("WEEK")
        .ok()
        .and_then(|w| w.parse().ok())
        .unwrap_or(registry::DEFAULT_WEEK);

    let mut tokens = TokenStore::new();
    if let Ok(token) = std::env::var("BACKEND_TOKEN") {
        tokens.set(token);
    }

    let notifier = LogNotifier;
    let client = BackendClient::new(backend_url);

    let mut files = Vec::new();
    for path in &args[1..] {
        let bytes = std::fs::read(path)?;
        let name = std::path::Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        files.push((name, bytes));
    }

    println!("Uploading {} file(s) to the parser...", files.len());
    let raw = match client.parse_schedules(tokens.get(), files).await {
        Ok(raw) => raw,
        Err(err) => {
            notifier.error(&format!("parse failed: {}", err));
            std::process::exit(1);
        }
    };

    let mut state = SchedulerState::new();
    match normalize_pool_response(&raw) {
        PoolPayload::Records(people) => {
            let count = state.load_pool(people);
            notifier.success(&format!("parsed schedules for {} people", count));
        }
        PoolPayload::Empty => {
            notifier.warning("parse succeeded but returned no student data");
            return Ok(());
        }
        PoolPayload::Malformed => {
            notifier.error("parser returned an unexpected payload");
            std::process::exit(1);
        }
    }
    state.set_current_week(week);

    print_pool_summary(state.pool());
    print_week_grid(&state, week);

    let out_file = "availability_grid.txt";
    write_week_grid_to_file(&state, week, out_file)?;
    println!("\nGrid saved to {}", out_file);

    Ok(())
}
