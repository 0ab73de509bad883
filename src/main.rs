use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use voter_console::domain::ports::ReportKind;
use voter_console::domain::routes::Route;
use voter_console::use_cases::dashboard::{DashboardView, FetchOutcome, VoterLogState};
use voter_console::use_cases::series::{GroupedBarSeries, StatusChart};
use voter_console::{Console, ConsoleConfig};

#[derive(Parser)]
#[command(name = "voter-console")]
#[command(about = "Admin console for the voter registration backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Login {
        username: String,
        password: String,
    },
    Logout,
    Whoami,
    Dashboard,
    Records {
        #[arg(short, long, default_value = "1")]
        page: u32,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(short, long)]
        search: Option<String>,
    },
    Report {
        #[arg(value_enum)]
        scope: ReportScope,
        #[arg(long)]
        id: Option<String>,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    // Resolve a screen path through the route guards.
    Open {
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportScope {
    Leader,
    Chief,
}

impl From<ReportScope> for ReportKind {
    fn from(scope: ReportScope) -> Self {
        match scope {
            ReportScope::Leader => ReportKind::ByLeader,
            ReportScope::Chief => ReportKind::ByChief,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout is reserved for command output.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = ConsoleConfig::load()?;
    tracing::debug!(api = config.api_base(), "configuration loaded.");
    let console = Console::build(&config)?;

    match cli.command {
        Commands::Login { username, password } => {
            let session = match console.session.login(&username, &password).await {
                Ok(session) => session,
                Err(err) => {
                    tracing::warn!(error = %err, "login failed.");
                    bail!(err.user_message());
                }
            };
            let landed = console.router.navigate(Route::Login.path());
            println!("Welcome, {} ({})", session.display_name, session.role);
            println!("Landing page: {landed}");
            print_menu(&console);
        }
        Commands::Logout => {
            console.session.logout();
            println!("Logged out.");
        }
        Commands::Whoami => match console.session.current_session() {
            Some(session) => {
                println!("[{}]", console.session.user_initials());
                println!("{}", serde_json::to_string_pretty(&session)?);
            }
            None => println!("Not logged in."),
        },
        Commands::Dashboard => {
            console.enter(console.dashboard_route())?;
            let (report, outcome) = console.dashboard.reload().await;
            print_dashboard(&console.dashboard.view());
            for (kind, err) in &report.failures {
                eprintln!("! {kind:?} unavailable: {}", err.message);
            }
            if let FetchOutcome::Failed(err) = outcome {
                eprintln!("! voter log unavailable: {}", err.message);
            }
        }
        Commands::Records {
            page,
            limit,
            search,
        } => {
            console.enter(Route::DigitadorRecords)?;
            let mut outcome = match search.as_deref() {
                Some(query) => console.dashboard.search(query).await,
                None => console.dashboard.load_voter_log().await,
            };
            if let Some(limit) = limit {
                outcome = console.dashboard.change_page_size(limit).await?;
            }
            if page != 1 {
                outcome = console.dashboard.change_page(page).await?;
            }
            if let FetchOutcome::Failed(err) = outcome {
                bail!(err.message);
            }
            print_voter_log(&console.dashboard.view().voter_log);
        }
        Commands::Report { scope, id, out } => {
            let (path, report) = console
                .save_report(scope.into(), id.as_deref(), &out)
                .await?;
            println!("Saved {} ({} bytes)", path.display(), report.bytes.len());
        }
        Commands::Open { path } => {
            let route = console.router.navigate(&path);
            println!("{route}");
            print_menu(&console);
        }
    }

    Ok(())
}

fn print_menu(console: &Console) {
    for entry in console.router.menu() {
        println!("  {:<20} {}", entry.label, entry.route);
    }
}

fn print_dashboard(view: &DashboardView) {
    if let Some(counts) = view.counts.data {
        let progress = view.series.progress;
        println!("Total registered: {}", counts.total);
        println!("  verified {:>6} ({}%)", counts.success, progress.verified);
        println!("  pending  {:>6} ({}%)", counts.pending, progress.pending);
        println!("  failed   {:>6} ({}%)", counts.failed, progress.failed);
        println!("  error    {:>6} ({}%)", counts.error, progress.error);
    }

    match &view.series.status {
        StatusChart::NoData => println!("Status: no data"),
        StatusChart::Distribution { labels, values, .. } => {
            let parts: Vec<String> = labels
                .iter()
                .zip(values)
                .map(|(label, value)| format!("{label} {value}"))
                .collect();
            println!("Status: {}", parts.join(" | "));
        }
    }

    print_bars("Chiefs", &view.series.chiefs);
    print_bars("Agents", &view.series.agents);

    let leaders = &view.leaders.data;
    println!("Leaders (page {}/{})", leaders.page(), leaders.total_pages());
    for leader in leaders.page_items() {
        println!(
            "  {:<24} {:<16} {}",
            leader.name,
            leader.chief_name.as_deref().unwrap_or("-"),
            leader.total_voters
        );
    }

    print_voter_log(&view.voter_log);
}

fn print_bars(title: &str, bars: &GroupedBarSeries) {
    if bars.is_empty() {
        return;
    }
    println!("{title}");
    for (index, label) in bars.labels.iter().enumerate() {
        let values: Vec<String> = bars
            .series
            .iter()
            .map(|series| {
                let value = series.values.get(index).copied().unwrap_or(0);
                format!("{} {value}", series.name)
            })
            .collect();
        println!("  {:<24} {}", label, values.join(", "));
    }
}

fn print_voter_log(log: &VoterLogState) {
    println!(
        "Records (page {}/{}, {} total)",
        log.cursor.page,
        log.cursor.total_pages(),
        log.cursor.total
    );
    if let Some(error) = &log.error {
        println!("  {error}");
    }
    for voter in &log.items {
        let status = voter
            .verification_status
            .map(|status| format!("{status:?}"))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<12} {:<28} {:<12} {}", voter.cedula, voter.name, voter.phone, status);
    }
}
