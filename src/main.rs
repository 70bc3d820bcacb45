mod app;
mod config;
mod handler;
mod quote;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::AppConfig;
use handler::PriceFetchHandler;
use quote::PriceClient;

#[derive(Parser, Debug)]
#[command(name = "pricetap")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal-friendly stock price lookup client")]
struct Args {
    /// Look up one stock name, print its price and exit
    #[arg(short, long)]
    symbol: Option<String>,

    /// Print the one-shot result as JSON
    #[arg(short, long, requires = "symbol")]
    json: bool,

    /// Price endpoint URL (overrides config)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Ignore late responses from superseded lookups
    #[arg(long)]
    discard_stale: bool,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Use this config file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so it never mixes with printed prices)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    // Handle CLI-only commands
    if let Some(symbol) = args.symbol.as_deref() {
        return print_price(&config, symbol, args.json).await;
    }

    // Run TUI
    run_tui(&config).await
}

/// Config file merged with command line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_default(),
    };

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if args.discard_stale {
        config.discard_stale = true;
    }
    if args.timeout_secs.is_some() {
        config.timeout_secs = args.timeout_secs;
    }

    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}

async fn print_price(config: &AppConfig, symbol: &str, json: bool) -> Result<()> {
    let client = PriceClient::new(config.endpoint.clone(), config.timeout());
    let handler = PriceFetchHandler::new(client, config.render_policy());

    let quote = handler.lookup(symbol).await?;

    if json {
        println!("{}", serde_json::to_string(&quote)?);
    } else {
        println!("{}", quote.display_price());
    }
    Ok(())
}

async fn run_tui(config: &AppConfig) -> Result<()> {
    // Restore the terminal even if something panics mid-frame
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Pick up sink output before drawing
        app.tick().await?;

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            if let Err(e) = app.handle_key(key).await {
                                tracing::error!("Key handling failed: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }
}
