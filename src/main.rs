//! QRZ Lookup - interactive call-sign lookup
//!
//! Reads call signs from standard input and prints what the directory knows.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qrz_lookup::{Config, Lookup, LookupError, QrzClient};

const QUIT_WORDS: &[&str] = &["QUIT", "EXIT", "BYE"];

/// Main entry point for the lookup client.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the positive and negative caches
/// 4. Authenticate against the directory
/// 5. Answer call signs until EOF or a quit word
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qrz_lookup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_dir={}, cache_ttl={}, negative_ttl={}",
        config.cache_dir.display(),
        config.cache_ttl,
        config.negative_ttl
    );

    let client = QrzClient::new(&config.url).context("Cannot build HTTP client")?;
    let mut lookup = Lookup::from_config(&config, client).context("Cannot open caches")?;

    let username = match &config.username {
        Some(name) => name.clone(),
        None => Input::new()
            .with_prompt("QRZ login")
            .interact_text()
            .context("Cannot read login")?,
    };
    let password = match &config.password {
        Some(key) => key.clone(),
        None => Password::new()
            .with_prompt(format!("\"{}\" XML Data key", username))
            .interact()
            .context("Cannot read password")?,
    };
    lookup
        .authenticate(&username, &password)
        .context("Authentication failed")?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Callsign: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let call = line?.trim().to_uppercase();
        if call.is_empty() {
            continue;
        }
        if QUIT_WORDS.contains(&call.as_str()) {
            break;
        }

        match lookup.lookup(&call) {
            Ok(outcome) => println!("{}", outcome),
            Err(LookupError::RemoteSession(msg)) => {
                warn!(callsign = %call, "Session error: {}", msg);
                println!("{} session error: {}", call, msg);
            }
            Err(e) => println!("{} {}", call, e),
        }
    }

    let stats = lookup.stats();
    info!(
        hits = stats.hits,
        negative_hits = stats.negative_hits,
        fetches = stats.fetches,
        cache_errors = stats.cache_errors,
        "Lookup session finished (hit rate {:.0}%)",
        stats.hit_rate() * 100.0
    );
    Ok(())
}
