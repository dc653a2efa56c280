//! Binary entry point: CLI parsing, config load, per-site crawl, index
//! persistence (spec §6, §7).

use llmstxt_forge::cli::{self, Cli};
use llmstxt_forge::config::{self, compile_exclude_pattern, SiteConfig};
use llmstxt_forge::fetcher::Fetcher;
use llmstxt_forge::index_store::{self, Index};
use llmstxt_forge::orchestrator;
use llmstxt_forge::rate_limiter::RateLimiter;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "llmstxt.config.json";
const DEFAULT_INDEX_PATH: &str = "llmstxt-index.json";

#[tokio::main]
async fn main() {
    let env_flags = cli::read_env_flags();
    init_logging(env_flags.debug_crawl);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match cli::parse(args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}\n\n{}", cli::usage());
            std::process::exit(1);
        }
    };

    if parsed.help {
        println!("{}", cli::usage());
        std::process::exit(0);
    }

    if let Err(code) = run(parsed, env_flags).await {
        std::process::exit(code);
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

async fn run(cli: Cli, env_flags: cli::EnvFlags) -> Result<(), i32> {
    let config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let run_config = config::load_run_config(&config_path).await.map_err(|e| {
        log::error!("configuration error: {e}");
        1
    })?;

    let fingerprint = config::fingerprint(&run_config);
    let output_path = cli
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_PATH));

    let mut index = if cli.force {
        Index::empty(fingerprint.clone())
    } else {
        index_store::load(&output_path, &fingerprint).await.map_err(|e| {
            log::error!("index read error: {e}");
            1
        })?
    };

    let sites: Vec<&SiteConfig> = match &cli.site {
        Some(key) => match run_config.sites.get(key) {
            Some(site) => vec![site],
            None => {
                log::error!("no such site: {key}");
                return Err(1);
            }
        },
        None => run_config.sites.values().collect(),
    };

    let limiter = Arc::new(RateLimiter::defaults());
    let fetcher = Fetcher::new(Arc::clone(&limiter)).map_err(|e| {
        log::error!("failed to build HTTP client: {e}");
        1
    })?;
    let cancel = Arc::new(AtomicBool::new(false));
    spawn_ctrlc_handler(Arc::clone(&cancel), Arc::clone(&limiter));

    for site in sites {
        let existing = index.sites.get(&site.key).cloned();
        let exclude_patterns: Vec<regex::Regex> = site
            .exclude_patterns
            .iter()
            .filter_map(|p| compile_exclude_pattern(p).ok())
            .collect();

        let started = std::time::Instant::now();
        match orchestrator::crawl_site(site, &fetcher, existing, &exclude_patterns, cancel.as_ref())
            .await
        {
            Ok(outcome) => {
                println!(
                    "{}: {} pages / {} errors / {:.1}s / {:.2} pages/s",
                    site.name,
                    outcome.entry.pages.len(),
                    outcome.errors.len(),
                    started.elapsed().as_secs_f64(),
                    outcome.entry.stats.pages_per_second
                );
                for (url, err) in &outcome.errors {
                    log::warn!("{}: {url}: {err}", site.key);
                }
                index.sites.insert(site.key.clone(), outcome.entry);
            }
            Err(e) => {
                log::error!("site {} failed: {e}", site.key);
            }
        }

        if cancel.load(std::sync::atomic::Ordering::Relaxed) {
            break;
        }
    }

    if cancel.load(std::sync::atomic::Ordering::Relaxed) {
        log::warn!("run cancelled; index not written");
        return Ok(());
    }

    index.generated = chrono::Utc::now();
    index.config_hash = fingerprint;
    write_index(&output_path, &index, &env_flags).await
}

async fn write_index(path: &Path, index: &Index, env_flags: &cli::EnvFlags) -> Result<(), i32> {
    index_store::save(path, index, env_flags).await.map_err(|e| {
        log::error!("index write error: {e}");
        1
    })
}

/// Propagate SIGINT to the run-level cancellation signal (spec §5
/// "Cancellation and timeouts"). Also wakes the rate limiter directly —
/// otherwise a fetch parked in `limiter.acquire()`'s sleep would not notice
/// cancellation until it wakes up on its own, up to a few seconds later.
fn spawn_ctrlc_handler(cancel: Arc<AtomicBool>, limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("cancellation requested; finishing current page and stopping");
            cancel.store(true, std::sync::atomic::Ordering::Relaxed);
            limiter.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_are_relative() {
        assert_eq!(DEFAULT_CONFIG_PATH, "llmstxt.config.json");
        assert_eq!(DEFAULT_INDEX_PATH, "llmstxt-index.json");
    }
}
