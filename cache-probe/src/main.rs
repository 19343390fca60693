use chrono::{Datelike, Local, NaiveDate};
use nscache::{CacheFactory, KeyScope, NamespacedCache, SessionIdentity, StorageFactory, StoreConfig};
use serde::{Deserialize, Serialize};
use shared::TtlSecs;
use shared::config::Config;
use storage_engine::EngineFactory;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const PROBE_KEY: &str = "reportRange";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ReportRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportRange {
    /// First to last day of the month containing `day`
    fn month_of(day: NaiveDate) -> Option<Self> {
        let start = day.with_day(1)?;
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)?
        };
        Some(Self {
            start,
            end: next_month.pred_opt()?,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting cache probe");

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    let backend = EngineFactory.create_from_config(&StoreConfig::from_config(&config));
    let factory = CacheFactory::from_config(&config, Some(backend));
    info!("Install identity: '{}'", factory.install().as_str());

    let session = SessionIdentity::new(
        config.session_user.clone(),
        uuid::Uuid::new_v4().to_string(),
    );
    let cache = factory.open(&session);

    if !cache.is_enabled() {
        warn!("Cache is disabled; every call below is a no-op");
    }

    let range = ReportRange::month_of(Local::now().date_naive())
        .ok_or("could not compute the current month range")?;

    if run_probe(&cache, &range) {
        info!("Cache probe passed");
        Ok(())
    } else {
        error!("Cache probe failed");
        Err("cache probe failed".into())
    }
}

/// set / get / exists / delete round on one session key
fn run_probe(cache: &NamespacedCache, range: &ReportRange) -> bool {
    if !cache.set(PROBE_KEY, range, TtlSecs(60), KeyScope::Session) {
        error!("set '{}' failed", PROBE_KEY);
        return false;
    }

    if !cache.is_enabled() {
        return true;
    }

    let cached: Option<ReportRange> = cache.get(PROBE_KEY, KeyScope::Session);
    if cached.as_ref() != Some(range) {
        error!("get '{}' returned {:?}, expected {:?}", PROBE_KEY, cached, range);
        return false;
    }
    info!("Read back {} .. {}", range.start, range.end);

    if cache.exists(PROBE_KEY, KeyScope::Global) {
        error!("'{}' leaked into the global namespace", PROBE_KEY);
        return false;
    }

    if !cache.delete(PROBE_KEY, KeyScope::Session) || cache.exists(PROBE_KEY, KeyScope::Session) {
        error!("delete '{}' failed", PROBE_KEY);
        return false;
    }

    true
}
