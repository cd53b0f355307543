use crate::config::{Config, MAX_WINDOW_DAYS, Mode};
use crate::domain::rates::{CurrencyPair, SeedPolicy};
use std::collections::HashMap;
use std::time::Duration;

fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(&|key| map.get(key).cloned())
}

#[test]
fn test_config_defaults() {
    let config = load(&[]).unwrap();

    assert_eq!(config.mode, Mode::Live);
    assert_eq!(config.feed.base_url, "https://api.frankfurter.app");
    assert_eq!(config.feed.pair, CurrencyPair::usd_krw());
    assert_eq!(config.feed.timeout, Duration::from_secs(10));
    assert_eq!(config.refresh.interval, Duration::from_secs(60));
    assert_eq!(config.refresh.window_days, 30);
    assert_eq!(config.refresh.seed_policy, SeedPolicy::PriorObservation);
    assert!(!config.analysis.enabled());
    assert_eq!(config.analysis.model, "gemini-2.5-flash");
    assert!(config.preferences_path.is_none());
}

#[test]
fn test_config_overrides() {
    let config = load(&[
        ("MODE", "mock"),
        ("FX_PAIR", "eur/krw"),
        ("REFRESH_INTERVAL_SECS", "15"),
        ("REFRESH_WINDOW_DAYS", "14"),
        ("SERIES_SEED_POLICY", "earliest"),
        ("API_KEY", " secret "),
        ("PREFERENCES_PATH", "/tmp/prefs.json"),
    ])
    .unwrap();

    assert_eq!(config.mode, Mode::Mock);
    assert_eq!(config.feed.pair.to_string(), "EUR/KRW");
    assert_eq!(config.refresh.interval, Duration::from_secs(15));
    assert_eq!(config.refresh.window_days, 14);
    assert_eq!(config.refresh.seed_policy, SeedPolicy::EarliestObservation);
    assert_eq!(config.analysis.api_key, "secret");
    assert!(config.analysis.enabled());

    let refresh = config.refresh_config();
    assert_eq!(refresh.window_days, 14);
    assert_eq!(refresh.pair.quote, "KRW");
}

#[test]
fn test_gemini_key_takes_precedence() {
    let config = load(&[("API_KEY", "fallback"), ("GEMINI_API_KEY", "primary")]).unwrap();
    assert_eq!(config.analysis.api_key, "primary");
}

#[test]
fn test_invalid_numbers_fall_back_to_defaults() {
    let config = load(&[
        ("REFRESH_INTERVAL_SECS", "0"),
        ("REFRESH_WINDOW_DAYS", "thirty"),
        ("FX_FEED_TIMEOUT_SECS", "-1"),
    ])
    .unwrap();

    assert_eq!(config.refresh.interval, Duration::from_secs(60));
    assert_eq!(config.refresh.window_days, 30);
    assert_eq!(config.feed.timeout, Duration::from_secs(10));
}

#[test]
fn test_invalid_enums_are_rejected() {
    assert!(load(&[("MODE", "paper")]).is_err());
    assert!(load(&[("FX_PAIR", "USDKRW")]).is_err());
    assert!(load(&[("SERIES_SEED_POLICY", "latest")]).is_err());
}

#[test]
fn test_blank_values_count_as_unset() {
    let config = load(&[
        ("MODE", "  "),
        ("FX_PAIR", ""),
        ("SERIES_SEED_POLICY", " "),
        ("GEMINI_API_KEY", "   "),
        ("API_KEY", "fallback"),
        ("PREFERENCES_PATH", ""),
    ])
    .unwrap();

    assert_eq!(config.mode, Mode::Live);
    assert_eq!(config.feed.pair, CurrencyPair::usd_krw());
    assert_eq!(config.refresh.seed_policy, SeedPolicy::PriorObservation);
    assert_eq!(config.analysis.api_key, "fallback");
    assert!(config.preferences_path.is_none());
}

#[test]
fn test_window_days_outside_range_fall_back_to_default() {
    let config = load(&[("REFRESH_WINDOW_DAYS", "366")]).unwrap();
    assert_eq!(config.refresh.window_days, MAX_WINDOW_DAYS);

    for raw in ["367", "4000000000", "0"] {
        let config = load(&[("REFRESH_WINDOW_DAYS", raw)]).unwrap();
        assert_eq!(config.refresh.window_days, 30, "REFRESH_WINDOW_DAYS={}", raw);
    }
}
