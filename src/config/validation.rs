use crate::config::types::{RunnerSettings, SeedEntry, Settings, SinkSettings};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire settings document
///
/// Every rejection here happens before any network activity.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_sink(&settings.sink)?;
    validate_runner(&settings.runner)?;
    validate_seeds(&settings.seeds)?;
    Ok(())
}

/// Validates the bulk sink address
fn validate_sink(sink: &SinkSettings) -> Result<(), ConfigError> {
    if sink.host.is_empty() {
        return Err(ConfigError::Validation(
            "sink host cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&sink.host)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sink host '{}': {}", sink.host, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "sink host must use HTTP or HTTPS, got '{}'",
            url.scheme()
        )));
    }

    if sink.index.is_empty() {
        return Err(ConfigError::Validation(
            "sink index cannot be empty".to_string(),
        ));
    }

    if sink.doc_type.is_empty() {
        return Err(ConfigError::Validation(
            "sink doc-type cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates runner behavior knobs
fn validate_runner(runner: &RunnerSettings) -> Result<(), ConfigError> {
    if runner.max_documents < 0 {
        return Err(ConfigError::Validation(format!(
            "max-documents cannot be negative, got {}",
            runner.max_documents
        )));
    }

    if runner.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if runner.crawl_delay_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "crawl-delay-ms must be >= 10ms, got {}ms",
            runner.crawl_delay_ms
        )));
    }

    if runner.worker_idle_ttl_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "worker-idle-ttl-ms must be >= 10ms, got {}ms",
            runner.worker_idle_ttl_ms
        )));
    }

    // A run needs at least one way to end when the frontier never drains.
    if !runner.auto_close && runner.stop_duration_secs == 0 && runner.cancel_duration_secs == 0 {
        return Err(ConfigError::Validation(
            "no termination path: enable auto-close or set a stop/cancel duration".to_string(),
        ));
    }

    if !runner.stop_at_url.is_empty() {
        Url::parse(&runner.stop_at_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid stop-at-url: {}", e)))?;
    }

    if !runner.cancel_at_url.is_empty() {
        Url::parse(&runner.cancel_at_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid cancel-at-url: {}", e)))?;
    }

    Ok(())
}

/// Validates the seed list
fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed entry is required".to_string(),
        ));
    }

    for seed in seeds {
        let url = Url::parse(&seed.link)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed '{}': {}", seed.link, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "seed '{}' must use HTTP or HTTPS",
                seed.link
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "seed '{}' has no host",
                seed.link
            )));
        }

        for tag in &seed.tags {
            Selector::parse(tag).map_err(|e| {
                ConfigError::InvalidSelector(format!("seed '{}' tag '{}': {:?}", seed.link, tag, e))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        Settings {
            sink: SinkSettings {
                host: "http://localhost:9200".to_string(),
                index: "documents".to_string(),
                doc_type: "page".to_string(),
            },
            runner: RunnerSettings {
                crawl_delay_ms: 1000,
                cancel_duration_secs: 0,
                cancel_at_url: String::new(),
                stop_duration_secs: 0,
                stop_at_url: String::new(),
                stats_interval_secs: 0,
                user_agent: "TestSkimmer/1.0".to_string(),
                worker_idle_ttl_ms: 10_000,
                auto_close: true,
                max_documents: 0,
            },
            seeds: vec![SeedEntry {
                link: "http://example.com/".to_string(),
                tags: vec!["p".to_string()],
                subdomain: true,
                top_level_domain: true,
            }],
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate(&valid_settings()).is_ok());
    }

    #[test]
    fn test_empty_sink_host_rejected() {
        let mut settings = valid_settings();
        settings.sink.host = String::new();
        assert!(matches!(
            validate(&settings),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_non_http_sink_host_rejected() {
        let mut settings = valid_settings();
        settings.sink.host = "ftp://localhost:9200".to_string();
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_empty_index_rejected() {
        let mut settings = valid_settings();
        settings.sink.index = String::new();
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_empty_doc_type_rejected() {
        let mut settings = valid_settings();
        settings.sink.doc_type = String::new();
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_negative_max_documents_rejected() {
        let mut settings = valid_settings();
        settings.runner.max_documents = -5;
        assert!(matches!(
            validate(&settings),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_max_documents_allowed() {
        let mut settings = valid_settings();
        settings.runner.max_documents = 0;
        assert!(validate(&settings).is_ok());
    }

    #[test]
    fn test_no_termination_path_rejected() {
        let mut settings = valid_settings();
        settings.runner.auto_close = false;
        assert!(validate(&settings).is_err());

        settings.runner.stop_duration_secs = 30;
        assert!(validate(&settings).is_ok());
    }

    #[test]
    fn test_empty_seed_list_rejected() {
        let mut settings = valid_settings();
        settings.seeds.clear();
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_non_http_seed_rejected() {
        let mut settings = valid_settings();
        settings.seeds[0].link = "ftp://example.com/".to_string();
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_malformed_seed_rejected() {
        let mut settings = valid_settings();
        settings.seeds[0].link = "not a url".to_string();
        assert!(matches!(
            validate(&settings),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_tag_selector_rejected() {
        let mut settings = valid_settings();
        settings.seeds[0].tags = vec!["p[".to_string()];
        assert!(matches!(
            validate(&settings),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_invalid_stop_at_url_rejected() {
        let mut settings = valid_settings();
        settings.runner.stop_at_url = "::not-a-url::".to_string();
        assert!(validate(&settings).is_err());
    }
}
