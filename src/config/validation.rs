use crate::config::types::CrawlConfig;
use crate::ConfigError;

/// Validates a crawl configuration before any network traffic happens
///
/// # Arguments
///
/// * `config` - The configuration to validate
///
/// # Returns
///
/// * `Ok(())` - Configuration is usable
/// * `Err(ConfigError)` - A field is out of range or missing
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.lang.is_empty() || !config.lang.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::Validation(format!(
            "language code must be alphabetic, got '{}'",
            config.lang
        )));
    }

    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root category must not be empty".to_string(),
        ));
    }

    if config.workers == 0 {
        return Err(ConfigError::Validation(
            "workers must be at least 1".to_string(),
        ));
    }

    if let Some(limit) = config.limit {
        if limit == 0 {
            return Err(ConfigError::Validation(
                "limit must be at least 1 when set".to_string(),
            ));
        }
    }

    let h = &config.heuristics;

    if !(h.link_ratio_threshold > 0.0 && h.link_ratio_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "link-ratio-threshold must be in (0, 1], got {}",
            h.link_ratio_threshold
        )));
    }

    if h.title_batch_size == 0 || h.title_batch_size > 50 {
        return Err(ConfigError::Validation(format!(
            "title-batch-size must be in 1..=50 (API batch limit), got {}",
            h.title_batch_size
        )));
    }

    if h.max_fetch_attempts == 0 {
        return Err(ConfigError::Validation(
            "max-fetch-attempts must be at least 1".to_string(),
        ));
    }

    if h.sink_capacity == 0 {
        return Err(ConfigError::Validation(
            "sink-capacity must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Heuristics;
    use std::path::PathBuf;

    fn base_config() -> CrawlConfig {
        CrawlConfig {
            lang: "fr".to_string(),
            category: "Poèmes".to_string(),
            workers: 8,
            limit: None,
            resume: false,
            tree_log: false,
            output_dir: PathBuf::from("./data"),
            heuristics: Heuristics::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_rejects_empty_lang() {
        let mut config = base_config();
        config.lang = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_non_alphabetic_lang() {
        let mut config = base_config();
        config.lang = "fr2".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_workers() {
        let mut config = base_config();
        config.workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_limit() {
        let mut config = base_config();
        config.limit = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_oversized_batch() {
        let mut config = base_config();
        config.heuristics.title_batch_size = 51;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_ratio() {
        let mut config = base_config();
        config.heuristics.link_ratio_threshold = 1.5;
        assert!(validate(&config).is_err());
    }
}
