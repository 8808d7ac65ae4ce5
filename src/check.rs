//! Setup report for `trendmine check`.

use std::fmt;

use crate::{
    api::Provider,
    config::AppConfig,
    error::Result,
    news::NEWS_KEY_VARS,
    template::PlatformTemplate,
};

/// Shows the first 8 and last 4 characters of keys longer than 12.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyStatus {
    pub variable: &'static str,
    pub provider: Option<Provider>,
    /// Masked value, `None` when unset.
    pub masked: Option<String>,
}

#[derive(Debug)]
pub struct SetupReport {
    pub keys: Vec<KeyStatus>,
    /// Number of topics, or the reason the configuration failed to load.
    pub config: std::result::Result<usize, String>,
    pub templates: usize,
}

impl SetupReport {
    /// True when at least one provider key is set and the config loads.
    pub fn is_ready(&self) -> bool {
        self.providers_configured() > 0 && self.config.is_ok()
    }

    pub fn providers_configured(&self) -> usize {
        self.keys
            .iter()
            .filter(|k| k.provider.is_some() && k.masked.is_some())
            .count()
    }
}

/// Collects key, configuration and template status.
pub fn run_check<F>(config: Result<AppConfig>, lookup: F) -> SetupReport
where
    F: Fn(&str) -> Option<String>,
{
    let mut keys = Vec::new();
    for provider in Provider::ALL {
        for &variable in provider.key_vars() {
            keys.push(KeyStatus {
                variable,
                provider: Some(provider),
                masked: lookup(variable)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| mask_key(v.trim())),
            });
        }
    }
    for variable in NEWS_KEY_VARS {
        keys.push(KeyStatus {
            variable,
            provider: None,
            masked: lookup(variable)
                .filter(|v| !v.trim().is_empty())
                .map(|v| mask_key(v.trim())),
        });
    }

    SetupReport {
        keys,
        config: config.map(|c| c.topics.len()).map_err(|e| e.to_string()),
        templates: PlatformTemplate::all().len(),
    }
}

impl fmt::Display for SetupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "API KEYS:")?;
        for key in &self.keys {
            let owner = key
                .provider
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| "news".to_string());
            match &key.masked {
                Some(masked) => writeln!(f, "  [ok]   {}: {masked} ({owner})", key.variable)?,
                None => writeln!(f, "  [--]   {}: not set ({owner})", key.variable)?,
            }
        }
        writeln!(f, "  {} provider key(s) found", self.providers_configured())?;
        writeln!(f)?;

        writeln!(f, "CONFIGURATION:")?;
        match &self.config {
            Ok(topics) => writeln!(f, "  [ok]   {topics} topics configured")?,
            Err(reason) => writeln!(f, "  [fail] {reason}")?,
        }
        writeln!(f)?;

        writeln!(f, "TEMPLATES:")?;
        writeln!(f, "  [ok]   {} platform templates", self.templates)?;
        writeln!(f)?;

        if self.is_ready() {
            write!(f, "Setup looks good.")
        } else {
            write!(
                f,
                "Setup incomplete. Set one of MISTRAL_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY \
                 and make sure config.yaml loads."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-1234567890abcdef"), "sk-12345...cdef");
        assert_eq!(mask_key("short"), "***");
        assert_eq!(mask_key("exactly12chr"), "***");
    }

    #[test]
    fn test_report_with_one_key() {
        let report = run_check(AppConfig::builtin(), |name| {
            (name == "GOOGLE_API_KEY").then(|| "AIzaSyAbcdefghijklmnop".to_string())
        });

        assert!(report.is_ready());
        assert_eq!(report.providers_configured(), 1);
        assert_eq!(report.config, Ok(8));
        assert_eq!(report.templates, 4);

        let gemini = report
            .keys
            .iter()
            .find(|k| k.variable == "GOOGLE_API_KEY")
            .unwrap();
        assert_eq!(gemini.provider, Some(Provider::Gemini));
        assert_eq!(gemini.masked.as_deref(), Some("AIzaSyAb...mnop"));

        let text = report.to_string();
        assert!(text.contains("GOOGLE_API_KEY: AIzaSyAb...mnop (gemini)"));
        assert!(text.contains("MISTRAL_API_KEY: not set"));
        assert!(!text.contains("AIzaSyAbcdefghijklmnop"));
        assert!(text.ends_with("Setup looks good."));
    }

    #[test]
    fn test_report_without_keys_or_config() {
        let report = run_check(Err(Error::Config("bad yaml".to_string())), |_| None);
        assert!(!report.is_ready());
        assert!(report.to_string().contains("[fail] configuration error: bad yaml"));
    }

    #[test]
    fn test_news_key_does_not_count_as_provider() {
        let report = run_check(AppConfig::builtin(), |name| {
            (name == "NEWS_API_KEY").then(|| "0123456789abcdef".to_string())
        });
        assert_eq!(report.providers_configured(), 0);
        assert!(!report.is_ready());
    }
}
