//! Optional config file loading. Search order: ./litharvest.toml, then
//! $XDG_CONFIG_HOME/litharvest/config.toml (or ~/.config/litharvest/config.toml).

use serde::Deserialize;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Site root, e.g. "https://litnet.com".
    pub base_url: Option<String>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Delay in milliseconds between page requests of one chapter.
    pub page_delay_ms: Option<u64>,
    /// Stop a chapter after this many pages without an end marker.
    pub max_pages: Option<u32>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("litharvest.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("litharvest").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            return Ok(Some(config));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.base_url.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.page_delay_ms.is_none());
        assert!(c.max_pages.is_none());
        assert!(c.timeout_secs.is_none());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            base_url = "https://litnet.com"
            user_agent = "Custom/1.0"
            page_delay_ms = 1500
            max_pages = 40
            timeout_secs = 60
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.base_url.as_deref(), Some("https://litnet.com"));
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.page_delay_ms, Some(1500));
        assert_eq!(c.max_pages, Some(40));
        assert_eq!(c.timeout_secs, Some(60));
    }

    #[test]
    fn parse_partial_config() {
        let c: Config = toml::from_str("max_pages = 7").unwrap();
        assert_eq!(c.max_pages, Some(7));
        assert!(c.page_delay_ms.is_none());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("max_pages = [").is_err());
        assert!(toml::from_str::<Config>("max_pages = \"many\"").is_err());
    }
}
