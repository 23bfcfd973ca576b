//! INI file configuration adapter.

use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockcastError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| StockcastError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, StockcastError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| StockcastError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Configuration with no sections; every getter falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
source = csv
csv_dir = ./fixtures

[yahoo]
timeout_secs = 15

[server]
listen = 0.0.0.0:8080
permissive_cors = no

[log]
filter = stockcast=debug
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("csv".to_string()));
        assert_eq!(
            adapter.get_string("data", "csv_dir"),
            Some("./fixtures".to_string())
        );
        assert_eq!(
            adapter.get_string("server", "listen"),
            Some("0.0.0.0:8080".to_string())
        );
        assert_eq!(
            adapter.get_string("log", "filter"),
            Some("stockcast=debug".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_or_blank() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource =\n").unwrap();
        assert_eq!(adapter.get_string("data", "source"), None);
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("yahoo", "timeout_secs", 10), 15);
        assert_eq!(adapter.get_int("yahoo", "missing", 42), 42);

        let adapter = FileConfigAdapter::from_string("[yahoo]\ntimeout_secs = abc\n").unwrap();
        assert_eq!(adapter.get_int("yahoo", "timeout_secs", 10), 10);
    }

    #[test]
    fn get_bool_variants() {
        let adapter =
            FileConfigAdapter::from_string("[a]\nt1 = true\nt2 = YES\nt3 = 1\nf1 = no\nbad = maybe\n")
                .unwrap();
        assert!(adapter.get_bool("a", "t1", false));
        assert!(adapter.get_bool("a", "t2", false));
        assert!(adapter.get_bool("a", "t3", false));
        assert!(!adapter.get_bool("a", "f1", true));
        assert!(adapter.get_bool("a", "bad", true));
        assert!(!adapter.get_bool("a", "missing", false));

        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(!adapter.get_bool("server", "permissive_cors", true));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("data", "source"), None);
        assert_eq!(adapter.get_int("yahoo", "timeout_secs", 10), 10);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[data]\nsource = yahoo\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("yahoo".to_string()));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/stockcast.ini");
        match result {
            Err(StockcastError::ConfigParse { file, .. }) => {
                assert!(file.contains("stockcast.ini"))
            }
            _ => panic!("expected ConfigParse error"),
        }
    }
}
