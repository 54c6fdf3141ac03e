use std::io::IsTerminal;

use serde::Deserialize;

use crate::logger::format::LoggerFormat;

/// Settings for [`logger_init`](crate::logger_init).
///
/// `level` takes any `EnvFilter` directive string, e.g. `"info,probe_core=debug"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_text_at_info() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level, "info");
        assert!(cfg.with_targets);
    }

    #[test]
    fn deserializes_partial_config() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format":"json","level":"debug,hyper=warn"}"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level, "debug,hyper=warn");
        assert!(cfg.with_targets);
    }

    #[test]
    fn rejects_unknown_format() {
        let res = serde_json::from_str::<LoggerConfig>(r#"{"format":"xml"}"#);
        assert!(res.is_err());
    }
}
