use anyhow::{Result, anyhow};
use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub listen_addr: String,
    pub ansi_logs: bool,
}

impl AppConfig {
    const DEFAULT_LISTEN_ADDR: &'static str = "0.0.0.0:8080";

    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("PROPOSALGEN_LISTEN_ADDR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_LISTEN_ADDR.to_string());

        let ansi_logs = match env::var("PROPOSALGEN_LOG_ANSI") {
            Ok(value) => parse_bool(&value)
                .ok_or_else(|| anyhow!("PROPOSALGEN_LOG_ANSI must be true or false"))?,
            Err(_) => true,
        };

        Ok(Self {
            listen_addr,
            ansi_logs,
        })
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn parses_common_boolean_spellings() {
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
