use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{ProposalError, SecretValue};

const DEFAULT_SECRETS_PATH: &str = "secrets.toml";
const SECRETS_PATH_ENV: &str = "PROPOSALGEN_SECRETS";

/// Key holding the web-search API key.
pub const SEARCH_API_KEY: &str = "SERPER_API_KEY";
/// Key holding the model API key.
pub const MODEL_API_KEY: &str = "OPENROUTER_API_KEY";
/// Key holding the chat-completion base URL.
pub const MODEL_ENDPOINT: &str = "MODEL_ENDPOINT";

/// Process-wide secrets, loaded once at start and injected wherever needed.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub search_api_key: SecretValue,
    pub model_api_key: SecretValue,
    /// Base URL of the chat-completion endpoint. Not validated.
    pub model_endpoint: String,
}

/// Loads [`Secrets`] from a TOML secrets file and the process environment.
pub struct SecretsLoader;

impl SecretsLoader {
    /// Load all required secrets.
    ///
    /// Resolution order for the secrets file:
    /// 1. Explicit `path` argument.
    /// 2. `PROPOSALGEN_SECRETS` environment variable.
    /// 3. `secrets.toml` in the current working directory, when present.
    ///
    /// Each key is looked up in the file first, then in the environment.
    pub fn load(path: Option<PathBuf>) -> Result<Secrets, ProposalError> {
        let table = match resolve_path(path) {
            Some(candidate) => Some(read_table(&candidate)?),
            None => None,
        };

        Self::from_sources(table.as_ref(), |key| env::var(key).ok())
    }

    /// Build secrets from an optional parsed file plus a fallback lookup.
    pub fn from_sources<F>(table: Option<&toml::Table>, fallback: F) -> Result<Secrets, ProposalError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| -> Result<String, ProposalError> {
            let from_file = table
                .and_then(|table| table.get(key))
                .and_then(|value| value.as_str())
                .map(str::to_string);

            from_file
                .or_else(|| fallback(key))
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ProposalError::MissingSecret(key.to_string()))
        };

        Ok(Secrets {
            search_api_key: SecretValue::new(lookup(SEARCH_API_KEY)?),
            model_api_key: SecretValue::new(lookup(MODEL_API_KEY)?),
            model_endpoint: lookup(MODEL_ENDPOINT)?,
        })
    }
}

fn resolve_path(path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = path {
        return Some(path);
    }

    if let Ok(from_env) = env::var(SECRETS_PATH_ENV) {
        if !from_env.trim().is_empty() {
            return Some(PathBuf::from(from_env));
        }
    }

    let default = Path::new(DEFAULT_SECRETS_PATH);
    default.is_file().then(|| default.to_path_buf())
}

fn read_table(path: &Path) -> Result<toml::Table, ProposalError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| ProposalError::config_io(path.to_path_buf(), err))?;
    raw.parse::<toml::Table>()
        .map_err(|err| ProposalError::InvalidConfiguration(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_secrets(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write secrets");
        file
    }

    #[test]
    fn loads_all_secrets_from_file() {
        let file = write_secrets(
            r#"
SERPER_API_KEY = "serper-key"
OPENROUTER_API_KEY = "router-key"
MODEL_ENDPOINT = "https://openrouter.ai/api/v1"
"#,
        );

        let secrets = SecretsLoader::load(Some(file.path().to_path_buf())).expect("secrets");
        assert_eq!(secrets.search_api_key.expose(), "serper-key");
        assert_eq!(secrets.model_api_key.expose(), "router-key");
        assert_eq!(secrets.model_endpoint, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn falls_back_to_environment_lookup() {
        let table: toml::Table = r#"SERPER_API_KEY = "from-file""#.parse().unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (SEARCH_API_KEY, "from-env"),
            (MODEL_API_KEY, "model-env"),
            (MODEL_ENDPOINT, "http://localhost:1234/v1"),
        ]);

        let secrets = SecretsLoader::from_sources(Some(&table), |key| {
            env.get(key).map(|value| value.to_string())
        })
        .expect("secrets");

        assert_eq!(secrets.search_api_key.expose(), "from-file");
        assert_eq!(secrets.model_api_key.expose(), "model-env");
    }

    #[test]
    fn each_missing_secret_is_fatal() {
        for missing in [SEARCH_API_KEY, MODEL_API_KEY, MODEL_ENDPOINT] {
            let mut table = toml::Table::new();
            for key in [SEARCH_API_KEY, MODEL_API_KEY, MODEL_ENDPOINT] {
                if key != missing {
                    table.insert(key.to_string(), toml::Value::String("value".into()));
                }
            }

            let err = SecretsLoader::from_sources(Some(&table), no_env).unwrap_err();
            assert!(
                matches!(&err, ProposalError::MissingSecret(name) if name == missing),
                "unexpected error for {missing}: {err}"
            );
        }
    }

    #[test]
    fn blank_environment_value_counts_as_missing() {
        let err = SecretsLoader::from_sources(None, |key| {
            Some(if key == MODEL_API_KEY { "  " } else { "set" }.to_string())
        })
        .unwrap_err();
        assert!(matches!(&err, ProposalError::MissingSecret(name) if name == MODEL_API_KEY));
    }

    #[test]
    fn endpoint_contents_are_not_validated() {
        let table: toml::Table = r#"
SERPER_API_KEY = "a"
OPENROUTER_API_KEY = "b"
MODEL_ENDPOINT = "not a url"
"#
        .parse()
        .unwrap();

        let secrets = SecretsLoader::from_sources(Some(&table), no_env).expect("secrets");
        assert_eq!(secrets.model_endpoint, "not a url");
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = SecretsLoader::load(Some(PathBuf::from("/nonexistent/secrets.toml"))).unwrap_err();
        assert!(matches!(err, ProposalError::ConfigIo { .. }));
    }

    #[test]
    fn malformed_file_is_invalid_configuration() {
        let file = write_secrets("SERPER_API_KEY = ");
        let err = SecretsLoader::load(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, ProposalError::InvalidConfiguration(_)));
    }
}
