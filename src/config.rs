use std::env;
use std::fmt;
use std::time::Duration;

use crate::domain::decision::RetryPolicy;

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub openai: OpenAiSettings,
    pub retry: RetryPolicy,
}

/// 텍스트 생성 서비스 연결 설정
#[derive(Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u16,
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = parse_or(&lookup, "SERVER_PORT", 5000)?;

        let api_key = lookup("OPENAI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            tracing::warn!(
                "OPENAI_API_KEY 환경변수가 설정되지 않았습니다. 모든 생성 요청이 인증 오류로 실패합니다."
            );
        }

        let openai = OpenAiSettings {
            api_key,
            api_base: lookup("OPENAI_API_BASE")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            max_tokens: parse_or(&lookup, "COMPLETION_MAX_TOKENS", 200)?,
            timeout: Duration::from_secs(parse_or(&lookup, "COMPLETION_TIMEOUT_SECS", 25)?),
        };

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "COMPLETION_MAX_ATTEMPTS", defaults.max_attempts)?,
            initial_backoff: Duration::from_millis(parse_or(
                &lookup,
                "COMPLETION_BACKOFF_INITIAL_MS",
                defaults.initial_backoff.as_millis() as u64,
            )?),
            max_backoff: Duration::from_millis(parse_or(
                &lookup,
                "COMPLETION_BACKOFF_MAX_MS",
                defaults.max_backoff.as_millis() as u64,
            )?),
            ..defaults
        };

        if openai.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "COMPLETION_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        if retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "COMPLETION_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            server_host,
            server_port,
            openai,
            retry,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn should_use_defaults_when_unset() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.openai.max_tokens, 200);
        assert_eq!(config.openai.timeout, Duration::from_secs(25));
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.openai.api_key.is_empty());
    }

    #[test]
    fn should_read_overrides() {
        let config = load(&[
            ("SERVER_PORT", "8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("COMPLETION_TIMEOUT_SECS", "5"),
            ("COMPLETION_MAX_ATTEMPTS", "3"),
            ("COMPLETION_BACKOFF_INITIAL_MS", "100"),
        ])
        .unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(100));
    }

    #[test]
    fn should_reject_invalid_port() {
        let result = load(&[("SERVER_PORT", "not-a-port")]);

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "SERVER_PORT", .. })
        ));
    }

    #[test]
    fn should_reject_zero_attempts() {
        let result = load(&[("COMPLETION_MAX_ATTEMPTS", "0")]);

        assert!(result.is_err());
    }

    #[test]
    fn debug_output_should_not_contain_api_key() {
        let config = load(&[("OPENAI_API_KEY", "sk-very-secret")]).unwrap();

        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }
}
