use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub mailgun: MailgunConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 密钥
    pub secret: String,
    /// 访问令牌有效期（秒）
    #[serde(default = "default_access_token_expires_in")]
    pub access_token_expires_in: i64,
}

fn default_access_token_expires_in() -> i64 {
    24 * 3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailgunConfig {
    /// 为空时不发送邮件（仅记录日志）
    #[serde(default)]
    pub api_key: String,
    pub domain: String,
    pub base_url: String,
    pub from: String,
    #[serde(default = "default_confirm_template")]
    pub confirm_template: String,
    #[serde(default = "default_welcome_template")]
    pub welcome_template: String,
    #[serde(default = "default_referral_template")]
    pub referral_template: String,
}

fn default_confirm_template() -> String {
    "email confirm".to_string()
}

fn default_welcome_template() -> String {
    "Welcome Email".to_string()
}

fn default_referral_template() -> String {
    "Successful Referral".to_string()
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            domain: "onenightbox.com".to_string(),
            base_url: "https://api.eu.mailgun.net".to_string(),
            from: "ONB Team <postmaster@onenightbox.com>".to_string(),
            confirm_template: default_confirm_template(),
            welcome_template: default_welcome_template(),
            referral_template: default_referral_template(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// 邮件中的站点链接
    pub url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "无法读取配置文件 {config_path}: {e}"
                )));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();

        Ok(config)
    }

    /// 解析 TOML 配置内容
    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("解析配置文件失败: {e}")))
    }

    // 无配置文件：使用环境变量与默认值构建
    fn from_env() -> AppResult<Self> {
        // 数据库 URL 在无配置文件时必须提供
        let database_url = get_env("DATABASE_URL").ok_or_else(|| {
            AppError::ConfigError(
                "缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml".to_string(),
            )
        })?;

        let mailgun_defaults = MailgunConfig::default();

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse(
                    "JWT_ACCESS_TOKEN_EXPIRES_IN",
                    default_access_token_expires_in(),
                ),
            },
            mailgun: MailgunConfig {
                api_key: get_env("MAILGUN_API_KEY").unwrap_or_default(),
                domain: get_env("MAILGUN_DOMAIN").unwrap_or(mailgun_defaults.domain),
                base_url: get_env("MAILGUN_BASE_URL").unwrap_or(mailgun_defaults.base_url),
                from: get_env("EMAIL_FROM").unwrap_or(mailgun_defaults.from),
                confirm_template: get_env("MAILGUN_CONFIRM_TEMPLATE")
                    .unwrap_or(mailgun_defaults.confirm_template),
                welcome_template: get_env("MAILGUN_WELCOME_TEMPLATE")
                    .unwrap_or(mailgun_defaults.welcome_template),
                referral_template: get_env("MAILGUN_REFERRAL_TEMPLATE")
                    .unwrap_or(mailgun_defaults.referral_template),
            },
            frontend: FrontendConfig {
                url: get_env("FRONTEND_URL").unwrap_or_else(|| FrontendConfig::default().url),
            },
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_EXPIRES_IN")
            && let Ok(secs) = v.parse()
        {
            self.jwt.access_token_expires_in = secs;
        }

        // Mailgun
        if let Ok(v) = env::var("MAILGUN_API_KEY") {
            self.mailgun.api_key = v;
        }
        if let Ok(v) = env::var("MAILGUN_DOMAIN") {
            self.mailgun.domain = v;
        }
        if let Ok(v) = env::var("MAILGUN_BASE_URL") {
            self.mailgun.base_url = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM") {
            self.mailgun.from = v;
        }
        if let Ok(v) = env::var("MAILGUN_CONFIRM_TEMPLATE") {
            self.mailgun.confirm_template = v;
        }
        if let Ok(v) = env::var("MAILGUN_WELCOME_TEMPLATE") {
            self.mailgun.welcome_template = v;
        }
        if let Ok(v) = env::var("MAILGUN_REFERRAL_TEMPLATE") {
            self.mailgun.referral_template = v;
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.frontend.url = v;
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_defaults() {
        let config = Config::parse(
            r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
url = "postgres://localhost/boxes"
max_connections = 5

[jwt]
secret = "s3cret"
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.jwt.access_token_expires_in, 86400);
        assert!(config.mailgun.api_key.is_empty());
        assert_eq!(config.mailgun.confirm_template, "email confirm");
        assert_eq!(config.mailgun.welcome_template, "Welcome Email");
        assert_eq!(config.mailgun.referral_template, "Successful Referral");
        assert_eq!(config.frontend.url, "http://localhost:3000");
    }

    #[test]
    fn test_parse_mailgun_section() {
        let config = Config::parse(
            r#"
[server]
host = "0.0.0.0"
port = 8080

[database]
url = "postgres://localhost/boxes"
max_connections = 10

[jwt]
secret = "s3cret"

[mailgun]
api_key = "key-123"
domain = "mg.example.com"
base_url = "https://api.mailgun.net"
from = "Boxes <no-reply@example.com>"
"#,
        )
        .unwrap();

        assert_eq!(config.mailgun.api_key, "key-123");
        assert_eq!(config.mailgun.domain, "mg.example.com");
        assert_eq!(config.mailgun.confirm_template, "email confirm");
    }

    #[test]
    fn test_parse_rejects_missing_sections() {
        assert!(matches!(
            Config::parse("[server]\nhost = \"x\"\nport = 1\n"),
            Err(AppError::ConfigError(_))
        ));
    }
}
