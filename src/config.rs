use secrecy::Secret;
use url::Url;

pub const DEFAULT_CHAPTER: &str = "Nagarbhavi Brigades";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Bearer tokens
    pub jwt_secret: Secret<String>,
    pub token_ttl_hours: i64,

    // Chapter defaults for new members
    pub default_chapter: String,

    // Outbound mail relay (mail is logged and dropped when unset)
    pub mail: Option<MailConfig>,

    // Bootstrap administrator created at startup if missing
    pub admin_email: Option<String>,
    pub admin_password: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub relay_url: Url,
    pub api_key: Secret<String>,
    pub sender: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        let mail = match config.get::<String>("mail_relay_url").ok() {
            Some(raw_url) => {
                let relay_url = Url::parse(&raw_url).map_err(|e| {
                    config::ConfigError::Message(format!("invalid MAIL_RELAY_URL: {}", e))
                })?;
                Some(MailConfig {
                    relay_url,
                    api_key: Secret::new(config.get("mail_api_key")?),
                    sender: config
                        .get("mail_sender")
                        .unwrap_or_else(|_| "noreply@chapterhub.local".to_string()),
                })
            }
            None => None,
        };

        Ok(Self {
            database_url: config.get("database_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port")?,

            jwt_secret: Secret::new(config.get("jwt_secret")?),
            token_ttl_hours: config
                .get("token_ttl_hours")
                .unwrap_or(DEFAULT_TOKEN_TTL_HOURS),

            default_chapter: config
                .get("default_chapter")
                .unwrap_or_else(|_| DEFAULT_CHAPTER.to_string()),

            mail,

            admin_email: config.get("admin_email").ok(),
            admin_password: config
                .get::<String>("admin_password")
                .ok()
                .map(Secret::new),
        })
    }
}
