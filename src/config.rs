use std::env;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub recipes_path: PathBuf,
    pub images_dir: PathBuf,
    pub public_base_url: String,
    pub allowed_origins: Vec<String>,
    pub trello: TrelloConfig,
}

/// Credentials and targets for the task board that receives feedback and images
#[derive(Debug, Clone)]
pub struct TrelloConfig {
    pub api_base: String,
    pub api_key: String,
    pub api_token: String,
    pub feedback_list_id: String,
    pub images_list_id: String,
    pub member_ids: Vec<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let environment = match env::var("ENV").unwrap_or_else(|_| "local".to_string()).as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Local,
        };

        let recipes_path: PathBuf = env::var("RECIPES_PATH")
            .unwrap_or_else(|_| "data/recipes.json".to_string())
            .into();

        let images_dir: PathBuf = env::var("IMAGES_DIR")
            .unwrap_or_else(|_| "data/img".to_string())
            .into();

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let allowed_origins = split_list(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:4200".to_string()),
        );

        let trello = TrelloConfig::from_env()?;

        let config = Config {
            port,
            environment,
            recipes_path,
            images_dir,
            public_base_url,
            allowed_origins,
            trello,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        if self.recipes_path.as_os_str().is_empty() {
            anyhow::bail!("RECIPES_PATH cannot be empty");
        }

        if self.images_dir.as_os_str().is_empty() {
            anyhow::bail!("IMAGES_DIR cannot be empty");
        }

        if !is_http_url(&self.public_base_url) {
            anyhow::bail!("PUBLIC_BASE_URL must start with 'http://' or 'https://'");
        }

        self.trello.validate()?;

        Ok(())
    }
}

impl TrelloConfig {
    pub fn from_env() -> Result<Self> {
        let api_base = env::var("TRELLO_API_BASE")
            .unwrap_or_else(|_| "https://api.trello.com".to_string());

        let api_key = env::var("TRELLO_API_KEY")
            .context("TRELLO_API_KEY environment variable is required")?;

        let api_token = env::var("TRELLO_API_TOKEN")
            .context("TRELLO_API_TOKEN environment variable is required")?;

        let feedback_list_id = env::var("TRELLO_FEEDBACK_LIST_ID")
            .context("TRELLO_FEEDBACK_LIST_ID environment variable is required")?;

        let images_list_id = env::var("TRELLO_NEW_IMAGES_LIST_ID")
            .context("TRELLO_NEW_IMAGES_LIST_ID environment variable is required")?;

        let member_ids = split_list(&env::var("TRELLO_MEMBER_IDS").unwrap_or_default());

        let timeout_secs = env::var("FORWARDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("FORWARDER_TIMEOUT_SECS must be a valid number of seconds")?;

        Ok(TrelloConfig {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            api_token,
            feedback_list_id,
            images_list_id,
            member_ids,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.api_base) {
            anyhow::bail!("TRELLO_API_BASE must start with 'http://' or 'https://'");
        }

        if self.api_key.trim().is_empty() {
            anyhow::bail!("Trello API key cannot be empty");
        }

        if self.api_token.trim().is_empty() {
            anyhow::bail!("Trello API token cannot be empty");
        }

        if self.feedback_list_id.trim().is_empty() {
            anyhow::bail!("Trello feedback list id cannot be empty");
        }

        if self.images_list_id.trim().is_empty() {
            anyhow::bail!("Trello new-images list id cannot be empty");
        }

        if self.timeout.as_secs() == 0 {
            anyhow::bail!("Forwarder timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Split a comma-separated value, dropping blanks
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
pub(crate) fn test_trello_config(api_base: &str) -> TrelloConfig {
    TrelloConfig {
        api_base: api_base.to_string(),
        api_key: "key".to_string(),
        api_token: "token".to_string(),
        feedback_list_id: "feedback-list".to_string(),
        images_list_id: "images-list".to_string(),
        member_ids: vec!["member-a".to_string(), "member-b".to_string()],
        timeout: Duration::from_secs(5),
    }
}
