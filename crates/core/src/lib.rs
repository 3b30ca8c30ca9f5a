pub mod domain;
pub mod fetch;
pub mod fixtures;
pub mod normalize;
pub mod pipeline;
pub mod select;
pub mod storage;
pub mod view;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub proposals_api_base_url: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                proposals_api_base_url: std::env::var("PROPOSALS_API_BASE_URL").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_proposals_api_base_url(&self) -> anyhow::Result<&str> {
            self.proposals_api_base_url
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .context("PROPOSALS_API_BASE_URL is required")
        }
    }
}
