//! HTTP server command
//!
//! Wires the GitHub client, the repository store, and the rate limiter into
//! `AppState`, then serves until Ctrl+C or SIGTERM.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use repocache_server::db::{self, create_pool_with_options, MemoryRepoStore, PgRepoStore, RepoStore};
use repocache_server::http::{run_server, RateLimitConfig, RateLimiter, ServerConfig};
use repocache_server::upstream::github::DEFAULT_API_BASE;
use repocache_server::upstream::{GitHubClient, GitHubConfig};
use repocache_server::AppState;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, short = 'b', env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// PostgreSQL connection string for the repository cache
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        required_unless_present = "in_memory"
    )]
    pub database_url: Option<String>,

    /// Keep the cache in process memory instead of PostgreSQL (lost on exit)
    #[arg(long)]
    pub in_memory: bool,

    /// GitHub token for authenticated upstream requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    pub github_api_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Maximum database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = db::pool::DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Rate limit window length in seconds (at least 1)
    #[arg(
        long,
        env = "RATE_LIMIT_WINDOW_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub rate_limit_window_secs: u64,

    /// Requests allowed per client per window
    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = 30)]
    pub rate_limit_max: u32,

    /// Key rate limits by X-Forwarded-For (only behind a trusted proxy)
    #[arg(long, env = "TRUST_PROXY")]
    pub trust_proxy: bool,
}

impl ServeArgs {
    fn github_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_base: self.github_api_url.clone(),
            token: self.github_token.clone().filter(|t| !t.trim().is_empty()),
            timeout: Duration::from_secs(self.upstream_timeout_secs),
        }
    }

    fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            window: Duration::from_secs(self.rate_limit_window_secs),
            max_requests: self.rate_limit_max,
            trust_forwarded_for: self.trust_proxy,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let github = args.github_config();
    let authenticated = github.token.is_some();
    let upstream = GitHubClient::new(github).context("Failed to build GitHub client")?;
    tracing::info!(
        api_base = %upstream.api_base(),
        authenticated,
        "GitHub client ready"
    );

    let store: Arc<dyn RepoStore> = if args.in_memory {
        tracing::warn!("Using in-memory repository cache; contents are lost on exit");
        Arc::new(MemoryRepoStore::new())
    } else {
        let database_url = args
            .database_url
            .as_deref()
            .context("DATABASE_URL not set. Set via --database-url or DATABASE_URL env")?;

        let pool = create_pool_with_options(database_url, args.max_connections)
            .await
            .context("Failed to create database pool")?;
        db::migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;

        Arc::new(PgRepoStore::new(pool))
    };

    let rate_limit = args.rate_limit_config();
    tracing::info!(
        window_secs = rate_limit.window.as_secs(),
        max_requests = rate_limit.max_requests,
        trust_proxy = rate_limit.trust_forwarded_for,
        "Inbound rate limit configured"
    );

    let state = AppState::new(Arc::new(upstream), store, RateLimiter::new(rate_limit));
    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.bind, args.port),
    };

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        args: ServeArgs,
    }

    fn parse(argv: &[&str]) -> ServeArgs {
        let mut full = vec!["serve"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn zero_rate_limit_window_is_rejected() {
        let err = Harness::try_parse_from([
            "serve",
            "--in-memory",
            "--rate-limit-window-secs",
            "0",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let args = parse(&["--in-memory", "--rate-limit-window-secs", "1"]);
        assert_eq!(args.rate_limit_config().window, Duration::from_secs(1));
    }

    #[test]
    fn blank_token_means_anonymous() {
        let args = parse(&["--in-memory", "--github-token", "  "]);
        assert!(args.github_config().token.is_none());
    }

    #[test]
    fn explicit_flags_flow_into_configs() {
        let args = parse(&[
            "--database-url",
            "postgres://localhost/repocache",
            "--github-api-url",
            "http://127.0.0.1:9000",
            "--upstream-timeout-secs",
            "3",
            "--rate-limit-window-secs",
            "15",
            "--rate-limit-max",
            "5",
            "--trust-proxy",
        ]);

        let github = args.github_config();
        assert_eq!(github.api_base, "http://127.0.0.1:9000");
        assert_eq!(github.timeout, Duration::from_secs(3));

        let limits = args.rate_limit_config();
        assert_eq!(limits.window, Duration::from_secs(15));
        assert_eq!(limits.max_requests, 5);
        assert!(limits.trust_forwarded_for);
    }
}
