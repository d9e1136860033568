// # ncdnsd - ncdns Webhook Daemon
//
// This daemon is a THIN integration layer: all record logic lives in
// ncdns-core and the registrar crates. Configuration is via environment
// variables only.
//
// The ncdnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Resolving the client IP the registrar expects
// 3. Registering registrar backends
// 4. Serving the external-dns webhook until SIGTERM / SIGINT
//
// ## Configuration
//
// ### Registrar
// - `NAMECHEAP_API_USER`: API user (required)
// - `NAMECHEAP_API_KEY`: API key (required)
// - `NAMECHEAP_USERNAME`: Account user name (defaults to the API user)
// - `NAMECHEAP_CLIENT_IP`: Whitelisted client IP (skips discovery)
// - `NAMECHEAP_SANDBOX`: Use the sandbox endpoint
// - `IP_DISCOVERY_URL`: Plain-text IP service (default: https://api.ipify.org)
//
// ### Webhook
// - `DOMAIN_FILTER`: The one domain to manage, e.g. `example.com`
// - `HOST`: Bind address (default: 0.0.0.0)
// - `PORT`: Bind port (default: 8888)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ### Reconciliation
// - `NCDNS_DRY_RUN`: Fetch for real, only log replacements
// - `NCDNS_DEDUPE_CREATES`: Skip creates that already exist (default: true)
// - `NCDNS_DEFAULT_TTL`: TTL for endpoints without one (default: 1800)
//
// ## Example
//
// ```bash
// export NAMECHEAP_API_USER=alice
// export NAMECHEAP_API_KEY=your_key
// export DOMAIN_FILTER=example.com
//
// ncdnsd
// ```

use anyhow::{Context, Result};
use ncdns_core::config::{ReconcileConfig, ServerConfig};
use ncdns_core::record::DEFAULT_TTL;
use ncdns_core::{IpSource, RegistrarConfig, WebhookConfig, WebhookService};
use std::env;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum NcdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<NcdnsExitCode> for ExitCode {
    fn from(code: NcdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Client IP used when discovery fails
const FALLBACK_CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Application configuration
struct Config {
    api_user: String,
    api_key: String,
    username: String,
    client_ip: Option<IpAddr>,
    sandbox: bool,
    ip_discovery_url: String,
    domain_filter: Option<String>,
    host: String,
    port: u16,
    log_level: String,
    dry_run: bool,
    dedupe_creates: bool,
    default_ttl: u32,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_user = var("NAMECHEAP_API_USER").unwrap_or_default();
        let client_ip = var("NAMECHEAP_CLIENT_IP")
            .map(|ip| {
                ip.parse::<IpAddr>()
                    .with_context(|| format!("NAMECHEAP_CLIENT_IP '{}' is not an IP address", ip))
            })
            .transpose()?;
        let port = var("PORT")
            .map(|p| {
                p.parse::<u16>()
                    .with_context(|| format!("PORT '{}' is not a valid port", p))
            })
            .transpose()?
            .unwrap_or(ServerConfig::default().port);
        let default_ttl = var("NCDNS_DEFAULT_TTL")
            .map(|t| {
                t.parse::<u32>()
                    .with_context(|| format!("NCDNS_DEFAULT_TTL '{}' is not a number", t))
            })
            .transpose()?
            .unwrap_or(DEFAULT_TTL);

        Ok(Self {
            username: var("NAMECHEAP_USERNAME").unwrap_or_else(|| api_user.clone()),
            api_user,
            api_key: var("NAMECHEAP_API_KEY").unwrap_or_default(),
            client_ip,
            sandbox: parse_flag(var("NAMECHEAP_SANDBOX"), false),
            ip_discovery_url: var("IP_DISCOVERY_URL")
                .unwrap_or_else(|| ncdns_ip_http::DEFAULT_IP_DISCOVERY_URL.to_string()),
            domain_filter: var("DOMAIN_FILTER"),
            host: var("HOST").unwrap_or_else(|| ServerConfig::default().host),
            port,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            dry_run: parse_flag(var("NCDNS_DRY_RUN"), false),
            dedupe_creates: parse_flag(var("NCDNS_DEDUPE_CREATES"), true),
            default_ttl,
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.api_user.is_empty() {
            anyhow::bail!(
                "NAMECHEAP_API_USER is required. \
                Set it via: export NAMECHEAP_API_USER=your_user"
            );
        }

        if self.api_key.is_empty() {
            anyhow::bail!(
                "NAMECHEAP_API_KEY is required. \
                Set it via: export NAMECHEAP_API_KEY=your_key"
            );
        }

        // Check for obvious placeholder keys (common mistake)
        let key_lower = self.api_key.to_lowercase();
        if key_lower.contains("your_key") || key_lower.contains("replace_me") {
            anyhow::bail!(
                "NAMECHEAP_API_KEY appears to be a placeholder. \
                Use the API key from your Namecheap account."
            );
        }

        if !self.ip_discovery_url.starts_with("https://")
            && !self.ip_discovery_url.starts_with("http://")
        {
            anyhow::bail!(
                "IP_DISCOVERY_URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_discovery_url
            );
        }

        parse_level(&self.log_level)?;

        // The rest is checked by the core config.
        self.webhook_config(self.client_ip)
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Build the core configuration for a resolved client IP
    fn webhook_config(&self, client_ip: Option<IpAddr>) -> WebhookConfig {
        let registrar = RegistrarConfig::Namecheap {
            api_user: self.api_user.clone(),
            api_key: self.api_key.clone(),
            username: self.username.clone(),
            client_ip,
            sandbox: self.sandbox,
            dry_run: self.dry_run,
        };

        let mut config = WebhookConfig::new(registrar);
        config.domain_filter = self.domain_filter.clone();
        config.server = ServerConfig {
            host: self.host.clone(),
            port: self.port,
        };
        config.reconcile = ReconcileConfig {
            default_ttl: self.default_ttl,
            dedupe_creates: self.dedupe_creates,
        };
        config
    }
}

/// Parse a boolean environment flag
fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Parse a log level name
fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return NcdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return NcdnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = parse_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return NcdnsExitCode::ConfigError.into();
    }

    info!("Starting ncdnsd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return NcdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            NcdnsExitCode::RuntimeError
        } else {
            NcdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let client_ip = resolve_client_ip(&config).await;
    let webhook_config = config.webhook_config(Some(client_ip));

    // Create registrar registry
    let registry = ncdns_core::RegistrarRegistry::new();

    #[cfg(feature = "namecheap")]
    {
        info!("Registering Namecheap registrar");
        ncdns_registrar_namecheap::register(&registry);
    }

    let repository = registry
        .create_repository(&webhook_config.registrar)
        .context("Failed to create registrar")?;
    let service = Arc::new(WebhookService::new(repository, &webhook_config)?);

    let addr = format!("{}:{}", webhook_config.server.host, webhook_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Serving external-dns webhook on {}", addr);

    let shutdown = shutdown_signal()?;
    ncdns_core::http::serve(listener, service, shutdown).await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Use the configured client IP, or discover it
///
/// Discovery never aborts startup: on failure the loopback address is used
/// and every registrar call will be rejected until the IP is configured.
async fn resolve_client_ip(config: &Config) -> IpAddr {
    if let Some(ip) = config.client_ip {
        info!("Using configured client IP {}", ip);
        return ip;
    }

    let discovered = match ncdns_ip_http::HttpIpSource::new(config.ip_discovery_url.as_str()) {
        Ok(source) => source.current().await,
        Err(e) => Err(e),
    };

    match discovered {
        Ok(ip) => ip,
        Err(e) => {
            warn!(
                "Client IP discovery via {} failed: {}. Falling back to {}; \
                registrar calls will fail until NAMECHEAP_CLIENT_IP is set",
                config.ip_discovery_url, e, FALLBACK_CLIENT_IP
            );
            FALLBACK_CLIENT_IP
        }
    }
}

/// Resolve once SIGTERM or SIGINT arrives
///
/// Signal handlers are installed before returning so that a failure to
/// install them is a startup error.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let signal = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", signal);
    })
}

/// Resolve once CTRL-C arrives
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    })
}
