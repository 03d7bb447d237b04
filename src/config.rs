use std::env;
use uuid::Uuid;

/// AppConfig
///
/// Immutable runtime configuration, loaded once at startup and shared with handlers
/// through `FromRef`. The `Viewer` extractor reads the secret and environment from it;
/// `main` reads the base path, bind address and admin seeds.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the `x-user-id` bypass and log format.
    pub env: Env,
    // Secret used to verify bearer tokens issued by the identity service.
    pub jwt_secret: String,
    // Prefix the console is served under (the SPA's BASE_URL).
    pub base_path: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Users given an admin session at startup (local mode only).
    pub admin_ids: Vec<Uuid>,
}

/// Env
///
/// Distinguishes local development (pretty logs, `x-user-id` bypass, admin seeding)
/// from production deployments (JSON logs, mandatory secret).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for test setup; no environment variables required.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: "console-router-local-secret".to_string(),
            base_path: "/".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            admin_ids: Vec::new(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment.
    ///
    /// # Panics
    /// Panics when `CONSOLE_JWT_SECRET` is missing in production, or when
    /// `CONSOLE_ADMIN_IDS` contains something that is not a UUID.
    pub fn load() -> Self {
        // 1. Environment marker. Anything but "production" is local.
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // 2. Secrets: fail fast in production, fall back to a dev secret locally.
        let jwt_secret = match env {
            Env::Production => env::var("CONSOLE_JWT_SECRET")
                .expect("FATAL: CONSOLE_JWT_SECRET must be set in production."),
            Env::Local => env::var("CONSOLE_JWT_SECRET")
                .unwrap_or_else(|_| "console-router-local-secret".to_string()),
        };

        // 3. Serving: mount point and bind address.
        let base_path = env::var("CONSOLE_BASE_PATH").unwrap_or_else(|_| "/".to_string());
        let bind_addr =
            env::var("CONSOLE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // 4. Seeded admins. A malformed entry is fatal, never skipped.
        let admin_ids = env::var("CONSOLE_ADMIN_IDS")
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default();

        Self {
            env,
            jwt_secret,
            base_path,
            bind_addr,
            admin_ids,
        }
    }
}

/// Splits a comma-separated UUID list, ignoring blanks.
fn parse_admin_ids(raw: &str) -> Vec<Uuid> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .unwrap_or_else(|_| panic!("FATAL: CONSOLE_ADMIN_IDS entry `{s}` is not a UUID"))
        })
        .collect()
}
