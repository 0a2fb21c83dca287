use jsonwebtoken::Algorithm;
use std::env;

/// AppConfig
///
/// Holds the application's entire configuration. Built once at startup by
/// `AppConfig::load()` and handed to the router inside `AppState`; components
/// pull it through `FromRef` instead of reading globals.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and secret requirements.
    pub env: Env,
    // Which repository implementation backs the API.
    pub storage: Storage,
    // Upper bound of the Postgres connection pool.
    pub max_connections: u32,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Secret used to sign and verify access tokens.
    pub jwt_secret: String,
    // HMAC algorithm used for access tokens (HS256, HS384 or HS512).
    pub jwt_algorithm: Algorithm,
    // Lifetime of an access token.
    pub token_ttl_minutes: i64,
}

/// Env
///
/// Local runs print human-readable logs and tolerate a missing JWT secret;
/// Production emits JSON logs and refuses to start without one.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// Storage
///
/// `Memory` runs the whole API on the in-process repository (seeded with the
/// default roles); useful for demos and front-end work without a database.
#[derive(Clone, PartialEq, Debug)]
pub enum Storage {
    Postgres { url: String },
    Memory,
}

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            storage: Storage::Memory,
            max_connections: 5,
            bind_addr: "127.0.0.1:3000".to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            jwt_algorithm: Algorithm::HS256,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the environment and implements the **fail-fast**
    /// principle.
    ///
    /// # Panics
    /// Panics when a variable required for the current environment is missing or
    /// unparsable, so the server never starts half-configured:
    /// - `JWT_SECRET` in production,
    /// - `DATABASE_URL` unless `APP_STORAGE=memory`,
    /// - a non-HMAC `JWT_ALGORITHM`, a non-positive `JWT_TOKEN_EXPIRES_MINUTES`.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").unwrap_or_else(|_| "local".to_string()).as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let storage = match env::var("APP_STORAGE").as_deref() {
            Ok("memory") => Storage::Memory,
            _ => Storage::Postgres {
                url: env::var("DATABASE_URL").expect("FATAL: DATABASE_URL must be set."),
            },
        };

        let jwt_algorithm = match env::var("JWT_ALGORITHM") {
            Ok(name) => parse_hmac_algorithm(&name)
                .unwrap_or_else(|| panic!("FATAL: JWT_ALGORITHM '{name}' is not an HMAC algorithm.")),
            Err(_) => Algorithm::HS256,
        };

        let token_ttl_minutes = match env::var("JWT_TOKEN_EXPIRES_MINUTES") {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => panic!("FATAL: JWT_TOKEN_EXPIRES_MINUTES must be a positive integer."),
            },
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(5);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            env,
            storage,
            max_connections,
            bind_addr,
            jwt_secret,
            jwt_algorithm,
            token_ttl_minutes,
        }
    }
}

/// Tokens are signed with a shared secret, so only the HMAC family applies.
pub fn parse_hmac_algorithm(name: &str) -> Option<Algorithm> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}
