use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Session cookie/token settings and the optional bootstrap admin account
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// S3-compatible object storage configuration (Cloudflare R2 in production)
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Explicit endpoint URL (e.g. MinIO in development). Takes precedence over `account_id`.
    pub endpoint: Option<String>,
    /// Cloudflare account id, used to derive the R2 endpoint
    pub account_id: Option<String>,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing images
    pub bucket: String,
    /// Region name ("auto" for R2)
    pub region: String,
    /// Public base URL objects are served from, without trailing slash
    pub public_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            session: SessionConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SessionConfig {
    const DEFAULT_TTL_HOURS: u64 = 24 * 7;
    pub const DEFAULT_COOKIE_NAME: &'static str = "tourbook_session";

    pub fn from_env() -> Result<Self, String> {
        let ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| Self::DEFAULT_TTL_HOURS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_TTL_HOURS must be a valid number".to_string())?;

        if ttl_hours == 0 {
            return Err("SESSION_TTL_HOURS must be greater than zero".to_string());
        }

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        // Bootstrap credentials are optional; both must be present to take effect
        let admin_email = env::var("ADMIN_EMAIL")
            .ok()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());
        let admin_name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());

        Ok(Self {
            ttl: Duration::from_secs(ttl_hours * 3600),
            cookie_name: Self::DEFAULT_COOKIE_NAME.to_string(),
            cookie_secure,
            admin_email,
            admin_password,
            admin_name,
        })
    }

    /// Returns bootstrap admin credentials when both email and password are configured
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Tourbook API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Tourism content management API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint = env::var("STORAGE_ENDPOINT").ok().filter(|s| !s.is_empty());
        let account_id = env::var("R2_ACCOUNT_ID").ok().filter(|s| !s.is_empty());

        if endpoint.is_none() && account_id.is_none() {
            return Err("Either STORAGE_ENDPOINT or R2_ACCOUNT_ID must be set".to_string());
        }

        let access_key = env::var("STORAGE_ACCESS_KEY")
            .map_err(|_| "STORAGE_ACCESS_KEY environment variable is required".to_string())?;

        let secret_key = env::var("STORAGE_SECRET_KEY")
            .map_err(|_| "STORAGE_SECRET_KEY environment variable is required".to_string())?;

        let bucket = env::var("STORAGE_BUCKET").unwrap_or_else(|_| "tourbook-images".to_string());

        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string());

        let public_url = env::var("STORAGE_PUBLIC_URL")
            .map_err(|_| "STORAGE_PUBLIC_URL environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            endpoint,
            account_id,
            access_key,
            secret_key,
            bucket,
            region,
            public_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_config(email: Option<&str>, password: Option<&str>) -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(3600),
            cookie_name: "tourbook_session".to_string(),
            cookie_secure: false,
            admin_email: email.map(str::to_string),
            admin_password: password.map(str::to_string),
            admin_name: "Administrator".to_string(),
        }
    }

    #[test]
    fn test_bootstrap_admin_requires_both_fields() {
        assert!(session_config(None, None).bootstrap_admin().is_none());
        assert!(session_config(Some("a@b.c"), None)
            .bootstrap_admin()
            .is_none());
        assert_eq!(
            session_config(Some("a@b.c"), Some("secret-pass")).bootstrap_admin(),
            Some(("a@b.c", "secret-pass"))
        );
    }

    #[test]
    fn test_swagger_credentials() {
        let swagger = SwaggerConfig {
            username: Some("docs".to_string()),
            password: Some("pw".to_string()),
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), Some("docs:pw".to_string()));
    }
}
