use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub session: SessionConfig,
    pub annotation: AnnotationConfig,
    pub metadata_writer: MetadataWriterConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// Limits applied to every editing session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of entries a session can hold
    pub max_entries: usize,
    /// Sessions untouched for longer than this are torn down
    pub idle_ttl: Duration,
    /// How often the idle sweeper runs
    pub sweep_interval: Duration,
}

/// AI annotation service (title/tag suggestions)
#[derive(Debug, Clone)]
pub struct AnnotationConfig {
    pub service_url: String,
    /// Provider-side cap on images per request, distinct from `SessionConfig::max_entries`
    pub max_batch_size: usize,
    pub timeout: Duration,
}

/// External IPTC/XMP metadata writer
#[derive(Debug, Clone)]
pub struct MetadataWriterConfig {
    pub service_url: String,
    pub timeout: Duration,
    /// Writer calls allowed in flight across the whole process
    pub max_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
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
            session: SessionConfig::from_env()?,
            annotation: AnnotationConfig::from_env()?,
            metadata_writer: MetadataWriterConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 200 * 1024 * 1024; // 200MB

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

impl SessionConfig {
    const DEFAULT_MAX_ENTRIES: usize = 10;
    const DEFAULT_IDLE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let max_entries = env::var("MAX_ENTRIES")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_ENTRIES.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_ENTRIES must be a valid number".to_string())?;

        if max_entries == 0 {
            return Err("MAX_ENTRIES must be greater than zero".to_string());
        }

        let idle_ttl_secs = env::var("SESSION_IDLE_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_IDLE_TTL_SECS must be a valid number".to_string())?;

        let sweep_interval_secs = env::var("SESSION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_SWEEP_INTERVAL_SECS must be a valid number".to_string())?;

        Ok(Self {
            max_entries,
            idle_ttl: Duration::from_secs(idle_ttl_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs.max(1)),
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            idle_ttl: Duration::from_secs(Self::DEFAULT_IDLE_TTL_SECS),
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl AnnotationConfig {
    const DEFAULT_MAX_BATCH_SIZE: usize = 10;
    const DEFAULT_TIMEOUT_SECS: u64 = 120;

    pub fn from_env() -> Result<Self, String> {
        let service_url = env::var("ANNOTATION_SERVICE_URL")
            .map_err(|_| "ANNOTATION_SERVICE_URL environment variable is required".to_string())?;

        let max_batch_size = env::var("ANNOTATION_MAX_BATCH_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_BATCH_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "ANNOTATION_MAX_BATCH_SIZE must be a valid number".to_string())?;

        let timeout_secs = env::var("ANNOTATION_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "ANNOTATION_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            service_url,
            max_batch_size,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl MetadataWriterConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_MAX_CONCURRENCY: usize = 1;

    pub fn from_env() -> Result<Self, String> {
        let service_url = env::var("METADATA_WRITER_URL")
            .map_err(|_| "METADATA_WRITER_URL environment variable is required".to_string())?;

        let timeout_secs = env::var("METADATA_WRITER_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "METADATA_WRITER_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_concurrency = env::var("METADATA_WRITER_MAX_CONCURRENCY")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONCURRENCY.to_string())
            .parse::<usize>()
            .map_err(|_| "METADATA_WRITER_MAX_CONCURRENCY must be a valid number".to_string())?;

        Ok(Self {
            service_url,
            timeout: Duration::from_secs(timeout_secs),
            max_concurrency: max_concurrency.max(1),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Metastamp API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Image title/keyword tagging sessions".to_string());

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
