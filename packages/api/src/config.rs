use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    /// Parent of the per-request scratch directories; system temp dir if unset.
    pub work_dir: Option<PathBuf>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let bind_addr = match env::var("API_BIND_ADDR") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %value, error = %e, "invalid API_BIND_ADDR, using default");
                default_bind_addr()
            }),
            Err(_) => default_bind_addr(),
        };

        let max_upload_bytes = env::var("API_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let work_dir = env::var("API_WORK_DIR").ok().map(PathBuf::from);

        Self {
            bind_addr,
            max_upload_bytes,
            work_dir,
        }
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            work_dir: None,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert!(config.work_dir.is_none());
    }
}
