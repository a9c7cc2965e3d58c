//! HTTP server settings.

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Read from `PANTRY_BIND_ADDR` (default `0.0.0.0:8080`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("PANTRY_BIND_ADDR").map(|v| v.trim().to_string()) {
            Some(addr) if !addr.is_empty() => Self { bind_addr: addr },
            _ => {
                tracing::warn!("PANTRY_BIND_ADDR not set; using {DEFAULT_BIND_ADDR}");
                Self::default()
            }
        }
    }
}
