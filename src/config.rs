use std::time::Duration;

/// Configuration for the tracking-service client.
///
/// Certificate validation is always on unless explicitly disabled with
/// [`ClientConfig::danger_accept_invalid_certs`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HTTP request timeout.
    pub timeout: Duration,

    /// TCP connect timeout.
    pub connect_timeout: Duration,

    /// How long idle pooled connections are kept alive.
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,

    /// TCP keepalive interval, if any.
    pub tcp_keepalive: Option<Duration>,

    /// Skip TLS certificate validation. Off by default; only for test
    /// deployments with self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 8,
            tcp_keepalive: None,
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    /// Sets the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the TCP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the TCP keepalive interval.
    pub fn with_tcp_keepalive(mut self, interval: Duration) -> Self {
        self.tcp_keepalive = Some(interval);
        self
    }

    /// Disables TLS certificate validation for this client.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.accept_invalid_certs = true;
        self
    }
}
