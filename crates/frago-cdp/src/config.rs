use std::time::Duration;

/// CDP dial/behavior options. Always constructed by the caller and passed
/// explicitly; never read from a process-wide singleton.
#[derive(Debug, Clone)]
pub struct CdpConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<String>,
    pub no_proxy: bool,
    pub target_id: Option<String>,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9222,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            proxy_host: None,
            proxy_port: None,
            proxy_username: None,
            proxy_password: None,
            no_proxy: false,
            target_id: None,
        }
    }
}

impl CdpConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Opt-in constructor consulting `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY`.
    /// Never called implicitly by connection logic; the caller decides
    /// whether environment defaults apply.
    pub fn from_env_defaults(mut self) -> Self {
        if let Some(bypass) = std::env::var("NO_PROXY").ok() {
            if bypass == "*" || bypass.split(',').any(|h| h.trim() == self.host) {
                self.no_proxy = true;
            }
        }
        if self.proxy_host.is_none() {
            if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("HTTP_PROXY")) {
                if let Ok(url) = url::Url::parse(&proxy) {
                    self.proxy_host = url.host_str().map(str::to_string);
                    self.proxy_port = url.port();
                    if !url.username().is_empty() {
                        self.proxy_username = Some(url.username().to_string());
                    }
                    self.proxy_password = url.password().map(str::to_string);
                }
            }
        }
        self
    }

    pub fn http_base(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
