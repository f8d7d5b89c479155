use config::ConfigError;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub blog: BlogSettings,
    pub transport: TransportSettings,
}

#[derive(Deserialize, Clone)]
pub struct BlogSettings {
    // 表单所在页面的地址，相对端点据此解析
    pub base_url: String,
}

#[derive(Deserialize, Clone)]
pub struct TransportSettings {
    pub user_agent: String,
    /// Unset means the HTTP client's own default.
    pub timeout_secs: Option<u64>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let s = config::Config::builder()
            .set_default("blog.base_url", "http://127.0.0.1:8080/")?
            .set_default(
                "transport.user_agent",
                concat!("rtfblog-client/", env!("CARGO_PKG_VERSION")),
            )?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(
                config::Environment::with_prefix("RTFBLOG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
