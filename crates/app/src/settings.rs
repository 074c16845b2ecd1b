//! Application settings, loaded from `gruzzolo.toml` with environment
//! overrides (`GRUZZOLO__SERVER__PORT=8080` and friends).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 3000)?
            .set_default("server.database.sqlite", "./gruzzolo.db")?
            .add_source(File::with_name("gruzzolo").required(false))
            .add_source(Environment::with_prefix("GRUZZOLO").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
