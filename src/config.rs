use std::env::VarError;

use anyhow::anyhow;
use reqwest::Url;

pub const REQUIRED_VARIABLES: &[&str] = &["PG_URL"];

const DEFAULT_LISTEN_PORT: u16 = 8000;

pub struct Config {
    pub pg_url: String,
    pub listen_port: u16,
}

impl Config {
    pub fn env() -> anyhow::Result<Self> {
        let pg_url = env("PG_URL")?;

        let listen_port = match optional_env("LISTEN_PORT")? {
            Some(port) => port
                .parse()
                .map_err(|e| anyhow!("LISTEN_PORT value {port:?} is not a valid port: {e}"))?,
            None => DEFAULT_LISTEN_PORT,
        };

        Ok(Self {
            pg_url,
            listen_port,
        })
    }

    pub fn log(&self) {
        log::info!("Database: {}", mask_password(&self.pg_url));
        log::info!("Listen port: {}", self.listen_port);
    }
}

/// Replaces the password of a connection url with `***`. Urls that don't
/// parse are returned unchanged.
pub fn mask_password(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    if parsed.password().is_some() && parsed.set_password(Some("***")).is_ok() {
        return parsed.to_string();
    }

    url.to_string()
}

fn env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|e| match e {
        VarError::NotPresent => anyhow!("{name} not set"),
        VarError::NotUnicode(_) => anyhow!("{name} value is not valid unicode"),
    })
}

fn optional_env(name: &str) -> anyhow::Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(anyhow!("{name} value is not valid unicode")),
    }
}
