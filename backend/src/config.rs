//! Runtime configuration, read once from the environment at start-up.

use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Return address printed on every envelope label unless `LABELDESK_SENDER`
/// overrides it.
pub const DEFAULT_SENDER: [&str; 6] = [
    "HIRANYA MAGAZINE",
    "12/2375 C.N. ARCADE",
    "Florican Road",
    "Malaparamba, Kozhikode",
    "Kerala - 673 009",
    "Ph: 0495-2961151",
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Where session datasets live.
    pub data_dir: PathBuf,
    /// Directory holding the TTF files used for labels.
    pub fonts_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub sender: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let sender = match lookup("LABELDESK_SENDER") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.split('|').map(|line| line.trim().to_string()).collect()
            }
            _ => DEFAULT_SENDER.iter().map(|l| l.to_string()).collect(),
        };
        let max_upload_mb: usize = parse_or(&lookup, "LABELDESK_MAX_UPLOAD_MB", 10);

        Self {
            host: env_or("LABELDESK_HOST", "127.0.0.1"),
            port: parse_or(&lookup, "LABELDESK_PORT", 8080),
            data_dir: PathBuf::from(env_or("LABELDESK_DATA_DIR", "./sessions")),
            fonts_dir: PathBuf::from(env_or("LABELDESK_FONTS_DIR", "./fonts")),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            sender,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{key}={raw:?} is not valid, using {default}");
            default
        }),
    }
}
