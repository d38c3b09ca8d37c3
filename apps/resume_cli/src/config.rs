use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::Context;

pub const CONFIG_FILE: &str = "resume-client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub session_path: PathBuf,
    pub notice_ttl_ms: u64,
    pub prevent_duplicate_submissions: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            session_path: PathBuf::from("./data/session.json"),
            notice_ttl_ms: 5000,
            prevent_duplicate_submissions: true,
            log_level: "info".into(),
        }
    }
}

impl Settings {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// Defaults, then `resume-client.toml` when present, then environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(CONFIG_FILE) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
                .with_context(|| format!("failed to parse {CONFIG_FILE}"))?;
            apply_file(&mut settings, &file_cfg);
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err).with_context(|| format!("failed to read {CONFIG_FILE}")),
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("session_path") {
        settings.session_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("notice_ttl_ms").and_then(|v| v.parse().ok()) {
        settings.notice_ttl_ms = v;
    }
    if let Some(v) = file_cfg
        .get("prevent_duplicate_submissions")
        .and_then(|v| parse_bool(v))
    {
        settings.prevent_duplicate_submissions = v;
    }
    if let Some(v) = file_cfg.get("log_level") {
        settings.log_level = v.clone();
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("RESUME_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    if let Some(v) = lookup("APP__NOTICE_TTL_MS").and_then(|v| v.parse().ok()) {
        settings.notice_ttl_ms = v;
    }

    if let Some(v) = lookup("APP__PREVENT_DUPLICATE_SUBMISSIONS").and_then(|v| parse_bool(&v)) {
        settings.prevent_duplicate_submissions = v;
    }

    if let Some(v) = lookup("APP__LOG_LEVEL") {
        settings.log_level = v;
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
