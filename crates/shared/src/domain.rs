use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// One of the mutually exclusive page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    Register,
    Upload,
    Results,
}

impl View {
    pub const ALL: [View; 4] = [View::Login, View::Register, View::Upload, View::Results];

    /// Element id of the section in the page markup.
    pub fn section_id(self) -> &'static str {
        match self {
            View::Login => "login-section",
            View::Register => "register-section",
            View::Upload => "upload-section",
            View::Results => "results-section",
        }
    }

    pub fn from_section_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.section_id() == id)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section id '{0}'")]
pub struct UnknownSection(pub String);

impl FromStr for View {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_section_id(trimmed)
            .or_else(|| match trimmed.to_ascii_lowercase().as_str() {
                "login" => Some(View::Login),
                "register" => Some(View::Register),
                "upload" => Some(View::Upload),
                "results" => Some(View::Results),
                _ => None,
            })
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

/// Server-assigned resume identifier. The backend emits numeric ids; other
/// deployments emit strings, so both are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResumeId(pub String);

impl ResumeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ResumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ResumeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => ResumeId(text),
            Raw::Int(n) => ResumeId(n.to_string()),
            Raw::Uint(n) => ResumeId(n.to_string()),
        })
    }
}
