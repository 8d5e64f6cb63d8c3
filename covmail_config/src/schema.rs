use covmail_core::BatchSpec;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::ConfigError;

pub const ALLOWED_KEYS: [&str; 3] = ["Site_Name", "Email_Account", "Folder_Path"];

static EMAIL_PATTERN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&’*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
});

const SITE_LIST_TEMPLATE: &str = r#"[
  {
    "Site_Name": "Example Site",
    "Email_Account": "testing@example.org",
    "Folder_Path": "Inbox/Test Results"
  }
]
"#;

/// Which site list to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Prod,
    Dev,
}

impl Environment {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Prod => "site_list_prod.json",
            Self::Dev => "site_list_dev.json",
        }
    }
}

/// Directory holding the site lists, `~/covmail`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join("covmail"))
        .ok_or(ConfigError::NoHomeDir)
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Site {
    #[serde(rename = "Site_Name")]
    pub site_name: String,
    #[serde(rename = "Email_Account")]
    pub email_account: String,
    #[serde(rename = "Folder_Path")]
    pub folder_path: String,
}

impl From<&Site> for BatchSpec {
    fn from(site: &Site) -> Self {
        Self {
            context_label: site.site_name.clone(),
            account: site.email_account.clone(),
            folder_path: site.folder_path.clone(),
        }
    }
}

/// A problem that is reported but does not reject the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub site: String,
    pub key: &'static str,
    pub value: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct SiteList {
    sites: Vec<Site>,
    issues: Vec<ValidationIssue>,
}

impl SiteList {
    pub fn default_path(env: Environment) -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join(env.file_name()))
    }

    pub fn load(env: Environment) -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path(env)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            error!("Could not find site list named '{}'", path.display());
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let list = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            sites = list.sites.len(),
            "Loaded site list"
        );
        Ok(list)
    }

    /// Parse and validate a site list.
    ///
    /// A key outside [`ALLOWED_KEYS`] rejects the whole list. An
    /// `Email_Account` that is not an email address is logged and recorded
    /// as a [`ValidationIssue`]; the site is kept.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: Vec<Map<String, Value>> = serde_json::from_str(content)?;
        let email = EMAIL_PATTERN.as_ref().map_err(|e| ConfigError::Pattern(e.clone()))?;

        let mut list = Self::default();
        for entry in raw {
            let site_label = entry
                .get("Site_Name")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>")
                .to_string();

            if let Some(key) = entry.keys().find(|k| !ALLOWED_KEYS.contains(&k.as_str())) {
                error!(
                    key = %key,
                    site = %site_label,
                    "Site list validation error, JSON key was not allowed"
                );
                return Err(ConfigError::DisallowedKey {
                    key: key.clone(),
                    site: site_label,
                    allowed: ALLOWED_KEYS.join(", "),
                });
            }

            let site: Site = serde_json::from_value(Value::Object(entry))?;

            if !email.is_match(&site.email_account) {
                error!(
                    site = %site.site_name,
                    value = %site.email_account,
                    "Site list validation error, Email_Account is not an email address"
                );
                list.issues.push(ValidationIssue {
                    site: site.site_name.clone(),
                    key: "Email_Account",
                    value: site.email_account.clone(),
                    message: "value is not an email address".to_string(),
                });
            }

            list.sites.push(site);
        }

        Ok(list)
    }

    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    #[must_use]
    pub fn batches(&self) -> Vec<BatchSpec> {
        self.sites.iter().map(BatchSpec::from).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Write a template site list for `env` into the config directory.
    pub fn create_template(env: Environment) -> Result<PathBuf, ConfigError> {
        let dir = config_dir()?;
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(env.file_name());
        Self::create_template_at(&path)?;
        Ok(path)
    }

    pub fn create_template_at(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        std::fs::write(path, SITE_LIST_TEMPLATE)?;
        Ok(())
    }
}
