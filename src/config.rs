//! Input configuration for the static website construct.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parsing::{parse_attributes_str, AttributeValue};
use crate::variables::Variables;

/// project names feed into the bucket name, which has a 63 character limit.
pub const MAX_PROJECT_NAME_LEN: usize = 12;

/// Errors raised while loading a [`ConstructConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read .env file {path}: {source}")]
    DotEnv {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid attribute syntax: {0}")]
    Syntax(String),

    #[error("Unexpected key '{0}' in static website attributes")]
    UnexpectedKey(String),

    #[error("Expected {expected} type at {key}. Instead found {found}")]
    ExpectedType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unexpected value '{value}' for {key}. Expected true or false")]
    InvalidBool { key: String, value: String },

    #[error("Must provide '{0}' to static website attributes")]
    MissingKey(&'static str),

    #[error("Failed to find value for '{0}'. Load it into the variables table, or surround it in double quotes to use it as is")]
    UnknownVariable(String),
}

/// Which value the bucket's hosting error-document slot receives.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDocumentMode {
    /// the error slot gets `website_error_document`.
    #[default]
    Independent,
    /// the error slot gets `website_index_document`, so single page apps
    /// route every miss back to the index.
    MirrorIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructConfig {
    /// 1 to 12 ascii alphanumeric characters.
    #[serde(alias = "projectName")]
    pub project_name: String,

    /// local folder whose contents are copied into the bucket at deploy time.
    /// when `None`, no seeding resources are declared.
    #[serde(default, alias = "s3WebsiteDeploySource")]
    pub s3_website_deploy_source: Option<PathBuf>,

    #[serde(alias = "websiteIndexDocument")]
    pub website_index_document: String,

    #[serde(alias = "websiteErrorDocument")]
    pub website_error_document: String,

    /// served by the distribution for requests to `/`.
    #[serde(alias = "cdnWebsiteIndexDocument")]
    pub cdn_website_index_document: String,

    #[serde(alias = "cdnComment")]
    pub cdn_comment: String,

    #[serde(alias = "useCdn")]
    pub use_cdn: bool,

    #[serde(default, alias = "errorDocumentMode")]
    pub error_document_mode: ErrorDocumentMode,
}

impl ConstructConfig {
    /// the document the bucket serves on errors, after applying `error_document_mode`.
    pub fn hosting_error_document(&self) -> &str {
        match self.error_document_mode {
            ErrorDocumentMode::Independent => &self.website_error_document,
            ErrorDocumentMode::MirrorIndex => &self.website_index_document,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let out = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), project = %out.project_name, "loaded construct config");
        Ok(out)
    }

    /// parses attribute syntax such as
    /// `{ project_name: "pname", website_index_document: "index.html", use_cdn: true, .. }`.
    /// camelCase keys are accepted as well. bare identifiers resolve through `vars`.
    pub fn from_attributes(attr: &str, vars: &Variables) -> Result<Self, ConfigError> {
        let value = parse_attributes_str(attr, vars)?;
        Self::try_from(value)
    }
}

impl TryFrom<AttributeValue> for ConstructConfig {
    type Error = ConfigError;

    fn try_from(value: AttributeValue) -> Result<Self, Self::Error> {
        let map = value.assert_map("static website attributes")?;
        let mut project_name = None;
        let mut deploy_source = None;
        let mut index_document = None;
        let mut error_document = None;
        let mut cdn_index_document = None;
        let mut cdn_comment = None;
        let mut use_cdn = None;
        let mut error_document_mode = ErrorDocumentMode::default();
        for (key, val) in map {
            match key.as_str() {
                "project_name" | "projectName" => {
                    project_name = Some(val.assert_str(&key)?);
                }
                "s3_website_deploy_source" | "s3WebsiteDeploySource" => {
                    deploy_source = Some(PathBuf::from(val.assert_str(&key)?));
                }
                "website_index_document" | "websiteIndexDocument" => {
                    index_document = Some(val.assert_str(&key)?);
                }
                "website_error_document" | "websiteErrorDocument" => {
                    error_document = Some(val.assert_str(&key)?);
                }
                "cdn_website_index_document" | "cdnWebsiteIndexDocument" => {
                    cdn_index_document = Some(val.assert_str(&key)?);
                }
                "cdn_comment" | "cdnComment" | "description" => {
                    cdn_comment = Some(val.assert_str(&key)?);
                }
                "use_cdn" | "useCdn" => {
                    use_cdn = Some(val.assert_bool(&key)?);
                }
                "error_document_mode" | "errorDocumentMode" => {
                    let mode = val.assert_str(&key)?;
                    error_document_mode = match mode.as_str() {
                        "independent" => ErrorDocumentMode::Independent,
                        "mirror_index" => ErrorDocumentMode::MirrorIndex,
                        _ => return Err(ConfigError::Syntax(format!("Unexpected error_document_mode '{mode}'. Expected independent or mirror_index"))),
                    };
                }
                other => return Err(ConfigError::UnexpectedKey(other.to_string())),
            }
        }
        Ok(Self {
            project_name: project_name.ok_or(ConfigError::MissingKey("project_name"))?,
            s3_website_deploy_source: deploy_source,
            website_index_document: index_document.ok_or(ConfigError::MissingKey("website_index_document"))?,
            website_error_document: error_document.ok_or(ConfigError::MissingKey("website_error_document"))?,
            cdn_website_index_document: cdn_index_document.ok_or(ConfigError::MissingKey("cdn_website_index_document"))?,
            cdn_comment: cdn_comment.ok_or(ConfigError::MissingKey("cdn_comment"))?,
            use_cdn: use_cdn.ok_or(ConfigError::MissingKey("use_cdn"))?,
            error_document_mode,
        })
    }
}
