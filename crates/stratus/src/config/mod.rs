use crate::{
    dialect::{Dialect, LEGACY_API_VERSION, STRUCTURED_API_VERSION},
    document::{DEFAULT_LANG, DocumentEncoder, NullFieldPolicy},
    error::{Result, StratusError},
};

pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Whether requests reach the live index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Live,
    /// Searches return an empty page and writes are dropped without touching the transport.
    Sandbox,
}

/// Client configuration. Build one with [`ClientConfig::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub search_domain: Option<String>,
    pub aws_region: String,
    pub api_version: String,
    pub mode: Mode,
    /// Replaces the `http://search-...` / `http://doc-...` hosts, e.g. for a local proxy.
    pub base_url: Option<String>,
    pub lang: String,
    pub null_fields: NullFieldPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_domain: None,
            aws_region: DEFAULT_AWS_REGION.to_owned(),
            api_version: LEGACY_API_VERSION.to_owned(),
            mode: Mode::default(),
            base_url: None,
            lang: DEFAULT_LANG.to_owned(),
            null_fields: NullFieldPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::from_api_version(&self.api_version)
    }

    pub fn is_sandbox(&self) -> bool {
        self.mode == Mode::Sandbox
    }

    pub fn encoder(&self) -> DocumentEncoder {
        DocumentEncoder::new(self.lang.clone(), self.null_fields)
    }

    fn domain(&self) -> Result<&str> {
        self.search_domain
            .as_deref()
            .filter(|domain| !domain.is_empty())
            .ok_or_else(|| {
                StratusError::ConfigError(
                    "No search domain configured. Set one with `ClientConfigBuilder::search_domain`"
                        .to_owned(),
                )
            })
    }

    fn host(&self, service: &str) -> Result<String> {
        let domain = self.domain()?;
        Ok(match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_owned(),
            None => format!(
                "http://{service}-{domain}.{}.cloudsearch.amazonaws.com",
                self.aws_region
            ),
        })
    }

    /// Search endpoint for the configured domain.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::ConfigError`] when no search domain is set.
    pub fn search_url(&self) -> Result<String> {
        Ok(format!("{}/{}/search", self.host("search")?, self.api_version))
    }

    /// Batch endpoint for the configured domain. Fails like [`Self::search_url`].
    pub fn document_url(&self) -> Result<String> {
        Ok(format!(
            "{}/{}/documents/batch",
            self.host("doc")?,
            self.api_version
        ))
    }
}

/// Builder for [`ClientConfig`] with presets for the common setups.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Preset for the `2013-01-01` structured query API.
    pub fn structured() -> Self {
        let mut builder = Self::new();
        builder.config.api_version = STRUCTURED_API_VERSION.to_owned();
        builder
    }

    /// Preset for running without a live index.
    pub fn sandbox() -> Self {
        let mut builder = Self::new();
        builder.config.mode = Mode::Sandbox;
        builder
    }

    pub fn search_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.search_domain = Some(domain.into());
        self
    }

    pub fn aws_region(mut self, region: impl Into<String>) -> Self {
        self.config.aws_region = region.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.config.lang = lang.into();
        self
    }

    pub fn null_fields(mut self, policy: NullFieldPolicy) -> Self {
        self.config.null_fields = policy;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = ClientConfig::builder().search_domain("testdomain").build();
        assert_eq!(
            config.search_url().unwrap(),
            "http://search-testdomain.us-east-1.cloudsearch.amazonaws.com/2011-02-01/search"
        );
        assert_eq!(
            config.document_url().unwrap(),
            "http://doc-testdomain.us-east-1.cloudsearch.amazonaws.com/2011-02-01/documents/batch"
        );
        assert_eq!(config.dialect(), Dialect::Legacy);
    }

    #[test]
    fn test_structured_preset_with_region() {
        let config = ClientConfigBuilder::structured()
            .search_domain("testdomain")
            .aws_region("eu-west-1")
            .build();
        assert_eq!(config.dialect(), Dialect::Structured);
        assert_eq!(
            config.search_url().unwrap(),
            "http://search-testdomain.eu-west-1.cloudsearch.amazonaws.com/2013-01-01/search"
        );
    }

    #[test]
    fn test_unknown_version_keeps_its_path_but_speaks_legacy() {
        let config = ClientConfig::builder()
            .search_domain("d")
            .api_version("2010-05-05")
            .build();
        assert_eq!(config.dialect(), Dialect::Legacy);
        assert!(config.search_url().unwrap().ends_with("/2010-05-05/search"));
    }

    #[test]
    fn test_base_url_override() {
        let config = ClientConfig::builder()
            .search_domain("d")
            .base_url("http://127.0.0.1:1234/")
            .build();
        assert_eq!(
            config.search_url().unwrap(),
            "http://127.0.0.1:1234/2011-02-01/search"
        );
    }

    #[test]
    fn test_missing_domain_is_a_config_error() {
        let config = ClientConfigBuilder::sandbox().build();
        assert!(config.is_sandbox());
        assert!(matches!(
            config.search_url(),
            Err(StratusError::ConfigError(_))
        ));
        assert!(matches!(
            ClientConfig::builder().search_domain("").build().document_url(),
            Err(StratusError::ConfigError(_))
        ));
    }
}
