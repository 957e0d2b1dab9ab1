/// Error raised while reading a stream configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration is not valid TOML.
    #[error("invalid toml: {0}")]
    TomlFormat(#[from] toml::de::Error),
    /// The configuration is valid TOML but does not describe a valid
    /// stream configuration.
    #[error("invalid stream configuration: {0}")]
    ConfigFormat(String),
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}
