use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use meshmock_core::{validate_port, MeshConfig, Scalar};
use meshmock_telemetry::TelemetryConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ConfigFormat {
    Auto,
    Toml,
    Yaml,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format:?} config: {details}")]
    Parse {
        format: ConfigFormat,
        details: String,
    },
    #[error("configuration invalid: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub mesh: MeshConfig,
    #[serde(default)]
    pub session: SessionSection,
    pub telemetry: TelemetryConfig,
}

/// Ports used by the scripted walkthrough session.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SessionSection {
    #[serde(default = "default_beamsplitter_inport")]
    pub beamsplitter_inport: Scalar,
    #[serde(default = "default_beamsplitter_outports")]
    pub beamsplitter_outports: Vec<Scalar>,
    #[serde(default = "default_interconnect_inport")]
    pub interconnect_inport: Scalar,
    #[serde(default = "default_interconnect_outport")]
    pub interconnect_outport: Scalar,
    #[serde(default = "default_interrogate_inport")]
    pub interrogate_inport: Scalar,
}

fn default_beamsplitter_inport() -> Scalar {
    Scalar::Int(2)
}

fn default_beamsplitter_outports() -> Vec<Scalar> {
    Scalar::list([17, 19])
}

fn default_interconnect_inport() -> Scalar {
    Scalar::Int(25)
}

fn default_interconnect_outport() -> Scalar {
    Scalar::Int(29)
}

fn default_interrogate_inport() -> Scalar {
    Scalar::Int(1)
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            beamsplitter_inport: default_beamsplitter_inport(),
            beamsplitter_outports: default_beamsplitter_outports(),
            interconnect_inport: default_interconnect_inport(),
            interconnect_outport: default_interconnect_outport(),
            interrogate_inport: default_interrogate_inport(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.beamsplitter_outports.is_empty() {
            return Err(ConfigError::Validation(
                "beamsplitter-outports must name at least one port".into(),
            ));
        }
        let singles = [
            ("beamsplitter-inport", &session.beamsplitter_inport),
            ("interconnect-inport", &session.interconnect_inport),
            ("interconnect-outport", &session.interconnect_outport),
            ("interrogate-inport", &session.interrogate_inport),
        ];
        let listed = session
            .beamsplitter_outports
            .iter()
            .map(|port| ("beamsplitter-outports", port));
        for (key, port) in singles.into_iter().chain(listed) {
            validate_port(port)
                .map_err(|err| ConfigError::Validation(format!("session.{key}: {err}")))?;
        }
        Ok(())
    }

    pub fn sample() -> Self {
        Self {
            mesh: MeshConfig::default(),
            session: SessionSection::default(),
            telemetry: TelemetryConfig::sample("http://localhost:4318"),
        }
    }
}

pub fn load_config(path: &Path, format: ConfigFormat) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, resolve_format(path, format))?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|err| ConfigError::Parse {
            format,
            details: err.to_string(),
        }),
        ConfigFormat::Toml | ConfigFormat::Auto => {
            toml::from_str(contents).map_err(|err| ConfigError::Parse {
                format: ConfigFormat::Toml,
                details: err.to_string(),
            })
        }
    }
}

fn resolve_format(path: &Path, format: ConfigFormat) -> ConfigFormat {
    match format {
        ConfigFormat::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        },
        _ => format,
    }
}
