use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use interlinker_core::{
  InterlinkerOptionsBuilder,
  ReportFormat,
  options::{
    DEFAULT_LAYOUT_KEY,
    DEFAULT_LAYOUT_TEMPLATE_LANG_KEY,
    DEFAULT_STUB_URL,
  },
  resolvers::UNABLE_TO_LOCATE_EMBED,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Href for links to missing pages, or `false` to leave them as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StubUrl {
  Enabled(bool),
  Url(String),
}

impl Default for StubUrl {
  fn default() -> Self {
    Self::Url(DEFAULT_STUB_URL.to_string())
  }
}

impl StubUrl {
  /// The stub href, or `None` when stubs are disabled.
  #[must_use]
  pub fn resolve(&self) -> Option<String> {
    match self {
      Self::Url(url) => Some(url.clone()),
      Self::Enabled(true) => Some(DEFAULT_STUB_URL.to_string()),
      Self::Enabled(false) => None,
    }
  }

  fn parse(value: &str) -> Self {
    match value.to_lowercase().as_str() {
      "false" | "no" | "off" => Self::Enabled(false),
      "true" | "yes" | "on" => Self::Enabled(true),
      _ => Self::Url(value.to_string()),
    }
  }
}

/// Interlinker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Input directory containing markdown pages.
  pub input_dir: Option<PathBuf>,

  /// Output directory for rendered pages and the JSON dead link report.
  pub output_dir: PathBuf,

  /// Directory of layout templates available to embeds.
  pub layouts_dir: Option<PathBuf>,

  /// Number of threads to use for rendering pages.
  pub jobs: Option<usize>,

  /// Layout wrapping embeds of pages that don't choose their own.
  pub default_layout: Option<String>,

  /// Template language for embeds of pages that don't choose their own.
  pub default_layout_lang: Option<String>,

  /// Front matter key a page uses to choose its embed layout.
  pub layout_key: String,

  /// Front matter key a page uses to choose its embed template language.
  pub layout_template_lang_key: String,

  /// Href for links to missing pages.
  pub stub_url: StubUrl,

  /// How dead links are reported after a build.
  pub dead_link_report: ReportFormat,

  /// Placeholder rendered for embeds of missing pages.
  pub unable_to_locate_embed: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:                None,
      output_dir:               PathBuf::from("_site"),
      layouts_dir:              None,
      jobs:                     None,
      default_layout:           None,
      default_layout_lang:      None,
      layout_key:               DEFAULT_LAYOUT_KEY.to_string(),
      layout_template_lang_key: DEFAULT_LAYOUT_TEMPLATE_LANG_KEY.to_string(),
      stub_url:                 StubUrl::default(),
      dead_link_report:         ReportFormat::default(),
      unable_to_locate_embed:   UNABLE_TO_LOCATE_EMBED.to_string(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from the given files, or a discovered one, then apply
  /// `KEY=VALUE` overrides.
  ///
  /// Multiple files are merged in order, later files taking precedence.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for config_path in rest {
        merged.merge(Self::from_file(config_path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in KEY=VALUE format, names an
  /// unknown key, or has a value of the wrong type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override. Empty values clear optional keys.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value is invalid.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
    let required = |value: &str| {
      if value.is_empty() {
        Err(ConfigError::Config(format!(
          "Configuration key '{key}' cannot be empty"
        )))
      } else {
        Ok(value.to_string())
      }
    };

    match key {
      "input_dir" => self.input_dir = optional(value).map(PathBuf::from),
      "output_dir" => self.output_dir = PathBuf::from(required(value)?),
      "layouts_dir" => self.layouts_dir = optional(value).map(PathBuf::from),
      "jobs" => {
        self.jobs = optional(value)
          .map(|jobs| {
            jobs.parse::<usize>().map_err(|e| {
              ConfigError::Config(format!("Invalid value for 'jobs': {e}"))
            })
          })
          .transpose()?;
      },
      "default_layout" => self.default_layout = optional(value),
      "default_layout_lang" => self.default_layout_lang = optional(value),
      "layout_key" => self.layout_key = required(value)?,
      "layout_template_lang_key" => {
        self.layout_template_lang_key = required(value)?;
      },
      "stub_url" => self.stub_url = StubUrl::parse(&required(value)?),
      "dead_link_report" => {
        self.dead_link_report = match value.to_lowercase().as_str() {
          "console" => ReportFormat::Console,
          "json" => ReportFormat::Json,
          "none" => ReportFormat::None,
          other => {
            return Err(ConfigError::Config(format!(
              "Invalid value for 'dead_link_report': '{other}'. Expected \
               console, json or none"
            )));
          },
        };
      },
      "unable_to_locate_embed" => self.unable_to_locate_embed = value.to_string(),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - Plain fields: Other's value always replaces
  pub fn merge(&mut self, other: Self) {
    if other.input_dir.is_some() {
      self.input_dir = other.input_dir;
    }
    if other.layouts_dir.is_some() {
      self.layouts_dir = other.layouts_dir;
    }
    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
    if other.default_layout.is_some() {
      self.default_layout = other.default_layout;
    }
    if other.default_layout_lang.is_some() {
      self.default_layout_lang = other.default_layout_lang;
    }
    self.output_dir = other.output_dir;
    self.layout_key = other.layout_key;
    self.layout_template_lang_key = other.layout_template_lang_key;
    self.stub_url = other.stub_url;
    self.dead_link_report = other.dead_link_report;
    self.unable_to_locate_embed = other.unable_to_locate_embed;
  }

  /// Runtime options for the link resolver, ready for resolvers to be
  /// registered.
  #[must_use]
  pub fn interlinker_options(&self) -> InterlinkerOptionsBuilder {
    InterlinkerOptionsBuilder::new()
      .default_layout(self.default_layout.clone())
      .default_layout_lang(self.default_layout_lang.clone())
      .layout_key(self.layout_key.clone())
      .layout_template_lang_key(self.layout_template_lang_key.clone())
      .stub_url(self.stub_url.resolve())
      .dead_link_report(self.dead_link_report)
      .unable_to_locate_embed(self.unable_to_locate_embed.clone())
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "interlinker.toml",
          "interlinker.json",
          ".interlinker.toml",
          ".interlinker.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        config_filenames
          .iter()
          .map(|filename| current_dir.join(filename))
          .find(|path| path.exists())
      })
      .clone()
  }

  /// Generate a default configuration file in `format` (`toml` or `json`).
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let defaults = Self::default();
    let config_content = match format {
      "toml" => {
        format!(
          "# Interlinker configuration\n#\n# Set `stub_url = false` to leave \
           links to missing pages as written.\n# `dead_link_report` is one of \
           \"console\", \"json\" or \"none\".\n\n{}",
          toml::to_string_pretty(&defaults)?
        )
      },
      "json" => serde_json::to_string_pretty(&defaults)?,
      other => {
        return Err(ConfigError::Config(format!(
          "Unsupported config format: '{other}'. Expected toml or json"
        )));
      },
    };

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}
