//! Tracking and reporting of links that point at missing pages.
use std::{fs, path::Path};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Source attributed to dead links when no current file is set.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// File name of the JSON dead link report.
pub const REPORT_FILE_NAME: &str = ".dead-links.json";

/// How dead links are reported after a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
  /// Log a warning per dead link.
  #[default]
  Console,
  /// Write `.dead-links.json` into the output directory.
  Json,
  /// Do not report.
  None,
}

/// Dead links keyed by link text, each with the files that contain it.
#[derive(Debug)]
pub struct DeadLinks {
  gravestones: Mutex<IndexMap<String, Vec<String>>>,
  file_src:    Mutex<String>,
}

impl Default for DeadLinks {
  fn default() -> Self {
    Self::new()
  }
}

impl DeadLinks {
  #[must_use]
  pub fn new() -> Self {
    Self {
      gravestones: Mutex::new(IndexMap::new()),
      file_src:    Mutex::new(UNKNOWN_SOURCE.to_string()),
    }
  }

  /// Set the file that subsequent [`DeadLinks::add`] calls are attributed to.
  pub fn set_file_src(&self, file_src: impl Into<String>) {
    *self.file_src.lock() = file_src.into();
  }

  /// The file dead links are currently attributed to.
  #[must_use]
  pub fn file_src(&self) -> String {
    self.file_src.lock().clone()
  }

  /// Record `link` as dead in the current file.
  pub fn add(&self, link: &str) {
    let source = self.file_src();
    self.add_from(link, &source);
  }

  /// Record `link` as dead in `source`.
  ///
  /// Every call appends, so a file referencing the same dead link twice is
  /// listed twice.
  pub fn add_from(&self, link: &str, source: &str) {
    self
      .gravestones
      .lock()
      .entry(link.to_string())
      .or_default()
      .push(source.to_string());
  }

  /// Number of distinct dead links.
  #[must_use]
  pub fn len(&self) -> usize {
    self.gravestones.lock().len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.gravestones.lock().is_empty()
  }

  /// Files that contain `link`, if it is dead.
  #[must_use]
  pub fn sources(&self, link: &str) -> Option<Vec<String>> {
    self.gravestones.lock().get(link).cloned()
  }

  /// Snapshot of every dead link and its sources, in discovery order.
  #[must_use]
  pub fn gravestones(&self) -> IndexMap<String, Vec<String>> {
    self.gravestones.lock().clone()
  }

  /// Forget all dead links and reset the current file.
  pub fn clear(&self) {
    self.gravestones.lock().clear();
    *self.file_src.lock() = UNKNOWN_SOURCE.to_string();
  }

  /// Human readable report, one entry per dead link.
  #[must_use]
  pub fn console_report(&self) -> Vec<String> {
    self
      .gravestones
      .lock()
      .iter()
      .map(|(link, sources)| {
        let kind = if link.starts_with("[[") || link.starts_with("![[") {
          "Wikilink"
        } else {
          "Link"
        };
        let mut entry =
          format!("{kind} ({link}) found pointing to non-existent page in:");
        for source in sources {
          entry.push_str("\n\t- ");
          entry.push_str(source);
        }
        entry
      })
      .collect()
  }

  /// Report dead links in `format`.
  ///
  /// The JSON report is written to `output_dir`, which is created if needed.
  ///
  /// # Errors
  ///
  /// Returns an error if the JSON report cannot be serialized or written.
  pub fn report(&self, format: ReportFormat, output_dir: &Path) -> Result<()> {
    match format {
      ReportFormat::Console => {
        for entry in self.console_report() {
          log::warn!("{entry}");
        }
      },
      ReportFormat::Json => {
        let json = serde_json::to_string_pretty(&self.gravestones())?;
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(REPORT_FILE_NAME);
        fs::write(&path, json)?;
        log::info!("Wrote dead link report to {}", path.display());
      },
      ReportFormat::None => {},
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn groups_sources_per_link() {
    let dead = DeadLinks::new();
    dead.add("[[missing]]");
    dead.set_file_src("./src/a.md");
    dead.add("[[missing]]");
    dead.add("[[missing]]");
    dead.add_from("/nowhere", "./src/b.md");

    assert_eq!(dead.len(), 2);
    assert_eq!(
      dead.sources("[[missing]]"),
      Some(vec![
        UNKNOWN_SOURCE.to_string(),
        "./src/a.md".to_string(),
        "./src/a.md".to_string(),
      ])
    );

    let report = dead.console_report();
    assert_eq!(
      report[0],
      "Wikilink ([[missing]]) found pointing to non-existent page in:\n\t- \
       unknown\n\t- ./src/a.md\n\t- ./src/a.md"
    );
    assert!(report[1].starts_with("Link (/nowhere)"));
  }

  #[test]
  fn clear_resets_source() {
    let dead = DeadLinks::new();
    dead.set_file_src("./src/a.md");
    dead.add("[[x]]");
    dead.clear();

    assert!(dead.is_empty());
    assert_eq!(dead.file_src(), UNKNOWN_SOURCE);
  }

  #[test]
  fn json_report_is_written_to_output_dir() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("_site");
    let dead = DeadLinks::new();
    dead.add_from("[[gone]]", "./src/index.md");

    dead
      .report(ReportFormat::Json, &output)
      .expect("Failed to write report");

    let written = fs::read_to_string(output.join(REPORT_FILE_NAME))
      .expect("Failed to read report");
    let parsed: IndexMap<String, Vec<String>> =
      serde_json::from_str(&written).expect("Failed to parse report");
    assert_eq!(parsed["[[gone]]"], vec!["./src/index.md"]);
  }

  #[test]
  fn none_report_writes_nothing() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let dead = DeadLinks::new();
    dead.add("[[gone]]");

    dead
      .report(ReportFormat::None, dir.path())
      .expect("None report cannot fail");
    assert!(!dir.path().join(REPORT_FILE_NAME).exists());
  }
}
