//! Error types for link resolution.
use std::io;

use thiserror::Error;

/// Errors raised while parsing, resolving or reporting links.
#[derive(Debug, Error)]
pub enum InterlinkError {
  /// A wikilink named a resolver that is not registered.
  #[error(
    "Unable to find resolving fn [{resolver}] for wikilink {link} on page \
     [{page}]"
  )]
  UnknownResolver {
    resolver: String,
    link:     String,
    page:     String,
  },

  /// A `./` or `../` wikilink was parsed without a source file path.
  #[error(
    "Unable to do relative path lookup of wikilink {link} without a source \
     file path"
  )]
  RelativeWithoutContext { link: String },

  /// An embed points at an existing page but no content was compiled for it.
  #[error(
    "Unable to render embed {link}: the page exists but no embed content was \
     compiled"
  )]
  MissingEmbed { link: String },

  #[error("Template error: {0}")]
  Template(String),

  #[error("Resolver error: {0}")]
  Resolver(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}

#[cfg(feature = "tera")]
impl From<tera::Error> for InterlinkError {
  fn from(err: tera::Error) -> Self {
    // Tera keeps the useful part of the message in the source chain.
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
      message.push_str(": ");
      message.push_str(&cause.to_string());
      source = cause.source();
    }
    Self::Template(message)
  }
}

/// Result type for link resolution operations.
pub type Result<T> = std::result::Result<T, InterlinkError>;
