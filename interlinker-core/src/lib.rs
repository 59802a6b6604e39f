//! # interlinker-core - wikilinks, backlinks and embeds for static sites
//!
//! Resolves Obsidian style `[[wikilinks]]`, `![[embeds]]` and internal HTML
//! anchors between the pages of a site, records backlinks on the linked
//! pages, and keeps track of links that point nowhere.
//!
//! ## Quick Start
//!
//! ```rust
//! use interlinker_core::{Interlinker, InterlinkerOptions, PageDirectory, PageRecord};
//!
//! let directory: PageDirectory = [
//!   PageRecord::new("/hello/")
//!     .with_file_slug("hello")
//!     .with_input_path("./src/hello.md")
//!     .with_title("Hello")
//!     .with_content("Hi!"),
//!   PageRecord::new("/")
//!     .with_file_slug("index")
//!     .with_file_path_stem("/index")
//!     .with_input_path("./src/index.md")
//!     .with_content("See [[Hello]]."),
//! ]
//! .into_iter()
//! .collect();
//!
//! let interlinker = Interlinker::new(InterlinkerOptions::default());
//! let links = futures::executor::block_on(
//!   interlinker.compute_outbound_links("/", &directory),
//! )?;
//! assert_eq!(links.len(), 1);
//!
//! if let Some(index) = directory.find_by_file("/") {
//!   let html = interlinker.render_page(&index)?;
//!   assert!(html.contains(r#"<a href="/hello/">Hello</a>"#));
//! }
//! # Ok::<(), interlinker_core::InterlinkError>(())
//! ```
//!
//! ## Features
//!
//! - **Wikilinks** with labels, anchors, path references and aliases
//! - **Embeds** compiled through a pluggable [`TemplateRenderer`]
//! - **Custom resolvers** selected with a `name:` prefix
//! - **Backlinks** recorded on every linked page
//! - **Dead link reports** on the console or as JSON

pub mod cache;
pub mod dead_links;
pub mod directory;
pub mod error;
pub mod interlinker;
pub mod markdown;
pub mod options;
pub mod parser;
pub mod resolvers;
pub mod template;
mod types;
pub mod utils;

pub use crate::{
  cache::{CacheKey, EmbedCache, LinkCache},
  dead_links::{DeadLinks, ReportFormat},
  directory::{LinkQuery, Lookup, PageDirectory},
  error::{InterlinkError, Result},
  interlinker::Interlinker,
  options::{InterlinkerOptions, InterlinkerOptionsBuilder, SlugifyFn},
  parser::{HtmlLinkParser, WikilinkParser},
  resolvers::{FnResolver, ResolveContext, Resolver, Resolvers},
  template::TemplateRenderer,
  types::{Backlink, LinkMeta, OutboundLink, PageRecord, WikilinkMeta},
};
#[cfg(feature = "tera")]
pub use crate::template::TeraRenderer;
