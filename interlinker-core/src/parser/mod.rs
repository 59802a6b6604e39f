//! Link discovery in page content.
pub mod html;
pub mod wikilink;

pub use html::{HtmlLinkParser, internal_hrefs, normalize_href};
pub use wikilink::{WikilinkParser, wikilink_regex};
