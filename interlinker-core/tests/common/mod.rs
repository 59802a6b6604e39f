#![allow(dead_code, reason = "Not every test binary uses every helper")]

use interlinker_core::{PageDirectory, PageRecord};

/// A page at `/<slug>/` with a matching slug, stem and input path.
pub fn page(slug: &str, title: &str) -> PageRecord {
  PageRecord::new(format!("/{slug}/"))
    .with_file_slug(slug)
    .with_file_path_stem(format!("/{slug}"))
    .with_input_path(format!("./src/{slug}.md"))
    .with_title(title)
}

/// The pages most tests link between.
pub fn site() -> PageDirectory {
  [
    page("hello", "Hello World").with_content("Hello there."),
    PageRecord::new("/blog/a-blog-post/")
      .with_file_slug("a-blog-post")
      .with_file_path_stem("/blog/a-blog-post")
      .with_input_path("./src/blog/a-blog-post.md")
      .with_title("A Blog Post")
      .with_content("Posted."),
    page("c-sharp", "Page about C#"),
    page("aliased", "Aliased Page").with_aliases(["ali", "Other name"]),
    page("time", "Time: 12"),
  ]
  .into_iter()
  .collect()
}

/// Build a directory from `pages`.
pub fn directory(pages: Vec<PageRecord>) -> PageDirectory {
  pages.into_iter().collect()
}
