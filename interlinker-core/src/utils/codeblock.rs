//! Code block detection for markdown sources.
//!
//! Wikilink expansion operates on raw markdown, so fenced code blocks and
//! inline code spans have to be located up front and left untouched.
use std::ops::Range;

/// State tracking for code fence detection in markdown.
///
/// This tracks whether we're currently inside a fenced code block and
/// maintains the fence character and count for proper closing detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  in_code_block:    bool,
  code_fence_char:  Option<char>,
  code_fence_count: usize,
}

impl FenceTracker {
  /// Create a new fence tracker.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      in_code_block:    false,
      code_fence_char:  None,
      code_fence_count: 0,
    }
  }

  /// Check if currently inside a code block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.in_code_block
  }

  /// Process a line and update fence state.
  ///
  /// Returns the updated state after processing the line.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let trimmed = line.trim_start();

    if !(trimmed.starts_with("```") || trimmed.starts_with("~~~")) {
      return *self;
    }

    let Some(fence_char) = trimmed.chars().next() else {
      return *self;
    };
    let fence_count = trimmed.chars().take_while(|&c| c == fence_char).count();

    if !self.in_code_block {
      return Self {
        in_code_block:    true,
        code_fence_char:  Some(fence_char),
        code_fence_count: fence_count,
      };
    }

    if self.code_fence_char == Some(fence_char)
      && fence_count >= self.code_fence_count
    {
      return Self::new();
    }

    *self
  }
}

/// Byte ranges of `source` covered by fenced code blocks or inline code spans.
///
/// Ranges are sorted and non-overlapping. A fenced block range spans its
/// opening and closing fence lines. An unterminated fence runs to the end of
/// the input. Inline code spans are matched within a single line; an opening
/// backtick run without a closing run of the same length is plain text.
#[must_use]
pub fn code_ranges(source: &str) -> Vec<Range<usize>> {
  let mut ranges = Vec::new();
  let mut tracker = FenceTracker::new();
  let mut fence_start = 0;
  let mut offset = 0;

  for line in source.split_inclusive('\n') {
    let was_in_block = tracker.in_code_block();
    tracker = tracker.process_line(line);

    match (was_in_block, tracker.in_code_block()) {
      (false, true) => fence_start = offset,
      (true, false) => ranges.push(fence_start..offset + line.len()),
      (false, false) => inline_code_ranges(line, offset, &mut ranges),
      (true, true) => {},
    }

    offset += line.len();
  }

  if tracker.in_code_block() {
    ranges.push(fence_start..source.len());
  }

  ranges
}

fn inline_code_ranges(line: &str, offset: usize, ranges: &mut Vec<Range<usize>>) {
  let bytes = line.as_bytes();
  let mut pos = 0;

  while pos < bytes.len() {
    if bytes[pos] != b'`' {
      pos += 1;
      continue;
    }

    let open = pos;
    let ticks = count_backticks(bytes, pos);
    pos += ticks;

    let mut search = pos;
    let mut closed = false;
    while search < bytes.len() {
      if bytes[search] == b'`' {
        let run = count_backticks(bytes, search);
        if run == ticks {
          ranges.push(offset + open..offset + search + run);
          pos = search + run;
          closed = true;
          break;
        }
        search += run;
      } else {
        search += 1;
      }
    }

    if !closed {
      // No matching closer, the run is literal text.
      pos = open + ticks;
    }
  }
}

fn count_backticks(bytes: &[u8], start: usize) -> usize {
  bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fence_tracker_basic() {
    let tracker = FenceTracker::new();
    assert!(!tracker.in_code_block());

    let tracker = tracker.process_line("```rust");
    assert!(tracker.in_code_block());

    let tracker = tracker.process_line("~~~");
    assert!(tracker.in_code_block(), "mismatched fence char must not close");

    let tracker = tracker.process_line("```");
    assert!(!tracker.in_code_block());
  }

  #[test]
  fn test_fence_ranges_cover_whole_block() {
    let src = "before\n```\n[[inside]]\n```\nafter [[outside]]\n";
    let ranges = code_ranges(src);
    assert_eq!(ranges.len(), 1);

    let covered = &src[ranges[0].clone()];
    assert!(covered.contains("[[inside]]"));
    assert!(!covered.contains("outside"));
  }

  #[test]
  fn test_inline_code_ranges() {
    let src = "see `[[code]]` and ``a ` b`` but not [[link]]";
    let ranges = code_ranges(src);
    assert_eq!(ranges.len(), 2);
    assert_eq!(&src[ranges[0].clone()], "`[[code]]`");
    assert_eq!(&src[ranges[1].clone()], "``a ` b``");
  }

  #[test]
  fn test_unterminated_fence_runs_to_end() {
    let src = "text\n~~~~\n[[a]]\n";
    let ranges = code_ranges(src);
    assert_eq!(ranges, vec![5..src.len()]);
  }

  #[test]
  fn test_unmatched_backtick_is_literal() {
    assert!(code_ranges("a ` b [[c]]").is_empty());
  }
}
