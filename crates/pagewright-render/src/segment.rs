// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content segmenter. Splits cleaned page text into an ordered sequence of
// prose and fenced-code blocks.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

const FENCE: &str = "```";

/// Code indentation is normalised to this many spaces per tab so that column
/// widths are deterministic in a fixed-pitch font.
const TAB_WIDTH: usize = 4;

static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").expect("heading pattern is valid"));

/// `**strong**` that opens at a word start and hugs its text on both sides.
/// Group 1 is the character before the opener; the closer's right edge is
/// checked in `tidy_prose`.
static STRONG_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^|[^\w*])\*\*([^\s*](?:[^*\n]*?[^\s*])?)\*\*")
        .expect("emphasis pattern is valid")
});

/// What a block contains, which decides its font and decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Prose,
    Code,
}

/// One contiguous run of page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub raw_text: String,
}

impl ContentBlock {
    pub fn prose(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Prose,
            raw_text: text.into(),
        }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Code,
            raw_text: text.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == BlockKind::Code
    }
}

/// A closed fence: the whole marked span and the code between the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fence {
    pub outer: Range<usize>,
    pub body: Range<usize>,
}

/// Closed fences in source order, plus the offset of an opening marker that
/// never closes.
pub(crate) fn find_fences(text: &str) -> (Vec<Fence>, Option<usize>) {
    let mut fences = Vec::new();
    let mut search_from = 0;

    while let Some(rel) = text[search_from..].find(FENCE) {
        let open = search_from + rel;
        let tag_start = open + FENCE.len();

        let Some(tag_len) = text[tag_start..].find('\n') else {
            // Backticks on the last line can't open a block.
            break;
        };

        if text[tag_start..tag_start + tag_len].contains('`') {
            // An inline span like ```x``` is prose, not an opener.
            search_from = tag_start + tag_len;
            continue;
        }

        let body_start = tag_start + tag_len + 1;
        match text[body_start..].find(FENCE) {
            Some(body_len) => {
                let body_end = body_start + body_len;
                fences.push(Fence {
                    outer: open..body_end + FENCE.len(),
                    body: body_start..body_end,
                });
                search_from = body_end + FENCE.len();
            }
            None => return (fences, Some(open)),
        }
    }

    (fences, None)
}

/// Split text into prose and code blocks in source order.
///
/// A fence is three backticks, an optional language tag, a newline, the code,
/// and a closing three backticks. Empty blocks are dropped. An opening fence
/// with no closing fence is left in place, marker line included, and the rest
/// of the page is rendered as prose.
pub fn segment(text: &str) -> Vec<ContentBlock> {
    let (fences, unterminated) = find_fences(text);
    if let Some(offset) = unterminated {
        warn!(offset, "Unterminated code fence; rendering as prose");
    }

    let mut blocks = Vec::new();
    let mut prose_start = 0;
    for fence in &fences {
        push_prose(&mut blocks, &text[prose_start..fence.outer.start]);
        push_code(&mut blocks, &text[fence.body.clone()]);
        prose_start = fence.outer.end;
    }
    push_prose(&mut blocks, &text[prose_start..]);

    debug!(
        blocks = blocks.len(),
        code_blocks = blocks.iter().filter(|b| b.is_code()).count(),
        "Segmented page"
    );
    blocks
}

fn push_prose(blocks: &mut Vec<ContentBlock>, text: &str) {
    let tidied = tidy_prose(text);
    let trimmed = tidied.trim();
    if !trimmed.is_empty() {
        blocks.push(ContentBlock::prose(trimmed));
    }
}

fn push_code(blocks: &mut Vec<ContentBlock>, text: &str) {
    let expanded = text.replace('\t', &" ".repeat(TAB_WIDTH));
    let lines: Vec<&str> = expanded.split('\n').collect();

    let is_blank = |line: &&str| line.trim().is_empty();
    let Some(first) = lines.iter().position(|l| !is_blank(l)) else {
        return;
    };
    let last = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(first);

    blocks.push(ContentBlock::code(lines[first..=last].join("\n")));
}

/// Drop Markdown heading markers and `**strong**` markers from prose.
///
/// Pointer declarations such as `char **argv` are not emphasis and are kept.
fn tidy_prose(text: &str) -> String {
    let without_headings = HEADING_MARKER.replace_all(text, "");
    STRONG_EMPHASIS
        .replace_all(&without_headings, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let end = caps.get(0).map_or(0, |m| m.end());
            let closes_at_word_end = without_headings[end..]
                .chars()
                .next()
                .is_none_or(|next| !(next.is_alphanumeric() || next == '_' || next == '*'));
            if closes_at_word_end {
                format!("{}{}", &caps[1], &caps[2])
            } else {
                whole.to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prose_code_prose_in_order() {
        let text = "Intro text.\n\n```c\nint main(void) {\n    return 0;\n}\n```\n\nOutro text.";
        let blocks = segment(text);

        assert_eq!(
            blocks,
            vec![
                ContentBlock::prose("Intro text."),
                ContentBlock::code("int main(void) {\n    return 0;\n}"),
                ContentBlock::prose("Outro text."),
            ]
        );
    }

    #[test]
    fn prose_only() {
        assert_eq!(segment("  just words \n"), vec![ContentBlock::prose("just words")]);
    }

    #[test]
    fn empty_and_whitespace_pages_have_no_blocks() {
        assert!(segment("").is_empty());
        assert!(segment(" \n\t\n").is_empty());
    }

    #[test]
    fn adjacent_fences_without_prose_between() {
        let text = "```\na();\n```\n```python\nb()\n```";
        assert_eq!(
            segment(text),
            vec![ContentBlock::code("a();"), ContentBlock::code("b()")]
        );
    }

    #[test]
    fn empty_fence_is_dropped() {
        let text = "before\n```\n\n   \n```\nafter";
        assert_eq!(
            segment(text),
            vec![ContentBlock::prose("before"), ContentBlock::prose("after")]
        );
    }

    #[test]
    fn code_line_count_matches_trimmed_fence_content() {
        let text = "```\n\n\nfirst\n\n    second\nthird\n\n\n```";
        let blocks = segment(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_text, "first\n\n    second\nthird");
        assert_eq!(blocks[0].raw_text.lines().count(), 4);
    }

    #[test]
    fn tabs_become_four_spaces() {
        let blocks = segment("```\nif (x) {\n\ty();\n}\n```");
        assert_eq!(blocks[0].raw_text, "if (x) {\n    y();\n}");
    }

    #[test]
    fn unterminated_fence_falls_back_to_prose() {
        let text = "Heading text\n```cpp\nint lost = 1;\nstill here";
        let blocks = segment(text);
        assert_eq!(
            blocks,
            vec![ContentBlock::prose("Heading text\n```cpp\nint lost = 1;\nstill here")]
        );
    }

    #[test]
    fn unterminated_fence_after_closed_one_keeps_its_marker() {
        let text = "```\na();\n```\nthen\n```rust\nlet b = 2;";
        assert_eq!(
            segment(text),
            vec![
                ContentBlock::code("a();"),
                ContentBlock::prose("then\n```rust\nlet b = 2;"),
            ]
        );
    }

    #[test]
    fn pointer_syntax_in_prose_is_not_emphasis() {
        assert_eq!(
            segment("Declare char **argv and int **table here."),
            vec![ContentBlock::prose("Declare char **argv and int **table here.")]
        );
        assert_eq!(segment("x**2 + y**2"), vec![ContentBlock::prose("x**2 + y**2")]);
    }

    #[test]
    fn emphasis_is_stripped_at_word_boundaries() {
        assert_eq!(
            segment("**Note:** call **free** once, not **a**b"),
            vec![ContentBlock::prose("Note: call free once, not **a**b")]
        );
    }

    #[test]
    fn fences_report_body_and_outer_spans() {
        let text = "p\n```c\nx;\n```\nq";
        let (fences, unterminated) = find_fences(text);
        assert_eq!(unterminated, None);
        assert_eq!(fences.len(), 1);
        assert_eq!(&text[fences[0].body.clone()], "x;\n");
        assert_eq!(&text[fences[0].outer.clone()], "```c\nx;\n```");

        let (fences, unterminated) = find_fences("a\n```\nopen");
        assert!(fences.is_empty());
        assert_eq!(unterminated, Some(2));
    }

    #[test]
    fn trailing_backticks_without_newline_stay_prose() {
        assert_eq!(segment("end ```"), vec![ContentBlock::prose("end ```")]);
    }

    #[test]
    fn inline_triple_backticks_are_not_fences() {
        let text = "use ```x``` inline\n```\ncode();\n```";
        assert_eq!(
            segment(text),
            vec![
                ContentBlock::prose("use ```x``` inline"),
                ContentBlock::code("code();"),
            ]
        );
    }

    #[test]
    fn prose_markup_is_tidied_but_code_is_not() {
        let text = "## Section **one**\n```\n## not a heading **kept**\n```";
        assert_eq!(
            segment(text),
            vec![
                ContentBlock::prose("Section one"),
                ContentBlock::code("## not a heading **kept**"),
            ]
        );
    }

    #[test]
    fn directives_in_prose_are_not_headings() {
        assert_eq!(
            segment("#include is a directive"),
            vec![ContentBlock::prose("#include is a directive")]
        );
    }

    #[test]
    fn reconstructs_section_order() {
        let sections = [
            (BlockKind::Prose, "alpha"),
            (BlockKind::Code, "beta();"),
            (BlockKind::Prose, "gamma"),
            (BlockKind::Code, "delta();\nepsilon();"),
            (BlockKind::Prose, "zeta"),
        ];
        let mut text = String::new();
        for (kind, body) in sections {
            match kind {
                BlockKind::Prose => text.push_str(&format!("{body}\n\n")),
                BlockKind::Code => text.push_str(&format!("```rust\n{body}\n```\n")),
            }
        }

        let blocks = segment(&text);
        let got: Vec<(BlockKind, &str)> = blocks
            .iter()
            .map(|b| (b.kind, b.raw_text.as_str()))
            .collect();
        assert_eq!(got, sections.to_vec());
    }
}
