// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text cleaner. Decodes HTML character references and strips formatting noise
// left behind by OCR and translation before the text is segmented.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::segment::find_fences;

/// Named and numeric character references we decode. Anything else that
/// looks like an entity is left alone.
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:nbsp|amp|lt|gt|quot|apos|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});")
        .expect("entity pattern is valid")
});

static LINE_BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br pattern is valid"));

/// Characters that carry no visible content: BOM, zero-width space/joiners,
/// word joiner, soft hyphen.
const INVISIBLE: &[char] = &[
    '\u{feff}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}', '\u{00ad}',
];

/// Clean raw page text.
///
/// Decodes the supported HTML references, normalises line endings, turns
/// `<br>` tags outside fenced code into newlines, drops invisible characters,
/// and trims trailing whitespace from each line. Never fails and never drops
/// visible content.
pub fn clean(raw: &str) -> String {
    let normalised = raw.replace("\r\n", "\n").replace('\r', "\n");
    let with_breaks = break_lines_outside_code(&normalised);
    let stripped: String = with_breaks
        .chars()
        .filter(|c| !INVISIBLE.contains(c))
        .collect();
    let decoded = decode_entities(&stripped);

    decoded
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite `<br>` tags as newlines everywhere except inside fence bodies,
/// where they are source text.
fn break_lines_outside_code(text: &str) -> String {
    let (fences, _) = find_fences(text);
    let mut out = String::with_capacity(text.len());
    let mut from = 0;
    for fence in fences {
        out.push_str(&LINE_BREAK_TAG.replace_all(&text[from..fence.body.start], "\n"));
        out.push_str(&text[fence.body.clone()]);
        from = fence.body.end;
    }
    out.push_str(&LINE_BREAK_TAG.replace_all(&text[from..], "\n"));
    out
}

/// Replace supported character references in a single pass, so that an
/// escaped reference such as `&amp;lt;` becomes `&lt;` rather than `<`.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            decode_reference(&whole[1..whole.len() - 1]).unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

/// Decode the body of one reference (between `&` and `;`).
fn decode_reference(body: &str) -> Option<String> {
    let decoded = match body {
        // A non-breaking space would be measured and drawn as an unknown
        // glyph by the base-14 fonts; a plain space reflows the same way.
        "nbsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let numeric = body.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_references() {
        assert_eq!(
            clean("a &lt; b &amp;&amp; c &gt; d &quot;q&quot; it&#39;s"),
            "a < b && c > d \"q\" it's"
        );
    }

    #[test]
    fn decodes_nbsp_as_space() {
        assert_eq!(clean("x&nbsp;=&nbsp;1"), "x = 1");
    }

    #[test]
    fn decodes_numeric_references() {
        assert_eq!(clean("&#65;&#x42;&#X43;&#x2192;"), "ABC\u{2192}");
    }

    #[test]
    fn leaves_unknown_entities_untouched() {
        assert_eq!(clean("&copy; &bogus; & alone"), "&copy; &bogus; & alone");
    }

    #[test]
    fn leaves_invalid_code_points_untouched() {
        assert_eq!(clean("&#xD800; &#1114112;"), "&#xD800; &#1114112;");
    }

    #[test]
    fn decodes_only_one_level() {
        assert_eq!(clean("&amp;lt;"), "&lt;");
    }

    #[test]
    fn decoded_fence_markers_survive() {
        let raw = "&#96;&#96;&#96;c\nint x;\n&#96;&#96;&#96;";
        assert_eq!(clean(raw), "```c\nint x;\n```");
    }

    #[test]
    fn normalises_line_endings_and_breaks() {
        assert_eq!(clean("one\r\ntwo\rthree<br>four<BR />five"), "one\ntwo\nthree\nfour\nfive");
    }

    #[test]
    fn line_break_tags_inside_code_are_source_text() {
        let raw = "before<br>after\n```cpp\nstd::cout << \"<br>\" << std::endl;\n```\nend<br/>";
        let cleaned = clean(raw);
        assert_eq!(
            cleaned,
            "before\nafter\n```cpp\nstd::cout << \"<br>\" << std::endl;\n```\nend\n"
        );

        let blocks = crate::segment::segment(&cleaned);
        let code: Vec<_> = blocks.iter().filter(|b| b.is_code()).collect();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].raw_text, "std::cout << \"<br>\" << std::endl;");
        assert_eq!(code[0].raw_text.lines().count(), 1);
    }

    #[test]
    fn strips_invisible_characters_and_trailing_spaces() {
        assert_eq!(clean("\u{feff}lead\u{200b}ing   \nnext\t"), "leading\nnext");
    }

    #[test]
    fn keeps_leading_indentation() {
        assert_eq!(clean("    indented();  "), "    indented();");
    }
}
