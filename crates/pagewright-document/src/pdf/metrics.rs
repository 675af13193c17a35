// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font metrics for the PDF base-14 fonts the writer uses, plus the line
// wrapping built on top of them.
//
// Widths come from the Adobe AFM files in 1/1000 em, WinAnsi encoding, and
// cover printable ASCII (0x20..=0x7E). Anything outside that range falls
// back to the face's typical lowercase width.

use pagewright_core::FontFace;
use pagewright_core::error::{PagewrightError, Result};

/// Courier is fixed pitch: every glyph is 600/1000 em.
const COURIER_WIDTH: u16 = 600;

/// Times-Roman, index = code point - 0x20.
#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,                               // '0'..'9'
    278, 278, 564, 564, 564, 444, 921,                                              // ':'..'@'
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,                // 'A'..'M'
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,                // 'N'..'Z'
    333, 278, 333, 469, 500, 333,                                                   // '['..'`'
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,                // 'a'..'m'
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,                // 'n'..'z'
    480, 200, 480, 541,                                                             // '{'..'~'
];

/// Helvetica, index = code point - 0x20.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

/// Width of one character in 1/1000 em.
fn glyph_width(face: FontFace, c: char) -> u16 {
    let table = match face {
        FontFace::Monospace => return COURIER_WIDTH,
        FontFace::Serif => &TIMES_ROMAN,
        FontFace::SansSerif => &HELVETICA,
    };
    match c {
        ' '..='~' => table[c as usize - 0x20],
        _ => match face {
            FontFace::Serif => 500,
            _ => 556,
        },
    }
}

fn check_size(size: f32) -> Result<()> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(PagewrightError::Measurement(format!(
            "font size must be positive, got {size}"
        )))
    }
}

/// Advance width of `text` in points.
pub fn text_width(text: &str, face: FontFace, size: f32) -> Result<f32> {
    check_size(size)?;
    Ok(raw_width(text, face, size))
}

fn raw_width(text: &str, face: FontFace, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(face, c) as u32).sum();
    units as f32 * size / 1000.0
}

/// Wrap `text` to `max_width` points.
///
/// Monospace text is one code line: whitespace is preserved and breaks fall
/// after the last space that fits, so joining the pieces gives back the
/// line. Other faces word-wrap each newline-separated paragraph; a blank
/// paragraph becomes an empty line.
pub fn wrap_text(text: &str, face: FontFace, size: f32, max_width: f32) -> Result<Vec<String>> {
    check_size(size)?;
    if !(max_width.is_finite() && max_width > 0.0) {
        return Err(PagewrightError::Measurement(format!(
            "wrap width must be positive, got {max_width}"
        )));
    }

    let lines = match face {
        FontFace::Monospace => text
            .split('\n')
            .flat_map(|line| wrap_code_line(line, size, max_width))
            .collect(),
        _ => wrap_prose(text, face, size, max_width),
    };
    Ok(lines)
}

fn wrap_code_line(line: &str, size: f32, max_width: f32) -> Vec<String> {
    let column = COURIER_WIDTH as f32 * size / 1000.0;
    let columns = ((max_width / column).floor() as usize).max(1);
    let chars: Vec<char> = line.chars().collect();

    let mut pieces = Vec::new();
    let mut start = 0;
    while chars.len() - start > columns {
        let window = &chars[start..start + columns];
        // Break after the last space that follows some visible text, so
        // indentation is never split off on its own.
        let split = window
            .iter()
            .rposition(|&c| c == ' ')
            .filter(|&at| window[..at].iter().any(|c| !c.is_whitespace()))
            .map_or(columns, |at| at + 1);
        pieces.push(window[..split].iter().collect());
        start += split;
    }
    pieces.push(chars[start..].iter().collect());
    pieces
}

fn wrap_prose(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let space = raw_width(" ", face, size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_width = raw_width(word, face, size);

            if word_width > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                // Force-break the oversized word; its tail starts the next line.
                let mut piece = String::new();
                let mut piece_width = 0.0_f32;
                for c in word.chars() {
                    let w = raw_width(c.encode_utf8(&mut [0; 4]), face, size);
                    if !piece.is_empty() && piece_width + w > max_width {
                        lines.push(std::mem::take(&mut piece));
                        piece_width = 0.0;
                    }
                    piece.push(c);
                    piece_width += w;
                }
                current = piece;
                current_width = piece_width;
            } else if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            }
        }

        lines.push(current);
    }

    lines
}
