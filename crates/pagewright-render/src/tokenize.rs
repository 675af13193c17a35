// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Code tokenizer: a single-pass, per-line lexer that assigns each token a
// colour class for highlighted rendering.
//
// The lexer is deliberately stateless between lines: a `/*` comment or string
// that continues onto the next line is not tracked, so every line can be
// tokenized independently after wrapping.

use pagewright_core::Rgb;

/// Semantic category of a token, which selects its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    Keyword,
    FunctionName,
    StringLiteral,
    NumberLiteral,
    Comment,
    Default,
}

/// A classified slice of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub class: ColorClass,
}

impl Token {
    fn new(text: impl Into<String>, class: ColorClass) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }
}

/// Fixed colour for each class (a light GitHub-style theme).
pub const fn palette(class: ColorClass) -> Rgb {
    match class {
        ColorClass::Keyword => Rgb::new(207, 34, 46),
        ColorClass::FunctionName => Rgb::new(130, 80, 223),
        ColorClass::StringLiteral => Rgb::new(10, 48, 105),
        ColorClass::NumberLiteral => Rgb::new(5, 80, 174),
        ColorClass::Comment => Rgb::new(110, 119, 129),
        ColorClass::Default => Rgb::new(31, 35, 40),
    }
}

/// C/C++ keywords, storage qualifiers, literal names, and a handful of common
/// standard-library identifiers.
const KEYWORDS: &[&str] = &[
    // statements and declarations
    "auto", "break", "case", "catch", "class", "const", "constexpr", "continue", "default",
    "delete", "do", "else", "enum", "explicit", "extern", "for", "friend", "goto", "if",
    "inline", "namespace", "new", "operator", "private", "protected", "public", "register",
    "return", "sizeof", "static", "struct", "switch", "template", "this", "throw", "try",
    "typedef", "typename", "union", "using", "virtual", "volatile", "while",
    // types
    "bool", "char", "double", "float", "int", "long", "short", "signed", "unsigned", "void",
    "wchar_t", "size_t", "ssize_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "int8_t",
    "int16_t", "int32_t", "int64_t",
    // literals
    "true", "false", "NULL", "nullptr", "EOF",
    // common library names
    "std", "string", "vector", "cout", "cin", "cerr", "endl", "printf", "scanf", "malloc",
    "free", "FILE",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_number_continue(c: char) -> bool {
    c.is_ascii_hexdigit() || matches!(c, '.' | 'x' | 'X')
}

/// Tokenize one line of code.
///
/// Never fails: unterminated strings and trailing partial tokens simply end
/// at the end of the line. Concatenating the returned token texts always
/// reproduces `line` exactly.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let text = |from: usize, to: usize| -> String { chars[from..to].iter().collect() };
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        // 1. Comments run to end of line.
        if c == '/' && matches!(next, Some('/') | Some('*')) {
            tokens.push(Token::new(text(i, chars.len()), ColorClass::Comment));
            break;
        }

        // 2. String and character literals.
        if c == '"' || c == '\'' {
            let end = scan_quoted(&chars, i);
            tokens.push(Token::new(text(i, end), ColorClass::StringLiteral));
            i = end;
            continue;
        }

        // 3. Preprocessor directives.
        if c == '#' {
            let name_end = scan_while(&chars, i + 1, is_ident_continue);
            let directive = text(i, name_end);

            let space_end = scan_while(&chars, name_end, char::is_whitespace);
            if directive == "#include" && chars.get(space_end) == Some(&'<') {
                tokens.push(Token::new(directive, ColorClass::Keyword));
                if space_end > name_end {
                    tokens.push(Token::new(text(name_end, space_end), ColorClass::Default));
                }
                let header_end = chars[space_end..]
                    .iter()
                    .position(|&ch| ch == '>')
                    .map_or(chars.len(), |pos| space_end + pos + 1);
                tokens.push(Token::new(
                    text(space_end, header_end),
                    ColorClass::StringLiteral,
                ));
                i = header_end;
            } else {
                tokens.push(Token::new(directive, ColorClass::Keyword));
                i = name_end;
            }
            continue;
        }

        // 4. Numbers, including hex and float suffixes.
        if c.is_ascii_digit() {
            let end = scan_while(&chars, i + 1, is_number_continue);
            tokens.push(Token::new(text(i, end), ColorClass::NumberLiteral));
            i = end;
            continue;
        }

        // 5. Identifiers, keywords, and call sites.
        if is_ident_start(c) {
            let end = scan_while(&chars, i + 1, is_ident_continue);
            let word = text(i, end);
            let class = if is_keyword(&word) {
                ColorClass::Keyword
            } else {
                let after_space = scan_while(&chars, end, char::is_whitespace);
                if chars.get(after_space) == Some(&'(') {
                    ColorClass::FunctionName
                } else {
                    ColorClass::Default
                }
            };
            tokens.push(Token::new(word, class));
            i = end;
            continue;
        }

        // 6. Everything else, one character at a time.
        tokens.push(Token::new(c, ColorClass::Default));
        i += 1;
    }

    tokens
}

/// Index one past the closing quote of the literal opening at `start`, or the
/// end of the line. A backslash escapes whatever follows it.
fn scan_quoted(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            ch if ch == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn scan_while(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    chars[start.min(chars.len())..]
        .iter()
        .position(|&c| !pred(c))
        .map_or(chars.len(), |pos| start + pos)
}
