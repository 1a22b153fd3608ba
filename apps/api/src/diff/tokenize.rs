//! Lossless word tokenizer.
//!
//! A token is a maximal run of word characters (alphanumerics and `_`), a
//! maximal run of whitespace, or a single other character. Concatenating the
//! tokens of a string always yields the string back.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_alphanumeric() || c == '_' {
            CharClass::Word
        } else if c.is_whitespace() {
            CharClass::Space
        } else {
            CharClass::Other
        }
    }

    fn extends_run(self) -> bool {
        self != CharClass::Other
    }
}

/// Splits `text` into tokens borrowed from it.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (idx, ch) in text.char_indices() {
        let class = CharClass::of(ch);
        if let Some(prev) = current {
            if prev != class || !class.extends_run() {
                tokens.push(&text[start..idx]);
                start = idx;
            }
        }
        current = Some(class);
    }

    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Iterates over the word tokens of `text` only.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().next().map(CharClass::of) == Some(CharClass::Word))
}
