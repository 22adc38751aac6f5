//! Text canonicalisation shared by every lexical signal.

/// Symbols kept inside tokens so that `c++`, `c#` and `node.js` survive.
const TOKEN_SYMBOLS: [char; 4] = ['.', '+', '#', '-'];

/// Lower-cases `text`, replaces every character that is not an ASCII word
/// character, whitespace or one of `. + # -` with a space, then collapses
/// whitespace.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || TOKEN_SYMBOLS.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes and splits on spaces, dropping single-character tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}
