//! Text folding shared by the pattern matchers and the intent classifier.

use unicode_normalization::UnicodeNormalization;

/// NFKC plus a small confusable map, so full-width digits and look-alike
/// Cyrillic/Greek letters hit the same rules as plain ASCII.
/// Case is preserved (upper-case look-alikes map to upper-case ASCII); the
/// matchers are case-insensitive.
pub fn fold(s: &str) -> String {
    s.nfkc()
        .map(|ch| map_confusable(ch).unwrap_or(ch))
        .collect()
}

/// Working copy for keyword tiers: folded, lowercased, whitespace runs
/// collapsed to a single space.
pub fn normalize_for_intent(s: &str) -> String {
    let lower = fold(s).to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut pending_space = false;
    for ch in lower.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

/// First `max_chars` characters of `s` (by char, not byte). Always a prefix.
pub fn prefix_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn map_confusable(ch: char) -> Option<char> {
    match ch {
        // Cyrillic
        '\u{0430}' => Some('a'), // а
        '\u{0435}' => Some('e'), // е
        '\u{043E}' => Some('o'), // о
        '\u{0440}' => Some('p'), // р
        '\u{0441}' => Some('c'), // с
        '\u{0445}' => Some('x'), // х
        '\u{0443}' => Some('y'), // у
        '\u{0456}' => Some('i'), // і
        '\u{0455}' => Some('s'), // ѕ
        '\u{0442}' => Some('t'), // т
        '\u{0410}' => Some('A'), // А
        '\u{0412}' => Some('B'), // В
        '\u{0415}' => Some('E'), // Е
        '\u{041A}' => Some('K'), // К
        '\u{041C}' => Some('M'), // М
        '\u{041D}' => Some('H'), // Н
        '\u{041E}' => Some('O'), // О
        '\u{0420}' => Some('P'), // Р
        '\u{0421}' => Some('C'), // С
        '\u{0422}' => Some('T'), // Т
        '\u{0423}' => Some('Y'), // У
        '\u{0425}' => Some('X'), // Х
        '\u{0406}' => Some('I'), // І
        '\u{0405}' => Some('S'), // Ѕ
        // Greek
        '\u{03b1}' => Some('a'), // α
        '\u{03b5}' => Some('e'), // ε
        '\u{03bf}' => Some('o'), // ο
        '\u{03c1}' => Some('p'), // ρ
        '\u{03c5}' => Some('u'), // υ
        '\u{03ba}' => Some('k'), // κ
        '\u{0391}' => Some('A'), // Α
        '\u{0392}' => Some('B'), // Β
        '\u{0395}' => Some('E'), // Ε
        '\u{0397}' => Some('H'), // Η
        '\u{0399}' => Some('I'), // Ι
        '\u{039A}' => Some('K'), // Κ
        '\u{039C}' => Some('M'), // Μ
        '\u{039D}' => Some('N'), // Ν
        '\u{039F}' => Some('O'), // Ο
        '\u{03A1}' => Some('P'), // Ρ
        '\u{03A4}' => Some('T'), // Τ
        '\u{03A5}' => Some('Y'), // Υ
        '\u{03A7}' => Some('X'), // Χ
        '\u{0396}' => Some('Z'), // Ζ
        _ => None,
    }
}
