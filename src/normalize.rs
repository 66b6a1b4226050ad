/// A cleaned text in two aligned forms: `display` keeps the original case for
/// context snippets, `search` is the lowercase form the matcher scans. Both
/// have identical byte length and char boundaries, so a match offset found in
/// `search` is a valid substring range in `display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub display: String,
    pub search: String,
}

/// Punctuation kept verbatim by the normalizer. Everything else outside
/// letters, ASCII digits, and whitespace becomes a single space.
const KEPT_PUNCTUATION: [char; 4] = ['.', ',', ';', '-'];

fn is_allowed(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit() || KEPT_PUNCTUATION.contains(&c)
}

/// Lowercase a single char only when the mapping keeps its UTF-8 length, so
/// byte offsets stay valid in both forms. Latin letters, accented included,
/// always qualify.
fn aligned_lowercase(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
        _ => c,
    }
}

/// Cleans raw extracted text into the canonical search form.
///
/// Characters outside the allow-list (letters, digits, whitespace, `. , ; -`)
/// are replaced by a space, whitespace runs collapse to a single space, and
/// the ends are trimmed. Idempotent: normalizing normalized text is a no-op.
pub fn normalize(raw: &str) -> NormalizedText {
    let mut display = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        let mapped = if is_allowed(c) { Some(c) } else { None };
        match mapped {
            Some(c) if !c.is_whitespace() => {
                if pending_space && !display.is_empty() {
                    display.push(' ');
                }
                pending_space = false;
                display.push(c);
            }
            // Whitespace and stripped chars both fold into one space.
            _ => pending_space = true,
        }
    }

    let search = display.chars().map(aligned_lowercase).collect();
    NormalizedText { display, search }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_disallowed_chars_and_collapses_whitespace() {
        let n = normalize("Hello\u{0000}world!  Two\t\nlines");
        assert_eq!(n.display, "Hello world Two lines");
        assert_eq!(n.search, "hello world two lines");
    }

    #[test]
    fn keeps_sentence_punctuation_and_accents() {
        let n = normalize("Álgebra, cálculo; c-d. Fin");
        assert_eq!(n.display, "Álgebra, cálculo; c-d. Fin");
        assert_eq!(n.search, "álgebra, cálculo; c-d. fin");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "plain text",
            "  padded\t\u{00AD}soft-hyphen  ",
            "símbolos ©®™ y números 3.14",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            let twice = normalize(&once.display);
            assert_eq!(once, twice, "normalize must be idempotent for {s:?}");
        }
    }

    #[test]
    fn forms_stay_byte_aligned() {
        let n = normalize("Álgebra Ñandú FIN");
        assert_eq!(n.display.len(), n.search.len());
        for (d, s) in n.display.char_indices().zip(n.search.char_indices()) {
            assert_eq!(d.0, s.0, "char boundaries must coincide");
        }
    }

    #[test]
    fn trims_ends() {
        let n = normalize("  ¡hola!  ");
        assert_eq!(n.display, "hola");
    }
}
