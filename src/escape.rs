//! Escaping engine – makes arbitrary profile text safe for embedding in the
//! generated typesetting source.
//!
//! The substitution order is significant. The backslash pass must run first:
//! every later pass emits backslashes of its own, and those must survive
//! untouched. The circumflex and tilde passes run last because their
//! replacement macros contain braces, which would otherwise be mangled by the
//! brace pass.
//!
//! `escape` is **not** idempotent. Applying it to its own output
//! double-escapes the text, so callers apply it exactly once per leaf value
//! and never to fragments they assembled themselves (hyperlink macros, row
//! constructs).

/// Escape one leaf string for interpolation into document source.
pub fn escape(raw: &str) -> String {
    raw
        // The trailing space delimits the control word from following text.
        .replace('\\', "\\textbackslash ")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('$', "\\$")
        .replace('%', "\\%")
        .replace('#', "\\#")
        .replace('&', "\\&")
        .replace('_', "\\_")
        // Circumflex and tilde cannot be escaped by simple prefixing.
        .replace('^', "\\textasciicircum{}")
        .replace('~', "\\textasciitilde{}")
}

/// True when `s` contains at least one character `escape` rewrites.
pub fn needs_escaping(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '\\' | '{' | '}' | '$' | '%' | '#' | '&' | '_' | '^' | '~'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_characters_are_rewritten() {
        assert_eq!(escape("100% done"), "100\\% done");
        assert_eq!(escape("C&O #4"), "C\\&O \\#4");
        assert_eq!(escape("snake_case"), "snake\\_case");
        assert_eq!(escape("$5"), "\\$5");
        assert_eq!(escape("{a}"), "\\{a\\}");
        assert_eq!(escape("2^10"), "2\\textasciicircum{}10");
        assert_eq!(escape("~user"), "\\textasciitilde{}user");
    }

    #[test]
    fn backslash_runs_first() {
        // The emitted macro's own characters must not be re-escaped by the
        // later passes.
        assert_eq!(escape("a\\b"), "a\\textbackslash b");
        assert_eq!(escape("\\{"), "\\textbackslash \\{");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(escape("Ada Lovelace"), "Ada Lovelace");
        assert!(!needs_escaping("Ada Lovelace"));
    }

    #[test]
    fn escape_is_not_idempotent() {
        for s in ["\\", "{", "$", "%", "#", "&", "_", "^", "~", "a_b c%d"] {
            let once = escape(s);
            let twice = escape(&once);
            assert_ne!(once, twice, "double-escaping {s:?} must corrupt");
        }
    }
}
