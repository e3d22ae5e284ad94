//! Identifier segmentation.
//!
//! Splits a Go identifier into word fragments by character class so a
//! readable description can be synthesized from names like `PDFLoader` or
//! `HTTPServer2`.
//!
//! Gotchas:
//!     - Classes come from the Unicode derived properties behind
//!       `char::is_lowercase`, `is_uppercase` and `is_numeric`. These are
//!       wider than the general categories Ll, Lu and Nd: `ª` counts as lower,
//!       `Ⅷ` as upper and `²` as a digit. Letters and digits of the cased
//!       scripts (Latin, Greek, Cyrillic, ...) classify the same either way.

/// Character class used to group code points into fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_lowercase() {
            CharClass::Lower
        } else if c.is_uppercase() {
            CharClass::Upper
        } else if c.is_numeric() {
            CharClass::Digit
        } else {
            CharClass::Other
        }
    }
}

/// Split an identifier into its word fragments.
///
/// Consecutive code points of the same class form one fragment. A single
/// pass then hands the last letter of an upper-case run to a following
/// lower-case run, so `"PDFL" "oader"` becomes `"PDF" "Loader"`. The pass
/// looks at the classes as they were before any letter moved.
///
/// Concatenating the result always yields `name` again.
pub fn segment(name: &str) -> Vec<String> {
    let mut runs: Vec<(CharClass, Vec<char>)> = Vec::new();

    for c in name.chars() {
        let class = CharClass::of(c);
        match runs.last_mut() {
            Some((last, chars)) if *last == class => chars.push(c),
            _ => runs.push((class, vec![c])),
        }
    }

    for i in 0..runs.len().saturating_sub(1) {
        if runs[i].0 == CharClass::Upper && runs[i + 1].0 == CharClass::Lower {
            if let Some(moved) = runs[i].1.pop() {
                runs[i + 1].1.insert(0, moved);
            }
        }
    }

    runs.into_iter()
        .filter(|(_, chars)| !chars.is_empty())
        .map(|(_, chars)| chars.into_iter().collect())
        .collect()
}

/// Build the lower-cased, space separated description for `name`.
pub fn describe(name: &str) -> String {
    segment(name)
        .iter()
        .map(|fragment| fragment.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_camel_case() {
        assert_eq!(segment("CamelCase"), vec!["Camel", "Case"]);
        assert_eq!(segment("lowerCamel"), vec!["lower", "Camel"]);
        assert_eq!(segment("lowercase"), vec!["lowercase"]);
    }

    #[test]
    fn test_segment_acronym_boundary() {
        assert_eq!(segment("PDFLoader"), vec!["PDF", "Loader"]);
        assert_eq!(segment("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(segment("GL11Version"), vec!["GL", "11", "Version"]);
        assert_eq!(segment("ServeHTTP"), vec!["Serve", "HTTP"]);
    }

    #[test]
    fn test_segment_digits_and_other() {
        assert_eq!(segment("CamelCase2"), vec!["Camel", "Case", "2"]);
        assert_eq!(segment("Max_Retries"), vec!["Max", "_", "Retries"]);
        assert_eq!(segment("BadUTF8"), vec!["Bad", "UTF", "8"]);
    }

    #[test]
    fn test_segment_single_letters() {
        assert_eq!(segment("X"), vec!["X"]);
        assert_eq!(segment("Ab"), vec!["Ab"]);
        assert_eq!(segment("AbC"), vec!["Ab", "C"]);
    }

    #[test]
    fn test_segment_unicode() {
        assert_eq!(segment("ÜberCool"), vec!["Über", "Cool"]);
        assert_eq!(segment("日本語"), vec!["日本語"]);
    }

    #[test]
    fn test_segment_cased_scripts() {
        assert_eq!(segment("ΑλφαBeta"), vec!["Αλφα", "Beta"]);
        assert_eq!(segment("ПриветМир42"), vec!["Привет", "Мир", "42"]);
    }

    #[test]
    fn test_segment_empty() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_segment_reconstructs_name() {
        for name in [
            "PDFLoader",
            "HTTPServer2Go",
            "a_b__C",
            "XMLHttpRequest",
            "IDs",
            "ÀÉÎõü9x",
        ] {
            assert_eq!(segment(name).concat(), name, "fragments of {}", name);
            assert!(segment(name).iter().all(|f| !f.is_empty()));
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("CamelCase"), "camel case");
        assert_eq!(describe("PDFLoader"), "pdf loader");
        assert_eq!(describe("NewHTTPClient"), "new http client");
    }
}
