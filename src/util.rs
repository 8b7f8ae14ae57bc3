//! Text and file helpers.

use std::fs::File;
use std::io::{BufRead, BufReader};

use unicode_normalization::UnicodeNormalization;

/// Strips accents and other combining marks (NFD, then drop the marks).
///
/// ```
/// use picklist::util::normalize;
///
/// assert_eq!(normalize("Zoë Çelik"), "Zoe Celik");
/// ```
pub fn normalize(s: &str) -> String {
    s.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

/// Whether `s` contains an uppercase character
pub fn contains_upper(s: &str) -> bool {
    s.chars().any(char::is_uppercase)
}

/// Reads a file into lines
pub fn read_file_lines(filename: &str) -> std::result::Result<Vec<String>, std::io::Error> {
    let file = File::open(filename)?;
    BufReader::new(file).lines().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_plain_text() {
        assert_eq!(normalize("anna"), "anna");
        assert_eq!(normalize("Åsa Núñez"), "Asa Nunez");
    }

    #[test]
    fn upper_detection() {
        assert!(contains_upper("anN"));
        assert!(!contains_upper("ann 2"));
    }
}
