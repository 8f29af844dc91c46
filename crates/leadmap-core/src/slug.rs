use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Filesystem-friendly form of a label: accents stripped, lowercased, and
/// whitespace runs collapsed to a single `_`.
///
/// `"Colegios Privados"` becomes `"colegios_privados"` and `"clínicas"`
/// becomes `"clinicas"`.
#[must_use]
pub fn file_slug(label: &str) -> String {
    let stripped: String = label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    stripped.split_whitespace().collect::<Vec<_>>().join("_")
}
