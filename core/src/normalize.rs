use unicode_normalization::UnicodeNormalization;

/// Canonicalize text for glossary matching.
///
/// Applies Unicode NFC, trims surrounding whitespace, and folds the
/// ideographic space (U+3000) to a regular space. The same function must be
/// used on glossary keys and on candidate entity text; comparing a normalized
/// key against un-normalized text is the main source of spurious "unknown"
/// terms.
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.trim().replace('\u{3000}', " ")
}
