//! Text normalization for slugs and content moderation
//!
//! Both slug generation and the restricted-word scanner must resolve the
//! same word to the same canonical form, so they share `normalize`.

use phf::phf_map;

/// Vietnamese diacritic folding table, keyed by lowercase character.
static DIACRITICS: phf::Map<char, char> = phf_map! {
    'à' => 'a', 'á' => 'a', 'ả' => 'a', 'ã' => 'a', 'ạ' => 'a',
    'ă' => 'a', 'ằ' => 'a', 'ắ' => 'a', 'ẳ' => 'a', 'ẵ' => 'a', 'ặ' => 'a',
    'â' => 'a', 'ầ' => 'a', 'ấ' => 'a', 'ẩ' => 'a', 'ẫ' => 'a', 'ậ' => 'a',
    'è' => 'e', 'é' => 'e', 'ẻ' => 'e', 'ẽ' => 'e', 'ẹ' => 'e',
    'ê' => 'e', 'ề' => 'e', 'ế' => 'e', 'ể' => 'e', 'ễ' => 'e', 'ệ' => 'e',
    'ì' => 'i', 'í' => 'i', 'ỉ' => 'i', 'ĩ' => 'i', 'ị' => 'i',
    'ò' => 'o', 'ó' => 'o', 'ỏ' => 'o', 'õ' => 'o', 'ọ' => 'o',
    'ô' => 'o', 'ồ' => 'o', 'ố' => 'o', 'ổ' => 'o', 'ỗ' => 'o', 'ộ' => 'o',
    'ơ' => 'o', 'ờ' => 'o', 'ớ' => 'o', 'ở' => 'o', 'ỡ' => 'o', 'ợ' => 'o',
    'ù' => 'u', 'ú' => 'u', 'ủ' => 'u', 'ũ' => 'u', 'ụ' => 'u',
    'ư' => 'u', 'ừ' => 'u', 'ứ' => 'u', 'ử' => 'u', 'ữ' => 'u', 'ự' => 'u',
    'ỳ' => 'y', 'ý' => 'y', 'ỷ' => 'y', 'ỹ' => 'y', 'ỵ' => 'y',
    'đ' => 'd',
};

/// Produce the canonical comparison form of arbitrary text: lowercase with
/// diacritical marks stripped. Total function; empty input yields empty
/// output. Word structure (whitespace, punctuation) is preserved.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| *DIACRITICS.get(&c).unwrap_or(&c))
        .collect()
}

/// Derive a URL-safe slug from a display name: normalized text with
/// non-alphanumeric runs collapsed into single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in normalize(name).chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_vietnamese_tones() {
        assert_eq!(normalize("Cà Phê Sữa Đá"), "ca phe sua da");
        assert_eq!(normalize("Trà Đào"), "tra dao");
    }

    #[test]
    fn test_normalize_is_total() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "   ");
    }

    #[test]
    fn test_normalize_preserves_word_structure() {
        assert_eq!(normalize("Một, hai; ba!"), "mot, hai; ba!");
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Cozy Cafe"), "cozy-cafe");
    }

    #[test]
    fn test_slugify_diacritics_and_punctuation() {
        assert_eq!(slugify("Cà Phê Sữa Đá - Quận 1!"), "ca-phe-sua-da-quan-1");
    }

    #[test]
    fn test_slugify_collapses_separator_runs() {
        assert_eq!(slugify("  The --- Roastery  "), "the-roastery");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
