//! Locale-specific extra candidates appended after the regular proximity codes.
//! English treats every vowel as a plausible slip for every other vowel.

use crate::consts::CodePoint;

const EN_ADDITIONAL_A: [CodePoint; 4] = ['e' as i32, 'i' as i32, 'o' as i32, 'u' as i32];
const EN_ADDITIONAL_E: [CodePoint; 4] = ['a' as i32, 'i' as i32, 'o' as i32, 'u' as i32];
const EN_ADDITIONAL_I: [CodePoint; 4] = ['a' as i32, 'e' as i32, 'o' as i32, 'u' as i32];
const EN_ADDITIONAL_O: [CodePoint; 4] = ['a' as i32, 'e' as i32, 'i' as i32, 'u' as i32];
const EN_ADDITIONAL_U: [CodePoint; 4] = ['a' as i32, 'e' as i32, 'i' as i32, 'o' as i32];

fn is_english(locale: &str) -> bool {
    locale
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("en"))
}

pub fn additional_chars(locale: &str, code: CodePoint) -> &'static [CodePoint] {
    if !is_english(locale) {
        return &[];
    }
    match u32::try_from(code).ok().and_then(char::from_u32) {
        Some('a') => &EN_ADDITIONAL_A,
        Some('e') => &EN_ADDITIONAL_E,
        Some('i') => &EN_ADDITIONAL_I,
        Some('o') => &EN_ADDITIONAL_O,
        Some('u') => &EN_ADDITIONAL_U,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_english_vowels_have_additions() {
        assert_eq!(additional_chars("en_GB", 'o' as i32).len(), 4);
        assert!(additional_chars("en_US", 't' as i32).is_empty());
        assert!(additional_chars("fr_FR", 'a' as i32).is_empty());
        assert!(additional_chars("e", 'a' as i32).is_empty());
    }
}
