//! Code point helpers: case folding and accent stripping.

use crate::consts::{CodePoint, KEYCODE_HYPHEN_MINUS, KEYCODE_SINGLE_QUOTE};

/// Lower-cases a single code point. Code points whose lower-case form is not a single
/// scalar value (or negative sentinels) are returned unchanged.
pub fn to_lower_case(c: CodePoint) -> CodePoint {
    if (b'A' as CodePoint..=b'Z' as CodePoint).contains(&c) {
        return c + (b'a' - b'A') as CodePoint;
    }
    if c < 0x80 {
        return c;
    }
    let Some(ch) = char::from_u32(c as u32) else {
        return c;
    };
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l as CodePoint,
        _ => c,
    }
}

/// Strips diacritics from Latin letters (`é` -> `e`, `Å` -> `A`).
pub fn to_base_code_point(c: CodePoint) -> CodePoint {
    let Ok(u) = u32::try_from(c) else {
        return c;
    };
    let Some(ch) = char::from_u32(u) else {
        return c;
    };
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ð' => 'D',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'Ā' | 'Ă' | 'Ą' => 'A',
        'ā' | 'ă' | 'ą' => 'a',
        'Ć' | 'Ĉ' | 'Ċ' | 'Č' => 'C',
        'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'Ď' | 'Đ' => 'D',
        'ď' | 'đ' => 'd',
        'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => 'G',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => 'I',
        'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'Ł' => 'L',
        'ł' => 'l',
        'Ń' | 'Ņ' | 'Ň' => 'N',
        'ń' | 'ņ' | 'ň' => 'n',
        'Ō' | 'Ŏ' | 'Ő' => 'O',
        'ō' | 'ŏ' | 'ő' => 'o',
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => 'S',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => 'U',
        'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'Ÿ' => 'Y',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    };
    base as CodePoint
}

pub fn to_base_lower_case(c: CodePoint) -> CodePoint {
    to_lower_case(to_base_code_point(c))
}

/// Characters a user may leave out while typing a word (`dont` for `don't`).
pub fn is_intentional_omission(c: CodePoint) -> bool {
    c == KEYCODE_SINGLE_QUOTE || c == KEYCODE_HYPHEN_MINUS
}

pub fn code_point_to_char(c: CodePoint) -> Option<char> {
    u32::try_from(c).ok().and_then(char::from_u32)
}
