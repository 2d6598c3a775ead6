use super::additional::additional_chars;
use super::codes::ProximityCodes;
use super::ProximityInfo;
use crate::consts::{
    CodePoint, ADDITIONAL_PROXIMITY_CHAR_DELIMITER_CODE, KEYCODE_SPACE, MAX_VALUE_FOR_WEIGHTING,
    NOT_A_COORDINATE,
};
use crate::error::DgResult;
use crate::layout::squared_distance_to_rect;
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// How a dictionary character relates to what the user touched at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum ProximityType {
    /// Exactly the typed character (case and accents folded).
    MatchChar,
    /// A neighbor of the typed key.
    ProximityChar,
    /// A locale-specific extra candidate.
    AdditionalProximityChar,
    SubstitutionChar,
    UnrelatedChar,
}

impl ProximityType {
    pub fn is_match_or_proximity(self) -> bool {
        matches!(
            self,
            Self::MatchChar | Self::ProximityChar | Self::AdditionalProximityChar
        )
    }
}

pub(crate) fn is_on_key(info: &ProximityInfo, key: Option<usize>, x: i32, y: i32) -> bool {
    let Some((left, top, width, height)) = key.and_then(|k| info.key_rect(k)) else {
        return true;
    };
    let (x, y) = (i64::from(x), i64::from(y));
    let (left, top) = (i64::from(left), i64::from(top));
    let right = left + i64::from(width) + 1;
    let bottom = top + i64::from(height);
    left < right && top < bottom && x >= left && x < right && y >= top && y < bottom
}

pub(crate) fn squared_length_to_edge(
    info: &ProximityInfo,
    key: Option<usize>,
    x: i32,
    y: i32,
) -> i64 {
    let Some((left, top, width, height)) = key.and_then(|k| info.key_rect(k)) else {
        return i64::from(MAX_VALUE_FOR_WEIGHTING);
    };
    squared_distance_to_rect(x, y, left, top, width, height)
}

/// Candidate codes for a single touch: the primary code, the grid cell's codes that are on
/// the touched key or within one key width of it, then the locale additions behind a delimiter.
pub(crate) fn calculate_proximities(
    info: &ProximityInfo,
    x: i32,
    y: i32,
    primary: CodePoint,
    locale: &str,
) -> DgResult<ProximityCodes> {
    let mut codes = ProximityCodes::new();
    codes.try_push(primary)?;
    if x == NOT_A_COORDINATE || y == NOT_A_COORDINATE {
        return Ok(codes);
    }
    let Some(cell) = info.proximity_list_at(x, y) else {
        return Ok(codes);
    };

    let mcw_square = info.most_common_key_width_square();
    for &c in cell {
        if c < KEYCODE_SPACE || c == primary {
            continue;
        }
        let key = info.key_index_of(c);
        if is_on_key(info, key, x, y) || squared_length_to_edge(info, key, x, y) < mcw_square {
            codes.try_push(c)?;
        }
    }

    let additional = additional_chars(locale, primary);
    if !additional.is_empty() {
        codes.try_push(ADDITIONAL_PROXIMITY_CHAR_DELIMITER_CODE)?;
        for &ac in additional {
            if codes.contains(ac) {
                continue;
            }
            codes.try_push(ac)?;
        }
    }
    Ok(codes)
}
