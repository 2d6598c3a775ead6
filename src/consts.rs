//! Capacity limits and sentinel values shared by the spatial model and the gesture state.

/// Unicode scalar value, or one of the negative sentinels below.
pub type CodePoint = i32;

/// Per-cell and per-point proximity buffer capacity.
pub const MAX_PROXIMITY_CHARS_SIZE: usize = 16;

/// Key index sets are stored in a single `u64`.
pub const MAX_KEY_COUNT: usize = 64;

/// Longest word the typing path and the greedy decoder will produce.
pub const MAX_WORD_LENGTH: usize = 48;

pub const NOT_A_CODE_POINT: CodePoint = -1;
pub const NOT_A_COORDINATE: i32 = -1;

pub const KEYCODE_SPACE: CodePoint = ' ' as CodePoint;
pub const KEYCODE_SINGLE_QUOTE: CodePoint = '\'' as CodePoint;
pub const KEYCODE_HYPHEN_MINUS: CodePoint = '-' as CodePoint;

/// Separates regular proximity codes from locale-specific additions in a buffer.
pub const ADDITIONAL_PROXIMITY_CHAR_DELIMITER_CODE: CodePoint = 2;

/// Returned for unknown distances and missing probabilities.
pub const MAX_VALUE_FOR_WEIGHTING: i32 = 10_000_000;
pub const MAX_VALUE_FOR_WEIGHTING_F32: f32 = MAX_VALUE_FOR_WEIGHTING as f32;

pub const MAX_PERCENTILE: i32 = 100;
