use crate::consts::{CodePoint, MAX_PROXIMITY_CHARS_SIZE, NOT_A_CODE_POINT};
use crate::error::DgResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

/// Proximity search radius used when a descriptor ships without a table, in key widths.
const SEARCH_DISTANCE: f32 = 1.2;

pub const DEFAULT_GRID_WIDTH: i32 = 32;
pub const DEFAULT_GRID_HEIGHT: i32 = 16;

/// Touch calibration for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweetSpot {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDef {
    pub code: CodePoint,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweet_spot: Option<SweetSpot>,
}

impl KeyDef {
    pub fn new(code: CodePoint, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            code,
            x,
            y,
            width,
            height,
            sweet_spot: None,
        }
    }

    /// Squared distance from `(x, y)` to the nearest point of the key rectangle.
    pub fn squared_distance_to_edge(&self, x: i32, y: i32) -> i64 {
        squared_distance_to_rect(x, y, self.x, self.y, self.width, self.height)
    }
}

/// Squared distance from a point to a rectangle, 0 inside it, in `i64`.
pub fn squared_distance_to_rect(
    x: i32,
    y: i32,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
) -> i64 {
    let (x, y) = (i64::from(x), i64::from(y));
    let (left, top) = (i64::from(left), i64::from(top));
    let edge_x = x.clamp(left, left + i64::from(width).max(0));
    let edge_y = y.clamp(top, top + i64::from(height).max(0));
    let dx = x - edge_x;
    let dy = y - edge_y;
    dx * dx + dy * dy
}

/// Everything the spatial model needs to know about one keyboard layout, in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    #[serde(default)]
    pub name: String,
    pub keyboard_width: i32,
    pub keyboard_height: i32,
    #[serde(default = "default_grid_width")]
    pub grid_width: i32,
    #[serde(default = "default_grid_height")]
    pub grid_height: i32,
    pub most_common_key_width: i32,
    pub most_common_key_height: i32,
    pub keys: Vec<KeyDef>,
    /// Flattened `grid_width * grid_height * MAX_PROXIMITY_CHARS_SIZE` table.
    /// Computed from the key rectangles when a file leaves it out.
    #[serde(default)]
    pub proximity_chars: Vec<CodePoint>,
}

fn default_grid_width() -> i32 {
    DEFAULT_GRID_WIDTH
}

fn default_grid_height() -> i32 {
    DEFAULT_GRID_HEIGHT
}

impl LayoutDescriptor {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> DgResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut layout: LayoutDescriptor = serde_json::from_str(&content)?;
        if layout.proximity_chars.is_empty() {
            debug!("layout '{}' has no proximity table, computing one", layout.name);
            layout.proximity_chars = layout.compute_proximity_table();
        }
        Ok(layout)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DgResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn cell_width(&self) -> i32 {
        ceil_div(self.keyboard_width, self.grid_width)
    }

    pub fn cell_height(&self) -> i32 {
        ceil_div(self.keyboard_height, self.grid_height)
    }

    /// Fills each grid cell with the codes of the keys whose edge lies within
    /// `SEARCH_DISTANCE` key widths of the cell center, nearest first.
    pub fn compute_proximity_table(&self) -> Vec<CodePoint> {
        let cells = (i64::from(self.grid_width) * i64::from(self.grid_height)).max(0) as usize;
        let mut table = vec![NOT_A_CODE_POINT; cells * MAX_PROXIMITY_CHARS_SIZE];
        let threshold_base = (self.most_common_key_width as f32 * SEARCH_DISTANCE) as i64;
        let threshold = threshold_base * threshold_base;
        let (cell_w, cell_h) = (self.cell_width(), self.cell_height());

        for gy in 0..self.grid_height {
            for gx in 0..self.grid_width {
                let cx = gx * cell_w + cell_w / 2;
                let cy = gy * cell_h + cell_h / 2;
                let mut near: Vec<(i64, CodePoint)> = self
                    .keys
                    .iter()
                    .map(|k| (k.squared_distance_to_edge(cx, cy), k.code))
                    .filter(|(d, _)| *d < threshold)
                    .collect();
                near.sort_by_key(|(d, _)| *d);

                let start = ((gy * self.grid_width + gx) as usize) * MAX_PROXIMITY_CHARS_SIZE;
                for (slot, (_, code)) in near.into_iter().take(MAX_PROXIMITY_CHARS_SIZE).enumerate()
                {
                    table[start + slot] = code;
                }
            }
        }
        table
    }

    pub fn with_computed_proximity(mut self) -> Self {
        self.proximity_chars = self.compute_proximity_table();
        self
    }

    /// Row-staggered phone keyboard ten keys wide: three centered letter rows and a bottom
    /// row holding comma, a five-key-wide space bar and period. Punctuation already placed on
    /// a letter row is not repeated.
    pub fn from_known(layout: KnownLayout, key_width: i32, key_height: i32) -> Self {
        let mut keys: Vec<KeyDef> = Vec::new();
        for (row, chars) in layout.rows().iter().enumerate() {
            let count = chars.chars().count() as i32;
            let offset = (10 - count).max(0) * key_width / 2;
            for (col, ch) in chars.chars().enumerate() {
                keys.push(KeyDef::new(
                    ch as CodePoint,
                    offset + col as i32 * key_width,
                    row as i32 * key_height,
                    key_width,
                    key_height,
                ));
            }
        }
        let bottom = 3 * key_height;
        let bottom_row = [
            (',', key_width * 3 / 2, key_width),
            (' ', key_width * 5 / 2, key_width * 5),
            ('.', key_width * 15 / 2, key_width),
        ];
        for (ch, x, width) in bottom_row {
            if keys.iter().any(|k| k.code == ch as CodePoint) {
                continue;
            }
            keys.push(KeyDef::new(ch as CodePoint, x, bottom, width, key_height));
        }

        LayoutDescriptor {
            name: layout.to_string(),
            keyboard_width: key_width * 10,
            keyboard_height: key_height * 4,
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            most_common_key_width: key_width,
            most_common_key_height: key_height,
            keys,
            proximity_chars: Vec::new(),
        }
        .with_computed_proximity()
    }
}

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum KnownLayout {
    Qwerty,
    Dvorak,
    Colemak,
    Workman,
}

impl KnownLayout {
    pub fn rows(&self) -> [&'static str; 3] {
        match self {
            Self::Qwerty => ["qwertyuiop", "asdfghjkl", "zxcvbnm"],
            Self::Dvorak => ["',.pyfgcrl", "aoeuidhtns", ";qjkxbmwvz"],
            Self::Colemak => ["qwfpgjluy;", "arstdhneio", "zxcvbkm"],
            Self::Workman => ["qdrwbjfup;", "ashtgyneoi", "zxmcvkl"],
        }
    }
}

/// Ceiling division for a positive divisor; 0 otherwise.
fn ceil_div(total: i32, parts: i32) -> i32 {
    if parts <= 0 {
        return 0;
    }
    ((i64::from(total) + i64::from(parts) - 1) / i64::from(parts)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_distance_is_zero_inside() {
        let k = KeyDef::new('a' as i32, 10, 10, 20, 20);
        assert_eq!(k.squared_distance_to_edge(15, 15), 0);
        assert_eq!(k.squared_distance_to_edge(0, 10), 100);
    }

    #[test]
    fn edge_distance_does_not_overflow_far_away() {
        let k = KeyDef::new('a' as i32, 0, 0, 10, 10);
        let d = 100_000i64 - 10;
        assert_eq!(k.squared_distance_to_edge(100_000, 100_000), 2 * d * d);
    }

    #[test]
    fn cell_size_rounds_up_without_overflow() {
        assert_eq!(ceil_div(101, 10), 11);
        assert_eq!(ceil_div(i32::MAX, i32::MAX), 1);
        assert_eq!(ceil_div(5, 0), 0);
    }
}
