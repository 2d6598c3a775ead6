//! Immutable spatial model of one keyboard layout.

pub mod additional;
pub mod codes;
pub mod utils;

pub use codes::ProximityCodes;
pub use utils::ProximityType;

use crate::chars::to_lower_case;
use crate::consts::{
    CodePoint, KEYCODE_SPACE, MAX_KEY_COUNT, MAX_PROXIMITY_CHARS_SIZE, MAX_VALUE_FOR_WEIGHTING,
    NOT_A_CODE_POINT, NOT_A_COORDINATE,
};
use crate::error::{DecoderError, DgResult};
use crate::geometry::{distance_int, squared_distance_f32};
use crate::layout::{LayoutDescriptor, SweetSpot};
use std::collections::HashMap;
use tracing::debug;

/// Vertical pull of the sweet spot toward the geometric center in gesture mode.
const VERTICAL_SWEET_SPOT_SCALE_G: f32 = 0.5;

#[derive(Debug, Clone)]
struct KeyGeometry {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    code_point: CodePoint,
    lower_code_point: CodePoint,
    center_x: i32,
    center_y: i32,
    sweet_spot: Option<SweetSpot>,
    sweet_spot_center_y_g: i32,
}

#[derive(Debug, Clone)]
pub struct ProximityInfo {
    keyboard_width: i32,
    keyboard_height: i32,
    grid_width: i32,
    grid_height: i32,
    cell_width: i32,
    cell_height: i32,
    most_common_key_width: i32,
    most_common_key_height: i32,
    keys: Vec<KeyGeometry>,
    proximity_chars: Vec<CodePoint>,
    key_key_distances: Vec<i32>,
    lower_code_to_key: HashMap<CodePoint, usize>,
    has_touch_position_correction_data: bool,
}

impl ProximityInfo {
    /// Builds the model. A proximity table whose length is not exactly
    /// `grid_width * grid_height * MAX_PROXIMITY_CHARS_SIZE` is rejected.
    pub fn new(layout: &LayoutDescriptor) -> DgResult<Self> {
        if layout.grid_width <= 0 || layout.grid_height <= 0 {
            return Err(DecoderError::Validation(format!(
                "grid must be positive, got {}x{}",
                layout.grid_width, layout.grid_height
            )));
        }
        if layout.keyboard_width <= 0 || layout.keyboard_height <= 0 {
            return Err(DecoderError::Validation(format!(
                "keyboard must be positive, got {}x{}",
                layout.keyboard_width, layout.keyboard_height
            )));
        }
        if layout.most_common_key_width <= 0 {
            return Err(DecoderError::Validation(
                "most common key width must be positive".into(),
            ));
        }
        let expected = layout
            .grid_width
            .checked_mul(layout.grid_height)
            .and_then(|cells| (cells as usize).checked_mul(MAX_PROXIMITY_CHARS_SIZE))
            .ok_or_else(|| {
                DecoderError::Validation(format!(
                    "grid {}x{} is too large",
                    layout.grid_width, layout.grid_height
                ))
            })?;
        if layout.proximity_chars.len() != expected {
            return Err(DecoderError::ProximityTableSize {
                expected,
                actual: layout.proximity_chars.len(),
            });
        }
        if layout.keys.len() > MAX_KEY_COUNT {
            return Err(DecoderError::TooManyKeys {
                count: layout.keys.len(),
                max: MAX_KEY_COUNT,
            });
        }

        let has_correction =
            !layout.keys.is_empty() && layout.keys.iter().all(|k| k.sweet_spot.is_some());

        let keys: Vec<KeyGeometry> = layout
            .keys
            .iter()
            .map(|k| {
                let center_x = k.x.saturating_add(k.width / 2);
                let center_y = k.y.saturating_add(k.height / 2);
                let sweet_spot_center_y_g = match k.sweet_spot {
                    Some(s) if has_correction => {
                        let gap = s.center_y - center_y as f32;
                        (center_y as f32 + gap * VERTICAL_SWEET_SPOT_SCALE_G) as i32
                    }
                    _ => center_y,
                };
                KeyGeometry {
                    x: k.x,
                    y: k.y,
                    width: k.width,
                    height: k.height,
                    code_point: k.code,
                    lower_code_point: to_lower_case(k.code),
                    center_x,
                    center_y,
                    sweet_spot: k.sweet_spot,
                    sweet_spot_center_y_g,
                }
            })
            .collect();

        let mut lower_code_to_key = HashMap::with_capacity(keys.len());
        for (i, k) in keys.iter().enumerate() {
            lower_code_to_key.insert(k.lower_code_point, i);
        }

        let n = keys.len();
        let mut key_key_distances = vec![0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = match (has_correction, keys[i].sweet_spot, keys[j].sweet_spot) {
                    (true, Some(si), Some(sj)) => distance_int(
                        si.center_x as i32,
                        keys[i].sweet_spot_center_y_g,
                        sj.center_x as i32,
                        keys[j].sweet_spot_center_y_g,
                    ),
                    _ => distance_int(
                        keys[i].center_x,
                        keys[i].center_y,
                        keys[j].center_x,
                        keys[j].center_y,
                    ),
                };
                key_key_distances[i * n + j] = d;
                key_key_distances[j * n + i] = d;
            }
        }

        let info = ProximityInfo {
            keyboard_width: layout.keyboard_width,
            keyboard_height: layout.keyboard_height,
            grid_width: layout.grid_width,
            grid_height: layout.grid_height,
            cell_width: layout.cell_width(),
            cell_height: layout.cell_height(),
            most_common_key_width: layout.most_common_key_width,
            most_common_key_height: layout.most_common_key_height,
            keys,
            proximity_chars: layout.proximity_chars.clone(),
            key_key_distances,
            lower_code_to_key,
            has_touch_position_correction_data: has_correction,
        };
        debug!(
            keys = info.key_count(),
            grid = %format!("{}x{}", info.grid_width, info.grid_height),
            correction = info.has_touch_position_correction_data,
            "spatial model built"
        );
        Ok(info)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keyboard_width(&self) -> i32 {
        self.keyboard_width
    }

    pub fn keyboard_height(&self) -> i32 {
        self.keyboard_height
    }

    pub fn keyboard_hypotenuse(&self) -> f32 {
        (self.keyboard_width as f32).hypot(self.keyboard_height as f32)
    }

    pub fn grid_width(&self) -> i32 {
        self.grid_width
    }

    pub fn grid_height(&self) -> i32 {
        self.grid_height
    }

    pub fn cell_width(&self) -> i32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> i32 {
        self.cell_height
    }

    pub fn most_common_key_width(&self) -> i32 {
        self.most_common_key_width
    }

    pub fn most_common_key_height(&self) -> i32 {
        self.most_common_key_height
    }

    pub fn most_common_key_width_square(&self) -> i64 {
        i64::from(self.most_common_key_width) * i64::from(self.most_common_key_width)
    }

    pub fn has_touch_position_correction_data(&self) -> bool {
        self.has_touch_position_correction_data
    }

    pub fn has_sweet_spot_data(&self, key: usize) -> bool {
        self.keys
            .get(key)
            .and_then(|k| k.sweet_spot)
            .is_some_and(|s| s.radius > 0.0)
    }

    /// `(x, y, width, height)` of a key.
    pub fn key_rect(&self, key: usize) -> Option<(i32, i32, i32, i32)> {
        self.keys.get(key).map(|k| (k.x, k.y, k.width, k.height))
    }

    /// Case-insensitive reverse lookup.
    pub fn key_index_of(&self, code: CodePoint) -> Option<usize> {
        if self.keys.is_empty() || code == NOT_A_CODE_POINT {
            return None;
        }
        self.lower_code_to_key.get(&to_lower_case(code)).copied()
    }

    /// Lower-cased code point of a key, `NOT_A_CODE_POINT` for an invalid index.
    pub fn code_point_of(&self, key: usize) -> CodePoint {
        self.keys
            .get(key)
            .map_or(NOT_A_CODE_POINT, |k| k.lower_code_point)
    }

    pub fn original_code_point_of(&self, key: usize) -> CodePoint {
        self.keys.get(key).map_or(NOT_A_CODE_POINT, |k| k.code_point)
    }

    fn cell_start_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let gx = x / self.cell_width;
        let gy = y / self.cell_height;
        if gx >= self.grid_width || gy >= self.grid_height {
            return None;
        }
        Some(((gy * self.grid_width + gx) as usize) * MAX_PROXIMITY_CHARS_SIZE)
    }

    /// The grid cell's proximity list, padding included.
    pub fn proximity_list_at(&self, x: i32, y: i32) -> Option<&[CodePoint]> {
        let start = self.cell_start_index(x, y)?;
        self.proximity_chars
            .get(start..start + MAX_PROXIMITY_CHARS_SIZE)
    }

    pub fn has_space_proximity(&self, x: i32, y: i32) -> bool {
        self.proximity_list_at(x, y)
            .is_some_and(|cell| cell.contains(&KEYCODE_SPACE))
    }

    /// Horizontal key center. Keys wider than the most common key are treated as a segment:
    /// the center slides toward `reference_x` by up to half of the extra width.
    pub fn key_center_x(&self, key: usize, reference_x: i32, _geometric: bool) -> i32 {
        let Some(k) = self.keys.get(key) else {
            return 0;
        };
        let mut center_x = match k.sweet_spot {
            Some(s) if self.has_touch_position_correction_data => s.center_x as i32,
            _ => k.center_x,
        };
        if reference_x != NOT_A_COORDINATE && k.width > self.most_common_key_width {
            let half_diff = (k.width - self.most_common_key_width) / 2;
            if reference_x < center_x - half_diff {
                center_x -= half_diff;
            } else if reference_x > center_x + half_diff {
                center_x += half_diff;
            } else {
                center_x = reference_x;
            }
        }
        center_x
    }

    /// Vertical key center. Bottom-row keys extend downward to meet `reference_y`.
    pub fn key_center_y(&self, key: usize, reference_y: i32, geometric: bool) -> i32 {
        let Some(k) = self.keys.get(key) else {
            return 0;
        };
        let center_y = match k.sweet_spot {
            Some(_) if self.has_touch_position_correction_data && geometric => {
                k.sweet_spot_center_y_g
            }
            Some(s) if self.has_touch_position_correction_data => s.center_y as i32,
            _ => k.center_y,
        };
        if reference_y != NOT_A_COORDINATE
            && center_y + k.height > self.keyboard_height
            && center_y < reference_y
        {
            return reference_y;
        }
        center_y
    }

    pub fn key_key_distance(&self, key0: usize, key1: usize) -> i32 {
        let n = self.keys.len();
        if key0 < n && key1 < n {
            self.key_key_distances[key0 * n + key1]
        } else {
            MAX_VALUE_FOR_WEIGHTING
        }
    }

    /// Squared distance from the touch to the key center, in most-common-key-width units.
    pub fn normalized_squared_distance_from_center(
        &self,
        key: usize,
        x: i32,
        y: i32,
        geometric: bool,
    ) -> f32 {
        let center_x = self.key_center_x(key, x, geometric) as f32;
        let center_y = self.key_center_y(key, y, geometric) as f32;
        squared_distance_f32(center_x, center_y, x as f32, y as f32)
            / self.most_common_key_width_square() as f32
    }

    /// Builds one proximity buffer per raw input point.
    pub fn initialize_proximities(
        &self,
        codes: &[CodePoint],
        xs: &[i32],
        ys: &[i32],
        locale: &str,
    ) -> DgResult<Vec<ProximityCodes>> {
        codes
            .iter()
            .zip(xs.iter().zip(ys))
            .map(|(&primary, (&x, &y))| utils::calculate_proximities(self, x, y, primary, locale))
            .collect()
    }
}
