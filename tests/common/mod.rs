#![allow(dead_code)]

use keyglide::consts::CodePoint;
use keyglide::layout::{KeyDef, KnownLayout, LayoutDescriptor, SweetSpot};
use keyglide::ProximityInfo;
use std::sync::Arc;

/// Hand-placed keys on a small grid, proximity table computed from the rectangles.
pub struct LayoutBuilder {
    width: i32,
    height: i32,
    key_width: i32,
    key_height: i32,
    keys: Vec<KeyDef>,
}

impl LayoutBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            key_width: 100,
            key_height: 100,
            keys: Vec::new(),
        }
    }

    pub fn common_key(mut self, width: i32, height: i32) -> Self {
        self.key_width = width;
        self.key_height = height;
        self
    }

    /// Adds a key of the common size centered at `(cx, cy)`.
    pub fn key(mut self, c: char, cx: i32, cy: i32) -> Self {
        self.keys.push(KeyDef::new(
            c as CodePoint,
            cx - self.key_width / 2,
            cy - self.key_height / 2,
            self.key_width,
            self.key_height,
        ));
        self
    }

    pub fn rect(mut self, c: char, x: i32, y: i32, w: i32, h: i32) -> Self {
        self.keys.push(KeyDef::new(c as CodePoint, x, y, w, h));
        self
    }

    /// Gives every key a sweet spot shifted by `(dx, dy)` from its center.
    pub fn sweet_spots(mut self, dx: f32, dy: f32) -> Self {
        for k in &mut self.keys {
            k.sweet_spot = Some(SweetSpot {
                center_x: (k.x + k.width / 2) as f32 + dx,
                center_y: (k.y + k.height / 2) as f32 + dy,
                radius: k.width as f32 / 2.0,
            });
        }
        self
    }

    pub fn descriptor(self) -> LayoutDescriptor {
        LayoutDescriptor {
            name: "test".to_string(),
            keyboard_width: self.width,
            keyboard_height: self.height,
            grid_width: 16,
            grid_height: 16,
            most_common_key_width: self.key_width,
            most_common_key_height: self.key_height,
            keys: self.keys,
            proximity_chars: Vec::new(),
        }
        .with_computed_proximity()
    }

    pub fn build(self) -> Arc<ProximityInfo> {
        Arc::new(ProximityInfo::new(&self.descriptor()).unwrap())
    }
}

pub fn qwerty() -> Arc<ProximityInfo> {
    let layout = LayoutDescriptor::from_known(KnownLayout::Qwerty, 100, 150);
    Arc::new(ProximityInfo::new(&layout).unwrap())
}

/// Center of the key typing `c`.
pub fn center_of(info: &ProximityInfo, c: char) -> (i32, i32) {
    let key = info.key_index_of(c as CodePoint).unwrap();
    (
        info.key_center_x(key, keyglide::consts::NOT_A_COORDINATE, false),
        info.key_center_y(key, keyglide::consts::NOT_A_COORDINATE, false),
    )
}

pub fn cp(c: char) -> CodePoint {
    c as CodePoint
}
