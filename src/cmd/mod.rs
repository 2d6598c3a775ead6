pub mod decode;
pub mod inspect;
pub mod simulate;

use keyglide::layout::{KnownLayout, LayoutDescriptor};
use keyglide::{DecoderError, DgResult};
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::info;

/// Key size used when a built-in layout name is given instead of a file.
const KNOWN_KEY_WIDTH: i32 = 100;
const KNOWN_KEY_HEIGHT: i32 = 150;

/// Accepts a built-in layout name (`qwerty`, `dvorak`, ...) or a path to a JSON descriptor.
pub fn load_layout(name: &str) -> DgResult<LayoutDescriptor> {
    if let Ok(known) = KnownLayout::from_str(&name.to_lowercase()) {
        info!(layout = %known, "using built-in layout");
        return Ok(LayoutDescriptor::from_known(
            known,
            KNOWN_KEY_WIDTH,
            KNOWN_KEY_HEIGHT,
        ));
    }
    if Path::new(name).extension().is_none() && !Path::new(name).exists() {
        let known: Vec<String> = KnownLayout::iter().map(|l| l.to_string()).collect();
        return Err(DecoderError::Config(format!(
            "unknown layout '{}' (built-in: {})",
            name,
            known.join(", ")
        )));
    }
    LayoutDescriptor::load_from_file(name)
}
