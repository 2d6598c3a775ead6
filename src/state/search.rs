use super::{KeyDistribution, KeySet, SampledPoint};
use crate::consts::CodePoint;
use crate::proximity::ProximityInfo;

/// For each sampled point, the keys with a retained cost at that point or at any later point
/// less than `radius_ratio` of the keyboard diagonal further along the path.
pub(super) fn update_search_key_sets(
    info: &ProximityInfo,
    radius_ratio: f32,
    last_saved: usize,
    points: &[SampledPoint],
    distributions: &[KeyDistribution],
    sets: &mut Vec<KeySet>,
    vectors: &mut Vec<Vec<CodePoint>>,
) {
    let size = points.len();
    sets.resize(size, KeySet::default());
    let read_forward = (info.keyboard_hypotenuse() * radius_ratio) as i32;

    for i in 0..size {
        if i >= last_saved {
            sets[i].reset();
        }
        for j in i.max(last_saved)..size {
            if points[j].length - points[i].length >= read_forward {
                break;
            }
            for &key in distributions[j].keys.keys() {
                sets[i].set(key);
            }
        }
    }

    vectors.clear();
    vectors.extend(sets.iter().map(|set| {
        let mut codes: Vec<CodePoint> = Vec::with_capacity(set.len());
        for key in set.iter() {
            let code = info.code_point_of(key);
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }));
}
