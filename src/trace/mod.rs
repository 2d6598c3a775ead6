//! Raw touch input: parallel arrays of coordinates with optional timing,
//! pointer and key-code channels.

pub mod loader;

use crate::consts::{CodePoint, NOT_A_CODE_POINT};
use crate::error::{DecoderError, DgResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTrace {
    pub xs: Vec<i32>,
    pub ys: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer_ids: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<CodePoint>>,
}

impl InputTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timed trace, as produced by a gesture.
    pub fn from_points(points: &[(i32, i32, i32)]) -> Self {
        Self {
            xs: points.iter().map(|p| p.0).collect(),
            ys: points.iter().map(|p| p.1).collect(),
            times: Some(points.iter().map(|p| p.2).collect()),
            pointer_ids: None,
            codes: None,
        }
    }

    /// Taps with their reported key codes, as produced by typing.
    pub fn from_taps(taps: &[(CodePoint, i32, i32)]) -> Self {
        Self {
            xs: taps.iter().map(|t| t.1).collect(),
            ys: taps.iter().map(|t| t.2).collect(),
            times: None,
            pointer_ids: None,
            codes: Some(taps.iter().map(|t| t.0).collect()),
        }
    }

    pub fn push(&mut self, x: i32, y: i32, time: i32) {
        self.xs.push(x);
        self.ys.push(y);
        self.times.get_or_insert_with(Vec::new).push(time);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn has_times(&self) -> bool {
        self.times.is_some()
    }

    pub fn time_at(&self, i: usize) -> i32 {
        self.times.as_ref().and_then(|t| t.get(i)).copied().unwrap_or(-1)
    }

    /// Points without pointer ids belong to pointer 0.
    pub fn pointer_id_at(&self, i: usize) -> i32 {
        self.pointer_ids
            .as_ref()
            .and_then(|p| p.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn code_at(&self, i: usize) -> CodePoint {
        self.codes
            .as_ref()
            .and_then(|c| c.get(i))
            .copied()
            .unwrap_or(NOT_A_CODE_POINT)
    }

    /// Prefix of the first `n` points, every channel included.
    pub fn prefix(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self {
            xs: self.xs[..n].to_vec(),
            ys: self.ys[..n].to_vec(),
            times: self.times.as_ref().map(|t| t[..n].to_vec()),
            pointer_ids: self.pointer_ids.as_ref().map(|p| p[..n].to_vec()),
            codes: self.codes.as_ref().map(|c| c[..n].to_vec()),
        }
    }

    pub fn validate(&self) -> DgResult<()> {
        let n = self.xs.len();
        if self.ys.len() != n {
            return Err(DecoderError::TraceShape(format!(
                "{} x values but {} y values",
                n,
                self.ys.len()
            )));
        }
        let channels = [
            ("times", self.times.as_ref().map(Vec::len)),
            ("pointer_ids", self.pointer_ids.as_ref().map(Vec::len)),
            ("codes", self.codes.as_ref().map(Vec::len)),
        ];
        for (name, len) in channels {
            if let Some(len) = len {
                if len != n {
                    return Err(DecoderError::TraceShape(format!(
                        "{} has {} entries, expected {}",
                        name, len, n
                    )));
                }
            }
        }
        if let Some(times) = &self.times {
            if let Some(w) = times.windows(2).find(|w| w[1] < w[0]) {
                return Err(DecoderError::TraceShape(format!(
                    "timestamps go backwards ({} -> {})",
                    w[0], w[1]
                )));
            }
        }
        Ok(())
    }
}
