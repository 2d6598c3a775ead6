use crate::consts::{CodePoint, MAX_PROXIMITY_CHARS_SIZE, NOT_A_CODE_POINT};
use crate::error::{DecoderError, DgResult};

/// Fixed-capacity list of candidate code points for one touch, primary code first.
/// Unused slots hold `NOT_A_CODE_POINT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityCodes {
    codes: [CodePoint; MAX_PROXIMITY_CHARS_SIZE],
    len: usize,
}

impl Default for ProximityCodes {
    fn default() -> Self {
        Self {
            codes: [NOT_A_CODE_POINT; MAX_PROXIMITY_CHARS_SIZE],
            len: 0,
        }
    }
}

impl ProximityCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_push(&mut self, code: CodePoint) -> DgResult<()> {
        if self.len >= MAX_PROXIMITY_CHARS_SIZE {
            return Err(DecoderError::Capacity {
                what: "proximity code buffer",
                capacity: MAX_PROXIMITY_CHARS_SIZE,
            });
        }
        self.codes[self.len] = code;
        self.len += 1;
        Ok(())
    }

    pub fn primary(&self) -> CodePoint {
        self.codes[0]
    }

    pub fn as_slice(&self) -> &[CodePoint] {
        &self.codes[..self.len]
    }

    /// All slots, padding included.
    pub fn raw(&self) -> &[CodePoint; MAX_PROXIMITY_CHARS_SIZE] {
        &self.codes
    }

    pub fn contains(&self, code: CodePoint) -> bool {
        self.as_slice().contains(&code)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_PROXIMITY_CHARS_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_is_an_error() {
        let mut codes = ProximityCodes::new();
        for c in 0..MAX_PROXIMITY_CHARS_SIZE as i32 {
            codes.try_push('a' as i32 + c).unwrap();
        }
        assert!(codes.is_full());
        assert!(codes.try_push('z' as i32).is_err());
        assert_eq!(codes.raw()[MAX_PROXIMITY_CHARS_SIZE - 1], 'a' as i32 + 15);
    }
}
