use std::fmt;

use crate::CODE_SPACE;

/// A slot in the dense 4-digit code namespace.
/// Renders as a zero-padded 4-character decimal string, so leading zeros
/// survive the trip into URLs and filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code(u16);

impl Code {
    /// Returns `None` when `n` falls outside [0, 10000).
    pub fn new(n: u16) -> Option<Self> {
        (n < CODE_SPACE).then_some(Self(n))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Every code in the namespace, in numeric order.
    pub fn all() -> impl Iterator<Item = Code> {
        (0..CODE_SPACE).map(Code)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_exactly_four_chars_and_round_trips() {
        for code in Code::all() {
            let rendered = code.to_string();
            assert_eq!(rendered.len(), 4, "bad rendering: {rendered}");
            assert_eq!(rendered.parse::<u16>().unwrap(), code.value());
        }
    }

    #[test]
    fn preserves_leading_zeros() {
        assert_eq!(Code::new(0).unwrap().to_string(), "0000");
        assert_eq!(Code::new(7).unwrap().to_string(), "0007");
        assert_eq!(Code::new(42).unwrap().to_string(), "0042");
        assert_eq!(Code::new(9999).unwrap().to_string(), "9999");
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Code::new(10_000).is_none());
        assert!(Code::new(u16::MAX).is_none());
    }
}
