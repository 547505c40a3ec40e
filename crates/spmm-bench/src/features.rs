//! Protocol feature mask
//!
//! Each scenario exercises a subset of optional device features. The mask
//! is the integer written to the results log; bit positions are fixed by
//! the scoring tool that reads it.

use std::fmt;
use std::ops::BitOr;

/// Set of protocol features, as a 4-bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Features(u8);

impl Features {
    /// No optional feature
    pub const NONE: Self = Self(0);
    /// Halo exchange (bit 0); no scenario here uses it
    pub const HALO: Self = Self(1 << 0);
    /// Double-buffered inputs or outputs (bit 1)
    pub const DBBUF: Self = Self(1 << 1);
    /// Weight-stationary reuse (bit 2)
    pub const WS: Self = Self(1 << 2);
    /// Output-stationary accumulation (bit 3)
    pub const OS: Self = Self(1 << 3);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::HALO, "halo"),
        (Self::DBBUF, "dbbuf"),
        (Self::WS, "ws"),
        (Self::OS, "os"),
    ];

    /// Raw mask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Every feature in `other` is also in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Features {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            return write!(f, "base");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "+")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_match_the_log_format() {
        assert_eq!(Features::NONE.bits(), 0);
        assert_eq!((Features::WS | Features::DBBUF).bits(), 6);
        assert_eq!((Features::OS | Features::DBBUF).bits(), 10);
        assert_eq!((Features::WS | Features::OS).bits(), 12);
    }

    #[test]
    fn display_lists_features() {
        assert_eq!(Features::NONE.to_string(), "base");
        assert_eq!((Features::OS | Features::DBBUF).to_string(), "dbbuf+os");
    }
}
