//! Sparse stream modes.
//!
//! Every sparse matrix is sent in exactly one of four modes. On the wire the
//! mode is the `(lhs_ws, lhs_os)` flag pair sampled on the start cycle, and
//! the device exposes one ready line per mode.

use std::fmt;

/// Operating mode carried by a sparse transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Plain streaming: the weight is used for one pass and dropped.
    Ns,
    /// Weight-stationary: the weight stays resident for later dense inputs.
    Ws,
    /// Output-stationary: the pass accumulates into the newest unread output.
    Os,
    /// Weight- and output-stationary.
    Wos,
}

impl StreamMode {
    /// All modes, in ready-line order.
    pub const ALL: [Self; 4] = [Self::Ns, Self::Ws, Self::Os, Self::Wos];

    /// Build from the `(weight_stationary, output_stationary)` flag pair.
    #[must_use]
    pub const fn from_flags(weight_stationary: bool, output_stationary: bool) -> Self {
        match (weight_stationary, output_stationary) {
            (false, false) => Self::Ns,
            (true, false) => Self::Ws,
            (false, true) => Self::Os,
            (true, true) => Self::Wos,
        }
    }

    /// Value driven on `lhs_ws`.
    #[must_use]
    pub const fn weight_stationary(self) -> bool {
        matches!(self, Self::Ws | Self::Wos)
    }

    /// Value driven on `lhs_os`.
    #[must_use]
    pub const fn output_stationary(self) -> bool {
        matches!(self, Self::Os | Self::Wos)
    }

    /// Name of the device ready line gating this mode.
    #[must_use]
    pub const fn ready_line(self) -> &'static str {
        match self {
            Self::Ns => "lhs_ready_ns",
            Self::Ws => "lhs_ready_ws",
            Self::Os => "lhs_ready_os",
            Self::Wos => "lhs_ready_wos",
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ns => write!(f, "ns"),
            Self::Ws => write!(f, "ws"),
            Self::Os => write!(f, "os"),
            Self::Wos => write!(f, "wos"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip_through_every_mode() {
        for mode in StreamMode::ALL {
            let back = StreamMode::from_flags(mode.weight_stationary(), mode.output_stationary());
            assert_eq!(back, mode);
        }
    }

    #[test]
    fn ready_lines_are_distinct() {
        let mut names: Vec<_> = StreamMode::ALL.iter().map(|m| m.ready_line()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
