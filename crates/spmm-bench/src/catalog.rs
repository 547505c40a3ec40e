//! Scenario catalog
//!
//! Each scenario is a fixed choreography of sends and reads against a
//! freshly reset device. Operands are generated from the scenario's own
//! seeded generator, so a failing scenario reproduces from the suite seed.
//!
//! | Scenario | Features | Choreography |
//! |----------|----------|--------------|
//! | `ns-onepass` | base | D, S, read |
//! | `rhs-dbbuf` | dbbuf | D1, D2, S, read, S, read |
//! | `out-dbbuf` | dbbuf | D1, S, D2, S, read, read |
//! | `rhs-out-dbbuf` | dbbuf | D1, D2, S1, S2, read, read |
//! | `ws-onepass` | ws | D1, S(ws), read, D2, read |
//! | `ws-out-dbbuf` | dbbuf+ws | D1, S(ws), D2, read, read |
//! | `ws-pipe` | dbbuf+ws | S0(ws), D0, D1, read, S1(ws), D2, D3, read ×3 |
//! | `os-onepass` | os | D1, S1, D2, S2(os), read |
//! | `os-rhs-dbbuf` | dbbuf+os | D1, D2, S1, S2(os), read |
//! | `os-pipe` | dbbuf+os | 2×2 outputs, each two (D, S) pairs summed |
//! | `wos-pipe` | ws+os | S(wos), D1..D4, read |

use spmm_chip::StreamMode;
use spmm_driver::{Result, SpmmDevice};
use spmm_models::{Pair, SparseShape};

use crate::context::ScenarioContext;
use crate::features::Features;

/// Extra cycles on top of every budget, covering reset and pipeline fill
const BUDGET_SLACK: u64 = 32;

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    /// One plain pass
    NsOnepass,
    /// Two dense operands queued before the sparse
    RhsDbbuf,
    /// Second pass issued before the first result is read
    OutDbbuf,
    /// Both inputs queued, both outputs held
    RhsOutDbbuf,
    /// One weight-stationary sparse serving two dense operands
    WsOnepass,
    /// Weight-stationary with both results held
    WsOutDbbuf,
    /// Two resident weights back to back
    WsPipe,
    /// Plain pass plus an output-stationary pass into one result
    OsOnepass,
    /// Output-stationary with both dense operands queued
    OsRhsDbbuf,
    /// Four outputs, each a two-pass output-stationary sum
    OsPipe,
    /// One resident output-stationary weight over four dense operands
    WosPipe,
}

impl ScenarioKind {
    /// Catalog in run order
    pub const ALL: [Self; 11] = [
        Self::NsOnepass,
        Self::RhsDbbuf,
        Self::OutDbbuf,
        Self::RhsOutDbbuf,
        Self::WsOnepass,
        Self::WsOutDbbuf,
        Self::WsPipe,
        Self::OsOnepass,
        Self::OsRhsDbbuf,
        Self::OsPipe,
        Self::WosPipe,
    ];

    /// Stable name used on the command line and in trace file names
    pub const fn name(self) -> &'static str {
        match self {
            Self::NsOnepass => "ns-onepass",
            Self::RhsDbbuf => "rhs-dbbuf",
            Self::OutDbbuf => "out-dbbuf",
            Self::RhsOutDbbuf => "rhs-out-dbbuf",
            Self::WsOnepass => "ws-onepass",
            Self::WsOutDbbuf => "ws-out-dbbuf",
            Self::WsPipe => "ws-pipe",
            Self::OsOnepass => "os-onepass",
            Self::OsRhsDbbuf => "os-rhs-dbbuf",
            Self::OsPipe => "os-pipe",
            Self::WosPipe => "wos-pipe",
        }
    }

    /// Position in [`ALL`](Self::ALL); seeds the scenario's generator
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or_default()
    }

    /// Look a scenario up by [`name`](Self::name)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Features the scenario exercises
    pub fn features(self) -> Features {
        match self {
            Self::NsOnepass => Features::NONE,
            Self::RhsDbbuf | Self::OutDbbuf | Self::RhsOutDbbuf => Features::DBBUF,
            Self::WsOnepass => Features::WS,
            Self::WsOutDbbuf | Self::WsPipe => Features::WS | Features::DBBUF,
            Self::OsOnepass => Features::OS,
            Self::OsRhsDbbuf | Self::OsPipe => Features::OS | Features::DBBUF,
            Self::WosPipe => Features::WS | Features::OS,
        }
    }

    /// Cycle budget for a device of dimension `n`, counted from reset
    pub fn budget(self, n: usize) -> u64 {
        let n = n as u64;
        let base = match self {
            Self::OsPipe => 10 * n * n,
            Self::WosPipe => 40 * n,
            _ => 10 * n,
        };
        base + BUDGET_SLACK
    }

    /// Run the choreography, recording checks on `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the driver's timeout if the device stops handshaking.
    pub fn run<D: SpmmDevice>(self, ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
        match self {
            Self::NsOnepass => ns_onepass(ctx),
            Self::RhsDbbuf => rhs_dbbuf(ctx),
            Self::OutDbbuf => out_dbbuf(ctx),
            Self::RhsOutDbbuf => rhs_out_dbbuf(ctx),
            Self::WsOnepass => ws_onepass(ctx),
            Self::WsOutDbbuf => ws_out_dbbuf(ctx),
            Self::WsPipe => ws_pipe(ctx),
            Self::OsOnepass => os_onepass(ctx),
            Self::OsRhsDbbuf => os_rhs_dbbuf(ctx),
            Self::OsPipe => os_pipe(ctx),
            Self::WosPipe => wos_pipe(ctx),
        }
    }
}

fn ns_onepass<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s = ctx.sparse(&SparseShape::Full, StreamMode::Ns);
    let d = ctx.dense();
    ctx.send_dense(&d)?;
    ctx.send_sparse(&s)?;
    let out = ctx.read()?;
    ctx.check("S·D", &[(&s, &d)], &out);
    Ok(())
}

fn rhs_dbbuf<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s = ctx.sparse(&SparseShape::Full, StreamMode::Ns);
    let d1 = ctx.dense();
    let d2 = ctx.dense();
    ctx.send_dense(&d1)?;
    ctx.send_dense(&d2)?;
    ctx.send_sparse(&s)?;
    let out1 = ctx.read()?;
    ctx.send_sparse(&s)?;
    let out2 = ctx.read()?;
    ctx.check("S·D1", &[(&s, &d1)], &out1);
    ctx.check("S·D2", &[(&s, &d2)], &out2);
    Ok(())
}

fn out_dbbuf<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s = ctx.sparse(&SparseShape::Full, StreamMode::Ns);
    let d1 = ctx.dense();
    let d2 = ctx.dense();
    ctx.send_dense(&d1)?;
    ctx.send_sparse(&s)?;
    ctx.send_dense(&d2)?;
    ctx.send_sparse(&s)?;
    let out1 = ctx.read()?;
    let out2 = ctx.read()?;
    ctx.check("S·D1", &[(&s, &d1)], &out1);
    ctx.check("S·D2", &[(&s, &d2)], &out2);
    Ok(())
}

fn rhs_out_dbbuf<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s1 = ctx.sparse(&SparseShape::Full, StreamMode::Ns);
    let s2 = ctx.sparse(&SparseShape::Half, StreamMode::Ns);
    let d1 = ctx.dense();
    let d2 = ctx.dense();
    ctx.send_dense(&d1)?;
    ctx.send_dense(&d2)?;
    ctx.send_sparse(&s1)?;
    ctx.send_sparse(&s2)?;
    let out1 = ctx.read()?;
    let out2 = ctx.read()?;
    ctx.check("S1·D1", &[(&s1, &d1)], &out1);
    ctx.check("S2·D2", &[(&s2, &d2)], &out2);
    Ok(())
}

fn ws_onepass<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s = ctx.sparse(&SparseShape::Full, StreamMode::Ws);
    let d1 = ctx.dense();
    let d2 = ctx.dense();
    ctx.send_dense(&d1)?;
    ctx.send_sparse(&s)?;
    let out1 = ctx.read()?;
    ctx.send_dense(&d2)?;
    let out2 = ctx.read()?;
    ctx.check("S·D1", &[(&s, &d1)], &out1);
    ctx.check("S·D2", &[(&s, &d2)], &out2);
    Ok(())
}

fn ws_out_dbbuf<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s = ctx.sparse(&SparseShape::Full, StreamMode::Ws);
    let d1 = ctx.dense();
    let d2 = ctx.dense();
    ctx.send_dense(&d1)?;
    ctx.send_sparse(&s)?;
    ctx.send_dense(&d2)?;
    let out1 = ctx.read()?;
    let out2 = ctx.read()?;
    ctx.check("S·D1", &[(&s, &d1)], &out1);
    ctx.check("S·D2", &[(&s, &d2)], &out2);
    Ok(())
}

fn ws_pipe<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s0 = ctx.sparse(&SparseShape::Full, StreamMode::Ws);
    let s1 = ctx.sparse(&SparseShape::Half, StreamMode::Ws);
    let d: Vec<_> = (0..4).map(|_| ctx.dense()).collect();

    ctx.send_sparse(&s0)?;
    ctx.send_dense(&d[0])?;
    ctx.send_dense(&d[1])?;
    let a0 = ctx.read()?;
    ctx.send_sparse(&s1)?;
    ctx.send_dense(&d[2])?;
    ctx.send_dense(&d[3])?;
    let a1 = ctx.read()?;
    let b0 = ctx.read()?;
    let b1 = ctx.read()?;

    ctx.check("S0·D0", &[(&s0, &d[0])], &a0);
    ctx.check("S0·D1", &[(&s0, &d[1])], &a1);
    ctx.check("S1·D2", &[(&s1, &d[2])], &b0);
    ctx.check("S1·D3", &[(&s1, &d[3])], &b1);
    Ok(())
}

fn os_onepass<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s1 = ctx.sparse(&SparseShape::Full, StreamMode::Ns);
    let s2 = ctx.sparse(&SparseShape::Half, StreamMode::Os);
    let d1 = ctx.dense();
    let d2 = ctx.dense();
    ctx.send_dense(&d1)?;
    ctx.send_sparse(&s1)?;
    ctx.send_dense(&d2)?;
    ctx.send_sparse(&s2)?;
    let out = ctx.read()?;
    ctx.check("S1·D1 + S2·D2", &[(&s1, &d1), (&s2, &d2)], &out);
    Ok(())
}

fn os_rhs_dbbuf<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s1 = ctx.sparse(&SparseShape::Full, StreamMode::Ns);
    let s2 = ctx.sparse(&SparseShape::Full, StreamMode::Os);
    let d1 = ctx.dense();
    let d2 = ctx.dense();
    ctx.send_dense(&d1)?;
    ctx.send_dense(&d2)?;
    ctx.send_sparse(&s1)?;
    ctx.send_sparse(&s2)?;
    let out = ctx.read()?;
    ctx.check("S1·D1 + S2·D2", &[(&s1, &d1), (&s2, &d2)], &out);
    Ok(())
}

fn os_pipe<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    // s[i][k]: k = 0 opens the output, k = 1 accumulates into it
    let mut s = Vec::with_capacity(2);
    for _ in 0..2 {
        s.push([
            ctx.sparse(&SparseShape::Full, StreamMode::Ns),
            ctx.sparse(&SparseShape::Full, StreamMode::Os),
        ]);
    }
    let mut d = Vec::with_capacity(2);
    for _ in 0..2 {
        d.push([ctx.dense(), ctx.dense()]);
    }

    for i in 0..2 {
        for j in 0..2 {
            for k in 0..2 {
                ctx.send_dense(&d[k][j])?;
                ctx.send_sparse(&s[i][k])?;
                ctx.step()?;
            }
            let out = ctx.read()?;
            let pairs: [Pair<'_>; 2] = [(&s[i][0], &d[0][j]), (&s[i][1], &d[1][j])];
            ctx.check(format!("out[{i}][{j}]"), &pairs, &out);
        }
    }
    Ok(())
}

fn wos_pipe<D: SpmmDevice>(ctx: &mut ScenarioContext<'_, D>) -> Result<()> {
    let s = ctx.sparse(&SparseShape::Full, StreamMode::Wos);
    let d: Vec<_> = (0..4).map(|_| ctx.dense()).collect();

    ctx.send_sparse(&s)?;
    for m in &d {
        ctx.send_dense(m)?;
        ctx.step()?;
    }
    let out = ctx.read()?;
    let pairs: Vec<Pair<'_>> = d.iter().map(|m| (&s, m)).collect();
    ctx.check("Σ S·Di", &pairs, &out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ScenarioKind::ALL {
            assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ScenarioKind::from_name("halo"), None);
    }

    #[test]
    fn index_follows_catalog_order() {
        for (i, kind) in ScenarioKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn feature_masks() {
        assert_eq!(ScenarioKind::NsOnepass.features().bits(), 0);
        assert_eq!(ScenarioKind::RhsDbbuf.features().bits(), 2);
        assert_eq!(ScenarioKind::WsOnepass.features().bits(), 4);
        assert_eq!(ScenarioKind::WsPipe.features().bits(), 6);
        assert_eq!(ScenarioKind::OsOnepass.features().bits(), 8);
        assert_eq!(ScenarioKind::OsPipe.features().bits(), 10);
        assert_eq!(ScenarioKind::WosPipe.features().bits(), 12);
    }

    #[test]
    fn budgets_scale_with_size() {
        assert_eq!(ScenarioKind::NsOnepass.budget(4), 72);
        assert_eq!(ScenarioKind::OsPipe.budget(4), 192);
        assert_eq!(ScenarioKind::WosPipe.budget(8), 352);
    }
}
