// Sequence Aligner
// Minimal-edit alignment of two unit sequences (sentences or words).
//
// Backbone is the suffix LCS recurrence walked forward from the start of both sequences:
// - equal units are always matched immediately (extends the current Equal run),
// - otherwise the source advances when that keeps the LCS length, else the target,
// so ambiguous matches land at the earliest source position.
// Consecutive non-equal steps collapse into one Replace/Delete/Insert op.
//
// The recurrence is only evaluated inside a diagonal band |j - i| <= reach. Every optimal
// path with D edits stays within |j - i| <= D, so once the banded edit count fits the reach
// the walk's decisions equal the full-table ones. The reach doubles until that holds. Only
// one decision bit per banded cell is kept.

use crate::error::{AuditError, AuditResult};
use crate::models::{AlignmentOp, OpKind, Span};
use std::convert::Infallible;
use tracing::debug;

const INITIAL_REACH: usize = 16;

/// Align two sequences with no size bound.
pub fn align<T: PartialEq>(source: &[T], target: &[T]) -> Vec<AlignmentOp> {
    let prefix = common_prefix(source, target);
    let (a, b) = (&source[prefix..], &target[prefix..]);
    match decide(a, b, |_| Ok::<(), Infallible>(())) {
        Ok(table) => walk(a, b, &table, prefix),
        Err(never) => match never {},
    }
}

/// Align two sequences, refusing inputs whose banded table would exceed `max_cells`.
pub fn align_bounded<T: PartialEq>(
    source: &[T],
    target: &[T],
    max_cells: u64,
) -> AuditResult<Vec<AlignmentOp>> {
    let prefix = common_prefix(source, target);
    let (a, b) = (&source[prefix..], &target[prefix..]);
    let table = decide(a, b, |band| {
        let cells = band.cells();
        if cells > max_cells {
            return Err(AuditError::InvalidInput(format!(
                "alignment needs {} cells ({} x {} units, band {}), limit is {}",
                cells,
                a.len(),
                b.len(),
                band.width(),
                max_cells
            )));
        }
        Ok(())
    })?;
    debug!(
        source_units = source.len(),
        target_units = target.len(),
        prefix,
        reach = table.band.reach,
        cells = table.band.cells(),
        "aligner.table"
    );
    Ok(walk(a, b, &table, prefix))
}

/// Align string tokens, optionally ignoring case.
pub fn align_tokens<S: AsRef<str>>(
    source: &[S],
    target: &[S],
    case_sensitive: bool,
    max_cells: u64,
) -> AuditResult<Vec<AlignmentOp>> {
    if case_sensitive {
        let a: Vec<&str> = source.iter().map(|s| s.as_ref()).collect();
        let b: Vec<&str> = target.iter().map(|s| s.as_ref()).collect();
        align_bounded(&a, &b, max_cells)
    } else {
        let a: Vec<String> = source.iter().map(|s| s.as_ref().to_lowercase()).collect();
        let b: Vec<String> = target.iter().map(|s| s.as_ref().to_lowercase()).collect();
        align_bounded(&a, &b, max_cells)
    }
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Diagonals `lo..=hi` (k = j - i) of an `m x n` problem.
#[derive(Debug, Clone, Copy)]
struct Band {
    m: usize,
    n: usize,
    reach: usize,
    lo: isize,
    hi: isize,
}

impl Band {
    fn new(m: usize, n: usize, reach: usize) -> Self {
        Self {
            m,
            n,
            reach,
            lo: -(reach.min(m) as isize),
            hi: reach.min(n) as isize,
        }
    }

    fn width(&self) -> usize {
        (self.hi - self.lo + 1) as usize
    }

    /// Decision bits needed: one per banded cell of rows `0..m`.
    fn cells(&self) -> u64 {
        (self.m as u64).saturating_mul(self.width() as u64)
    }

    fn is_full(&self) -> bool {
        self.lo == -(self.m as isize) && self.hi == self.n as isize
    }

    /// Column inside the band for cell `(i, j)`.
    fn slot(&self, i: usize, j: usize) -> Option<usize> {
        let k = j as isize - i as isize;
        (self.lo..=self.hi).contains(&k).then(|| (k - self.lo) as usize)
    }
}

/// Walk decisions: bit set when advancing the source keeps the LCS length.
struct DecisionTable {
    band: Band,
    bits: Vec<u64>,
}

impl DecisionTable {
    /// Fill the band bottom-up and return the table with the banded LCS of the whole problem.
    fn build<T: PartialEq>(a: &[T], b: &[T], band: Band) -> (Self, usize) {
        let (m, n) = (a.len(), b.len());
        let width = band.width();
        let mut bits = vec![0u64; (band.cells() as usize).div_ceil(64)];
        // Row i + 1 and row i of the banded LCS values; cells outside the band read as 0.
        let mut next = vec![0u32; width];
        let mut cur = vec![0u32; width];

        for i in (0..m).rev() {
            for s in (0..width).rev() {
                let k = band.lo + s as isize;
                let j = i as isize + k;
                if j < 0 || j as usize >= n {
                    cur[s] = 0;
                    continue;
                }
                let j = j as usize;
                if a[i] == b[j] {
                    cur[s] = next[s] + 1;
                    continue;
                }
                let down = if s > 0 { next[s - 1] } else { 0 };
                let right = if s + 1 < width { cur[s + 1] } else { 0 };
                if down >= right {
                    let idx = i * width + s;
                    bits[idx / 64] |= 1u64 << (idx % 64);
                }
                cur[s] = down.max(right);
            }
            std::mem::swap(&mut next, &mut cur);
        }

        let lcs = if m == 0 {
            0
        } else {
            band.slot(0, 0).map(|s| next[s] as usize).unwrap_or(0)
        };
        (Self { band, bits }, lcs)
    }

    fn prefers_source(&self, i: usize, j: usize) -> bool {
        match self.band.slot(i, j) {
            Some(s) => {
                let idx = i * self.band.width() + s;
                (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
            }
            None => false,
        }
    }
}

/// Grow the band until its edit count fits inside it; `admit` vets each band before it is filled.
fn decide<T, E>(
    a: &[T],
    b: &[T],
    mut admit: impl FnMut(&Band) -> Result<(), E>,
) -> Result<DecisionTable, E>
where
    T: PartialEq,
{
    let (m, n) = (a.len(), b.len());
    let mut reach = m.abs_diff(n).max(INITIAL_REACH);
    loop {
        let band = Band::new(m, n, reach);
        admit(&band)?;
        let (table, lcs) = DecisionTable::build(a, b, band);
        let edits = m + n - 2 * lcs;
        if band.is_full() || edits <= reach {
            return Ok(table);
        }
        reach = reach.saturating_mul(2);
    }
}

fn walk<T: PartialEq>(a: &[T], b: &[T], table: &DecisionTable, offset: usize) -> Vec<AlignmentOp> {
    let mut ops = Vec::new();
    if offset > 0 {
        ops.push(AlignmentOp::equal(Span::new(0, offset), Span::new(0, offset)));
    }

    let (m, n) = (a.len(), b.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut equal_from: Option<(usize, usize)> = None;
    let mut change_from: Option<(usize, usize)> = None;

    while i < m || j < n {
        if i < m && j < n && a[i] == b[j] {
            if let Some(from) = change_from.take() {
                push_op(&mut ops, change_op(from, (i, j), offset));
            }
            equal_from.get_or_insert((i, j));
            i += 1;
            j += 1;
            continue;
        }

        if let Some((si, sj)) = equal_from.take() {
            push_op(
                &mut ops,
                AlignmentOp::equal(
                    Span::new(si + offset, i + offset),
                    Span::new(sj + offset, j + offset),
                ),
            );
        }
        change_from.get_or_insert((i, j));

        let advance_source = j == n || (i < m && table.prefers_source(i, j));
        if advance_source {
            i += 1;
        } else {
            j += 1;
        }
    }

    if let Some((si, sj)) = equal_from {
        push_op(
            &mut ops,
            AlignmentOp::equal(
                Span::new(si + offset, m + offset),
                Span::new(sj + offset, n + offset),
            ),
        );
    }
    if let Some(from) = change_from {
        push_op(&mut ops, change_op(from, (m, n), offset));
    }

    ops
}

fn change_op(from: (usize, usize), to: (usize, usize), offset: usize) -> AlignmentOp {
    let source = Span::new(from.0 + offset, to.0 + offset);
    let target = Span::new(from.1 + offset, to.1 + offset);
    match (source.is_empty(), target.is_empty()) {
        (false, false) => AlignmentOp::replace(source, target),
        (false, true) => AlignmentOp::delete(source, target.start),
        _ => AlignmentOp::insert(source.start, target),
    }
}

fn push_op(ops: &mut Vec<AlignmentOp>, op: AlignmentOp) {
    if op.source.is_empty() && op.target.is_empty() {
        return;
    }
    if let Some(last) = ops.last_mut() {
        if last.kind == OpKind::Equal && op.kind == OpKind::Equal {
            last.source.end = op.source.end;
            last.target.end = op.target.end;
            return;
        }
    }
    ops.push(op);
}
