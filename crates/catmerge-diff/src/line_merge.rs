//! Conventional line-oriented three-way merge (diff3).
//!
//! Both branches are diffed against the ancestor with Myers' algorithm.
//! Ancestor lines that survive unchanged on both sides are sync points; the
//! regions between sync points are taken from whichever side changed them.
//! A region changed differently on both sides is a conflict.
//!
//! Content is handled as bytes split after `\n`, so the merge works on any
//! encoding and preserves line endings exactly.

use similar::{capture_diff_slices, Algorithm, DiffOp};

/// Outcome of a line merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineMerge {
    /// Every region merged cleanly; the merged content.
    Clean(Vec<u8>),
    /// At least one region was changed differently on both sides.
    Conflicted { regions: usize },
}

/// Merge `local` and `other`, both descended from `base`.
pub fn merge_lines(base: &[u8], local: &[u8], other: &[u8]) -> LineMerge {
    if local == other || base == other {
        return LineMerge::Clean(local.to_vec());
    }
    if base == local {
        return LineMerge::Clean(other.to_vec());
    }

    let base_lines = split_lines(base);
    let local_lines = split_lines(local);
    let other_lines = split_lines(other);

    let local_map = match_lines(&base_lines, &local_lines);
    let other_map = match_lines(&base_lines, &other_lines);

    let mut merged = Vec::with_capacity(local.len().max(other.len()));
    let mut regions = 0;
    let (mut ib, mut il, mut io) = (0usize, 0usize, 0usize);

    loop {
        // Next ancestor line kept by both sides, or the end of all three.
        let mut j = ib;
        let (sync_l, sync_o) = loop {
            if j == base_lines.len() {
                break (local_lines.len(), other_lines.len());
            }
            if let (Some(l), Some(o)) = (local_map[j], other_map[j]) {
                break (l, o);
            }
            j += 1;
        };

        if j == ib && sync_l == il && sync_o == io {
            if j == base_lines.len() {
                break;
            }
            merged.extend_from_slice(base_lines[j]);
            ib += 1;
            il += 1;
            io += 1;
            continue;
        }

        let base_chunk = &base_lines[ib..j];
        let local_chunk = &local_lines[il..sync_l];
        let other_chunk = &other_lines[io..sync_o];

        if local_chunk == base_chunk {
            extend(&mut merged, other_chunk);
        } else if other_chunk == base_chunk || local_chunk == other_chunk {
            extend(&mut merged, local_chunk);
        } else {
            regions += 1;
        }

        ib = j;
        il = sync_l;
        io = sync_o;
    }

    if regions > 0 {
        tracing::debug!(regions, "line merge found overlapping changes");
        LineMerge::Conflicted { regions }
    } else {
        LineMerge::Clean(merged)
    }
}

fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    data.split_inclusive(|&b| b == b'\n').collect()
}

/// For each ancestor line, the index of the matching line on the branch.
fn match_lines(base: &[&[u8]], side: &[&[u8]]) -> Vec<Option<usize>> {
    let mut map = vec![None; base.len()];
    for op in capture_diff_slices(Algorithm::Myers, base, side) {
        if let DiffOp::Equal {
            old_index,
            new_index,
            len,
        } = op
        {
            for k in 0..len {
                map[old_index + k] = Some(new_index + k);
            }
        }
    }
    map
}

fn extend(out: &mut Vec<u8>, lines: &[&[u8]]) {
    for line in lines {
        out.extend_from_slice(line);
    }
}
