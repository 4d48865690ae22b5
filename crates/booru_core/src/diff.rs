//! Positional list diff for incremental rendering.
//!
//! Operations are expressed against the list as it looks after every earlier
//! operation has been applied, so a renderer can replay them front to back.

/// An element that can be matched across two snapshots.
///
/// Two elements are the same item when their identities are equal; their
/// content changed when `PartialEq` says otherwise.
pub trait DiffItem: Clone + PartialEq {
    type Identity: PartialEq;

    fn identity(&self) -> Self::Identity;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp<T> {
    Insert { pos: usize, item: T },
    Remove { pos: usize },
    Change { pos: usize, item: T },
}

enum Step {
    Keep,
    Remove,
    Insert,
}

pub fn diff<T: DiffItem>(old: &[T], new: &[T]) -> Vec<DiffOp<T>> {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a.identity() == b.identity())
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a.identity() == b.identity())
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut steps = Vec::with_capacity(old.len().max(new.len()));
    steps.extend((0..prefix).map(|_| Step::Keep));
    steps.extend(align(old_mid, new_mid));
    steps.extend((0..suffix).map(|_| Step::Keep));

    let mut ops = Vec::new();
    let (mut i, mut j, mut pos) = (0, 0, 0);
    for step in steps {
        match step {
            Step::Keep => {
                if old[i] != new[j] {
                    ops.push(DiffOp::Change {
                        pos,
                        item: new[j].clone(),
                    });
                }
                i += 1;
                j += 1;
                pos += 1;
            }
            Step::Remove => {
                ops.push(DiffOp::Remove { pos });
                i += 1;
            }
            Step::Insert => {
                ops.push(DiffOp::Insert {
                    pos,
                    item: new[j].clone(),
                });
                j += 1;
                pos += 1;
            }
        }
    }
    ops
}

/// Replays `ops` on `list`.
///
/// # Panics
/// Panics when an operation addresses a position outside the list; that means
/// the ops were not produced against this list.
pub fn apply<T: Clone>(list: &mut Vec<T>, ops: &[DiffOp<T>]) {
    for op in ops {
        match op {
            DiffOp::Insert { pos, item } => {
                assert!(*pos <= list.len(), "insert at {pos} past end {}", list.len());
                list.insert(*pos, item.clone());
            }
            DiffOp::Remove { pos } => {
                assert!(*pos < list.len(), "remove at {pos} past end {}", list.len());
                list.remove(*pos);
            }
            DiffOp::Change { pos, item } => {
                assert!(*pos < list.len(), "change at {pos} past end {}", list.len());
                list[*pos] = item.clone();
            }
        }
    }
}

/// Longest-common-subsequence alignment over identities.
fn align<T: DiffItem>(old: &[T], new: &[T]) -> Vec<Step> {
    let (n, m) = (old.len(), new.len());
    if n == 0 || m == 0 {
        let mut steps = Vec::with_capacity(n + m);
        steps.extend((0..n).map(|_| Step::Remove));
        steps.extend((0..m).map(|_| Step::Insert));
        return steps;
    }

    let old_ids: Vec<_> = old.iter().map(DiffItem::identity).collect();
    let new_ids: Vec<_> = new.iter().map(DiffItem::identity).collect();

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let width = m + 1;
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if old_ids[i] == new_ids[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old_ids[i] == new_ids[j] {
            steps.push(Step::Keep);
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            steps.push(Step::Remove);
            i += 1;
        } else {
            steps.push(Step::Insert);
            j += 1;
        }
    }
    steps.extend((i..n).map(|_| Step::Remove));
    steps.extend((j..m).map(|_| Step::Insert));
    steps
}
