/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The union of two sorted, labelled sequential graphs under a caller-supplied
//! merge semigroup.
//!
//! This is the labelled counterpart of [`crate::graphs::union_graph::UnionGraph`]:
//! arcs present in only one component are copied as is, arcs present in both
//! receive `merge(l0, l1)`.

use crate::prelude::*;
use lender::*;

/// A wrapper exhibiting the union of the arcs of two labelled graphs, merging
/// the labels of arcs present in both components with `merge`.
///
/// Both components must be [sorted](SortedLender) sequential labelled graphs
/// with the same label type; the union is computed with a single lock-step
/// merge of the two successor lists of each node, walking both in lockstep
/// and handling the three cases (only left, only right, both) as it goes.
#[derive(Clone)]
pub struct UnionLabelGraph<G, H, L, F>
where
    G: SequentialLabeling<Label = (usize, L)>,
    H: SequentialLabeling<Label = (usize, L)>,
    F: Fn(&L, &L) -> L,
{
    pub left: G,
    pub right: H,
    pub merge: F,
}

impl<G, H, L, F> UnionLabelGraph<G, H, L, F>
where
    G: SequentialLabeling<Label = (usize, L)>,
    H: SequentialLabeling<Label = (usize, L)>,
    F: Fn(&L, &L) -> L,
{
    pub fn new(left: G, right: H, merge: F) -> Self {
        Self { left, right, merge }
    }
}

impl<G, H, L, F> SequentialLabeling for UnionLabelGraph<G, H, L, F>
where
    G: SequentialLabeling<Label = (usize, L)>,
    H: SequentialLabeling<Label = (usize, L)>,
    L: Clone,
    F: Fn(&L, &L) -> L + Clone,
    for<'a> G::Lender<'a>: SortedLender,
    for<'a> H::Lender<'a>: SortedLender,
{
    type Label = (usize, L);
    type Lender<'b>
        = Iter<'b, G, H, L, F>
    where
        Self: 'b;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.left.num_nodes().max(self.right.num_nodes())
    }

    #[inline(always)]
    fn num_arcs_hint(&self) -> Option<u64> {
        None
    }

    #[inline(always)]
    fn iter_from(&self, from: usize) -> Self::Lender<'_> {
        Iter {
            left: self.left.iter_from(from.min(self.left.num_nodes())),
            right: self.right.iter_from(from.min(self.right.num_nodes())),
            merge: &self.merge,
        }
    }
}

impl<'c, G, H, L, F> IntoLender for &'c UnionLabelGraph<G, H, L, F>
where
    G: SequentialLabeling<Label = (usize, L)>,
    H: SequentialLabeling<Label = (usize, L)>,
    L: Clone,
    F: Fn(&L, &L) -> L + Clone,
    for<'a> G::Lender<'a>: SortedLender,
    for<'a> H::Lender<'a>: SortedLender,
{
    type Lender = <UnionLabelGraph<G, H, L, F> as SequentialLabeling>::Lender<'c>;

    #[inline(always)]
    fn into_lender(self) -> Self::Lender {
        self.iter()
    }
}

#[doc(hidden)]
pub struct Iter<'a, G: SequentialLabeling, H: SequentialLabeling, L, F> {
    left: G::Lender<'a>,
    right: H::Lender<'a>,
    merge: &'a F,
}

impl<'succ, 'a, G, H, L, F> NodeLabelsLender<'succ> for Iter<'a, G, H, L, F>
where
    G: SequentialLabeling<Label = (usize, L)>,
    H: SequentialLabeling<Label = (usize, L)>,
    L: Clone,
    F: Fn(&L, &L) -> L,
{
    type Label = (usize, L);
    type IntoIterator = std::vec::IntoIter<(usize, L)>;
}

impl<'succ, 'a, G, H, L, F> Lending<'succ> for Iter<'a, G, H, L, F>
where
    G: SequentialLabeling<Label = (usize, L)>,
    H: SequentialLabeling<Label = (usize, L)>,
    L: Clone,
    F: Fn(&L, &L) -> L,
{
    type Lend = (usize, <Self as NodeLabelsLender<'succ>>::IntoIterator);
}

impl<'a, G, H, L, F> Lender for Iter<'a, G, H, L, F>
where
    G: SequentialLabeling<Label = (usize, L)>,
    H: SequentialLabeling<Label = (usize, L)>,
    L: Clone,
    F: Fn(&L, &L) -> L,
{
    #[inline(always)]
    fn next(&mut self) -> Option<Lend<'_, Self>> {
        match (self.left.next(), self.right.next()) {
            (Some((x, a)), Some((y, b))) => {
                debug_assert_eq!(x, y);
                let merged = merge_sorted(
                    a.into_iter().collect::<Vec<_>>(),
                    b.into_iter().collect::<Vec<_>>(),
                    self.merge,
                );
                Some((x, merged.into_iter()))
            }
            (Some((x, a)), None) => Some((x, a.into_iter().collect::<Vec<_>>().into_iter())),
            (None, Some((y, b))) => Some((y, b.into_iter().collect::<Vec<_>>().into_iter())),
            (None, None) => None,
        }
    }
}

/// Merges two ascending `(target, label)` sequences, applying `merge` to
/// the labels of targets present in both.
///
/// The three cases from the merge operation's lockstep walk (only left,
/// only right, both) are handled explicitly rather than via a generic
/// peekable adapter, since the result (unlike the unlabelled union) is
/// eagerly materialised per node: label merging is not always cheap enough
/// to re-run lazily on every peek.
fn merge_sorted<L: Clone>(
    left: Vec<(usize, L)>,
    right: Vec<(usize, L)>,
    merge: &impl Fn(&L, &L) -> L,
) -> Vec<(usize, L)> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut i = 0;
    let mut j = 0;
    while i < left.len() && j < right.len() {
        match left[i].0.cmp(&right[j].0) {
            std::cmp::Ordering::Less => {
                out.push(left[i].clone());
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(right[j].clone());
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push((left[i].0, merge(&left[i].1, &right[j].1)));
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    out
}
