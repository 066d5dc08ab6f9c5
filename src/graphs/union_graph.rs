/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The union of two sorted sequential graphs.

use crate::prelude::*;
use lender::*;

/// A wrapper exhibiting the union of the arcs of two graphs.
///
/// Both components must be [sorted](SortedLender) sequential graphs: the
/// union is computed with a single lock-step merge of the two successor
/// lists of each node, without any auxiliary sorting pass. This is the
/// mechanism used, for example, by [`transform::simplify_sorted`] to turn a
/// directed graph into an undirected one by unioning it with its transpose.
#[derive(Debug, Clone)]
pub struct UnionGraph<G: SequentialGraph, H: SequentialGraph>(pub G, pub H);

impl<G: SequentialGraph, H: SequentialGraph> SequentialLabeling for UnionGraph<G, H>
where
    for<'a> G::Lender<'a>: SortedLender,
    for<'a> H::Lender<'a>: SortedLender,
{
    type Label = usize;
    type Lender<'b>
        = Iter<G::Lender<'b>, H::Lender<'b>>
    where
        Self: 'b;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.0.num_nodes().max(self.1.num_nodes())
    }

    #[inline(always)]
    fn num_arcs_hint(&self) -> Option<u64> {
        None
    }

    #[inline(always)]
    fn iter_from(&self, from: usize) -> Self::Lender<'_> {
        Iter(
            self.0.iter_from(from.min(self.0.num_nodes())),
            self.1.iter_from(from.min(self.1.num_nodes())),
        )
    }
}

unsafe impl<
        L: SortedLender + Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
        M: SortedLender + Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
    > SortedLender for Iter<L, M>
{
}

impl<G: SequentialGraph, H: SequentialGraph> SplitLabeling for UnionGraph<G, H>
where
    for<'a> G::Lender<'a>: SortedLender + Clone + Send + Sync,
    for<'a> H::Lender<'a>: SortedLender + Clone + Send + Sync,
{
    type SplitLender<'a>
        = split::seq::Lender<'a, UnionGraph<G, H>>
    where
        Self: 'a;
    type IntoIterator<'a>
        = split::seq::IntoIterator<'a, UnionGraph<G, H>>
    where
        Self: 'a;

    fn split_iter(&self, how_many: usize) -> Self::IntoIterator<'_> {
        split::seq::Iter::new(self.iter(), self.num_nodes(), how_many)
    }
}

impl<G: SequentialGraph, H: SequentialGraph> SequentialGraph for UnionGraph<G, H>
where
    for<'a> G::Lender<'a>: SortedLender,
    for<'a> H::Lender<'a>: SortedLender,
{
}

impl<'c, G: SequentialGraph, H: SequentialGraph> IntoLender for &'c UnionGraph<G, H>
where
    for<'a> G::Lender<'a>: SortedLender,
    for<'a> H::Lender<'a>: SortedLender,
{
    type Lender = <UnionGraph<G, H> as SequentialLabeling>::Lender<'c>;

    #[inline(always)]
    fn into_lender(self) -> Self::Lender {
        self.iter()
    }
}

#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct Iter<L, M>(L, M);

impl<
        'succ,
        L: Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
        M: Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
    > NodeLabelsLender<'succ> for Iter<L, M>
{
    type Label = usize;
    type IntoIterator = Succ<LenderIntoIter<'succ, L>, LenderIntoIter<'succ, M>>;
}

impl<
        'succ,
        L: Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
        M: Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
    > Lending<'succ> for Iter<L, M>
{
    type Lend = (usize, <Self as NodeLabelsLender<'succ>>::IntoIterator);
}

impl<
        L: Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
        M: Lender + for<'next> NodeLabelsLender<'next, Label = usize>,
    > Lender for Iter<L, M>
{
    #[inline(always)]
    fn next(&mut self) -> Option<Lend<'_, Self>> {
        match (self.0.next(), self.1.next()) {
            (Some((x, a)), Some((y, b))) => {
                debug_assert_eq!(x, y);
                Some((x, Succ::new(Some(a.into_iter()), Some(b.into_iter()))))
            }
            (Some((x, a)), None) => Some((x, Succ::new(Some(a.into_iter()), None))),
            (None, Some((y, b))) => Some((y, Succ::new(None, Some(b.into_iter())))),
            (None, None) => None,
        }
    }
}

impl<
        L: ExactSizeLender + for<'next> NodeLabelsLender<'next, Label = usize>,
        M: ExactSizeLender + for<'next> NodeLabelsLender<'next, Label = usize>,
    > ExactSizeLender for Iter<L, M>
{
    fn len(&self) -> usize {
        self.0.len().max(self.1.len())
    }
}

/// Merges two ascending successor iterators, deduplicating arcs present
/// in both (this is what makes the result a *set* union rather than a
/// multiset sum).
#[derive(Clone, Debug)]
pub struct Succ<I: Iterator<Item = usize>, J: Iterator<Item = usize>> {
    iter0: Option<core::iter::Peekable<I>>,
    iter1: Option<core::iter::Peekable<J>>,
}

impl<I: Iterator<Item = usize>, J: Iterator<Item = usize>> Succ<I, J> {
    pub fn new(iter0: Option<I>, iter1: Option<J>) -> Self {
        Self {
            iter0: iter0.map(Iterator::peekable),
            iter1: iter1.map(Iterator::peekable),
        }
    }
}

impl<I: Iterator<Item = usize>, J: Iterator<Item = usize>> Iterator for Succ<I, J> {
    type Item = usize;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let next0 = self.iter0.as_mut().and_then(|iter| iter.peek().copied());
        let next1 = self.iter1.as_mut().and_then(|iter| iter.peek().copied());
        match next0.unwrap_or(usize::MAX).cmp(&next1.unwrap_or(usize::MAX)) {
            std::cmp::Ordering::Greater => self.iter1.as_mut().and_then(Iterator::next),
            std::cmp::Ordering::Less => self.iter0.as_mut().and_then(Iterator::next),
            std::cmp::Ordering::Equal => {
                self.iter0.as_mut().and_then(Iterator::next);
                self.iter1.as_mut().and_then(Iterator::next)
            }
        }
    }
}

unsafe impl<I: Iterator<Item = usize>, J: Iterator<Item = usize>> SortedIterator for Succ<I, J> {}
