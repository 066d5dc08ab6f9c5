/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::graphs::arc_list_graph;
use crate::prelude::proj::Left;
use crate::prelude::sort_pairs::{BatchIterator, KMergeIters};
use crate::prelude::{LabeledSequentialGraph, SequentialGraph, SortPairs};
use crate::traits::graph::UnitLabelGraph;
use crate::traits::{BitDeserializer, BitSerializer};
use crate::utils::sort_pairs::{BitReader, BitWriter};
use crate::utils::MemoryUsage;
use anyhow::Result;
use dsi_bitstream::traits::NE;
use dsi_progress_logger::prelude::*;
use lender::prelude::*;
use tempfile::Builder;

/// Returns the transpose of the provided labeled graph as a [sequential
/// graph](crate::traits::SequentialGraph).
///
/// For the meaning of the additional parameters, see
/// [`SortPairs`](crate::prelude::sort_pairs::SortPairs).
#[allow(clippy::type_complexity)]
pub fn transpose_labeled<S, D>(
    graph: &impl LabeledSequentialGraph<S::SerType>,
    memory_usage: MemoryUsage,
    serializer: S,
    deserializer: D,
) -> Result<
    arc_list_graph::ArcListGraph<
        std::iter::Map<
            KMergeIters<BatchIterator<D>, D::DeserType>,
            fn(((usize, usize), D::DeserType)) -> (usize, usize, D::DeserType),
        >,
    >,
>
where
    S: BitSerializer<NE, BitWriter>,
    S::SerType: Send + Sync + Copy + Clone + 'static,
    D: BitDeserializer<NE, BitReader, DeserType = S::SerType> + Clone + 'static,
{
    let dir = Builder::new().prefix("transpose_").tempdir()?;
    let mut sorted = SortPairs::new_labeled(memory_usage, dir.path(), serializer, deserializer)?;

    let mut pl = progress_logger![
        item_name = "node",
        expected_updates = Some(graph.num_nodes()),
        display_memory = true
    ];
    pl.start("Creating batches...");
    // create batches of sorted edges
    for_!( (src, succ) in graph.iter() {
        for (dst, l) in succ {
            sorted.push_labeled(dst, src, l)?;
        }
        pl.light_update();
    });
    // KMergeIters yields nested `((src, dst), label)` pairs; ArcListGraph
    // wants the flat `(src, dst, label)` triple.
    let flatten: fn(((usize, usize), D::DeserType)) -> (usize, usize, D::DeserType) =
        |((src, dst), label)| (src, dst, label);
    let sorted =
        arc_list_graph::ArcListGraph::new_labeled(graph.num_nodes(), sorted.iter()?.map(flatten));
    pl.done();

    Ok(sorted)
}

/// Returns the transpose of the provided graph as a [sequential
/// graph](crate::traits::SequentialGraph).
///
/// For the meaning of the additional parameter, see
/// [`SortPairs`](crate::prelude::sort_pairs::SortPairs).
#[allow(clippy::type_complexity)]
pub fn transpose(
    graph: impl SequentialGraph,
    memory_usage: MemoryUsage,
) -> Result<
    Left<
        arc_list_graph::ArcListGraph<
            std::iter::Map<
                KMergeIters<BatchIterator<()>, ()>,
                fn(((usize, usize), ())) -> (usize, usize, ()),
            >,
        >,
    >,
> {
    Ok(Left(transpose_labeled(
        &UnitLabelGraph(graph),
        memory_usage,
        (),
        (),
    )?))
}
