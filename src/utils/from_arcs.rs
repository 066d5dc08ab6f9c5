/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Ingestion of the external arc text format into a [`SortPairs`], assigning
//! dense node identifiers to the opaque identifiers found in the input.
//!
//! The input is ASCII, one arc per line, whitespace-separated `src tgt
//! [label]`. Lines starting with `#` and blank lines are ignored. A line
//! that cannot be parsed at all is logged and skipped; trailing garbage
//! after a syntactically valid `src`/`tgt`/`label` is logged and discarded
//! without dropping the arc.

use std::collections::HashMap;
use std::io::BufRead;

use anyhow::Result;

use crate::labels::int_label::IntLabel;
use crate::utils::sort_pairs::SortPairs;

/// Statistics and the id mapping produced by [`ingest_arcs`] or
/// [`ingest_labeled_arcs`].
#[derive(Debug, Default)]
pub struct ArcsIngest {
    /// The number of distinct nodes seen, in order of first appearance.
    pub num_nodes: usize,
    /// The number of arcs successfully parsed and pushed.
    pub num_arcs: u64,
    /// The number of lines that could not be parsed at all.
    pub malformed_lines: u64,
    /// `ids[i]` is the original token mapped to dense identifier `i`.
    pub ids: Vec<String>,
}

/// Returns `true` if `token` is a decimal integer with an optional leading
/// `-`, as required of ids and labels by the input format.
fn is_decimal_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

struct IdMap {
    index: HashMap<String, usize>,
    ids: Vec<String>,
}

impl IdMap {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            ids: Vec::new(),
        }
    }

    fn get_or_insert(&mut self, token: &str) -> usize {
        if let Some(&id) = self.index.get(token) {
            return id;
        }
        let id = self.ids.len();
        self.ids.push(token.to_owned());
        self.index.insert(token.to_owned(), id);
        id
    }
}

/// Reads an unlabelled arc stream, pushing `(src, tgt)` pairs into
/// `sort_pairs` with dense node identifiers, and returns the id mapping and
/// ingestion statistics.
pub fn ingest_arcs(reader: impl BufRead, sort_pairs: &mut SortPairs<(), ()>) -> Result<ArcsIngest> {
    let mut ids = IdMap::new();
    let mut num_arcs = 0u64;
    let mut malformed_lines = 0u64;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let (Some(src), Some(tgt)) = (fields.next(), fields.next()) else {
            log::warn!("line {line_num}: not enough columns: {trimmed:?}");
            malformed_lines += 1;
            continue;
        };
        if !is_decimal_token(src) || !is_decimal_token(tgt) {
            log::warn!("line {line_num}: malformed id in {trimmed:?}");
            malformed_lines += 1;
            continue;
        }
        if let Some(extra) = fields.next() {
            log::warn!("line {line_num}: trailing data {extra:?} discarded");
        }

        let src_id = ids.get_or_insert(src);
        let tgt_id = ids.get_or_insert(tgt);
        sort_pairs.push(src_id, tgt_id)?;
        num_arcs += 1;
    }

    Ok(ArcsIngest {
        num_nodes: ids.ids.len(),
        num_arcs,
        malformed_lines,
        ids: ids.ids,
    })
}

/// Like [`ingest_arcs`], but each line carries an additional decimal integer
/// label pushed as an [`IntLabel`].
///
/// A line with a src/tgt pair but no (or a malformed) label is treated as
/// malformed and skipped, since the label codec is not optional once
/// selected.
pub fn ingest_labeled_arcs(
    reader: impl BufRead,
    sort_pairs: &mut SortPairs<
        crate::labels::int_label::IntLabelCodec,
        crate::labels::int_label::IntLabelCodec,
    >,
) -> Result<ArcsIngest> {
    let mut ids = IdMap::new();
    let mut num_arcs = 0u64;
    let mut malformed_lines = 0u64;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let (Some(src), Some(tgt), Some(label)) = (fields.next(), fields.next(), fields.next())
        else {
            log::warn!("line {line_num}: not enough columns: {trimmed:?}");
            malformed_lines += 1;
            continue;
        };
        if !is_decimal_token(src) || !is_decimal_token(tgt) || !is_decimal_token(label) {
            log::warn!("line {line_num}: malformed id or label in {trimmed:?}");
            malformed_lines += 1;
            continue;
        }
        if let Some(extra) = fields.next() {
            log::warn!("line {line_num}: trailing data {extra:?} discarded");
        }
        let label: i64 = label.parse()?;

        let src_id = ids.get_or_insert(src);
        let tgt_id = ids.get_or_insert(tgt);
        sort_pairs.push_labeled(src_id, tgt_id, IntLabel(label))?;
        num_arcs += 1;
    }

    Ok(ArcsIngest {
        num_nodes: ids.ids.len(),
        num_arcs,
        malformed_lines,
        ids: ids.ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryUsage;
    use itertools::Itertools;
    use tempfile::Builder;

    #[test]
    fn test_ingest_arcs_remaps_opaque_ids() -> Result<()> {
        let dir = Builder::new().prefix("test_ingest_arcs_").tempdir()?;
        let mut sp = SortPairs::new(MemoryUsage::BatchSize(16), dir.path())?;
        let input = "-1 15\n15 2\n2 -1\nOOPS!\n-1 2";
        let stats = ingest_arcs(input.as_bytes(), &mut sp)?;

        assert_eq!(stats.num_nodes, 3);
        assert_eq!(stats.ids, vec!["-1", "15", "2"]);
        assert_eq!(stats.num_arcs, 4);
        assert_eq!(stats.malformed_lines, 1);

        let arcs = sp.iter()?.map(|((s, d), _)| (s, d)).dedup().collect_vec();
        assert_eq!(arcs, vec![(0, 1), (0, 2), (1, 2), (2, 0)]);
        Ok(())
    }

    #[test]
    fn test_ingest_arcs_ignores_comments_and_blanks() -> Result<()> {
        let dir = Builder::new().prefix("test_ingest_arcs_").tempdir()?;
        let mut sp = SortPairs::new(MemoryUsage::BatchSize(16), dir.path())?;
        let input = "# a comment\n\n0 1\n   \n1 2\n";
        let stats = ingest_arcs(input.as_bytes(), &mut sp)?;
        assert_eq!(stats.num_arcs, 2);
        assert_eq!(stats.malformed_lines, 0);
        Ok(())
    }

    #[test]
    fn test_ingest_labeled_arcs() -> Result<()> {
        let dir = Builder::new().prefix("test_ingest_labeled_arcs_").tempdir()?;
        let mut sp = SortPairs::new_labeled(
            MemoryUsage::BatchSize(16),
            dir.path(),
            crate::labels::int_label::IntLabelCodec::Gamma,
            crate::labels::int_label::IntLabelCodec::Gamma,
        )?;
        let input = "0 1 2\n0 2 10\n0 3 1\n1 2 4\n3 2 1\n";
        let stats = ingest_labeled_arcs(input.as_bytes(), &mut sp)?;
        assert_eq!(stats.num_arcs, 5);
        assert_eq!(stats.malformed_lines, 0);
        Ok(())
    }
}
