/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2024 Stefano Zacchiroli
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

A concrete label type for integer-valued arc labels, together with a small
family of bitstream codecs and a spec-string registry that reconstructs a
codec from the `class(arg₁,arg₂,…)` string stored in a `.properties` file.

Unlike the SWH-specific label format this module is derived from, labels
here are bare signed integers rather than opaque byte blobs: this is enough
to model edge weights, timestamps or any other scalar annotation, while
keeping the [`BitSerializer`]/[`BitDeserializer`] machinery in
[`crate::utils::sort_pairs`] reusable as is.

*/

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use dsi_bitstream::prelude::*;

use crate::traits::{BitDeserializer, BitSerializer};

/// The type of a named or well-known attribute value exposed by a
/// [`Label`].
///
/// Mirrors the small set of primitive and composite types a label codec may
/// declare for its keys: accessing a key with the wrong variant is a caller
/// error, not a silent conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Bool(bool),
    IntList(Vec<i64>),
}

/// An error returned when an attribute is accessed under the wrong type, or
/// under a key the label does not declare.
#[derive(thiserror::Error, Debug)]
pub enum AttrError {
    #[error("unknown attribute key {0:?}")]
    UnknownKey(String),
    #[error("attribute {0:?} is not of the requested type")]
    TypeMismatch(String),
}

/// A decoded arc label.
///
/// Every label exposes a *well-known* value (the one used, for example, by
/// the union semigroup in [`crate::labels::UnionLabel::merge`]) plus zero or
/// more named keys, each with a declared primitive or composite type.
pub trait Label: Clone + PartialEq + std::fmt::Debug {
    /// The well-known value of this label (e.g. an edge weight).
    fn well_known(&self) -> AttrValue;

    /// The declared named keys, in declaration order.
    fn keys(&self) -> &'static [&'static str] {
        &[]
    }

    /// Returns the value of a named attribute, or an error if the key is
    /// unknown.
    fn attr(&self, key: &str) -> Result<AttrValue, AttrError> {
        Err(AttrError::UnknownKey(key.to_owned()))
    }
}

/// A single signed-integer label, the simplest possible instance of
/// [`Label`]: its well-known value *is* the integer, and it declares no
/// named keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IntLabel(pub i64);

impl Label for IntLabel {
    fn well_known(&self) -> AttrValue {
        AttrValue::Long(self.0)
    }
}

/// Keeps the smaller of two weights: the `min` half of a `(min, +)`
/// semiring used as a union merge function. Implemented here rather than
/// as a [`std::ops::Add`] impl because the merge operation is a property of
/// the *union*, not of the label type itself.
pub fn merge_min(l0: &IntLabel, l1: &IntLabel) -> IntLabel {
    IntLabel(l0.0.min(l1.0))
}

/// Sums two weights: the `+` half of a `(min, +)` semiring used as a union
/// merge function.
pub fn merge_sum(l0: &IntLabel, l1: &IntLabel) -> IntLabel {
    IntLabel(l0.0 + l1.0)
}

/// A [`BitSerializer`]/[`BitDeserializer`] pair for [`IntLabel`], selectable
/// at load time from a spec string of the form `class(arg,…)`.
///
/// The codec is given the source node as context (per the label codec
/// interface) but the variants implemented here are context-free; codecs
/// that need node-dependent state (e.g. a per-node dictionary) would take
/// the node into account in `serialize`/`deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntLabelCodec {
    /// `fixed(width)`: a fixed-width two's complement integer, `width`
    /// bits wide (excluding sign handling beyond the bit pattern itself).
    FixedWidth { width: usize },
    /// `gamma`: the label's zig-zag natural transform is Elias γ coded.
    Gamma,
    /// `zeta(k)`: the label's zig-zag natural transform is ζ_k coded.
    Zeta { k: usize },
}

impl IntLabelCodec {
    /// Parses a spec string such as `"fixed(40)"`, `"gamma"` or `"zeta(3)"`.
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (name, args) = match spec.find('(') {
            Some(idx) => {
                let Some(rest) = spec.strip_suffix(')') else {
                    bail!("malformed label spec {spec:?}: missing closing parenthesis");
                };
                (&spec[..idx], &rest[idx + 1..])
            }
            None => (spec, ""),
        };
        match name {
            "fixed" => {
                let width: usize = args
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid width in label spec {spec:?}"))?;
                Ok(IntLabelCodec::FixedWidth { width })
            }
            "gamma" => Ok(IntLabelCodec::Gamma),
            "zeta" => {
                let k: usize = args
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid k in label spec {spec:?}"))?;
                Ok(IntLabelCodec::Zeta { k })
            }
            _ => bail!("unknown label codec class {name:?} in spec {spec:?}"),
        }
    }

    /// The spec string that [`Self::parse_spec`] would invert.
    pub fn spec(&self) -> String {
        match self {
            IntLabelCodec::FixedWidth { width } => format!("fixed({width})"),
            IntLabelCodec::Gamma => "gamma".to_owned(),
            IntLabelCodec::Zeta { k } => format!("zeta({k})"),
        }
    }

    /// The number of bits every label occupies, or `-1` if the width is
    /// value-dependent and an offset index is required for random access.
    pub fn fixed_width(&self) -> i64 {
        match self {
            IntLabelCodec::FixedWidth { width } => *width as i64,
            IntLabelCodec::Gamma | IntLabelCodec::Zeta { .. } => -1,
        }
    }
}

/// Zig-zag interleaving: maps a signed integer to a natural number so that
/// small magnitudes (positive or negative) map to small codes, as used by
/// the `nat(x)` transform for signed values throughout the codebase.
fn to_nat(x: i64) -> u64 {
    ((x << 1) ^ (x >> 63)) as u64
}

fn from_nat(nat: u64) -> i64 {
    ((nat >> 1) as i64) ^ -((nat & 1) as i64)
}

impl<E: Endianness, B: BitWrite<E> + GammaWrite<E> + ZetaWrite<E>> BitSerializer<E, B>
    for IntLabelCodec
{
    type SerType = IntLabel;

    fn serialize(&self, value: &Self::SerType, bitstream: &mut B) -> Result<usize, B::Error> {
        let nat = to_nat(value.0);
        match self {
            IntLabelCodec::FixedWidth { width } => bitstream.write_bits(nat, *width),
            IntLabelCodec::Gamma => bitstream.write_gamma(nat),
            IntLabelCodec::Zeta { k } => bitstream.write_zeta(nat, *k),
        }
    }
}

impl<E: Endianness, B: BitRead<E> + GammaRead<E> + ZetaRead<E>> BitDeserializer<E, B>
    for IntLabelCodec
{
    type DeserType = IntLabel;

    fn deserialize(&self, bitstream: &mut B) -> Result<Self::DeserType, B::Error> {
        let nat = match self {
            IntLabelCodec::FixedWidth { width } => bitstream.read_bits(*width)?,
            IntLabelCodec::Gamma => bitstream.read_gamma()?,
            IntLabelCodec::Zeta { k } => bitstream.read_zeta(*k)?,
        };
        Ok(IntLabel(from_nat(nat)))
    }
}

/// A byte-keyed bag of named, typed attributes, used by label types that go
/// beyond a single scalar (e.g. a label exposing both a weight and a
/// timestamp).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttrLabel {
    pub well_known: i64,
    pub attrs: HashMap<&'static str, AttrValue>,
}

impl Label for AttrLabel {
    fn well_known(&self) -> AttrValue {
        AttrValue::Long(self.well_known)
    }

    fn keys(&self) -> &'static [&'static str] {
        // Keys are fixed per codec configuration in practice; an empty
        // slice here is overridden by callers that build `AttrLabel`s
        // through a schema-aware codec.
        &[]
    }

    fn attr(&self, key: &str) -> Result<AttrValue, AttrError> {
        self.attrs
            .get(key)
            .cloned()
            .ok_or_else(|| AttrError::UnknownKey(key.to_owned()))
    }
}
