/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Traits for serializing and deserializing values to and from a bitstream,
//! used to plug arbitrary label codecs into the batch sorting pipeline in
//! [`crate::utils::sort_pairs`].

use dsi_bitstream::traits::{BitRead, BitWrite, Endianness};

/// Writes a value to a bitstream.
pub trait BitSerializer<E: Endianness, B: BitWrite<E>> {
    /// The type of the value being serialized.
    type SerType;

    /// Writes `value` to `bitstream`, returning the number of bits written.
    fn serialize(&self, value: &Self::SerType, bitstream: &mut B) -> Result<usize, B::Error>;
}

/// Reads a value from a bitstream.
///
/// This trait requires [`Clone`] because deserializers are cloned across
/// the worker threads that drive parallel batch compression; structures
/// large enough that cloning them is undesirable should be wrapped in an
/// [`Arc`](std::sync::Arc) or passed by reference.
pub trait BitDeserializer<E: Endianness, B: BitRead<E>>: Clone {
    /// The type of the value being deserialized.
    type DeserType;

    /// Reads a value from `bitstream`.
    fn deserialize(&self, bitstream: &mut B) -> Result<Self::DeserType, B::Error>;
}

impl<E: Endianness, B: BitWrite<E>> BitSerializer<E, B> for () {
    type SerType = ();

    #[inline(always)]
    fn serialize(&self, _value: &Self::SerType, _bitstream: &mut B) -> Result<usize, B::Error> {
        Ok(0)
    }
}

impl<E: Endianness, B: BitRead<E>> BitDeserializer<E, B> for () {
    type DeserType = ();

    #[inline(always)]
    fn deserialize(&self, _bitstream: &mut B) -> Result<Self::DeserType, B::Error> {
        Ok(())
    }
}
