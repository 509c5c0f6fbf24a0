//! Typed reads over a [`ReadMemory`] source

use super::{PointerWidth, ReadMemory};
use crate::core::types::{Address, RemoteValue};
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::mem;

/// Typed reader borrowing a foreign memory source.
///
/// Values are read as [`Pod`] so every byte pattern is a valid value; a read
/// racing the foreign writer yields a plausible but possibly torn value,
/// never undefined behavior.
pub struct MemoryReader<'a, M: ReadMemory + ?Sized> {
    source: &'a M,
    pointer_width: PointerWidth,
}

impl<'a, M: ReadMemory + ?Sized> Clone for MemoryReader<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: ReadMemory + ?Sized> Copy for MemoryReader<'a, M> {}

impl<'a, M: ReadMemory + ?Sized> MemoryReader<'a, M> {
    /// Create a new reader
    pub fn new(source: &'a M, pointer_width: PointerWidth) -> Self {
        MemoryReader {
            source,
            pointer_width,
        }
    }

    pub fn source(&self) -> &'a M {
        self.source
    }

    pub fn pointer_width(&self) -> PointerWidth {
        self.pointer_width
    }

    /// Read raw bytes from memory
    pub fn read_raw(&self, address: Address, size: usize) -> RemoteValue<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.source.read_bytes(address, &mut buffer)?;
        Ok(buffer)
    }

    /// Read exactly `size_of::<T>()` bytes as a typed value
    pub fn read<T: Pod>(&self, address: Address) -> RemoteValue<T> {
        let mut value = T::zeroed();
        self.source
            .read_bytes(address, bytemuck::bytes_of_mut(&mut value))?;
        Ok(value)
    }

    /// Read a pointer of the configured width
    pub fn read_pointer(&self, address: Address) -> RemoteValue<Address> {
        match self.pointer_width {
            PointerWidth::Bits32 => self.read::<u32>(address).map(Address::from),
            PointerWidth::Bits64 => self.read::<u64>(address).map(Address::from),
        }
    }

    /// Read `count` consecutive pointers with a single foreign read
    pub fn read_pointers(&self, address: Address, count: usize) -> RemoteValue<Vec<Address>> {
        let size = self.pointer_width.size();
        let buffer = self.read_raw(address, count * size)?;
        let pointers = buffer
            .chunks_exact(size)
            .map(|chunk| match self.pointer_width {
                PointerWidth::Bits32 => Address::from(bytemuck::pod_read_unaligned::<u32>(chunk)),
                PointerWidth::Bits64 => Address::from(bytemuck::pod_read_unaligned::<u64>(chunk)),
            })
            .collect();
        Ok(pointers)
    }

    /// Read an array of tightly packed values with a single foreign read
    pub fn read_array<T: Pod>(&self, address: Address, count: usize) -> RemoteValue<Vec<T>> {
        let mut values = vec![T::zeroed(); count];
        self.source
            .read_bytes(address, bytemuck::cast_slice_mut(&mut values))?;
        Ok(values)
    }

    /// Read `count` records spaced `stride` bytes apart with a single foreign read.
    ///
    /// Only the leading `size_of::<T>()` bytes of each slot are decoded. A
    /// stride smaller than the record is treated as tightly packed.
    pub fn read_strided<T: Pod>(
        &self,
        address: Address,
        count: usize,
        stride: usize,
    ) -> RemoteValue<Vec<T>> {
        let size = mem::size_of::<T>();
        if stride <= size {
            return self.read_array(address, count);
        }

        let buffer = self.read_raw(address, count * stride)?;
        let records = buffer
            .chunks_exact(stride)
            .map(|slot| bytemuck::pod_read_unaligned(&slot[..size]))
            .collect();
        Ok(records)
    }

    /// Read a null-terminated string of at most `max_len` bytes
    pub fn read_string(&self, address: Address, max_len: usize) -> RemoteValue<String> {
        let buffer = self.read_raw(address, max_len)?;
        Ok(c_string(&buffer).into_owned())
    }
}

/// Decodes a NUL-terminated byte buffer, replacing invalid UTF-8
pub(crate) fn c_string(bytes: &[u8]) -> Cow<'_, str> {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len])
}
