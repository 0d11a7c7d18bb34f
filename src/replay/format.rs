//! Bounds-checked little-endian primitives shared by the header and splits codecs
//!
//! Every read checks the remaining length first and reports the field being decoded,
//! so a truncated or hostile buffer produces a [`ReplayFormatError`] instead of a panic.

use super::{ReplayFormatError, Result, Vector3};

/// Forward-only cursor over a borrowed replay buffer.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Start reading at `offset`; fails if the buffer does not reach it.
    pub(crate) fn at(data: &'a [u8], offset: usize, context: &'static str) -> Result<Self> {
        if offset > data.len() {
            return Err(ReplayFormatError::Truncated {
                context,
                offset,
                needed: 0,
                available: 0,
            });
        }
        Ok(Self { data, offset })
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ReplayFormatError::Truncated {
                context,
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        Ok(self.take_array::<1>(context)?[0])
    }

    pub(crate) fn read_bool(&mut self, context: &'static str) -> Result<bool> {
        let offset = self.offset;
        match self.read_u8(context)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(ReplayFormatError::InvalidBool { context, offset, value }),
        }
    }

    pub(crate) fn read_u32_le(&mut self, context: &'static str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array(context)?))
    }

    pub(crate) fn read_i32_le(&mut self, context: &'static str) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array(context)?))
    }

    pub(crate) fn read_i64_le(&mut self, context: &'static str) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array(context)?))
    }

    pub(crate) fn read_u64_le(&mut self, context: &'static str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array(context)?))
    }

    pub(crate) fn read_f32_le(&mut self, context: &'static str) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array(context)?))
    }

    pub(crate) fn read_f64_le(&mut self, context: &'static str) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array(context)?))
    }

    pub(crate) fn read_vector3(&mut self, context: &'static str) -> Result<Vector3> {
        Ok(Vector3 {
            x: self.read_f32_le(context)?,
            y: self.read_f32_le(context)?,
            z: self.read_f32_le(context)?,
        })
    }

    /// Read a fixed-width, nul-padded string field.
    pub(crate) fn read_fixed_str(&mut self, width: usize, context: &'static str) -> Result<String> {
        Ok(extract_null_terminated_string(self.take(width, context)?))
    }

    /// Read a `u32` element count and check `count * min_element_size` still fits.
    ///
    /// Guards allocations against counts that could never be backed by the buffer.
    pub(crate) fn read_count(
        &mut self,
        min_element_size: usize,
        context: &'static str,
    ) -> Result<usize> {
        let offset = self.offset;
        let count = self.read_u32_le(context)?;
        let count = usize::try_from(count)
            .map_err(|_| ReplayFormatError::CountTooLarge { context, offset, count })?;
        let required = count.saturating_mul(min_element_size);
        if required > self.remaining() {
            return Err(ReplayFormatError::CountTooLarge { context, offset, count: count as u32 });
        }
        Ok(count)
    }
}

/// Append-only little-endian writer used by the encoders.
pub(crate) struct ByteWriter<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> ByteWriter<'a> {
    pub(crate) fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out }
    }

    pub(crate) fn write_u8(&mut self, value: u8) {
        self.out.push(value);
    }

    pub(crate) fn write_bool(&mut self, value: bool) {
        self.out.push(u8::from(value));
    }

    pub(crate) fn write_u32_le(&mut self, value: u32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_i32_le(&mut self, value: i32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_i64_le(&mut self, value: i64) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_u64_le(&mut self, value: u64) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_f32_le(&mut self, value: f32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_f64_le(&mut self, value: f64) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_vector3(&mut self, value: &Vector3) {
        self.write_f32_le(value.x);
        self.write_f32_le(value.y);
        self.write_f32_le(value.z);
    }

    /// Write `value` into a `width`-byte nul-padded field.
    ///
    /// At most `width` bytes of text are kept, cut on a char boundary. A value that
    /// fills the field has no terminator, which the reader accepts.
    pub(crate) fn write_fixed_str(&mut self, value: &str, width: usize) {
        let mut end = value.len().min(width);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        self.out.extend_from_slice(&value.as_bytes()[..end]);
        self.out.resize(self.out.len() + (width - end), 0);
    }

    pub(crate) fn write_zeroes(&mut self, len: usize) {
        self.out.resize(self.out.len() + len, 0);
    }

    /// Write a collection length as a `u32` count prefix.
    pub(crate) fn write_count(&mut self, len: usize, context: &'static str) -> Result<()> {
        let count = u32::try_from(len)
            .map_err(|_| ReplayFormatError::FieldOverflow { context, value: len as u64 })?;
        self.write_u32_le(count);
        Ok(())
    }
}

/// Extract null-terminated string from byte slice
fn extract_null_terminated_string(bytes: &[u8]) -> String {
    let null_pos = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..null_pos]).to_string()
}
