//! Default-instance memory
//!
//! A default instance is sampled as raw little-endian bytes. Values the host
//! keeps behind pointers (object references, string payloads, container
//! element counts) cannot be recovered from the bytes alone, so the snapshot
//! carries them as managed slots keyed by field offset.

use serde::{Deserialize, Serialize};

use crate::descriptor::ObjectId;
use crate::error::{ReflectError, ReflectResult};

/// Raw memory of one default instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Instance bytes, hex encoded in snapshots
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,

    /// Pointer-backed values, keyed by field offset
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed: Vec<ManagedSlot>,
}

/// A pointer-backed value at a field offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedSlot {
    pub offset: usize,
    pub value: ManagedValue,
}

/// Value stored behind a pointer in the host's memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ManagedValue {
    /// Object reference; `None` is a null pointer
    Object(Option<ObjectId>),
    /// Contents of a string, name or text
    String(String),
    /// Element count of a container
    Count(usize),
}

impl InstanceData {
    /// All-zero memory of the given size
    pub fn zeroed(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            managed: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow `len` bytes at `offset`
    pub fn read_bytes(&self, offset: usize, len: usize) -> ReflectResult<&[u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(ReflectError::InstanceOutOfBounds {
                offset,
                len,
                size: self.bytes.len(),
            })
    }

    pub fn read_u8(&self, offset: usize) -> ReflectResult<u8> {
        Ok(self.read_bytes(offset, 1)?[0])
    }

    /// Sign-extended little-endian integer of `width` bytes (1, 2, 4 or 8)
    pub fn read_signed(&self, offset: usize, width: usize) -> ReflectResult<i64> {
        let raw = self.read_unsigned(offset, width)?;
        let shift = 64 - (width as u32 * 8);
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Zero-extended little-endian integer of `width` bytes (1, 2, 4 or 8)
    pub fn read_unsigned(&self, offset: usize, width: usize) -> ReflectResult<u64> {
        let bytes = self.read_bytes(offset, width.min(8))?;
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_f32(&self, offset: usize) -> ReflectResult<f32> {
        let bytes = self.read_bytes(offset, 4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f64(&self, offset: usize) -> ReflectResult<f64> {
        let bytes = self.read_bytes(offset, 8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(buf))
    }

    fn managed_at(&self, offset: usize) -> Option<&ManagedValue> {
        self.managed
            .iter()
            .find(|slot| slot.offset == offset)
            .map(|slot| &slot.value)
    }

    /// Object referenced at `offset`; absent slots read as null
    pub fn object_at(&self, offset: usize) -> Option<ObjectId> {
        match self.managed_at(offset) {
            Some(ManagedValue::Object(id)) => *id,
            _ => None,
        }
    }

    /// String payload at `offset`; absent slots read as empty
    pub fn string_at(&self, offset: usize) -> &str {
        match self.managed_at(offset) {
            Some(ManagedValue::String(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Container element count at `offset`; absent slots read as empty
    pub fn count_at(&self, offset: usize) -> usize {
        match self.managed_at(offset) {
            Some(ManagedValue::Count(n)) => *n,
            _ => 0,
        }
    }

    // ── Builders for snapshot producers ─────────────────────────────

    /// Write raw bytes at `offset`, growing the buffer if needed
    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        let end = offset + data.len();
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[offset..end].copy_from_slice(data);
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) {
        self.write_bytes(offset, &[value]);
    }

    pub fn write_i32(&mut self, offset: usize, value: i32) {
        self.write_bytes(offset, &value.to_le_bytes());
    }

    pub fn write_i64(&mut self, offset: usize, value: i64) {
        self.write_bytes(offset, &value.to_le_bytes());
    }

    pub fn write_f32(&mut self, offset: usize, value: f32) {
        self.write_bytes(offset, &value.to_le_bytes());
    }

    pub fn write_f64(&mut self, offset: usize, value: f64) {
        self.write_bytes(offset, &value.to_le_bytes());
    }

    /// Record a pointer-backed value, replacing any previous one at `offset`
    pub fn set_managed(&mut self, offset: usize, value: ManagedValue) {
        self.managed.retain(|slot| slot.offset != offset);
        self.managed.push(ManagedSlot { offset, value });
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text.trim()).map_err(serde::de::Error::custom)
    }
}
