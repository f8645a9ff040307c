//! Fixed binary layout of the Link shared memory record.
//!
//! The consumer reads this record as a C struct (`LinkedMem`) with 4-byte
//! `wchar_t` strings, so offsets and the total size are a compatibility
//! contract and must never change.
//!
//! ## Layout
//!
//! ```text
//! offset  size  field
//!      0     4  ui_version        u32 (always 2)
//!      4     4  ui_tick           u32
//!      8    12  avatar_position   f32[3]
//!     20    12  avatar_front      f32[3]
//!     32    12  avatar_top        f32[3]
//!     44  1024  name              wchar[256]
//!   1068    12  camera_position   f32[3]
//!   1080    12  camera_front      f32[3]
//!   1092    12  camera_top        f32[3]
//!   1104  1024  identity          wchar[256]
//!   2128     4  context_len       u32
//!   2132   256  context           u8[256]
//!   2388  8192  description       wchar[2048]
//!  10580        end
//! ```
//!
//! All values are little-endian.

use crate::math::Vec3;
use serde::Serialize;
use static_assertions::const_assert_eq;
use thiserror::Error;

/// Protocol version written into `ui_version`.
pub const LINK_VERSION: u32 = 2;

/// Width of one wide character unit in bytes.
pub const WCHAR_SIZE: usize = 4;

/// Width of one serialized vector component in bytes.
pub const COMPONENT_SIZE: usize = 4;

/// Size of one serialized 3-vector in bytes.
pub const VEC3_SIZE: usize = 3 * COMPONENT_SIZE;

/// Capacity of `name` in wide characters.
pub const NAME_UNITS: usize = 256;

/// Capacity of `identity` in wide characters.
pub const IDENTITY_UNITS: usize = 256;

/// Capacity of `context` in bytes.
pub const CONTEXT_CAPACITY: usize = 256;

/// Capacity of `description` in wide characters.
pub const DESCRIPTION_UNITS: usize = 2048;

/// Byte offsets of every field.
pub mod offsets {
    use super::*;

    /// `ui_version`
    pub const UI_VERSION: usize = 0;
    /// `ui_tick`
    pub const UI_TICK: usize = UI_VERSION + 4;
    /// `avatar_position`
    pub const AVATAR_POSITION: usize = UI_TICK + 4;
    /// `avatar_front`
    pub const AVATAR_FRONT: usize = AVATAR_POSITION + VEC3_SIZE;
    /// `avatar_top`
    pub const AVATAR_TOP: usize = AVATAR_FRONT + VEC3_SIZE;
    /// `name`
    pub const NAME: usize = AVATAR_TOP + VEC3_SIZE;
    /// `camera_position`
    pub const CAMERA_POSITION: usize = NAME + NAME_UNITS * WCHAR_SIZE;
    /// `camera_front`
    pub const CAMERA_FRONT: usize = CAMERA_POSITION + VEC3_SIZE;
    /// `camera_top`
    pub const CAMERA_TOP: usize = CAMERA_FRONT + VEC3_SIZE;
    /// `identity`
    pub const IDENTITY: usize = CAMERA_TOP + VEC3_SIZE;
    /// `context_len`
    pub const CONTEXT_LEN: usize = IDENTITY + IDENTITY_UNITS * WCHAR_SIZE;
    /// `context`
    pub const CONTEXT: usize = CONTEXT_LEN + 4;
    /// `description`
    pub const DESCRIPTION: usize = CONTEXT + CONTEXT_CAPACITY;
    /// One past the last byte.
    pub const END: usize = DESCRIPTION + DESCRIPTION_UNITS * WCHAR_SIZE;
}

/// Total size S of the record in bytes.
pub const LINK_SIZE: usize = 10_580;

const_assert_eq!(offsets::END, LINK_SIZE);
const_assert_eq!(offsets::NAME, 44);
const_assert_eq!(offsets::IDENTITY, 1104);
const_assert_eq!(offsets::CONTEXT, 2132);

/// One complete serialized record.
pub type LinkBuffer = [u8; LINK_SIZE];

/// Errors raised while decoding a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Buffer shorter than the record.
    #[error("Buffer too small: {actual} bytes (record needs {expected})")]
    BufferTooSmall {
        /// Required size
        expected: usize,
        /// Provided size
        actual: usize,
    },

    /// `context_len` exceeds the context field.
    #[error("Context length {0} exceeds field capacity")]
    ContextLength(u32),
}

/// Allocate a zeroed record buffer on the heap.
pub fn new_buffer() -> Box<LinkBuffer> {
    Box::new([0u8; LINK_SIZE])
}

/// Write a little-endian `u32` at `offset`.
#[inline]
pub fn put_u32(buf: &mut LinkBuffer, offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Write a vector at `offset`, narrowing each component to the wire width.
#[inline]
pub fn put_vec3(buf: &mut LinkBuffer, offset: usize, v: Vec3) {
    for (i, c) in v.to_array().into_iter().enumerate() {
        let at = offset + i * COMPONENT_SIZE;
        buf[at..at + COMPONENT_SIZE].copy_from_slice(&(c as f32).to_le_bytes());
    }
}

/// Write a NUL-terminated UTF-32 string into a field of `units` characters.
///
/// The whole field is cleared first. At most `units - 1` characters are
/// written. Returns the number of characters written.
pub fn put_wide_str(buf: &mut LinkBuffer, offset: usize, units: usize, s: &str) -> usize {
    let field = &mut buf[offset..offset + units * WCHAR_SIZE];
    field.fill(0);
    let mut written = 0;
    for (i, ch) in s.chars().take(units.saturating_sub(1)).enumerate() {
        field[i * WCHAR_SIZE..(i + 1) * WCHAR_SIZE].copy_from_slice(&(ch as u32).to_le_bytes());
        written += 1;
    }
    written
}

/// Write the context bytes and their length. Truncates to the field capacity.
pub fn put_context(buf: &mut LinkBuffer, context: &[u8]) -> usize {
    let len = context.len().min(CONTEXT_CAPACITY);
    put_u32(buf, offsets::CONTEXT_LEN, len as u32);
    let field = &mut buf[offsets::CONTEXT..offsets::CONTEXT + CONTEXT_CAPACITY];
    field.fill(0);
    field[..len].copy_from_slice(&context[..len]);
    len
}

#[inline]
fn get_u32(buf: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

#[inline]
fn get_vec3(buf: &[u8], offset: usize) -> [f32; 3] {
    let mut out = [0f32; 3];
    for (i, c) in out.iter_mut().enumerate() {
        let at = offset + i * COMPONENT_SIZE;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&buf[at..at + COMPONENT_SIZE]);
        *c = f32::from_le_bytes(raw);
    }
    out
}

fn get_wide_str(buf: &[u8], offset: usize, units: usize) -> String {
    (0..units)
        .map(|i| get_u32(buf, offset + i * WCHAR_SIZE))
        .take_while(|&unit| unit != 0)
        .map(|unit| char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decoded view of a record, as the consumer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFrame {
    /// Protocol version
    pub ui_version: u32,
    /// Tick heartbeat
    pub ui_tick: u32,
    /// Avatar position (consumer frame)
    pub avatar_position: [f32; 3],
    /// Avatar facing unit vector
    pub avatar_front: [f32; 3],
    /// Avatar up vector
    pub avatar_top: [f32; 3],
    /// Application name
    pub name: String,
    /// Camera position (consumer frame)
    pub camera_position: [f32; 3],
    /// Camera facing unit vector
    pub camera_front: [f32; 3],
    /// Camera up vector
    pub camera_top: [f32; 3],
    /// Player identity
    pub identity: String,
    /// Session context bytes
    pub context: Vec<u8>,
    /// Application description
    pub description: String,
}

impl LinkFrame {
    /// Decode the first [`LINK_SIZE`] bytes of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self, LayoutError> {
        if buf.len() < LINK_SIZE {
            return Err(LayoutError::BufferTooSmall {
                expected: LINK_SIZE,
                actual: buf.len(),
            });
        }

        let context_len = get_u32(buf, offsets::CONTEXT_LEN);
        if context_len as usize > CONTEXT_CAPACITY {
            return Err(LayoutError::ContextLength(context_len));
        }
        let context_start = offsets::CONTEXT;

        Ok(Self {
            ui_version: get_u32(buf, offsets::UI_VERSION),
            ui_tick: get_u32(buf, offsets::UI_TICK),
            avatar_position: get_vec3(buf, offsets::AVATAR_POSITION),
            avatar_front: get_vec3(buf, offsets::AVATAR_FRONT),
            avatar_top: get_vec3(buf, offsets::AVATAR_TOP),
            name: get_wide_str(buf, offsets::NAME, NAME_UNITS),
            camera_position: get_vec3(buf, offsets::CAMERA_POSITION),
            camera_front: get_vec3(buf, offsets::CAMERA_FRONT),
            camera_top: get_vec3(buf, offsets::CAMERA_TOP),
            identity: get_wide_str(buf, offsets::IDENTITY, IDENTITY_UNITS),
            context: buf[context_start..context_start + context_len as usize].to_vec(),
            description: get_wide_str(buf, offsets::DESCRIPTION, DESCRIPTION_UNITS),
        })
    }

    /// Context interpreted as UTF-8, lossily.
    pub fn context_str(&self) -> String {
        String::from_utf8_lossy(&self.context).into_owned()
    }
}
