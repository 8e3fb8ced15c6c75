//! Frame codec
//!
//! Encoding and decoding of the length-prefixed batch frames described in
//! the crate docs. Decoding walks the payload with a position cursor and
//! typed bounds checks; it never panics on truncated input.

use bytes::{BufMut, Bytes, BytesMut};

use crate::batch::{Credentials, Event, EventBatch};
use crate::error::ProtocolError;
use crate::{LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE, Result};

/// Encode a batch into a complete frame, length prefix included
///
/// # Errors
///
/// Fails if a credentials field exceeds its u16 length representation or
/// the assembled payload would exceed [`MAX_FRAME_SIZE`].
pub fn encode_batch(batch: &EventBatch) -> Result<BytesMut> {
    let username = batch.credentials().username.as_bytes();
    let password = batch.credentials().password.as_bytes();

    if username.len() > u16::MAX as usize {
        return Err(ProtocolError::field_too_long(
            "username",
            username.len(),
            u16::MAX as usize,
        ));
    }
    if password.len() > u16::MAX as usize {
        return Err(ProtocolError::field_too_long(
            "password",
            password.len(),
            u16::MAX as usize,
        ));
    }

    let mut payload_len = 2 + username.len() + 2 + password.len() + 4;
    for event in batch.events() {
        payload_len += 4 + event.payload_len();
    }
    if payload_len > MAX_FRAME_SIZE {
        return Err(ProtocolError::too_large(payload_len, MAX_FRAME_SIZE));
    }

    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload_len);
    buf.put_u32(payload_len as u32);
    buf.put_u16(username.len() as u16);
    buf.put_slice(username);
    buf.put_u16(password.len() as u16);
    buf.put_slice(password);
    buf.put_u32(batch.len() as u32);
    for event in batch.events() {
        buf.put_u32(event.payload_len() as u32);
        buf.put_slice(event.payload());
    }

    Ok(buf)
}

/// Peek at the next frame's payload length without consuming the buffer
///
/// Returns:
/// - `Ok(Some(len))` if a complete frame is buffered (`len` is the payload
///   size, not including the prefix)
/// - `Ok(None)` if more data is needed
/// - `Err` if the declared length exceeds `max_frame_size`
///
/// The caller decodes the payload in place, then advances the buffer past
/// `LENGTH_PREFIX_SIZE + len`.
#[inline]
pub fn peek_frame_len(buf: &BytesMut, max_frame_size: usize) -> Result<Option<usize>> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let payload_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

    if payload_len > max_frame_size {
        return Err(ProtocolError::too_large(payload_len, max_frame_size));
    }

    if buf.len() < LENGTH_PREFIX_SIZE + payload_len {
        return Ok(None);
    }

    Ok(Some(payload_len))
}

/// Decode a frame payload (without its length prefix) into a batch
///
/// # Errors
///
/// Fails on truncated payloads and on credentials that are not UTF-8.
pub fn decode_batch(payload: &[u8]) -> Result<EventBatch> {
    let mut pos = 0usize;

    let username = read_string(payload, &mut pos, "username")?;
    let password = read_string(payload, &mut pos, "password")?;

    let event_count = read_u32(payload, &mut pos)? as usize;
    let mut events = Vec::with_capacity(event_count.min(1024));
    for _ in 0..event_count {
        let len = read_u32(payload, &mut pos)? as usize;
        let bytes = read_bytes(payload, &mut pos, len)?;
        events.push(Event::new(Bytes::copy_from_slice(bytes)));
    }

    Ok(EventBatch::new(Credentials::new(username, password), events))
}

fn read_bytes<'a>(buf: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = match pos.checked_add(len) {
        Some(end) if end <= buf.len() => end,
        _ => return Err(ProtocolError::too_short(pos.saturating_add(len), buf.len())),
    };
    let slice = &buf[*pos..end];
    *pos = end;
    Ok(slice)
}

fn read_u16(buf: &[u8], pos: &mut usize) -> Result<u16> {
    let bytes = read_bytes(buf, pos, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32(buf: &[u8], pos: &mut usize) -> Result<u32> {
    let bytes = read_bytes(buf, pos, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_string(buf: &[u8], pos: &mut usize, field: &'static str) -> Result<String> {
    let len = read_u16(buf, pos)? as usize;
    let bytes = read_bytes(buf, pos, len)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| ProtocolError::invalid_utf8(field))
}
