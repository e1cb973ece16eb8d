// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Frames exchanged with worker processes over their stdin and stdout.
//!
//! Each frame is a 4-byte big-endian length followed by a bincode body.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};
use work_mapper_core::MapperError;

/// Largest body accepted from a peer
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

pub fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), MapperError>
where
    W: Write + ?Sized,
    T: Serialize,
{
    let body = bincode::serialize(value).map_err(|e| MapperError::Codec(e.to_string()))?;
    if body.len() > MAX_FRAME_LEN {
        return Err(MapperError::Codec(format!(
            "frame of {} bytes exceeds limit of {}",
            body.len(),
            MAX_FRAME_LEN
        )));
    }

    writer.write_all(&(body.len() as u32).to_be_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Reads one frame. `Ok(None)` means the peer closed the stream between frames.
pub fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, MapperError>
where
    R: Read + ?Sized,
    T: DeserializeOwned,
{
    let mut len_bytes = [0u8; 4];
    let mut filled = 0;
    while filled < len_bytes.len() {
        match reader.read(&mut len_bytes[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(MapperError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream closed inside a frame header",
                )))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_FRAME_LEN {
        return Err(MapperError::Codec(format!(
            "frame of {} bytes exceeds limit of {}",
            len, MAX_FRAME_LEN
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    bincode::deserialize(&body)
        .map(Some)
        .map_err(|e| MapperError::Codec(e.to_string()))
}
