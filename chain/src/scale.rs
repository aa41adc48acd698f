//! Minimal SCALE decoding for the two storage values the dashboard reads.

use crate::error::ChainError;

fn decode_err(reason: impl Into<String>) -> ChainError {
    ChainError::Decode {
        what: "storage value",
        reason: reason.into(),
    }
}

/// Decodes the SCALE compact-encoded integer at the start of `bytes`.
///
/// `Session::Validators` is a SCALE `Vec`, so its length (the validator
/// count) is exactly this prefix.
pub fn decode_compact_len(bytes: &[u8]) -> Result<u64, ChainError> {
    let first = *bytes.first().ok_or_else(|| decode_err("empty compact value"))?;
    match first & 0b11 {
        0 => Ok(u64::from(first >> 2)),
        1 => {
            let raw: [u8; 2] = bytes
                .get(..2)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| decode_err("truncated two-byte compact value"))?;
            Ok(u64::from(u16::from_le_bytes(raw) >> 2))
        }
        2 => {
            let raw: [u8; 4] = bytes
                .get(..4)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| decode_err("truncated four-byte compact value"))?;
            Ok(u64::from(u32::from_le_bytes(raw) >> 2))
        }
        _ => {
            let len = usize::from(first >> 2) + 4;
            if len > 8 {
                return Err(decode_err("compact value exceeds u64"));
            }
            let tail = bytes
                .get(1..1 + len)
                .ok_or_else(|| decode_err("truncated big-integer compact value"))?;
            let mut raw = [0u8; 8];
            raw[..len].copy_from_slice(tail);
            Ok(u64::from_le_bytes(raw))
        }
    }
}

/// Decodes a SCALE `u32` (four bytes, little endian), e.g. `System::EventCount`.
pub fn decode_u32(bytes: &[u8]) -> Result<u32, ChainError> {
    let raw: [u8; 4] = bytes
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| decode_err("expected four bytes for u32"))?;
    Ok(u32::from_le_bytes(raw))
}
