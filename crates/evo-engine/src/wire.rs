use evo_error::{EngineResult, ensure, evo_err};

/// Wire-level integers are fixed 8-byte little-endian, used for counts,
/// lengths, and the generation number (spec section 6).
pub fn encode_usize(value: usize) -> Vec<u8> {
    (value as u64).to_le_bytes().to_vec()
}

pub fn decode_usize(bytes: &[u8]) -> EngineResult<usize> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| evo_err!(Protocol: "expected an 8-byte integer, got {} bytes", bytes.len()))?;
    Ok(u64::from_le_bytes(array) as usize)
}

/// The wire table (spec section 6) has no dedicated tag for the trailing
/// generation-number message; it rides on `Tag::MessageSize` as the message
/// immediately following the last individual payload of a work unit, since
/// the receiver always knows by position (after exactly `k` payloads) that
/// this particular `MessageSize` envelope carries the generation rather than
/// a length prefix. See DESIGN.md for this Open Question resolution.
pub fn check_len(expected: usize, actual: usize) -> EngineResult<()> {
    ensure!(
        expected == actual,
        Protocol: "announced length {expected} does not match received length {actual}"
    );
    Ok(())
}
