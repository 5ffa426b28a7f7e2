/// BLOCKS checksum over a command payload.
///
/// Seeded with the payload length, then `c = c * 3 + b` for each byte in
/// order, wrapping at 8 bits. The result is masked to 7 bits so it is a
/// valid SysEx data byte. The length term comes from the slice itself, so
/// payloads of any size are hashed with their own length.
pub fn checksum(payload: &[u8]) -> u8 {
    let seed = payload.len() as u8;
    let c = payload
        .iter()
        .fold(seed, |c, &b| c.wrapping_mul(3).wrapping_add(b));
    c & 0x7F
}
