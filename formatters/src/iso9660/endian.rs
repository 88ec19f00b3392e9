// Both-endian field encoding
// ISO9660 stores most integers twice: a little-endian copy followed by a big-endian copy

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use isoforge_core::{IsoError, Result};

/// Write a 32-bit value as 8 bytes (LE then BE)
pub fn write_both_u32(buf: &mut [u8], value: u32) {
    LittleEndian::write_u32(&mut buf[0..4], value);
    BigEndian::write_u32(&mut buf[4..8], value);
}

/// Write a 16-bit value as 4 bytes (LE then BE)
pub fn write_both_u16(buf: &mut [u8], value: u16) {
    LittleEndian::write_u16(&mut buf[0..2], value);
    BigEndian::write_u16(&mut buf[2..4], value);
}

/// Read a both-endian 32-bit field, rejecting halves that disagree
pub fn read_both_u32(buf: &[u8]) -> Result<u32> {
    if buf.len() < 8 {
        return Err(IsoError::InvalidImage("truncated both-endian u32".to_string()));
    }

    let le = LittleEndian::read_u32(&buf[0..4]);
    let be = BigEndian::read_u32(&buf[4..8]);
    if le != be {
        return Err(IsoError::InvalidImage(format!(
            "both-endian mismatch: LE {} vs BE {}",
            le, be
        )));
    }

    Ok(le)
}

pub fn read_both_u16(buf: &[u8]) -> Result<u16> {
    if buf.len() < 4 {
        return Err(IsoError::InvalidImage("truncated both-endian u16".to_string()));
    }

    let le = LittleEndian::read_u16(&buf[0..2]);
    let be = BigEndian::read_u16(&buf[2..4]);
    if le != be {
        return Err(IsoError::InvalidImage(format!(
            "both-endian mismatch: LE {} vs BE {}",
            le, be
        )));
    }

    Ok(le)
}
