// Directory record encoding and decoding
// Layout per ECMA-119 9.1, with both-endian extent location and data length

use super::constants::*;
use super::endian::{read_both_u16, read_both_u32, write_both_u16, write_both_u32};
use super::timestamps::{decode_recording_date, encode_recording_date};
use chrono::{DateTime, Utc};
use isoforge_core::{IsoError, Result};

/// File identifier carried by a directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordName {
    /// The "." entry, encoded as a single 0x00 byte
    Current,
    /// The ".." entry, encoded as a single 0x01 byte
    Parent,
    Directory(String),
    /// Stored with the ";1" version suffix
    File(String),
}

impl RecordName {
    pub fn identifier(&self) -> Vec<u8> {
        match self {
            RecordName::Current => vec![CURRENT_DIR_ID],
            RecordName::Parent => vec![PARENT_DIR_ID],
            RecordName::Directory(name) => name.as_bytes().to_vec(),
            RecordName::File(name) => format!("{}{}", name, FILE_VERSION_SUFFIX).into_bytes(),
        }
    }

    fn from_identifier(raw: &[u8], is_dir: bool) -> Self {
        match (raw, is_dir) {
            ([CURRENT_DIR_ID], true) => RecordName::Current,
            ([PARENT_DIR_ID], true) => RecordName::Parent,
            (_, true) => RecordName::Directory(String::from_utf8_lossy(raw).into_owned()),
            (_, false) => {
                let name = String::from_utf8_lossy(raw);
                let name = name.strip_suffix(FILE_VERSION_SUFFIX).unwrap_or(&name);
                RecordName::File(name.to_string())
            }
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            RecordName::Current => ".",
            RecordName::Parent => "..",
            RecordName::Directory(name) | RecordName::File(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub name: RecordName,
    pub lba: u32,
    pub size: u32,
    pub flags: u8,
    pub recorded: Option<DateTime<Utc>>,
}

impl DirectoryRecord {
    pub fn directory(name: RecordName, lba: u32, recorded: Option<DateTime<Utc>>) -> Self {
        Self {
            name,
            lba,
            size: SECTOR_SIZE as u32,
            flags: FLAG_DIRECTORY,
            recorded,
        }
    }

    pub fn file(name: &str, lba: u32, size: u32, recorded: Option<DateTime<Utc>>) -> Self {
        Self {
            name: RecordName::File(name.to_string()),
            lba,
            size,
            flags: 0,
            recorded,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.flags & FLAG_DIRECTORY != 0
    }

    /// Encoded length: 33 fixed bytes, the identifier, and a pad byte
    /// when the identifier length is even
    pub fn encoded_len(&self) -> usize {
        record_len(self.name.identifier().len())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let identifier = self.name.identifier();
        let len = record_len(identifier.len());
        if len > MAX_RECORD_LEN {
            return Err(IsoError::NameTooLong {
                name: self.name.display_name().to_string(),
                len: identifier.len(),
                max: MAX_IDENTIFIER_LEN,
            });
        }

        let mut rec = vec![0u8; len];
        rec[DR_LENGTH] = len as u8;
        rec[DR_EXT_ATTR_LENGTH] = 0;
        write_both_u32(&mut rec[DR_EXTENT_LBA..DR_EXTENT_LBA + 8], self.lba);
        write_both_u32(&mut rec[DR_DATA_LENGTH..DR_DATA_LENGTH + 8], self.size);
        rec[DR_RECORDING_DATE..DR_RECORDING_DATE + RECORDING_DATE_LEN]
            .copy_from_slice(&encode_recording_date(self.recorded));
        rec[DR_FLAGS] = self.flags;
        // File unit size and interleave gap stay zero
        write_both_u16(&mut rec[DR_VOLUME_SEQUENCE..DR_VOLUME_SEQUENCE + 4], 1);
        rec[DR_NAME_LENGTH] = identifier.len() as u8;
        rec[DR_NAME..DR_NAME + identifier.len()].copy_from_slice(&identifier);

        Ok(rec)
    }

    /// Decode the record at the start of `buf`, returning it with its length.
    /// `Ok(None)` marks the zero padding after the last record of a sector.
    pub fn decode(buf: &[u8]) -> Result<Option<(Self, usize)>> {
        let len = match buf.first() {
            None | Some(0) => return Ok(None),
            Some(&len) => len as usize,
        };

        if len < DR_NAME + 1 || len > buf.len() {
            return Err(IsoError::InvalidImage(format!("bad directory record length {}", len)));
        }

        let name_len = buf[DR_NAME_LENGTH] as usize;
        if DR_NAME + name_len > len {
            return Err(IsoError::InvalidImage(format!(
                "identifier of {} bytes overruns record of {}",
                name_len, len
            )));
        }

        let flags = buf[DR_FLAGS];
        let lba = read_both_u32(&buf[DR_EXTENT_LBA..DR_EXTENT_LBA + 8])?;
        let size = read_both_u32(&buf[DR_DATA_LENGTH..DR_DATA_LENGTH + 8])?;
        read_both_u16(&buf[DR_VOLUME_SEQUENCE..DR_VOLUME_SEQUENCE + 4])?;
        let recorded = decode_recording_date(&buf[DR_RECORDING_DATE..DR_RECORDING_DATE + RECORDING_DATE_LEN]);
        let name = RecordName::from_identifier(&buf[DR_NAME..DR_NAME + name_len], flags & FLAG_DIRECTORY != 0);

        Ok(Some((
            Self {
                name,
                lba,
                size,
                flags,
                recorded,
            },
            len,
        )))
    }
}

pub fn record_len(identifier_len: usize) -> usize {
    DR_NAME + identifier_len + (identifier_len + 1) % 2
}
