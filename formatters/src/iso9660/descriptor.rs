// Volume descriptor builder
// Builds the primary volume descriptor (sector 16) and the set terminator

use super::constants::*;
use super::endian::{write_both_u16, write_both_u32};
use super::record::{DirectoryRecord, RecordName};
use super::timestamps::encode_descriptor_date;
use isoforge_core::{ImageOptions, Result};

/// Where the descriptor needs to point, taken from the allocation plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeLayout {
    pub root_directory_lba: u32,
    pub total_sectors: u32,
}

/// Uppercase the label and space-pad or truncate it to 32 bytes.
/// Non-ASCII characters become '_' so every character is one byte.
pub fn format_volume_label(label: &str) -> [u8; PVD_VOLUME_ID_LEN] {
    let mut result = [b' '; PVD_VOLUME_ID_LEN];
    fill_identifier(&mut result, label);
    result
}

/// Write `value` into a space-padded identifier field
fn fill_identifier(field: &mut [u8], value: &str) {
    field.fill(b' ');

    let chars = value
        .chars()
        .map(|c| if c.is_ascii() { c.to_ascii_uppercase() as u8 } else { b'_' });
    for (slot, byte) in field.iter_mut().zip(chars) {
        *slot = byte;
    }
}

fn write_header(sector: &mut [u8], descriptor_type: u8) {
    sector[VD_TYPE] = descriptor_type;
    sector[VD_STANDARD_ID..VD_STANDARD_ID + 5].copy_from_slice(STANDARD_IDENTIFIER);
    sector[VD_VERSION_OFFSET] = VD_VERSION;
}

/// Build the primary volume descriptor
pub fn build_primary_descriptor(options: &ImageOptions, layout: VolumeLayout) -> Result<[u8; SECTOR_SIZE]> {
    let mut pvd = [0u8; SECTOR_SIZE];
    write_header(&mut pvd, VD_TYPE_PRIMARY);

    fill_identifier(&mut pvd[PVD_SYSTEM_ID..PVD_SYSTEM_ID + PVD_SYSTEM_ID_LEN], "");
    pvd[PVD_VOLUME_ID..PVD_VOLUME_ID + PVD_VOLUME_ID_LEN]
        .copy_from_slice(&format_volume_label(&options.volume_label));

    write_both_u32(&mut pvd[PVD_VOLUME_SPACE_SIZE..PVD_VOLUME_SPACE_SIZE + 8], layout.total_sectors);
    write_both_u16(&mut pvd[PVD_VOLUME_SET_SIZE..PVD_VOLUME_SET_SIZE + 4], 1);
    write_both_u16(&mut pvd[PVD_VOLUME_SEQUENCE..PVD_VOLUME_SEQUENCE + 4], 1);
    write_both_u16(&mut pvd[PVD_LOGICAL_BLOCK_SIZE..PVD_LOGICAL_BLOCK_SIZE + 4], SECTOR_SIZE as u16);
    // No path tables: size and all four locations stay zero
    write_both_u32(&mut pvd[PVD_PATH_TABLE_SIZE..PVD_PATH_TABLE_SIZE + 8], 0);

    let root = DirectoryRecord::directory(RecordName::Current, layout.root_directory_lba, options.recording_time)
        .encode()?;
    pvd[PVD_ROOT_RECORD..PVD_ROOT_RECORD + ROOT_RECORD_LEN].copy_from_slice(&root);

    fill_identifier(&mut pvd[PVD_VOLUME_SET_ID..PVD_VOLUME_SET_ID + PVD_LONG_ID_LEN], "");
    fill_identifier(
        &mut pvd[PVD_PUBLISHER_ID..PVD_PUBLISHER_ID + PVD_LONG_ID_LEN],
        options.publisher.as_deref().unwrap_or(""),
    );
    fill_identifier(&mut pvd[PVD_PREPARER_ID..PVD_PREPARER_ID + PVD_LONG_ID_LEN], "");
    fill_identifier(
        &mut pvd[PVD_APPLICATION_ID..PVD_APPLICATION_ID + PVD_LONG_ID_LEN],
        options.application.as_deref().unwrap_or(""),
    );
    for offset in [PVD_COPYRIGHT_FILE_ID, PVD_ABSTRACT_FILE_ID, PVD_BIBLIOGRAPHIC_FILE_ID] {
        fill_identifier(&mut pvd[offset..offset + PVD_FILE_ID_LEN], "");
    }

    let stamped = encode_descriptor_date(options.recording_time);
    let unset = encode_descriptor_date(None);
    pvd[PVD_CREATION_DATE..PVD_CREATION_DATE + DEC_DATETIME_LEN].copy_from_slice(&stamped);
    pvd[PVD_MODIFICATION_DATE..PVD_MODIFICATION_DATE + DEC_DATETIME_LEN].copy_from_slice(&stamped);
    pvd[PVD_EXPIRATION_DATE..PVD_EXPIRATION_DATE + DEC_DATETIME_LEN].copy_from_slice(&unset);
    pvd[PVD_EFFECTIVE_DATE..PVD_EFFECTIVE_DATE + DEC_DATETIME_LEN].copy_from_slice(&stamped);

    pvd[PVD_FILE_STRUCTURE_VERSION] = 1;

    Ok(pvd)
}

/// Build the volume descriptor set terminator
pub fn build_terminator() -> [u8; SECTOR_SIZE] {
    let mut term = [0u8; SECTOR_SIZE];
    write_header(&mut term, VD_TYPE_TERMINATOR);
    term
}
