// ISO9660 layout constants
// Offsets follow ECMA-119 (the primary volume descriptor and directory record tables)

use static_assertions::const_assert;

pub const SECTOR_SIZE: usize = 2048;
pub const SYSTEM_AREA_SECTORS: u32 = 16;
pub const PRIMARY_DESCRIPTOR_LBA: u32 = SYSTEM_AREA_SECTORS;
/// First sector available to directory and file extents
pub const FIRST_DATA_LBA: u32 = PRIMARY_DESCRIPTOR_LBA + 1;

// Volume descriptor header
pub const STANDARD_IDENTIFIER: &[u8; 5] = b"CD001";
pub const VD_TYPE_PRIMARY: u8 = 0x01;
pub const VD_TYPE_TERMINATOR: u8 = 0xFF;
pub const VD_VERSION: u8 = 0x01;

pub const VD_TYPE: usize = 0;
pub const VD_STANDARD_ID: usize = 1;
pub const VD_VERSION_OFFSET: usize = 6;

// Primary volume descriptor fields
pub const PVD_SYSTEM_ID: usize = 8;
pub const PVD_SYSTEM_ID_LEN: usize = 32;
pub const PVD_VOLUME_ID: usize = 40;
pub const PVD_VOLUME_ID_LEN: usize = 32;
pub const PVD_VOLUME_SPACE_SIZE: usize = 80;
pub const PVD_VOLUME_SET_SIZE: usize = 120;
pub const PVD_VOLUME_SEQUENCE: usize = 124;
pub const PVD_LOGICAL_BLOCK_SIZE: usize = 128;
pub const PVD_PATH_TABLE_SIZE: usize = 132;
pub const PVD_ROOT_RECORD: usize = 156;
pub const PVD_VOLUME_SET_ID: usize = 190;
pub const PVD_PUBLISHER_ID: usize = 318;
pub const PVD_PREPARER_ID: usize = 446;
pub const PVD_APPLICATION_ID: usize = 574;
pub const PVD_LONG_ID_LEN: usize = 128;
pub const PVD_COPYRIGHT_FILE_ID: usize = 702;
pub const PVD_ABSTRACT_FILE_ID: usize = 739;
pub const PVD_BIBLIOGRAPHIC_FILE_ID: usize = 776;
pub const PVD_FILE_ID_LEN: usize = 37;
pub const PVD_CREATION_DATE: usize = 813;
pub const PVD_MODIFICATION_DATE: usize = 830;
pub const PVD_EXPIRATION_DATE: usize = 847;
pub const PVD_EFFECTIVE_DATE: usize = 864;
pub const PVD_FILE_STRUCTURE_VERSION: usize = 881;

pub const DEC_DATETIME_LEN: usize = 17;

// Directory record fields
pub const DR_LENGTH: usize = 0;
pub const DR_EXT_ATTR_LENGTH: usize = 1;
pub const DR_EXTENT_LBA: usize = 2;
pub const DR_DATA_LENGTH: usize = 10;
pub const DR_RECORDING_DATE: usize = 18;
pub const DR_FLAGS: usize = 25;
pub const DR_VOLUME_SEQUENCE: usize = 28;
pub const DR_NAME_LENGTH: usize = 32;
pub const DR_NAME: usize = 33;

pub const RECORDING_DATE_LEN: usize = 7;

pub const FLAG_DIRECTORY: u8 = 0x02;

/// Root record embedded in the PVD: 33 fixed bytes plus a one-byte identifier
pub const ROOT_RECORD_LEN: usize = 34;
pub const MAX_RECORD_LEN: usize = u8::MAX as usize;
/// Longest identifier whose record (33 + name + parity pad) still fits the length byte
pub const MAX_IDENTIFIER_LEN: usize = 221;
pub const MAX_PATH_LEN: usize = 255;

pub const FILE_VERSION_SUFFIX: &str = ";1";
pub const CURRENT_DIR_ID: u8 = 0x00;
pub const PARENT_DIR_ID: u8 = 0x01;

const_assert!(SECTOR_SIZE % 512 == 0);
const_assert!(PVD_ROOT_RECORD + ROOT_RECORD_LEN == PVD_VOLUME_SET_ID);
const_assert!(PVD_FILE_STRUCTURE_VERSION < SECTOR_SIZE);
const_assert!(DR_NAME + MAX_IDENTIFIER_LEN + 1 <= MAX_RECORD_LEN);
