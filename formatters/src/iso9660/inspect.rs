// Image inspector
// Decodes the primary volume descriptor and directory extents of a finished image

use super::constants::*;
use super::endian::{read_both_u16, read_both_u32};
use super::record::{DirectoryRecord, RecordName};
use isoforge_core::{IsoError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub volume_label: String,
    pub publisher: String,
    pub application: String,
    pub volume_space_size: u32,
    pub logical_block_size: u16,
    pub root: DirectoryRecord,
}

/// A record found while walking the tree, with its full path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub record: DirectoryRecord,
}

fn sector(image: &[u8], lba: u32) -> Result<&[u8]> {
    let start = lba as usize * SECTOR_SIZE;
    image
        .get(start..start + SECTOR_SIZE)
        .ok_or_else(|| IsoError::InvalidImage(format!("sector {} beyond end of image", lba)))
}

fn trimmed(field: &[u8]) -> String {
    String::from_utf8_lossy(field).trim_end().to_string()
}

/// Parse the primary volume descriptor at sector 16
pub fn read_primary_descriptor(image: &[u8]) -> Result<VolumeInfo> {
    let pvd = sector(image, PRIMARY_DESCRIPTOR_LBA)?;

    if pvd[VD_TYPE] != VD_TYPE_PRIMARY
        || &pvd[VD_STANDARD_ID..VD_STANDARD_ID + 5] != STANDARD_IDENTIFIER
    {
        return Err(IsoError::InvalidImage("no primary volume descriptor at sector 16".to_string()));
    }

    let (root, _) = DirectoryRecord::decode(&pvd[PVD_ROOT_RECORD..PVD_ROOT_RECORD + ROOT_RECORD_LEN])?
        .ok_or_else(|| IsoError::InvalidImage("empty root directory record".to_string()))?;

    Ok(VolumeInfo {
        volume_label: trimmed(&pvd[PVD_VOLUME_ID..PVD_VOLUME_ID + PVD_VOLUME_ID_LEN]),
        publisher: trimmed(&pvd[PVD_PUBLISHER_ID..PVD_PUBLISHER_ID + PVD_LONG_ID_LEN]),
        application: trimmed(&pvd[PVD_APPLICATION_ID..PVD_APPLICATION_ID + PVD_LONG_ID_LEN]),
        volume_space_size: read_both_u32(&pvd[PVD_VOLUME_SPACE_SIZE..PVD_VOLUME_SPACE_SIZE + 8])?,
        logical_block_size: read_both_u16(&pvd[PVD_LOGICAL_BLOCK_SIZE..PVD_LOGICAL_BLOCK_SIZE + 4])?,
        root,
    })
}

/// Decode every record of a directory extent
pub fn read_directory(image: &[u8], lba: u32, size: u32) -> Result<Vec<DirectoryRecord>> {
    let sectors = (size as usize).div_ceil(SECTOR_SIZE) as u32;
    let mut records = Vec::new();

    // Records never straddle a sector boundary; zero padding ends each sector
    for i in 0..sectors {
        let data = sector(image, lba + i)?;
        let mut pos = 0;
        while pos < SECTOR_SIZE {
            match DirectoryRecord::decode(&data[pos..])? {
                Some((record, len)) => {
                    records.push(record);
                    pos += len;
                }
                None => break,
            }
        }
    }

    Ok(records)
}

/// Walk the whole tree from the root, depth first
pub fn walk(image: &[u8]) -> Result<Vec<TreeEntry>> {
    let volume = read_primary_descriptor(image)?;
    let mut out = Vec::new();
    let mut visited = HashSet::from([volume.root.lba]);
    walk_directory(image, &volume.root, "", &mut visited, &mut out)?;
    Ok(out)
}

fn walk_directory(
    image: &[u8],
    dir: &DirectoryRecord,
    prefix: &str,
    visited: &mut HashSet<u32>,
    out: &mut Vec<TreeEntry>,
) -> Result<()> {
    for record in read_directory(image, dir.lba, dir.size)? {
        if matches!(record.name, RecordName::Current | RecordName::Parent) {
            continue;
        }

        let path = if prefix.is_empty() {
            record.name.display_name().to_string()
        } else {
            format!("{}/{}", prefix, record.name.display_name())
        };

        // A directory extent is only entered once, even if records point back into the tree
        let descend = record.is_dir() && visited.insert(record.lba);
        out.push(TreeEntry {
            path: path.clone(),
            record: record.clone(),
        });

        if descend {
            walk_directory(image, &record, &path, visited, out)?;
        }
    }

    Ok(())
}

/// Contents of a file extent
pub fn file_data<'i>(image: &'i [u8], record: &DirectoryRecord) -> Result<&'i [u8]> {
    let start = record.lba as usize * SECTOR_SIZE;
    image
        .get(start..start + record.size as usize)
        .ok_or_else(|| IsoError::InvalidImage(format!("extent at LBA {} beyond end of image", record.lba)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_image() {
        let image = vec![0u8; SECTOR_SIZE * 4];
        assert!(matches!(read_primary_descriptor(&image), Err(IsoError::InvalidImage(_))));
    }

    #[test]
    fn test_rejects_missing_signature() {
        let image = vec![0u8; SECTOR_SIZE * 20];
        assert!(matches!(read_primary_descriptor(&image), Err(IsoError::InvalidImage(_))));
    }

    #[test]
    fn test_walk_enters_each_directory_once() {
        use crate::iso9660::descriptor::{build_primary_descriptor, VolumeLayout};
        use isoforge_core::ImageOptions;

        // Root at 17 holds a directory record that loops back to the root extent
        let mut image = vec![0u8; SECTOR_SIZE * 19];
        let pvd = build_primary_descriptor(
            &ImageOptions::default(),
            VolumeLayout {
                root_directory_lba: 17,
                total_sectors: 19,
            },
        )
        .unwrap();
        image[16 * SECTOR_SIZE..17 * SECTOR_SIZE].copy_from_slice(&pvd);

        let mut pos = 17 * SECTOR_SIZE;
        for record in [
            DirectoryRecord::directory(RecordName::Current, 17, None),
            DirectoryRecord::directory(RecordName::Parent, 17, None),
            DirectoryRecord::directory(RecordName::Directory("loop".into()), 17, None),
        ] {
            let bytes = record.encode().unwrap();
            image[pos..pos + bytes.len()].copy_from_slice(&bytes);
            pos += bytes.len();
        }

        let paths: Vec<String> = walk(&image).unwrap().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["loop".to_string()]);
    }

    #[test]
    fn test_file_data_bounds() {
        let image = vec![0u8; SECTOR_SIZE * 2];
        let inside = DirectoryRecord::file("a", 1, 100, None);
        assert_eq!(file_data(&image, &inside).unwrap().len(), 100);

        let outside = DirectoryRecord::file("b", 1, 4096, None);
        assert!(file_data(&image, &outside).is_err());
    }
}
