// Sector allocator
// Walks the ordered entry list and assigns each extent a run of whole sectors

use super::constants::{FIRST_DATA_LBA, SECTOR_SIZE};
use super::registry::Entry;
use isoforge_core::{IsoError, Result};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

/// Placement of one entry's extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation<'a> {
    #[serde(flatten)]
    pub entry: Entry<'a>,
    pub lba: u32,
    /// Bytes recorded in the directory record's data length field
    pub size: u32,
    pub sectors: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationPlan<'a> {
    pub allocations: Vec<Allocation<'a>>,
    pub root_directory_lba: u32,
    pub terminator_lba: u32,
    pub total_sectors: u32,
    /// Path -> position in `allocations`
    #[serde(skip)]
    by_path: HashMap<&'a str, usize>,
    /// Parent path ("" for the root) -> positions of its direct children, in allocation order
    #[serde(skip)]
    by_parent: HashMap<&'a str, Vec<usize>>,
}

impl<'a> AllocationPlan<'a> {
    pub fn find(&self, path: &str) -> Option<&Allocation<'a>> {
        self.by_path.get(path).map(|&i| &self.allocations[i])
    }

    /// Extent location of a directory, "" being the root
    pub fn directory_lba(&self, path: &str) -> Option<u32> {
        if path.is_empty() {
            return Some(self.root_directory_lba);
        }
        self.find(path).filter(|a| a.entry.is_dir).map(|a| a.lba)
    }

    /// Direct children of `dir` in allocation order: sub-directories by name, then files as inserted
    pub fn children<'p>(&'p self, dir: &str) -> impl Iterator<Item = &'p Allocation<'a>> + 'p {
        self.by_parent
            .get(dir)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.allocations[i])
    }
}

/// Sectors needed for `len` bytes; an empty file still takes one sector
pub fn sectors_for(len: usize) -> usize {
    len.div_ceil(SECTOR_SIZE).max(1)
}

/// Smallest multiple of the sector size holding `len` bytes (at least one sector)
pub fn padded_len(len: usize) -> usize {
    sectors_for(len) * SECTOR_SIZE
}

/// Assign LBAs starting right after the primary volume descriptor.
/// Each sub-directory gets one sector, files get `sectors_for(len)`. The root
/// directory follows the last file and the terminator follows the root.
pub fn allocate<'a>(entries: &[Entry<'a>]) -> Result<AllocationPlan<'a>> {
    let mut cursor = FIRST_DATA_LBA;
    let mut allocations = Vec::with_capacity(entries.len());
    let mut by_path = HashMap::with_capacity(entries.len());
    let mut by_parent: HashMap<&'a str, Vec<usize>> = HashMap::new();

    for entry in entries {
        let (size, sectors) = if entry.is_dir {
            (SECTOR_SIZE as u32, 1)
        } else {
            let size = u32::try_from(entry.data.len()).map_err(|_| too_large(entry.path, entry.data.len() as u64))?;
            let sectors = u32::try_from(sectors_for(entry.data.len()))
                .map_err(|_| too_large(entry.path, entry.data.len() as u64))?;
            (size, sectors)
        };

        debug!("Placing '{}' at LBA {} ({} sectors)", entry.path, cursor, sectors);
        by_path.insert(entry.path, allocations.len());
        by_parent.entry(entry.parent()).or_default().push(allocations.len());
        allocations.push(Allocation {
            entry: *entry,
            lba: cursor,
            size,
            sectors,
        });

        cursor = cursor
            .checked_add(sectors)
            .ok_or_else(|| too_large(entry.path, entry.data.len() as u64))?;
    }

    let root_directory_lba = cursor;
    let terminator_lba = root_directory_lba
        .checked_add(1)
        .ok_or_else(|| too_large("/", 0))?;
    let total_sectors = terminator_lba
        .checked_add(1)
        .ok_or_else(|| too_large("/", 0))?;

    info!(
        "Allocated {} sectors for {} entries (root directory at LBA {})",
        total_sectors,
        allocations.len(),
        root_directory_lba
    );

    Ok(AllocationPlan {
        allocations,
        root_directory_lba,
        terminator_lba,
        total_sectors,
        by_path,
        by_parent,
    })
}

fn too_large(path: &str, size: u64) -> IsoError {
    IsoError::UnsupportedFileSize {
        path: path.to_string(),
        size,
    }
}
