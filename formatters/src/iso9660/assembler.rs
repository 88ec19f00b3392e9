// Image assembler
// Serializes directory sectors and lays every sector out in one contiguous buffer

use super::allocator::AllocationPlan;
use super::constants::*;
use super::descriptor::{build_primary_descriptor, build_terminator, VolumeLayout};
use super::record::{DirectoryRecord, RecordName};
use super::registry::parent_path;
use isoforge_core::{ImageOptions, IsoError, Result};
use log::{debug, info};

/// Build one directory's sector: ".", "..", then a record per direct child
pub fn build_directory_sector(
    plan: &AllocationPlan<'_>,
    path: &str,
    options: &ImageOptions,
) -> Result<[u8; SECTOR_SIZE]> {
    let recorded = options.recording_time;
    let self_lba = directory_lba(plan, path)?;
    // The root is its own parent
    let parent_lba = if path.is_empty() {
        self_lba
    } else {
        directory_lba(plan, parent_path(path))?
    };

    let mut records = vec![
        DirectoryRecord::directory(RecordName::Current, self_lba, recorded),
        DirectoryRecord::directory(RecordName::Parent, parent_lba, recorded),
    ];
    for child in plan.children(path) {
        let name = child.entry.name();
        records.push(if child.entry.is_dir {
            DirectoryRecord::directory(RecordName::Directory(name.to_string()), child.lba, recorded)
        } else {
            DirectoryRecord::file(name, child.lba, child.size, recorded)
        });
    }

    let required: usize = records.iter().map(DirectoryRecord::encoded_len).sum();
    if required > SECTOR_SIZE {
        return Err(IsoError::DirectorySectorOverflow {
            directory: display_dir(path).to_string(),
            required,
            capacity: SECTOR_SIZE,
        });
    }

    let mut sector = [0u8; SECTOR_SIZE];
    let mut pos = 0;
    for record in &records {
        let bytes = record.encode()?;
        sector[pos..pos + bytes.len()].copy_from_slice(&bytes);
        pos += bytes.len();
    }

    debug!("Directory '{}': {} records, {} bytes", display_dir(path), records.len(), pos);
    Ok(sector)
}

/// Concatenate system area, descriptor, extents, root directory and terminator
pub fn assemble(plan: &AllocationPlan<'_>, options: &ImageOptions) -> Result<Vec<u8>> {
    let mut image = vec![0u8; plan.total_sectors as usize * SECTOR_SIZE];

    let pvd = build_primary_descriptor(
        options,
        VolumeLayout {
            root_directory_lba: plan.root_directory_lba,
            total_sectors: plan.total_sectors,
        },
    )?;
    write_sector(&mut image, PRIMARY_DESCRIPTOR_LBA, &pvd);

    for allocation in &plan.allocations {
        if allocation.entry.is_dir {
            let sector = build_directory_sector(plan, allocation.entry.path, options)?;
            write_sector(&mut image, allocation.lba, &sector);
        } else {
            // Remaining bytes of the last sector are already zero
            let start = allocation.lba as usize * SECTOR_SIZE;
            image[start..start + allocation.entry.data.len()].copy_from_slice(allocation.entry.data);
        }
    }

    let root = build_directory_sector(plan, "", options)?;
    write_sector(&mut image, plan.root_directory_lba, &root);
    write_sector(&mut image, plan.terminator_lba, &build_terminator());

    info!("Assembled image: {} sectors ({} bytes)", plan.total_sectors, image.len());
    Ok(image)
}

fn write_sector(image: &mut [u8], lba: u32, sector: &[u8; SECTOR_SIZE]) {
    let start = lba as usize * SECTOR_SIZE;
    image[start..start + SECTOR_SIZE].copy_from_slice(sector);
}

fn directory_lba(plan: &AllocationPlan<'_>, path: &str) -> Result<u32> {
    plan.directory_lba(path)
        .ok_or_else(|| IsoError::InvalidPath(format!("'{}' is not an allocated directory", path)))
}

fn display_dir(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
