// ISO9660 image writer
// Pipeline: registry -> allocation plan -> directory records + file data -> image buffer

pub mod allocator;
pub mod assembler;
pub mod constants;
pub mod descriptor;
pub mod endian;
pub mod inspect;
pub mod record;
pub mod registry;
pub mod timestamps;

pub use allocator::{Allocation, AllocationPlan};
pub use inspect::{read_directory, read_primary_descriptor, walk, TreeEntry, VolumeInfo};
pub use record::{DirectoryRecord, RecordName};
pub use registry::{Entry, EntryRegistry};

use isoforge_core::{ImageOptions, ImageWriter, Result};
use log::info;

/// Builds an ISO9660 image in memory from `(path, bytes)` entries
#[derive(Debug, Clone, Default)]
pub struct Iso9660Writer {
    options: ImageOptions,
    registry: EntryRegistry,
}

impl Iso9660Writer {
    pub fn new(volume_label: impl Into<String>) -> Self {
        Self {
            options: ImageOptions::with_label(volume_label),
            registry: EntryRegistry::new(),
        }
    }

    pub fn with_options(options: ImageOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            registry: EntryRegistry::new(),
        })
    }

    /// Directory paths implied by the registered files, sorted
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.registry.directories()
    }

    pub fn files(&self) -> &[registry::FileEntry] {
        self.registry.files()
    }

    /// Entries in allocation order
    pub fn entries(&self) -> Vec<Entry<'_>> {
        self.registry.entries()
    }

    /// Compute where every extent will be placed without building the image
    pub fn allocate(&self) -> Result<AllocationPlan<'_>> {
        allocator::allocate(&self.registry.entries())
    }
}

impl ImageWriter for Iso9660Writer {
    fn name(&self) -> &'static str {
        "iso9660"
    }

    fn add_file(&mut self, path: &str, data: Vec<u8>) -> Result<()> {
        self.registry.add_file(path, data)
    }

    fn create(&self) -> Result<Vec<u8>> {
        info!(
            "Building ISO9660 image '{}' from {} files",
            self.options.volume_label,
            self.registry.files().len()
        );

        let plan = self.allocate()?;
        assembler::assemble(&plan, &self.options)
    }
}
