pub mod iso9660;

// Re-export the writer and inspector entry points
pub use iso9660::{Iso9660Writer, AllocationPlan, DirectoryRecord, RecordName, VolumeInfo, TreeEntry};
pub use iso9660::inspect::{read_primary_descriptor, read_directory, walk, file_data};
