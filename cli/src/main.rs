use anyhow::Context;
use clap::{Parser, Subcommand};
use isoforge_core::{ImageOptions, ImageWriter};
use isoforge_formatters::{read_primary_descriptor, walk, Iso9660Writer};
use log::{info, LevelFilter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "isoforge")]
#[command(about = "Build ISO9660 disc images from files on disk", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an image from files and directories
    Build {
        /// Files or directories to include
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where to write the image
        #[arg(short, long)]
        output: PathBuf,
        /// Volume label (uppercased, at most 32 characters)
        #[arg(short, long)]
        label: Option<String>,
        /// JSON file with image options
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Leave all dates unset so identical inputs give identical images
        #[arg(long)]
        no_timestamp: bool,
        /// Print the allocation plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the volume descriptor and directory tree of an image
    Inspect {
        /// Image file
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Build {
            inputs,
            output,
            label,
            config,
            no_timestamp,
            json,
        } => {
            let mut options = match config {
                Some(path) => ImageOptions::from_json_file(&path)
                    .with_context(|| format!("Failed to load options from {}", path.display()))?,
                None => ImageOptions::default(),
            };
            if let Some(label) = label {
                options.volume_label = label;
            }
            if no_timestamp {
                options.recording_time = None;
            } else if options.recording_time.is_none() {
                options.recording_time = Some(chrono::Utc::now());
            }

            let mut writer = Iso9660Writer::with_options(options)?;
            for (iso_path, host_path) in collect_inputs(&inputs)? {
                let data = tokio::fs::read(&host_path)
                    .await
                    .with_context(|| format!("Failed to read {}", host_path.display()))?;
                writer
                    .add_file(&iso_path, data)
                    .with_context(|| format!("Cannot add {}", host_path.display()))?;
            }

            if json {
                println!("{}", plan_json(&writer)?);
            }

            let image = writer.create().context("Failed to build image")?;
            tokio::fs::write(&output, &image)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;

            info!(
                "Wrote {} image {} ({} files, {} bytes)",
                writer.name(),
                output.display(),
                writer.files().len(),
                image.len()
            );
        }
        Commands::Inspect { image } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read {}", image.display()))?;

            let volume = read_primary_descriptor(&bytes)?;
            println!("Volume: {}", volume.volume_label);
            if !volume.publisher.is_empty() {
                println!("  Publisher: {}", volume.publisher);
            }
            if !volume.application.is_empty() {
                println!("  Application: {}", volume.application);
            }
            println!(
                "  Size: {} sectors x {} bytes",
                volume.volume_space_size, volume.logical_block_size
            );
            println!("  Root directory: LBA {}", volume.root.lba);
            println!();

            for entry in walk(&bytes)? {
                if entry.record.is_dir() {
                    println!("  {:>8}  {:>10}  {}/", entry.record.lba, "-", entry.path);
                } else {
                    println!("  {:>8}  {:>10}  {}", entry.record.lba, entry.record.size, entry.path);
                }
            }
        }
    }

    Ok(())
}

/// Allocation plan as pretty JSON, one object per placed entry
fn plan_json(writer: &Iso9660Writer) -> anyhow::Result<String> {
    let plan = writer.allocate()?;
    Ok(serde_json::to_string_pretty(&plan)?)
}

/// Map every input to `(image path, host path)` pairs.
/// Files land at the image root; directories are walked and keep their relative layout.
fn collect_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(false).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(input)?;
                files.push((image_path(relative), entry.path().to_path_buf()));
            }
        } else {
            let name = input
                .file_name()
                .with_context(|| format!("{} has no file name", input.display()))?;
            files.push((name.to_string_lossy().into_owned(), input.clone()));
        }
    }

    Ok(files)
}

fn image_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_json_flattens_entries() {
        let mut writer = Iso9660Writer::new("plan");
        writer.add_file("docs/notes.txt", b"notes".to_vec()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&plan_json(&writer).unwrap()).unwrap();
        let allocations = json["allocations"].as_array().unwrap();
        assert_eq!(allocations.len(), 2);

        let dir = &allocations[0];
        assert_eq!(dir["path"], "docs");
        assert_eq!(dir["is_dir"], true);
        assert_eq!(dir["lba"], 17);

        let file = &allocations[1];
        assert_eq!(file["path"], "docs/notes.txt");
        assert_eq!(file["is_dir"], false);
        assert_eq!(file["lba"], 18);
        assert_eq!(file["size"], 5);
        assert_eq!(file["sectors"], 1);
        // File contents and lookup tables stay out of the listing
        assert!(file.get("data").is_none());
        assert!(file.get("entry").is_none());

        assert_eq!(json["root_directory_lba"], 19);
        assert_eq!(json["terminator_lba"], 20);
        assert_eq!(json["total_sectors"], 21);
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_collect_inputs_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        std::fs::write(dir.path().join("top.txt"), b"top").unwrap();
        std::fs::write(dir.path().join("sub/deeper/leaf.bin"), b"leaf").unwrap();

        let loose = tempfile::NamedTempFile::new().unwrap();

        let inputs = vec![dir.path().to_path_buf(), loose.path().to_path_buf()];
        let collected: Vec<String> = collect_inputs(&inputs).unwrap().into_iter().map(|(p, _)| p).collect();

        let loose_name = loose.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(collected, vec!["sub/deeper/leaf.bin".to_string(), "top.txt".to_string(), loose_name]);
    }
}
