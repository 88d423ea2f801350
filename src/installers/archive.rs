use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tar::Archive;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Archive formats the installer knows how to unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
    Tar,
}

impl ArchiveKind {
    /// Detects the format from a file name or URL path.
    pub fn detect(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        if lowered.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if lowered.ends_with(".tar.gz") || lowered.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if lowered.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::Tar => "tar",
        }
    }
}

pub fn extract_archive(archive_path: &Path, kind: ArchiveKind, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create extraction directory {:?}", dest))?;
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive {:?}", archive_path))?;

    match kind {
        ArchiveKind::TarGz => Archive::new(GzDecoder::new(file))
            .unpack(dest)
            .with_context(|| format!("Failed to unpack tar.gz archive {:?}", archive_path)),
        ArchiveKind::Tar => Archive::new(file)
            .unpack(dest)
            .with_context(|| format!("Failed to unpack tar archive {:?}", archive_path)),
        ArchiveKind::Zip => extract_zip(file, archive_path, dest),
    }
}

fn extract_zip(file: File, archive_path: &Path, dest: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip archive {:?}", archive_path))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).with_context(|| {
            format!("Failed to read zip entry #{index} from {:?}", archive_path)
        })?;

        let Some(enclosed) = entry.enclosed_name().map(|path| dest.join(path)) else {
            tracing::warn!(entry = entry.name(), "skipping zip entry outside extraction root");
            continue;
        };

        if entry.is_dir() {
            fs::create_dir_all(&enclosed)
                .with_context(|| format!("Failed to create directory {:?}", enclosed))?;
            continue;
        }

        if let Some(parent) = enclosed.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create parent directory {:?}", parent))?;
        }

        let mut outfile = File::create(&enclosed)
            .with_context(|| format!("Failed to create file {:?}", enclosed))?;
        io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Failed to extract zip entry {:?}", enclosed))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&enclosed, fs::Permissions::from_mode(mode))
                    .with_context(|| format!("Failed to set permissions on {:?}", enclosed))?;
            }
        }
    }

    Ok(())
}

/// Recursively copies `src` into `dst`, creating directories as needed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        bail!("Source directory {:?} does not exist", src);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", src))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Unexpected path {:?} outside {:?}", entry.path(), src))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {:?}", target))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("Failed to copy {:?} to {:?}", entry.path(), target)
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    #[test]
    fn detects_archive_kind() {
        assert_eq!(ArchiveKind::detect("install.zip"), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::detect("install.TGZ"), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::detect("install.tar.gz"), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::detect("install.tar"), Some(ArchiveKind::Tar));
        assert_eq!(ArchiveKind::detect("install.7z"), None);
    }

    #[test]
    fn extracts_zip_archive() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("install.zip");
        {
            let mut writer = ZipWriter::new(File::create(&archive_path).unwrap());
            writer
                .add_directory("install/include/shaderc/", FileOptions::default())
                .unwrap();
            writer
                .start_file("install/include/shaderc/shaderc.h", FileOptions::default())
                .unwrap();
            writer.write_all(b"// header").unwrap();
            writer.finish().unwrap();
        }

        let dest = temp.path().join("staging");
        extract_archive(&archive_path, ArchiveKind::Zip, &dest).unwrap();
        assert_eq!(
            fs::read_to_string(dest.join("install/include/shaderc/shaderc.h")).unwrap(),
            "// header"
        );
    }

    #[test]
    #[cfg(unix)]
    fn zip_extraction_keeps_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("tools.zip");
        {
            let mut writer = ZipWriter::new(File::create(&archive_path).unwrap());
            writer
                .start_file(
                    "install/bin/glslc",
                    FileOptions::default().unix_permissions(0o755),
                )
                .unwrap();
            writer.write_all(b"#!/bin/sh\n").unwrap();
            writer
                .start_file(
                    "install/include/shaderc.h",
                    FileOptions::default().unix_permissions(0o640),
                )
                .unwrap();
            writer.write_all(b"// header").unwrap();
            writer.finish().unwrap();
        }

        let dest = temp.path().join("staging");
        extract_archive(&archive_path, ArchiveKind::Zip, &dest).unwrap();
        let mode = |path: &str| fs::metadata(dest.join(path)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode("install/bin/glslc"), 0o755);
        assert_eq!(mode("install/include/shaderc.h"), 0o640);
    }

    #[test]
    fn extracts_tar_gz_archive() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("install.tgz");
        {
            let encoder = GzEncoder::new(File::create(&archive_path).unwrap(), Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let data = b"archive";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, "install/lib/libshaderc_combined.a", &data[..])
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        let dest = temp.path().join("staging");
        extract_archive(&archive_path, ArchiveKind::TarGz, &dest).unwrap();
        assert_eq!(
            fs::read_to_string(dest.join("install/lib/libshaderc_combined.a")).unwrap(),
            "archive"
        );
    }

    #[test]
    fn copy_tree_copies_nested_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("top.h"), "top").unwrap();
        fs::write(src.join("a/b/nested.h"), "nested").unwrap();

        let dst = temp.path().join("dst");
        assert_eq!(copy_tree(&src, &dst).unwrap(), 2);
        assert_eq!(fs::read_to_string(dst.join("a/b/nested.h")).unwrap(), "nested");
    }

    #[test]
    fn copy_tree_requires_source() {
        let temp = TempDir::new().unwrap();
        let err = copy_tree(&temp.path().join("missing"), &temp.path().join("dst")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
