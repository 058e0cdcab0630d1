//! Zip archives of chapter directories.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write every regular file directly inside `dir` into a zip at `archive_path`.
///
/// Entries are stored flat, by file name, in name order. Returns the number
/// of entries written.
pub fn zip_directory(dir: &Path, archive_path: &Path) -> zip::result::ZipResult<usize> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut written = 0;
    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
            continue;
        };
        zip.start_file(name, options)?;
        io::copy(&mut File::open(path)?, &mut zip)?;
        written += 1;
    }

    zip.finish()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_zip_directory() {
        let dir = tempdir().unwrap();
        let chapters = dir.path().join("chapters");
        fs::create_dir(&chapters).unwrap();
        fs::write(chapters.join("002_B.txt"), "B\n\nbee").unwrap();
        fs::write(chapters.join("001_A.txt"), "A\n\nay").unwrap();
        fs::create_dir(chapters.join("nested")).unwrap();
        let archive_path = dir.path().join("out.zip");

        let written = zip_directory(&chapters, &archive_path).unwrap();
        assert_eq!(written, 2);

        let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"001_A.txt".to_string()));

        let mut content = String::new();
        archive
            .by_name("002_B.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "B\n\nbee");
    }

    #[test]
    fn test_zip_empty_directory() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("empty.zip");
        let chapters = dir.path().join("chapters");
        fs::create_dir(&chapters).unwrap();

        assert_eq!(zip_directory(&chapters, &archive_path).unwrap(), 0);
        let archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
