//! Capability-based file helpers built on `cap-std` and `camino`.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

use crate::CliError;

/// Open the parent directory of `path` and return it with the file name.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    let metadata =
        open_dir_and_file(path).and_then(|(dir, name)| dir.metadata(name.as_str()));
    match metadata {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `contents` to `file_name` inside `dir`, returning the written path.
pub(crate) fn write_into_dir(
    dir: &Utf8Path,
    file_name: &str,
    contents: &[u8],
) -> Result<Utf8PathBuf, CliError> {
    let handle = fs_utf8::Dir::open_ambient_dir(dir, ambient_authority()).map_err(|source| {
        CliError::OpenOutputDirectory {
            path: dir.to_path_buf(),
            source,
        }
    })?;
    handle
        .write(file_name, contents)
        .map_err(CliError::WriteOutput)?;
    Ok(dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 tempdir")
    }

    #[rstest]
    fn missing_file_is_reported() {
        let tmp = TempDir::new().expect("tempdir");
        let path = utf8_root(&tmp).join("spots.json");

        let err = require_existing_file(&path, "records").expect_err("missing file");

        assert!(matches!(err, CliError::MissingSourceFile { field: "records", .. }));
    }

    #[rstest]
    fn directory_is_not_a_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = utf8_root(&tmp).join("spots");
        std::fs::create_dir(&path).expect("create dir");

        let err = require_existing_file(&path, "records").expect_err("directory");

        assert!(matches!(err, CliError::SourcePathNotFile { .. }));
    }

    #[rstest]
    fn writes_into_existing_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let root = utf8_root(&tmp);

        let written = write_into_dir(&root, "chile.json", b"{}").expect("write");

        assert_eq!(written, root.join("chile.json"));
        assert_eq!(std::fs::read(&written).expect("read back"), b"{}");
        require_existing_file(&written, "output").expect("file exists");
    }

    #[rstest]
    fn missing_output_directory_is_reported() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = utf8_root(&tmp).join("nope");

        let err = write_into_dir(&missing, "chile.json", b"{}").expect_err("missing dir");

        assert!(matches!(err, CliError::OpenOutputDirectory { .. }));
    }
}
