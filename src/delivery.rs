//! Handing finished results to the output folder.

use std::io;
use std::io::{Seek, Write};
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Move a file or directory into `dest_folder`, keeping its name.
///
/// The output folder is typically on a different mount than the scratch
/// space, so a failed rename falls back to copy-and-remove.
pub(crate) fn move_into(path: &Utf8Path, dest_folder: &Utf8Path) -> io::Result<Utf8PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let dest = dest_folder.join(file_name);
    match fs_err::rename(path.as_std_path(), dest.as_std_path()) {
        Ok(()) => Ok(dest),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            if path.is_dir() {
                copy_dir_recursive(path.as_std_path(), dest.as_std_path())?;
                fs_err::remove_dir_all(path.as_std_path())?;
            } else {
                fs_err::copy(path.as_std_path(), dest.as_std_path())?;
                fs_err::remove_file(path.as_std_path())?;
            }
            Ok(dest)
        }
        Err(e) => Err(e),
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    fs_err::create_dir_all(dest)?;
    for entry in fs_err::read_dir(src)? {
        let entry = entry?;
        let dest_path = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest_path)?;
        } else {
            fs_err::copy(entry.path(), dest_path)?;
        }
    }
    Ok(())
}

/// Zip `dir` into the archive file `dest`.
///
/// Entries are prefixed with the directory's own name so the archive
/// unpacks to a single BIDS root, and visited in sorted order so the same
/// tree always produces the same listing.
pub(crate) fn zip_dir(dir: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    let root = dir
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "directory has no name"))?;
    let file = fs_err::File::create(dest.as_std_path())?;
    let mut zip = ZipWriter::new(file);
    add_dir_entries(&mut zip, dir, Utf8Path::new(root), SimpleFileOptions::default())?;
    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

fn add_dir_entries<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    dir: &Utf8Path,
    prefix: &Utf8Path,
    options: SimpleFileOptions,
) -> io::Result<()> {
    zip.add_directory(format!("{prefix}/"), options)
        .map_err(io::Error::other)?;
    let mut entries: Vec<Utf8PathBuf> = fs_err::read_dir(dir.as_std_path())?
        .map(|entry| {
            entry.and_then(|e| {
                Utf8PathBuf::from_path_buf(e.path())
                    .map_err(|_| io::Error::other("non-UTF-8 file name in result tree"))
            })
        })
        .collect::<io::Result<_>>()?;
    entries.sort();
    for path in entries {
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "entry has no name"))?;
        let entry_name = prefix.join(name);
        if path.is_dir() {
            add_dir_entries(zip, &path, &entry_name, options)?;
        } else {
            zip.start_file(entry_name.as_str(), options)
                .map_err(io::Error::other)?;
            let mut file = fs_err::File::open(path.as_std_path())?;
            io::copy(&mut file, zip)?;
        }
    }
    Ok(())
}

/// Drop an empty placeholder with a DICOM extension next to the archive.
///
/// The routing platform only dispatches an output folder once it sees a
/// file it recognizes as an image.
pub(crate) fn write_trigger(dir: &Utf8Path, result_name: &str) -> io::Result<Utf8PathBuf> {
    let path = dir.join(format!("{result_name}.dcm"));
    fs_err::write(path.as_std_path(), b"")?;
    Ok(path)
}
