use super::{ClassBytes, ClassCollector, ClassFileSource, EntryFilter, Error};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Class files under a directory (eg. a `target/classes` build output)
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    filter: EntryFilter,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>, filter: EntryFilter) -> DirectorySource {
        DirectorySource {
            root: root.as_ref().to_path_buf(),
            filter,
        }
    }
}

impl ClassFileSource for DirectorySource {
    fn description(&self) -> String {
        self.root.display().to_string()
    }

    /// Files are listed in lexicographic order of their paths, so the result does not depend on
    /// the order the file system happens to return entries in
    fn read_classes(&mut self) -> Result<Vec<ClassBytes>, Error> {
        let mut collector = ClassCollector::new(&self.filter);

        for entry in WalkDir::new(&self.root).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            // Entry paths always use `/`, like inside of archives
            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let path = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            collector.add(&path, || Ok(fs::read(entry.path())?))?;
        }

        let classes = collector.finish();
        log::debug!("Read {} classes from {}", classes.len(), self.root.display());
        Ok(classes)
    }
}
