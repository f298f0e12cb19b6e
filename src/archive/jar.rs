use super::{ClassBytes, ClassCollector, ClassFileSource, EntryFilter, Error};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Class files inside of a JAR (or any other zip archive)
#[derive(Debug, Clone)]
pub struct JarSource {
    path: PathBuf,
    filter: EntryFilter,
}

impl JarSource {
    pub fn new(path: impl AsRef<Path>, filter: EntryFilter) -> JarSource {
        JarSource {
            path: path.as_ref().to_path_buf(),
            filter,
        }
    }
}

impl ClassFileSource for JarSource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn read_classes(&mut self) -> Result<Vec<ClassBytes>, Error> {
        let file = File::open(&self.path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let mut collector = ClassCollector::new(&self.filter);

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let path = entry.name().to_owned();
            collector.add(&path, || {
                let mut bytes = vec![];
                entry.read_to_end(&mut bytes)?;
                Ok(bytes)
            })?;
        }

        let classes = collector.finish();
        log::debug!("Read {} classes from {}", classes.len(), self.path.display());
        Ok(classes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    #[test]
    fn reads_class_entries_in_archive_order() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("lib.jar");
        {
            let mut writer = ZipWriter::new(File::create(&jar_path).unwrap());
            let options = FileOptions::default();
            writer.add_directory("a/", options).unwrap();
            for (name, bytes) in [
                ("a/Z.class", &[1u8][..]),
                ("META-INF/MANIFEST.MF", &b"Manifest-Version: 1.0\n"[..]),
                ("a/A.class", &[2u8, 3][..]),
            ] {
                writer.start_file(name, options).unwrap();
                writer.write_all(bytes).unwrap();
            }
            writer.finish().unwrap();
        }

        let mut source = JarSource::new(&jar_path, EntryFilter::default());
        assert_eq!(
            source.read_classes().unwrap(),
            vec![
                ClassBytes::new("a/Z", vec![1]),
                ClassBytes::new("a/A", vec![2, 3]),
            ]
        );
    }

    #[test]
    fn not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("broken.jar");
        std::fs::write(&jar_path, b"not a zip at all").unwrap();
        let mut source = JarSource::new(&jar_path, EntryFilter::default());
        assert!(matches!(source.read_classes(), Err(Error::Zip(_))));
    }
}
