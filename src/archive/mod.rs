//! Where class files come from
//!
//! The comparison itself only ever sees a flat list of named class file blobs (see
//! [`ClassFileSource`]). This module has the sources the command line tool uses: JAR (zip)
//! archives, directories of class files, and plain in-memory lists.

mod directory;
mod errors;
mod filter;
mod jar;
mod memory;

pub use directory::*;
pub use errors::*;
pub use filter::*;
pub use jar::*;
pub use memory::*;

use std::collections::HashMap;
use std::path::Path;

/// Contents of a class file along with the name of the class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBytes {
    /// Binary name of the class, derived from the entry path (eg. `java/util/Map$Entry`)
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ClassBytes {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> ClassBytes {
        ClassBytes {
            name: name.into(),
            bytes,
        }
    }
}

/// Anything that can list class files
pub trait ClassFileSource {
    /// Human readable description of the source (eg. a path)
    fn description(&self) -> String;

    /// Read all of the class files, in listing order
    ///
    /// The same name may show up more than once.
    fn read_classes(&mut self) -> Result<Vec<ClassBytes>, Error>;
}

/// Open a JAR archive or a directory of class files
pub fn open_source(
    path: &Path,
    filter: &EntryFilter,
) -> Result<Box<dyn ClassFileSource + Send>, Error> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        Ok(Box::new(DirectorySource::new(path, filter.clone())))
    } else {
        Ok(Box::new(JarSource::new(path, filter.clone())))
    }
}

/// Gathers class files from entry paths, applying extension precedence
///
/// When the same class is found under several extensions, the one whose extension comes first in
/// the filter wins, and keeps the position of whichever was seen first.
struct ClassCollector<'f> {
    filter: &'f EntryFilter,
    classes: Vec<ClassBytes>,

    /// Position in `classes` and extension rank of every name seen so far
    seen: HashMap<String, (usize, usize)>,
}

impl<'f> ClassCollector<'f> {
    fn new(filter: &'f EntryFilter) -> ClassCollector<'f> {
        ClassCollector {
            filter,
            classes: vec![],
            seen: HashMap::new(),
        }
    }

    /// Add an entry, calling `read` only if the entry is wanted
    fn add<F>(&mut self, path: &str, read: F) -> Result<(), Error>
    where
        F: FnOnce() -> Result<Vec<u8>, Error>,
    {
        let (name, rank) = match self.filter.classify_path(path) {
            Some(class) => class,
            None => {
                log::trace!("Skipping entry {}", path);
                return Ok(());
            }
        };

        match self.seen.get(&name).copied() {
            Some((position, seen_rank)) if rank < seen_rank => {
                log::trace!("Entry {} takes precedence for class {}", path, name);
                self.classes[position].bytes = read()?;
                self.seen.insert(name, (position, rank));
            }
            Some((_, seen_rank)) if rank > seen_rank => {
                log::trace!("Skipping entry {} shadowed by another extension", path);
            }
            seen => {
                if seen.is_none() {
                    self.seen.insert(name.clone(), (self.classes.len(), rank));
                }
                let bytes = read()?;
                self.classes.push(ClassBytes { name, bytes });
            }
        }
        Ok(())
    }

    fn finish(self) -> Vec<ClassBytes> {
        self.classes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn class_extension_wins_over_alias() {
        let filter = EntryFilter::default().with_class_extension("clazz");
        let mut collector = ClassCollector::new(&filter);
        collector.add("a/B.clazz", || Ok(vec![1])).unwrap();
        collector.add("a/C.class", || Ok(vec![2])).unwrap();
        collector.add("a/B.class", || Ok(vec![3])).unwrap();
        collector.add("a/C.clazz", || panic!("shadowed entry read")).unwrap();
        collector.add("META-INF/MANIFEST.MF", || panic!("non-class read")).unwrap();

        assert_eq!(
            collector.finish(),
            vec![ClassBytes::new("a/B", vec![3]), ClassBytes::new("a/C", vec![2])]
        );
    }

    #[test]
    fn missing_path() {
        let missing = Path::new("definitely/not/here.jar");
        assert!(matches!(
            open_source(missing, &EntryFilter::default()),
            Err(Error::NotFound(path)) if path == missing
        ));
    }
}
