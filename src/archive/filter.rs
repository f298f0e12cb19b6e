use super::Error;
use glob::Pattern;

/// Which archive entries are class files worth comparing
#[derive(Debug, Clone)]
pub struct EntryFilter {
    /// Entries with paths matching any of these are skipped
    excludes: Vec<Pattern>,

    /// Extensions of class files (without the dot), in order of precedence
    class_extensions: Vec<String>,
}

impl EntryFilter {
    /// Skip entries whose path matches a glob pattern (eg. `META-INF/**` or `**/package-info.class`)
    pub fn exclude(mut self, pattern: &str) -> Result<EntryFilter, Error> {
        let compiled = Pattern::new(pattern).map_err(|err| Error::Pattern {
            pattern: pattern.to_owned(),
            err,
        })?;
        self.excludes.push(compiled);
        Ok(self)
    }

    /// Treat files with this extension as class files too
    ///
    /// `.class` itself always takes precedence over added extensions.
    pub fn with_class_extension(mut self, extension: &str) -> EntryFilter {
        let extension = extension.trim_start_matches('.');
        if !extension.is_empty() && !self.class_extensions.iter().any(|e| e == extension) {
            self.class_extensions.push(extension.to_owned());
        }
        self
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excludes.iter().any(|pattern| pattern.matches(path))
    }

    /// Class name and extension rank of an entry (`None` for excluded and non-class entries)
    pub fn classify_path(&self, path: &str) -> Option<(String, usize)> {
        if self.is_excluded(path) {
            return None;
        }
        self.class_extensions
            .iter()
            .enumerate()
            .find_map(|(rank, extension)| {
                let stem = path.strip_suffix(extension.as_str())?.strip_suffix('.')?;
                if stem.is_empty() || stem.ends_with('/') {
                    None
                } else {
                    Some((stem.to_owned(), rank))
                }
            })
    }
}

impl Default for EntryFilter {
    fn default() -> EntryFilter {
        EntryFilter {
            excludes: vec![],
            class_extensions: vec![String::from("class")],
        }
    }
}
