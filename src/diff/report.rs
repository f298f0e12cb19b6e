use super::Change;
use crate::jvm;
use serde::{Serialize, Serializer};
use std::fmt;

/// Which of the two versions being compared
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Old => "old",
            Side::New => "new",
        })
    }
}

/// Result of comparing one class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ClassOutcome {
    /// Both sides could be read (an empty list means no differences)
    Compared { changes: Vec<Change> },

    /// The class file on one side could not be read
    Failed {
        side: Side,
        #[serde(serialize_with = "serialize_display")]
        error: jvm::Error,
    },

    /// The comparison did not finish before the timeout
    Incomplete,
}

impl ClassOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, ClassOutcome::Compared { changes } if !changes.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassEntry {
    /// Binary name of the class (eg. `java/util/Map$Entry`)
    pub name: String,

    #[serde(flatten)]
    pub outcome: ClassOutcome,
}

/// Outcome of comparing two sets of classes
///
/// Entries are in encounter order: classes of the old version in the order they were listed,
/// followed by the classes that only exist in the new version.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DiffReport {
    pub entries: Vec<ClassEntry>,
}

impl DiffReport {
    /// Look up the entry for a class
    pub fn get(&self, name: &str) -> Option<&ClassOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.outcome)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            match &entry.outcome {
                ClassOutcome::Compared { changes } => {
                    summary.compared += 1;
                    if !changes.is_empty() {
                        summary.changed += 1;
                    }
                }
                ClassOutcome::Failed { .. } => summary.failed += 1,
                ClassOutcome::Incomplete => summary.incomplete += 1,
            }
        }
        summary
    }

    /// Iterate over the classes that could not be read, along with the reason why
    pub fn failures(&self) -> impl Iterator<Item = (&str, Side, &jvm::Error)> + '_ {
        self.entries.iter().filter_map(|entry| match &entry.outcome {
            ClassOutcome::Failed { side, error } => Some((entry.name.as_str(), *side, error)),
            _ => None,
        })
    }
}

/// Counts of classes by outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    /// Classes that could be read on every side they exist on (changed or not)
    ///
    /// This includes classes only found in one version, which show up as a single addition or
    /// removal.
    pub compared: usize,

    /// Compared classes with at least one change
    pub changed: usize,

    pub failed: usize,
    pub incomplete: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} classes compared, {} classes failed to parse",
            self.compared, self.failed
        )?;
        if self.incomplete > 0 {
            write!(f, ", {} classes incomplete", self.incomplete)?;
        }
        Ok(())
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::ClassFileDefect;

    #[test]
    fn summary_counts_outcomes() {
        let report = DiffReport {
            entries: vec![
                ClassEntry {
                    name: String::from("a/Same"),
                    outcome: ClassOutcome::Compared { changes: vec![] },
                },
                ClassEntry {
                    name: String::from("a/Broken"),
                    outcome: ClassOutcome::Failed {
                        side: Side::New,
                        error: jvm::Error::MalformedClassFile(ClassFileDefect::BadMagic(0)),
                    },
                },
                ClassEntry {
                    name: String::from("a/Slow"),
                    outcome: ClassOutcome::Incomplete,
                },
            ],
        };
        let summary = report.summary();
        assert_eq!(
            summary,
            Summary {
                compared: 1,
                changed: 0,
                failed: 1,
                incomplete: 1,
            }
        );
        assert_eq!(
            summary.to_string(),
            "1 classes compared, 1 classes failed to parse, 1 classes incomplete"
        );
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.get("a/Slow"), Some(&ClassOutcome::Incomplete));
        assert_eq!(report.get("a/Missing"), None);
    }

    #[test]
    fn failed_entries_serialize_their_message() {
        let entry = ClassEntry {
            name: String::from("a/Broken"),
            outcome: ClassOutcome::Failed {
                side: Side::Old,
                error: jvm::Error::MalformedClassFile(ClassFileDefect::BadMagic(0xCAFE_D00D)),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "a/Broken",
                "outcome": "failed",
                "side": "old",
                "error": "malformed class file: bad magic 0xCAFED00D",
            })
        );
    }
}
