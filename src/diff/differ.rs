use super::{
    added_class, diff_classes, removed_class, ClassEntry, ClassOutcome, ClassifiedClass,
    DiffReport, DiffSettings, Error, Side,
};
use crate::archive::{ClassBytes, ClassFileSource};
use crate::jvm::{ClassDescriptor, SupportedVersions};
use crossbeam_channel::RecvTimeoutError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::time::Instant;

/// Compares sets of classes
///
/// Every class name is compared independently on a pool of worker threads. Results are put back
/// in encounter order, so the report doesn't depend on which comparisons finish first.
pub struct Differ {
    settings: DiffSettings,
    pool: ThreadPool,
}

/// One class to compare, owning the bytes for both sides
struct Job {
    index: usize,
    name: String,
    old: Option<Vec<u8>>,
    new: Option<Vec<u8>>,
}

impl Differ {
    /// Validate the settings and start the worker threads
    pub fn new(settings: DiffSettings) -> Result<Differ, Error> {
        settings.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.parallelism)
            .thread_name(|i| format!("jardiff-worker-{}", i))
            .build()?;
        Ok(Differ { settings, pool })
    }

    /// Read both sources, then compare them
    pub fn diff_sources<O, N>(&self, old: &mut O, new: &mut N) -> Result<DiffReport, Error>
    where
        O: ClassFileSource + ?Sized,
        N: ClassFileSource + ?Sized,
    {
        let old_classes = old.read_classes()?;
        let new_classes = new.read_classes()?;
        log::info!(
            "Comparing {} classes in {} with {} classes in {}",
            old_classes.len(),
            old.description(),
            new_classes.len(),
            new.description()
        );
        Ok(self.diff_classes(old_classes, new_classes))
    }

    /// Compare two lists of classes
    ///
    /// Classes are matched up by name. If the same name shows up more than once on one side,
    /// only the first one is used.
    pub fn diff_classes(&self, old: Vec<ClassBytes>, new: Vec<ClassBytes>) -> DiffReport {
        let (old_names, mut old_classes) = deduplicate(old, Side::Old);
        let (new_names, mut new_classes) = deduplicate(new, Side::New);

        // Names from the old side first, then names only found on the new side
        let mut names = vec![];
        let mut jobs = vec![];
        for name in old_names.into_iter().chain(new_names) {
            let old = old_classes.remove(&name);
            let new = new_classes.remove(&name);
            if old.is_none() && new.is_none() {
                continue;
            }
            jobs.push(Job {
                index: names.len(),
                name: name.clone(),
                old,
                new,
            });
            names.push(name);
        }

        let outcomes = self.run_jobs(jobs, names.len());
        let entries = names
            .into_iter()
            .zip(outcomes)
            .map(|(name, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    log::warn!("Comparison of {} did not finish in time", name);
                    ClassOutcome::Incomplete
                });
                ClassEntry { name, outcome }
            })
            .collect();
        DiffReport { entries }
    }

    /// Run the comparisons on the pool, slotting the results by job index
    ///
    /// Slots left empty are comparisons that did not report back before the deadline.
    fn run_jobs(&self, jobs: Vec<Job>, count: usize) -> Vec<Option<ClassOutcome>> {
        let mut outcomes: Vec<Option<ClassOutcome>> = (0..count).map(|_| None).collect();
        if count == 0 {
            return outcomes;
        }

        let deadline = self.settings.timeout.map(|timeout| Instant::now() + timeout);
        let include_synthetics = self.settings.include_synthetics;
        let supported = self.settings.supported_versions;

        let (sender, receiver) = crossbeam_channel::unbounded();
        for job in jobs {
            let sender = sender.clone();
            self.pool.spawn(move || {
                let outcome = compare(&job.name, job.old, job.new, &supported, include_synthetics);
                // The receiver is gone if the deadline already passed
                let _ = sender.send((job.index, outcome));
            });
        }
        drop(sender);

        let mut received = 0;
        while received < count {
            let result = match deadline {
                Some(deadline) => receiver.recv_deadline(deadline),
                None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match result {
                Ok((index, outcome)) => {
                    outcomes[index] = Some(outcome);
                    received += 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Timed out with {} of {} comparisons unfinished",
                        count - received,
                        count
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        outcomes
    }
}

/// Keep the first class with any given name, remembering the order names were first seen in
fn deduplicate(classes: Vec<ClassBytes>, side: Side) -> (Vec<String>, HashMap<String, Vec<u8>>) {
    let mut names = Vec::with_capacity(classes.len());
    let mut by_name = HashMap::with_capacity(classes.len());
    for ClassBytes { name, bytes } in classes {
        if by_name.contains_key(&name) {
            log::warn!("Ignoring duplicate {} class {}", side, name);
            continue;
        }
        names.push(name.clone());
        by_name.insert(name, bytes);
    }
    (names, by_name)
}

/// Compare one class
fn compare(
    name: &str,
    old: Option<Vec<u8>>,
    new: Option<Vec<u8>>,
    supported: &SupportedVersions,
    include_synthetics: bool,
) -> ClassOutcome {
    let parse = |bytes: &[u8], side: Side| {
        ClassDescriptor::parse(bytes, supported)
            .map(ClassifiedClass::new)
            .map_err(|error| {
                log::warn!("Failed to parse {} version of {}: {}", side, name, error);
                ClassOutcome::Failed { side, error }
            })
    };

    let result = match (old, new) {
        (Some(old), Some(new)) => parse(&old, Side::Old).and_then(|old| {
            let new = parse(&new, Side::New)?;
            log::debug!("Comparing class {}", name);
            Ok(diff_classes(&old, &new, include_synthetics))
        }),
        (Some(old), None) => {
            parse(&old, Side::Old).map(|old| removed_class(&old, include_synthetics))
        }
        (None, Some(new)) => {
            parse(&new, Side::New).map(|new| added_class(&new, include_synthetics))
        }
        (None, None) => Ok(vec![]),
    };

    match result {
        Ok(changes) => ClassOutcome::Compared { changes },
        Err(failed) => failed,
    }
}
