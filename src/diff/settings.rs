use super::{Error, SettingsDefect};
use crate::jvm::SupportedVersions;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct DiffSettings {
    /// Report compiler synthetic members and bridge methods too
    ///
    /// These are left out by default: they come and go with unrelated source changes (eg. adding
    /// a nested class that reads a private field adds an `access$000` method to the outer class).
    pub include_synthetics: bool,

    /// Maximum number of classes compared at the same time
    pub parallelism: usize,

    /// Class file major versions that will be read (anything else fails that class)
    pub supported_versions: SupportedVersions,

    /// How long to wait for all comparisons before giving up on the remaining ones
    ///
    /// Classes whose comparison did not finish in time are reported as incomplete.
    pub timeout: Option<Duration>,
}

impl DiffSettings {
    /// Check that the settings can be used for comparing anything at all
    pub fn validate(&self) -> Result<(), Error> {
        if self.parallelism == 0 {
            return Err(Error::InvalidSettings(SettingsDefect::ZeroParallelism));
        }
        if self.supported_versions.is_empty() {
            return Err(Error::InvalidSettings(SettingsDefect::EmptyVersionRange(
                self.supported_versions,
            )));
        }
        Ok(())
    }
}

impl Default for DiffSettings {
    fn default() -> DiffSettings {
        DiffSettings {
            include_synthetics: false,
            parallelism: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            supported_versions: SupportedVersions::default(),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = DiffSettings::default();
        assert!(settings.parallelism >= 1);
        assert!(!settings.include_synthetics);
        assert_eq!(settings.supported_versions, SupportedVersions::new(45, 69));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_settings() {
        let settings = DiffSettings {
            parallelism: 0,
            ..DiffSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(Error::InvalidSettings(SettingsDefect::ZeroParallelism))
        ));

        let settings = DiffSettings {
            supported_versions: SupportedVersions::new(60, 52),
            ..DiffSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(Error::InvalidSettings(SettingsDefect::EmptyVersionRange(range)))
                if range == SupportedVersions::new(60, 52)
        ));
    }
}
