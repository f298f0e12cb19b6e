use super::{ClassCursor, Deserialize, Error, Serialize};
use byteorder::WriteBytesExt;
use std::fmt;

/// Version of the class file, which is used to verify that the JVM has the
/// necessary features to interpret the class
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Copy, Clone, serde::Serialize)]
pub struct Version {
    pub major_version: u16,
    pub minor_version: u16,
}

impl Version {
    /// Major versions of Java releases are offset by this much (Java 8 is `52`)
    const JAVA_RELEASE_OFFSET: u16 = 44;

    /// JVM class file version corresponding to JDK 1.1 (the oldest readable format)
    pub const JAVA1_1: Version = Version {
        major_version: 45,
        minor_version: 3,
    };

    /// JVM class file version corresponding to Java SE 8 (released March 2014)
    pub const JAVA8: Version = Version {
        major_version: 52,
        minor_version: 0,
    };

    /// JVM class file version corresponding to Java SE 11 (released September 2018)
    pub const JAVA11: Version = Version {
        major_version: 55,
        minor_version: 0,
    };

    /// JVM class file version corresponding to Java SE 25 (released September 2025)
    pub const JAVA25: Version = Version {
        major_version: 69,
        minor_version: 0,
    };

    /// Java release that introduced this major version (`1` stands for all of JDK 1.0/1.1)
    pub fn java_release(&self) -> u16 {
        self.major_version.saturating_sub(Self::JAVA_RELEASE_OFFSET)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} (Java {})",
            self.major_version,
            self.minor_version,
            self.java_release()
        )
    }
}

impl Serialize for Version {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.minor_version.serialize(writer)?;
        self.major_version.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Version {
    const MIN_SIZE: usize = 4;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        let minor_version = cursor.read_u16()?;
        let major_version = cursor.read_u16()?;
        Ok(Version {
            major_version,
            minor_version,
        })
    }
}

/// Inclusive range of class file major versions that will be parsed
///
/// Anything outside of it fails with [`Error::UnsupportedClassVersion`] before the constant pool
/// is even looked at.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct SupportedVersions {
    pub min_major: u16,
    pub max_major: u16,
}

impl SupportedVersions {
    pub const fn new(min_major: u16, max_major: u16) -> SupportedVersions {
        SupportedVersions {
            min_major,
            max_major,
        }
    }

    pub fn contains(&self, version: Version) -> bool {
        self.min_major <= version.major_version && version.major_version <= self.max_major
    }

    pub fn is_empty(&self) -> bool {
        self.min_major > self.max_major
    }
}

impl Default for SupportedVersions {
    fn default() -> Self {
        SupportedVersions::new(
            Version::JAVA1_1.major_version,
            Version::JAVA25.major_version,
        )
    }
}

impl fmt::Display for SupportedVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min_major, self.max_major)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn describes_java_release() {
        assert_eq!(Version::JAVA8.java_release(), 8);
        assert_eq!(Version::JAVA8.to_string(), "52.0 (Java 8)");
        assert_eq!(Version::JAVA1_1.java_release(), 1);
    }

    #[test]
    fn default_range_covers_every_release() {
        let supported = SupportedVersions::default();
        assert!(supported.contains(Version::JAVA1_1));
        assert!(supported.contains(Version::JAVA11));
        assert!(!supported.contains(Version {
            major_version: 70,
            minor_version: 0
        }));
        assert!(!supported.contains(Version {
            major_version: 44,
            minor_version: 0
        }));
    }
}
