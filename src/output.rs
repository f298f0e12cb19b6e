use jardiff::diff::{Change, ClassOutcome, Delta, DiffReport};
use jardiff::jvm::java_class_name;
use std::io;
use termcolor::{Color, ColorSpec, WriteColor};

/// How the report gets printed
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OutputMode {
    /// One line per class, with a symbol for its outcome
    Status,

    /// Every change, with members written out as Java declarations
    Changes,

    /// Change counts per class
    Stat,

    Json,
}

impl OutputMode {
    pub const NAMES: [&'static str; 4] = ["status", "changes", "stat", "json"];

    pub fn from_name(name: &str) -> Option<OutputMode> {
        match name {
            "status" => Some(OutputMode::Status),
            "changes" => Some(OutputMode::Changes),
            "stat" => Some(OutputMode::Stat),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }
}

pub fn write_report<W: WriteColor>(
    out: &mut W,
    report: &DiffReport,
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Status => write_status(out, report),
        OutputMode::Changes => write_changes(out, report),
        OutputMode::Stat => write_stat(out, report),
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)
        }
    }
}

fn write_status<W: WriteColor>(out: &mut W, report: &DiffReport) -> io::Result<()> {
    for entry in &report.entries {
        let (color, symbol) = match &entry.outcome {
            ClassOutcome::Compared { changes } if changes.is_empty() => (Color::Green, "✔"),
            ClassOutcome::Compared { .. } => (Color::Yellow, "⨯"),
            ClassOutcome::Failed { .. } => (Color::Red, "!"),
            ClassOutcome::Incomplete => (Color::Magenta, "?"),
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        write!(out, "{}", symbol)?;
        out.reset()?;
        writeln!(out, " {}", java_class_name(&entry.name))?;
    }
    Ok(())
}

fn write_changes<W: WriteColor>(out: &mut W, report: &DiffReport) -> io::Result<()> {
    for entry in &report.entries {
        match &entry.outcome {
            ClassOutcome::Compared { changes } if changes.is_empty() => continue,
            ClassOutcome::Compared { changes } => {
                write_class_name(out, &entry.name)?;
                writeln!(out)?;
                for change in changes {
                    write_change(out, change)?;
                }
            }
            ClassOutcome::Failed { side, error } => {
                write_class_name(out, &entry.name)?;
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(out, " failed to parse {} class: {}", side, error)?;
                out.reset()?;
            }
            ClassOutcome::Incomplete => {
                write_class_name(out, &entry.name)?;
                out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
                writeln!(out, " comparison did not finish")?;
                out.reset()?;
            }
        }
    }
    Ok(())
}

fn write_class_name<W: WriteColor>(out: &mut W, name: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{}", java_class_name(name))?;
    out.reset()
}

fn write_change<W: WriteColor>(out: &mut W, change: &Change) -> io::Result<()> {
    let (color, symbol) = match change {
        Change::Added { .. } => (Color::Green, '+'),
        Change::Removed { .. } => (Color::Red, '-'),
        Change::Modified { .. } => (Color::Yellow, '~'),
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "  {} ", symbol)?;
    out.reset()?;
    write!(out, "{}", change.subject().java_declaration())?;

    let classification = change.classification();
    if !classification.is_source_declared() {
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        write!(out, " [{}]", classification)?;
        out.reset()?;
    }
    writeln!(out)?;

    if let Change::Modified { deltas, .. } = change {
        for delta in deltas {
            out.set_color(ColorSpec::new().set_dimmed(true))?;
            writeln!(out, "      {}", describe_delta(delta))?;
            out.reset()?;
        }
    }
    Ok(())
}

fn write_stat<W: WriteColor>(out: &mut W, report: &DiffReport) -> io::Result<()> {
    for entry in &report.entries {
        let changes = match &entry.outcome {
            ClassOutcome::Compared { changes } if !changes.is_empty() => changes,
            _ => continue,
        };
        let (mut added, mut removed, mut modified) = (0, 0, 0);
        for change in changes {
            match change {
                Change::Added { .. } => added += 1,
                Change::Removed { .. } => removed += 1,
                Change::Modified { .. } => modified += 1,
            }
        }

        write!(out, "{} ", java_class_name(&entry.name))?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "+{}", added)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(out, " -{}", removed)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, " ~{}", modified)?;
        out.reset()?;
        writeln!(out)?;
    }
    writeln!(out, "{}", report.summary())
}

fn describe_delta(delta: &Delta) -> String {
    match delta {
        Delta::AccessFlags { added, removed } => {
            format!("access flags: {}", added_removed(added, removed))
        }
        Delta::Signature { old, new } => {
            format!("signature: {} -> {}", or_none(old), or_none(new))
        }
        Delta::Exceptions { added, removed } => {
            let added: Vec<String> = added.iter().map(|e| java_class_name(e)).collect();
            let removed: Vec<String> = removed.iter().map(|e| java_class_name(e)).collect();
            format!("exceptions: {}", added_removed(&added, &removed))
        }
        Delta::ConstantValue { old, new } => {
            format!("constant value: {} -> {}", or_none(old), or_none(new))
        }
        Delta::Deprecated { new, .. } => {
            if *new {
                String::from("deprecated")
            } else {
                String::from("no longer deprecated")
            }
        }
        Delta::SuperClass { old, new } => format!(
            "superclass: {} -> {}",
            old.as_deref().map_or_else(|| String::from("none"), java_class_name),
            new.as_deref().map_or_else(|| String::from("none"), java_class_name),
        ),
        Delta::Interfaces { added, removed } => {
            let added: Vec<String> = added.iter().map(|i| java_class_name(i)).collect();
            let removed: Vec<String> = removed.iter().map(|i| java_class_name(i)).collect();
            format!("interfaces: {}", added_removed(&added, &removed))
        }
        Delta::Version { old, new } => format!("class file version: {} -> {}", old, new),
        Delta::OuterClass { old, new } => format!(
            "outer class: {} -> {}",
            old.as_deref().map_or_else(|| String::from("none"), java_class_name),
            new.as_deref().map_or_else(|| String::from("none"), java_class_name),
        ),
    }
}

fn added_removed<S: AsRef<str>>(added: &[S], removed: &[S]) -> String {
    added
        .iter()
        .map(|s| format!("+{}", s.as_ref()))
        .chain(removed.iter().map(|s| format!("-{}", s.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("none")
}

#[cfg(test)]
mod test {
    use super::*;
    use jardiff::diff::{ClassEntry, Side};
    use jardiff::jvm::{ClassFileDefect, Error};
    use termcolor::NoColor;

    fn render(report: &DiffReport, mode: OutputMode) -> String {
        let mut out = NoColor::new(vec![]);
        write_report(&mut out, report, mode).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    fn report() -> DiffReport {
        DiffReport {
            entries: vec![
                ClassEntry {
                    name: String::from("a/Same"),
                    outcome: ClassOutcome::Compared { changes: vec![] },
                },
                ClassEntry {
                    name: String::from("a/Broken"),
                    outcome: ClassOutcome::Failed {
                        side: Side::New,
                        error: Error::MalformedClassFile(ClassFileDefect::TrailingBytes(3)),
                    },
                },
            ],
        }
    }

    #[test]
    fn status_lines() {
        assert_eq!(render(&report(), OutputMode::Status), "✔ a.Same\n! a.Broken\n");
    }

    #[test]
    fn stat_ends_with_summary() {
        assert_eq!(
            render(&report(), OutputMode::Stat),
            "1 classes compared, 1 classes failed to parse\n"
        );
    }

    #[test]
    fn deltas() {
        let delta = Delta::AccessFlags {
            added: vec!["final"],
            removed: vec!["static", "volatile"],
        };
        assert_eq!(describe_delta(&delta), "access flags: +final -static -volatile");

        let delta = Delta::SuperClass {
            old: Some(String::from("java/lang/Object")),
            new: Some(String::from("a/Base")),
        };
        assert_eq!(describe_delta(&delta), "superclass: java.lang.Object -> a.Base");
    }

    #[test]
    fn mode_names() {
        for name in OutputMode::NAMES {
            assert!(OutputMode::from_name(name).is_some());
        }
        assert_eq!(OutputMode::from_name("verbose"), None);
    }
}
