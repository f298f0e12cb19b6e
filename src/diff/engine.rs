use super::{classify, Change, ClassHeader, Classification, Classifications, Delta, Subject};
use crate::jvm::{AccessFlagNames, ClassDescriptor, FieldDescriptor, Member, MethodDescriptor};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Class descriptor along with the classification of it and its members
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedClass {
    pub descriptor: ClassDescriptor,
    pub classifications: Classifications,
}

impl ClassifiedClass {
    pub fn new(descriptor: ClassDescriptor) -> ClassifiedClass {
        let classifications = classify(&descriptor);
        ClassifiedClass {
            descriptor,
            classifications,
        }
    }
}

/// Compare two versions of the same class
///
/// The class header comes first (at most one change), then fields, then methods. Within fields
/// and within methods, removals are listed in the order of the old class, followed by additions
/// and modifications in the order of the new class.
///
/// Members are matched by name and descriptor, so a member whose type changes shows up as one
/// removal and one addition. Unless `include_synthetics` is set, changes to members that are not
/// source declared are dropped (a modification is kept if either side is source declared).
pub fn diff_classes(
    old: &ClassifiedClass,
    new: &ClassifiedClass,
    include_synthetics: bool,
) -> Vec<Change> {
    let mut changes = vec![];

    let header_deltas = header_deltas(&old.descriptor, &new.descriptor);
    if !header_deltas.is_empty() {
        let old_classification = old.classifications.class();
        let new_classification = new.classifications.class();
        if include_synthetics
            || old_classification.is_source_declared()
            || new_classification.is_source_declared()
        {
            changes.push(Change::Modified {
                old: Subject::Class(ClassHeader::of(&old.descriptor)),
                new: Subject::Class(ClassHeader::of(&new.descriptor)),
                deltas: header_deltas,
                classification: new_classification,
            });
        }
    }

    diff_members(
        &old.descriptor.fields,
        &old.classifications,
        &new.descriptor.fields,
        &new.classifications,
        include_synthetics,
        &mut changes,
    );
    diff_members(
        &old.descriptor.methods,
        &old.classifications,
        &new.descriptor.methods,
        &new.classifications,
        include_synthetics,
        &mut changes,
    );

    changes
}

/// Changes for a class only present in the new version (no descent into members)
pub fn added_class(new: &ClassifiedClass, include_synthetics: bool) -> Vec<Change> {
    let classification = new.classifications.class();
    if include_synthetics || classification.is_source_declared() {
        vec![Change::Added {
            subject: Subject::Class(ClassHeader::of(&new.descriptor)),
            classification,
        }]
    } else {
        vec![]
    }
}

/// Changes for a class only present in the old version (no descent into members)
pub fn removed_class(old: &ClassifiedClass, include_synthetics: bool) -> Vec<Change> {
    let classification = old.classifications.class();
    if include_synthetics || classification.is_source_declared() {
        vec![Change::Removed {
            subject: Subject::Class(ClassHeader::of(&old.descriptor)),
            classification,
        }]
    } else {
        vec![]
    }
}

/// Members which can be compared once matched up by name and descriptor
trait Comparable: Member + Clone {
    fn subject(&self) -> Subject;

    fn deltas(&self, new: &Self) -> Vec<Delta>;
}

impl Comparable for FieldDescriptor {
    fn subject(&self) -> Subject {
        Subject::Field(self.clone())
    }

    fn deltas(&self, new: &FieldDescriptor) -> Vec<Delta> {
        let mut deltas = vec![];
        if let Some(delta) = access_flags_delta(self.access_flags, new.access_flags) {
            deltas.push(delta);
        }
        if self.signature != new.signature {
            deltas.push(Delta::Signature {
                old: self.signature.clone(),
                new: new.signature.clone(),
            });
        }
        if self.constant_value != new.constant_value {
            deltas.push(Delta::ConstantValue {
                old: self.constant_value.clone(),
                new: new.constant_value.clone(),
            });
        }
        if self.deprecated != new.deprecated {
            deltas.push(Delta::Deprecated {
                old: self.deprecated,
                new: new.deprecated,
            });
        }
        deltas
    }
}

impl Comparable for MethodDescriptor {
    fn subject(&self) -> Subject {
        Subject::Method(self.clone())
    }

    fn deltas(&self, new: &MethodDescriptor) -> Vec<Delta> {
        let mut deltas = vec![];
        if let Some(delta) = access_flags_delta(self.access_flags, new.access_flags) {
            deltas.push(delta);
        }
        if self.signature != new.signature {
            deltas.push(Delta::Signature {
                old: self.signature.clone(),
                new: new.signature.clone(),
            });
        }
        let (added, removed) = set_difference(&self.exceptions, &new.exceptions);
        if !added.is_empty() || !removed.is_empty() {
            deltas.push(Delta::Exceptions { added, removed });
        }
        if self.deprecated != new.deprecated {
            deltas.push(Delta::Deprecated {
                old: self.deprecated,
                new: new.deprecated,
            });
        }
        deltas
    }
}

fn diff_members<M: Comparable>(
    old_members: &[M],
    old_classifications: &Classifications,
    new_members: &[M],
    new_classifications: &Classifications,
    include_synthetics: bool,
    changes: &mut Vec<Change>,
) {
    let keep = |classification: Classification| {
        include_synthetics || classification.is_source_declared()
    };

    let new_keys: HashSet<(&str, &str)> = new_members
        .iter()
        .map(|member| (member.name(), member.descriptor()))
        .collect();
    for old_member in old_members {
        if !new_keys.contains(&(old_member.name(), old_member.descriptor())) {
            let classification = old_classifications.of(old_member);
            if keep(classification) {
                changes.push(Change::Removed {
                    subject: old_member.subject(),
                    classification,
                });
            }
        }
    }

    let old_by_key: HashMap<(&str, &str), &M> = old_members
        .iter()
        .map(|member| ((member.name(), member.descriptor()), member))
        .collect();
    for new_member in new_members {
        let classification = new_classifications.of(new_member);
        match old_by_key.get(&(new_member.name(), new_member.descriptor())) {
            None => {
                if keep(classification) {
                    changes.push(Change::Added {
                        subject: new_member.subject(),
                        classification,
                    });
                }
            }
            Some(old_member) => {
                let deltas = old_member.deltas(new_member);
                if deltas.is_empty() {
                    continue;
                }
                if keep(classification) || keep(old_classifications.of(*old_member)) {
                    changes.push(Change::Modified {
                        old: old_member.subject(),
                        new: new_member.subject(),
                        deltas,
                        classification,
                    });
                }
            }
        }
    }
}

fn header_deltas(old: &ClassDescriptor, new: &ClassDescriptor) -> Vec<Delta> {
    let mut deltas = vec![];
    if let Some(delta) = access_flags_delta(old.access_flags, new.access_flags) {
        deltas.push(delta);
    }
    if old.super_class != new.super_class {
        deltas.push(Delta::SuperClass {
            old: old.super_class.clone(),
            new: new.super_class.clone(),
        });
    }
    let (added, removed) = set_difference(&old.interfaces, &new.interfaces);
    if !added.is_empty() || !removed.is_empty() {
        deltas.push(Delta::Interfaces { added, removed });
    }
    if old.signature != new.signature {
        deltas.push(Delta::Signature {
            old: old.signature.clone(),
            new: new.signature.clone(),
        });
    }
    if old.version != new.version {
        deltas.push(Delta::Version {
            old: old.version,
            new: new.version,
        });
    }
    if old.outer_class != new.outer_class {
        deltas.push(Delta::OuterClass {
            old: old.outer_class.clone(),
            new: new.outer_class.clone(),
        });
    }
    if old.deprecated != new.deprecated {
        deltas.push(Delta::Deprecated {
            old: old.deprecated,
            new: new.deprecated,
        });
    }
    deltas
}

fn access_flags_delta<F>(old: F, new: F) -> Option<Delta>
where
    F: AccessFlagNames + PartialEq,
{
    if old == new {
        return None;
    }
    let old_names = old.names();
    let new_names = new.names();
    Some(Delta::AccessFlags {
        added: new_names
            .iter()
            .filter(|name| !old_names.contains(name))
            .copied()
            .collect(),
        removed: old_names
            .iter()
            .filter(|name| !new_names.contains(name))
            .copied()
            .collect(),
    })
}

/// Compare two lists as sets, returning what was added and what was removed (both sorted)
fn set_difference(old: &[String], new: &[String]) -> (Vec<String>, Vec<String>) {
    let old: BTreeSet<&String> = old.iter().collect();
    let new: BTreeSet<&String> = new.iter().collect();
    let added = new.difference(&old).map(|s| (*s).clone()).collect();
    let removed = old.difference(&new).map(|s| (*s).clone()).collect();
    (added, removed)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags, Version};

    fn class(fields: Vec<FieldDescriptor>, methods: Vec<MethodDescriptor>) -> ClassDescriptor {
        ClassDescriptor {
            name: String::from("a/Box"),
            version: Version::JAVA8,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            super_class: Some(String::from("java/lang/Object")),
            interfaces: vec![String::from("java/lang/Comparable")],
            fields,
            methods,
            outer_class: None,
            signature: None,
            synthetic_attribute: false,
            deprecated: false,
        }
    }

    fn field(name: &str, descriptor: &str) -> FieldDescriptor {
        FieldDescriptor {
            owner: String::from("a/Box"),
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            access_flags: FieldAccessFlags::PRIVATE,
            signature: None,
            constant_value: None,
            synthetic_attribute: false,
            deprecated: false,
        }
    }

    fn method(name: &str, descriptor: &str, access_flags: MethodAccessFlags) -> MethodDescriptor {
        MethodDescriptor {
            owner: String::from("a/Box"),
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            access_flags,
            signature: None,
            exceptions: vec![],
            synthetic_attribute: false,
            deprecated: false,
        }
    }

    fn classified(class: ClassDescriptor) -> ClassifiedClass {
        ClassifiedClass::new(class)
    }

    fn change_names(changes: &[Change]) -> Vec<(&'static str, String)> {
        changes
            .iter()
            .map(|change| {
                let kind = match change {
                    Change::Added { .. } => "added",
                    Change::Removed { .. } => "removed",
                    Change::Modified { .. } => "modified",
                };
                (kind, change.subject().name().to_owned())
            })
            .collect()
    }

    #[test]
    fn self_diff_is_empty() {
        let class = classified(class(
            vec![field("value", "I"), field("this$0", "La/Outer;")],
            vec![
                method("get", "()I", MethodAccessFlags::PUBLIC),
                method("access$000", "(La/Box;)I", MethodAccessFlags::STATIC),
            ],
        ));
        assert!(diff_classes(&class, &class, false).is_empty());
        assert!(diff_classes(&class, &class, true).is_empty());
    }

    #[test]
    fn descriptor_change_is_removal_and_addition() {
        let old = classified(class(
            vec![],
            vec![method("put", "(I)V", MethodAccessFlags::PUBLIC)],
        ));
        let new = classified(class(
            vec![],
            vec![method("put", "(J)V", MethodAccessFlags::PUBLIC)],
        ));
        assert_eq!(
            change_names(&diff_classes(&old, &new, false)),
            vec![("removed", "put".to_owned()), ("added", "put".to_owned())]
        );
    }

    #[test]
    fn ordering_of_changes() {
        let old = classified(class(
            vec![field("a", "I"), field("b", "I")],
            vec![
                method("x", "()V", MethodAccessFlags::PUBLIC),
                method("y", "()V", MethodAccessFlags::PUBLIC),
                method("z", "()V", MethodAccessFlags::PUBLIC),
            ],
        ));
        let mut new_class = class(
            vec![field("c", "I"), field("b", "J")],
            vec![
                method("w", "()V", MethodAccessFlags::PUBLIC),
                method("z", "()V", MethodAccessFlags::PUBLIC | MethodAccessFlags::FINAL),
                method("x", "()V", MethodAccessFlags::PUBLIC),
            ],
        );
        new_class.super_class = Some(String::from("a/Base"));
        let new = classified(new_class);

        let changes = diff_classes(&old, &new, false);
        assert_eq!(
            change_names(&changes),
            vec![
                ("modified", "a/Box".to_owned()),
                ("removed", "a".to_owned()),
                ("removed", "b".to_owned()),
                ("added", "c".to_owned()),
                ("added", "b".to_owned()),
                ("removed", "y".to_owned()),
                ("added", "w".to_owned()),
                ("modified", "z".to_owned()),
            ]
        );
        match &changes[7] {
            Change::Modified { deltas, .. } => assert_eq!(
                deltas,
                &vec![Delta::AccessFlags {
                    added: vec!["final"],
                    removed: vec![],
                }]
            ),
            other => panic!("expected a modification, got {:?}", other),
        }
    }

    #[test]
    fn bridge_methods_are_filtered_by_default() {
        let compare_to = method("compareTo", "(La/Box;)I", MethodAccessFlags::PUBLIC);
        let bridge = method(
            "compareTo",
            "(Ljava/lang/Object;)I",
            MethodAccessFlags::PUBLIC | MethodAccessFlags::BRIDGE | MethodAccessFlags::SYNTHETIC,
        );
        let old = classified(class(vec![], vec![]));
        let new = classified(class(vec![], vec![compare_to, bridge]));

        let filtered = diff_classes(&old, &new, false);
        assert_eq!(change_names(&filtered), vec![("added", "compareTo".to_owned())]);
        assert_eq!(filtered[0].classification(), Classification::SourceDeclared);

        let everything = diff_classes(&old, &new, true);
        assert_eq!(everything.len(), 2);
        assert_eq!(everything[1].classification(), Classification::Bridge);
    }

    #[test]
    fn modification_kept_when_one_side_is_source_declared() {
        let plain = method("run", "()V", MethodAccessFlags::PUBLIC);
        let synthetic = method(
            "run",
            "()V",
            MethodAccessFlags::PUBLIC | MethodAccessFlags::SYNTHETIC,
        );
        let old = classified(class(vec![], vec![plain]));
        let new = classified(class(vec![], vec![synthetic]));

        let changes = diff_classes(&old, &new, false);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].classification(), Classification::CompilerSynthetic);
    }

    #[test]
    fn interfaces_compare_as_a_set() {
        let mut old_class = class(vec![], vec![]);
        old_class.interfaces = vec![String::from("a/I"), String::from("a/J")];
        let mut new_class = class(vec![], vec![]);
        new_class.interfaces = vec![String::from("a/J"), String::from("a/I")];
        let old = classified(old_class);
        let new = classified(new_class.clone());
        assert!(diff_classes(&old, &new, false).is_empty());

        new_class.interfaces = vec![String::from("a/K"), String::from("a/I")];
        let new = classified(new_class);
        match &diff_classes(&old, &new, false)[..] {
            [Change::Modified { deltas, .. }] => assert_eq!(
                deltas,
                &vec![Delta::Interfaces {
                    added: vec![String::from("a/K")],
                    removed: vec![String::from("a/J")],
                }]
            ),
            other => panic!("expected one modification, got {:?}", other),
        }
    }

    #[test]
    fn one_sided_classes() {
        let class = classified(class(vec![field("value", "I")], vec![]));
        assert_eq!(
            change_names(&added_class(&class, false)),
            vec![("added", "a/Box".to_owned())]
        );
        assert_eq!(
            change_names(&removed_class(&class, false)),
            vec![("removed", "a/Box".to_owned())]
        );

        let mut synthetic = class.descriptor.clone();
        synthetic.access_flags |= ClassAccessFlags::SYNTHETIC;
        let synthetic = classified(synthetic);
        assert!(added_class(&synthetic, false).is_empty());
        assert_eq!(added_class(&synthetic, true).len(), 1);
    }
}
