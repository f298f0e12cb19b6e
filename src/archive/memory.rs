use super::{ClassBytes, ClassFileSource, Error};

/// Class files that are already in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    description: String,
    classes: Vec<ClassBytes>,
}

impl MemorySource {
    pub fn new(description: impl Into<String>, classes: Vec<ClassBytes>) -> MemorySource {
        MemorySource {
            description: description.into(),
            classes,
        }
    }

    pub fn push(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.classes.push(ClassBytes::new(name, bytes));
    }
}

impl ClassFileSource for MemorySource {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn read_classes(&mut self) -> Result<Vec<ClassBytes>, Error> {
        Ok(self.classes.clone())
    }
}
