//! Substance class set

use heapless::Vec;

use crate::scan::{Label, MAX_LABEL_LEN};

/// Maximum number of substance classes
pub const MAX_CLASSES: usize = 16;

/// Ordered substance names, indexed like the model output vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSet {
    labels: Vec<Label, MAX_CLASSES>,
}

impl Default for ClassSet {
    fn default() -> Self {
        // Order matches the training label encoding
        Self::from_names(&["MSG", "Salt", "Sugar"]).unwrap_or(Self { labels: Vec::new() })
    }
}

impl ClassSet {
    /// Build a class set, or `None` if a name is too long or there are
    /// too many classes
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        let mut labels = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.is_empty() || name.len() > MAX_LABEL_LEN {
                return None;
            }
            let mut label = Label::new();
            label.push_str(name).ok()?;
            labels.push(label).ok()?;
        }
        Some(Self { labels })
    }

    /// Name of the class at an output index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|l| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.as_str())
    }
}
