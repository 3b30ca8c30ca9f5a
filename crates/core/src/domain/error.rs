use std::fmt;

/// A raw record that cannot become a [`Proposal`](super::proposal::Proposal) because it has no
/// usable identifier. Only that record is dropped; its siblings keep normalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecordError {
    /// Position of the record in its batch, when it was normalized as part of one.
    pub index: Option<usize>,
    pub reason: &'static str,
}

impl InvalidRecordError {
    pub(crate) fn new(reason: &'static str) -> Self {
        Self {
            index: None,
            reason,
        }
    }

    pub(crate) fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for InvalidRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "invalid proposal record at index {index}: {}", self.reason),
            None => write!(f, "invalid proposal record: {}", self.reason),
        }
    }
}

impl std::error::Error for InvalidRecordError {}
