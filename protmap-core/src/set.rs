//! Named, duplicate-free accession sets

use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// A named set of accessions that remembers insertion order
///
/// The unit of overlap comparison. Holds a back-reference to the input list
/// it was built from.
#[derive(Debug, Clone, Default)]
pub struct ProteinSet {
    name: String,
    source: String,
    accessions: Vec<String>,
    index: HashSet<String>,
}

impl ProteinSet {
    /// Create an empty set
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            accessions: Vec::new(),
            index: HashSet::new(),
        }
    }

    /// Build a set from accessions, dropping repeats after the first
    pub fn from_accessions<I, S>(name: impl Into<String>, source: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(name, source);
        for accession in items {
            set.insert(accession);
        }
        set
    }

    /// Insert an accession; returns `false` if it was already present
    pub fn insert(&mut self, accession: impl Into<String>) -> bool {
        let accession = accession.into();
        if self.index.contains(&accession) {
            return false;
        }
        self.index.insert(accession.clone());
        self.accessions.push(accession);
        true
    }

    /// Set name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Originating input list
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Membership test
    pub fn contains(&self, accession: &str) -> bool {
        self.index.contains(accession)
    }

    /// Accessions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.accessions.iter().map(String::as_str)
    }

    /// Accessions in insertion order
    pub fn as_slice(&self) -> &[String] {
        &self.accessions
    }

    /// Number of accessions
    pub fn len(&self) -> usize {
        self.accessions.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.accessions.is_empty()
    }
}

impl PartialEq for ProteinSet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.source == other.source && self.accessions == other.accessions
    }
}

impl Eq for ProteinSet {}

impl Serialize for ProteinSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ProteinSet", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("accessions", &self.accessions)?;
        state.end()
    }
}
