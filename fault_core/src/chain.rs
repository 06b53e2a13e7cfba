//! Chain walking
//!
//! A chain is a record followed by its cause, the cause's cause and so on.
//! Traversal tracks record identity and stops at the first repeat, so a
//! chain is finite even when causes were linked into a loop.

use crate::record::{ErrorRecord, SerializedChainEntry};
use std::collections::HashSet;

/// The record and every distinct cause behind it, most recent first
pub fn get_chain(start: &ErrorRecord) -> Vec<ErrorRecord> {
    let mut chain = vec![start.clone()];
    let mut visited = HashSet::from([start.address()]);
    let mut current = start.clone();

    while let Some(next) = current.cause().cloned() {
        if !visited.insert(next.address()) {
            break;
        }
        chain.push(next.clone());
        current = next;
    }
    chain
}

/// The oldest distinct record in the chain
pub fn root(start: &ErrorRecord) -> ErrorRecord {
    get_chain(start)
        .pop()
        .unwrap_or_else(|| start.clone())
}

pub fn map_chain<T, F>(start: &ErrorRecord, mut f: F) -> Vec<T>
where
    F: FnMut(&ErrorRecord, usize) -> T,
{
    get_chain(start)
        .iter()
        .enumerate()
        .map(|(index, node)| f(node, index))
        .collect()
}

/// Highest-severity record; the earliest one wins a tie
pub fn most_severe(start: &ErrorRecord) -> ErrorRecord {
    let mut chain = get_chain(start).into_iter();
    let mut worst = chain.next().unwrap_or_else(|| start.clone());
    for node in chain {
        if node.severity().weight() > worst.severity().weight() {
            worst = node;
        }
    }
    worst
}

/// Flat serialized form, one entry per record
pub fn serialize_chain(start: &ErrorRecord) -> Vec<SerializedChainEntry> {
    map_chain(start, |node, _| SerializedChainEntry::from(node))
}

/// One `Display` line per record
pub fn chain_to_string(start: &ErrorRecord) -> String {
    map_chain(start, |node, _| node.to_string()).join("\n")
}

/// Chain operations bound to one record
#[derive(Debug, Clone, Copy)]
pub struct ChainView<'a> {
    start: &'a ErrorRecord,
}

impl<'a> ChainView<'a> {
    pub(crate) fn new(start: &'a ErrorRecord) -> Self {
        Self { start }
    }

    pub fn get(&self) -> Vec<ErrorRecord> {
        get_chain(self.start)
    }

    pub fn len(&self) -> usize {
        get_chain(self.start).len()
    }

    /// Never true; a chain holds at least its starting record
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn root(&self) -> ErrorRecord {
        root(self.start)
    }

    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: FnMut(&ErrorRecord, usize) -> T,
    {
        map_chain(self.start, f)
    }

    pub fn most_severe(&self) -> ErrorRecord {
        most_severe(self.start)
    }

    pub fn serialize(&self) -> Vec<SerializedChainEntry> {
        serialize_chain(self.start)
    }
}

impl std::fmt::Display for ChainView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&chain_to_string(self.start))
    }
}
