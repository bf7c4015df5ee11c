//! Identifier sources for builders and generators.
//!
//! Builders never consult a process-wide counter: whoever needs fresh
//! identifiers passes an [`IdSource`] in, so repeated builds are reproducible.

use crate::types::NodeId;

/// A supplier of fresh node identifiers.
pub trait IdSource {
    fn next_id(&mut self) -> NodeId;
}

/// Sequential identifiers: `prefix0`, `prefix1`, ...
#[derive(Debug, Clone)]
pub struct Sequential {
    prefix: String,
    next: usize,
}

impl Sequential {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new("n")
    }
}

impl IdSource for Sequential {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl<F> IdSource for F
where
    F: FnMut() -> NodeId,
{
    fn next_id(&mut self) -> NodeId {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential() {
        let mut ids = Sequential::new("p");
        assert_eq!(ids.next_id(), NodeId::new("p0"));
        assert_eq!(ids.next_id(), NodeId::new("p1"));
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_sequential_is_reproducible() {
        let a: Vec<_> = {
            let mut ids = Sequential::default();
            (0..3).map(|_| ids.next_id()).collect()
        };
        let b: Vec<_> = {
            let mut ids = Sequential::default();
            (0..3).map(|_| ids.next_id()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_closure_source() {
        let mut k = 10;
        let mut source = || {
            k += 1;
            NodeId::new(format!("x{}", k))
        };
        assert_eq!(source.next_id(), NodeId::new("x11"));
    }
}
