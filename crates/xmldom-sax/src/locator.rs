//! Shared position tracker.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct LocatorState {
    line_number: usize,
    column_number: usize,
    system_id: Option<String>,
}

/// Current position of the reader within the source.
///
/// Clones share the same state: the reader advances one handle while the
/// builder and the error adapter read theirs. Lines and columns are 1-based
/// once the reader has emitted its first event; columns count characters.
#[derive(Debug, Clone, Default)]
pub struct Locator(Rc<RefCell<LocatorState>>);

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A locator whose positions are reported against `system_id`.
    pub fn with_system_id(system_id: impl Into<String>) -> Self {
        let locator = Self::new();
        locator.set_system_id(Some(system_id.into()));
        locator
    }

    pub fn line_number(&self) -> usize {
        self.0.borrow().line_number
    }

    pub fn column_number(&self) -> usize {
        self.0.borrow().column_number
    }

    pub fn system_id(&self) -> Option<String> {
        self.0.borrow().system_id.clone()
    }

    pub fn set_system_id(&self, system_id: Option<String>) {
        self.0.borrow_mut().system_id = system_id;
    }

    pub fn set_line_number(&self, line_number: usize) {
        self.0.borrow_mut().line_number = line_number;
    }

    pub fn set_position(&self, line_number: usize, column_number: usize) {
        let mut state = self.0.borrow_mut();
        state.line_number = line_number;
        state.column_number = column_number;
    }

    /// Whether both handles share the same state.
    pub fn ptr_eq(&self, other: &Locator) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_position() {
        let locator = Locator::with_system_id("doc.xml");
        let view = locator.clone();

        locator.set_position(3, 7);

        assert_eq!(view.line_number(), 3);
        assert_eq!(view.column_number(), 7);
        assert_eq!(view.system_id().as_deref(), Some("doc.xml"));
        assert!(view.ptr_eq(&locator));
        assert!(!view.ptr_eq(&Locator::new()));
    }
}
