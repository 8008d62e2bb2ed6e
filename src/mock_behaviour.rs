//! Failures that a [`MockSource`](crate::mock::MockSource) should report on purpose
#![cfg(any(test, feature = "mock_source"))]

use std::collections::HashMap;
use std::error::Error;

/// The calls of a [`TodoSource`](crate::traits::TodoSource)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    GetLists,
    GetList,
    CreateList,
    EditList,
    DeleteList,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

/// Queued failures, per operation. Every call that is not expected to fail succeeds.
#[derive(Clone, Debug, Default)]
pub struct MockBehaviour {
    pending_failures: HashMap<Operation, u32>,
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` calls of `operation` will fail
    pub fn fail_next(&mut self, operation: Operation, count: u32) {
        *self.pending_failures.entry(operation).or_insert(0) += count;
    }

    /// How many calls of `operation` will still fail
    pub fn pending_failures(&self, operation: Operation) -> u32 {
        self.pending_failures.get(&operation).copied().unwrap_or(0)
    }

    /// Consume one queued failure of `operation`, if any
    pub fn check(&mut self, operation: Operation) -> Result<(), Box<dyn Error>> {
        match self.pending_failures.get_mut(&operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                log::debug!("Mock behaviour: failing a {:?} ({} more to fail)", operation, remaining);
                Err(format!("Mocked failure of {:?}", operation).into())
            },
            _ => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_failures() {
        let mut behaviour = MockBehaviour::new();
        assert!(behaviour.check(Operation::GetLists).is_ok());

        behaviour.fail_next(Operation::UpdateTask, 2);
        behaviour.fail_next(Operation::UpdateTask, 1);
        assert_eq!(behaviour.pending_failures(Operation::UpdateTask), 3);
        assert!(behaviour.check(Operation::DeleteTask).is_ok());

        for _ in 0..3 {
            let err = behaviour.check(Operation::UpdateTask).unwrap_err();
            assert_eq!(err.to_string(), "Mocked failure of UpdateTask");
        }
        assert!(behaviour.check(Operation::UpdateTask).is_ok());
        assert_eq!(behaviour.pending_failures(Operation::UpdateTask), 0);
    }
}
