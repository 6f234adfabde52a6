//! Rejection accumulation.

use serde::Serialize;

/// Sink for rejections produced while validating or authorizing an operation.
///
/// Implementations must not fail; callers inspect the collected entries once
/// evaluation returns to decide whether to abort the operation.
pub trait ErrorCollector {
    fn reject(&mut self, code: &str, message: String);
}

/// A single rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub code: String,
    pub message: String,
}

/// Default in-memory collector, preserving insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Errors {
    rejections: Vec<Rejection>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.rejections.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rejections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rejections.len()
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.rejections.iter().map(|r| r.message.as_str())
    }
}

impl ErrorCollector for Errors {
    fn reject(&mut self, code: &str, message: String) {
        self.rejections.push(Rejection {
            code: code.to_string(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_keep_insertion_order() {
        let mut errors = Errors::new();
        assert!(!errors.has_errors());

        errors.reject("authorization", "first".to_string());
        errors.reject("authorization", "second".to_string());

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.messages().collect::<Vec<_>>(), vec!["first", "second"]);
        assert!(errors.rejections().iter().all(|r| r.code == "authorization"));
    }
}
