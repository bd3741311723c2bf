//! Filter outcome for a single element.

/// Whether an element continues downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// First sighting of the key within its window; forward the element
    Admit,
    /// Key was already seen and has not expired; drop the element
    Reject,
}

impl Decision {
    /// Decision for the result of an insert-if-absent.
    pub fn from_inserted(inserted: bool) -> Self {
        if inserted {
            Decision::Admit
        } else {
            Decision::Reject
        }
    }

    /// Check if this decision admits the element.
    pub fn is_admit(self) -> bool {
        matches!(self, Decision::Admit)
    }

    /// Check if this decision rejects the element.
    pub fn is_reject(self) -> bool {
        matches!(self, Decision::Reject)
    }
}

impl From<Decision> for bool {
    fn from(decision: Decision) -> Self {
        decision.is_admit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_inserted() {
        assert_eq!(Decision::from_inserted(true), Decision::Admit);
        assert_eq!(Decision::from_inserted(false), Decision::Reject);
        assert!(bool::from(Decision::Admit));
        assert!(Decision::Reject.is_reject());
    }
}
