use serde::Serialize;

/// What a flattening pass did to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenReport {
    /// Names registered into `components.schemas`, in registration order.
    pub registered: Vec<String>,
    /// Names an inline schema was folded into, once per fold.
    pub reused: Vec<String>,
    /// Dangling pointers met during the pass, each listed once.
    pub unresolved: Vec<String>,
    /// Copied from the configuration for downstream generators.
    pub generate_metadata: bool,
}

impl FlattenReport {
    /// True when the pass neither registered nor rewrote anything.
    pub fn is_noop(&self) -> bool {
        self.registered.is_empty() && self.reused.is_empty()
    }

    pub(crate) fn record_unresolved(&mut self, pointer: &str) -> bool {
        if self.unresolved.iter().any(|p| p == pointer) {
            return false;
        }
        self.unresolved.push(pointer.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_pointers_are_listed_once() {
        let mut report = FlattenReport::default();
        assert!(report.record_unresolved("#/components/schemas/Gone"));
        assert!(!report.record_unresolved("#/components/schemas/Gone"));
        assert_eq!(report.unresolved.len(), 1);
        assert!(report.is_noop());
    }

    #[test]
    fn reuse_alone_is_a_change() {
        let report = FlattenReport {
            reused: vec!["User_address".into()],
            ..FlattenReport::default()
        };
        assert!(!report.is_noop());
    }
}
