//! Free-form product specification pairs.

use serde::{Deserialize, Serialize};

/// One key/value entry in a product's specification table
/// (e.g., `{"key": "Switch type", "value": "Linear"}`).
///
/// Stored on the product as a JSONB array in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

impl Specification {
    /// Create a new specification entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let spec = Specification::new("Connectivity", "Wireless");
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "Connectivity", "value": "Wireless"})
        );
    }
}
