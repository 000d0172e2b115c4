use serde::Serialize;

/// One search filter clause, serialized into the `filters` array of a search
/// request body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchFilter {
    /// Field the filter applies to (e.g. `"id"`, `"ipAddress"`).
    pub field: String,
    /// Whether the filter excludes matching records instead of selecting them.
    pub exclusive: bool,
    /// Match operator.
    pub operator: Operator,
    /// Filter value; strings, numbers, and lists are all accepted by the
    /// platform depending on the operator.
    pub value: serde_json::Value,
}

impl SearchFilter {
    pub fn new(
        field: impl Into<String>,
        exclusive: bool,
        operator: Operator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            field: field.into(),
            exclusive,
            operator,
            value: value.into(),
        }
    }
}

/// Filter match operators understood by the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    Exact,
    In,
    Like,
    Wildcard,
    Range,
    Greater,
    Lesser,
    Cidr,
}

/// Result projection requested from a search.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Basic,
    Detail,
}

/// Sort direction for search results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Operator, Projection, SearchFilter, SortDirection};

    #[test]
    fn filter_serializes_to_platform_shape() {
        let filter = SearchFilter::new("ipAddress", false, Operator::Cidr, "10.0.0.0/8");
        let serialized = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            serialized,
            json!({
                "field": "ipAddress",
                "exclusive": false,
                "operator": "CIDR",
                "value": "10.0.0.0/8"
            })
        );
    }

    #[test]
    fn enums_serialize_to_wire_strings() {
        assert_eq!(serde_json::to_value(Operator::Exact).unwrap(), json!("EXACT"));
        assert_eq!(serde_json::to_value(Projection::Basic).unwrap(), json!("basic"));
        assert_eq!(serde_json::to_value(Projection::Detail).unwrap(), json!("detail"));
        assert_eq!(serde_json::to_value(SortDirection::Asc).unwrap(), json!("ASC"));
        assert_eq!(serde_json::to_value(SortDirection::Desc).unwrap(), json!("DESC"));
    }
}
