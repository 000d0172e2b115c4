use serde::Serialize;
use serde_json::{json, Value};

use crate::{Result, SearchParams, Subject};

/// Tag categories supported by the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagType {
    Compliance,
    Location,
    Custom,
    Remediation,
    People,
    Project,
    Scanner,
    Cmdb,
}

/// Tag operations: creation and tag search.
#[derive(Clone, Debug)]
pub struct Tags {
    subject: Subject,
}

impl Tags {
    pub(crate) fn new(subject: Subject) -> Self {
        Self { subject }
    }

    /// Creates a tag and returns its ID.
    ///
    /// The platform models tag creation as a field list rather than a flat
    /// object; the body shape here mirrors that contract.
    pub async fn create(
        &self,
        client_id: u64,
        tag_type: TagType,
        name: &str,
        description: &str,
        owner: &str,
    ) -> Result<u64> {
        let body = json!({
            "fields": [
                { "uid": "TAG_TYPE", "value": tag_type },
                { "uid": "NAME", "value": name },
                { "uid": "DESCRIPTION", "value": description },
                { "uid": "OWNER", "value": owner },
                { "uid": "COLOR", "value": "#648d9f" },
                { "uid": "LOCKED", "value": false },
                { "uid": "PROPAGATE_TO_ALL_FINDINGS", "value": true }
            ]
        });
        self.subject.post_for_id(client_id, "", &body).await
    }

    /// Fetches a single page of tag search results.
    pub async fn search_page(
        &self,
        client_id: u64,
        page: u32,
        params: &SearchParams,
    ) -> Result<Value> {
        self.subject.search_page(client_id, page, params).await
    }

    /// Fetches all pages of tag search results as one sorted list.
    pub async fn search(&self, client_id: u64, params: &SearchParams) -> Result<Vec<Value>> {
        self.subject.search(client_id, params).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::TagType;

    #[test]
    fn tag_type_serializes_to_wire_string() {
        assert_eq!(serde_json::to_value(TagType::Custom).unwrap(), json!("CUSTOM"));
        assert_eq!(serde_json::to_value(TagType::Cmdb).unwrap(), json!("CMDB"));
    }
}
