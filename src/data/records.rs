// Local record store.
// Holds projections of remote entities: raw payloads per fingerprint and reaction groups per subject.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::cache::Fingerprint;
use crate::github::ReactionGroup;

/// In-memory projection of everything fetched through one environment.
#[derive(Debug, Default)]
pub struct RecordStore {
    payloads: HashMap<Fingerprint, Arc<Value>>,
    reactions: HashMap<String, Vec<ReactionGroup>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last payload stored for a query, if any.
    pub fn payload(&self, fingerprint: &Fingerprint) -> Option<Arc<Value>> {
        self.payloads.get(fingerprint).cloned()
    }

    pub fn store_payload(&mut self, fingerprint: Fingerprint, payload: Arc<Value>) {
        self.payloads.insert(fingerprint, payload);
    }

    /// Normalize every reactable subject found in a payload.
    ///
    /// Any object carrying both `id` and `reactionGroups` replaces the
    /// stored groups for that subject. Returns the number of subjects updated.
    pub fn publish(&mut self, payload: &Value) -> usize {
        let mut updated = 0;
        self.normalize(payload, &mut updated);
        updated
    }

    fn normalize(&mut self, value: &Value, updated: &mut usize) {
        match value {
            Value::Object(map) => {
                if let (Some(Value::String(id)), Some(groups @ Value::Array(_))) =
                    (map.get("id"), map.get("reactionGroups"))
                {
                    match serde_json::from_value::<Vec<ReactionGroup>>(groups.clone()) {
                        Ok(groups) => {
                            self.reactions.insert(id.clone(), groups);
                            *updated += 1;
                        }
                        Err(e) => warn!(subject = %id, "skipping malformed reaction groups: {}", e),
                    }
                }
                for child in map.values() {
                    self.normalize(child, updated);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.normalize(item, updated);
                }
            }
            _ => {}
        }
    }

    pub fn reaction_groups(&self, subject_id: &str) -> Option<&Vec<ReactionGroup>> {
        self.reactions.get(subject_id)
    }

    pub fn set_reaction_groups(&mut self, subject_id: &str, groups: Vec<ReactionGroup>) {
        self.reactions.insert(subject_id.to_string(), groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ReactionContent;
    use crate::github::operations::POSTS_QUERY;
    use serde_json::json;

    fn issue(id: &str, count: u64) -> Value {
        json!({
            "id": id,
            "title": "Post",
            "reactionGroups": [
                {
                    "content": "THUMBS_UP",
                    "viewerHasReacted": false,
                    "users": { "totalCount": count, "nodes": [] }
                }
            ]
        })
    }

    #[test]
    fn test_publish_normalizes_nested_subjects() {
        let mut store = RecordStore::new();
        let payload = json!({
            "gitHub": {
                "repository": {
                    "issues": {
                        "edges": [
                            { "node": issue("I_1", 2) },
                            { "node": issue("I_2", 0) },
                            null
                        ]
                    }
                }
            }
        });

        assert_eq!(store.publish(&payload), 2);
        let groups = store.reaction_groups("I_1").unwrap();
        assert_eq!(groups[0].content, ReactionContent::ThumbsUp);
        assert_eq!(groups[0].total(), 2);
        assert!(store.reaction_groups("I_2").is_some());
        assert!(store.reaction_groups("I_3").is_none());
    }

    #[test]
    fn test_publish_replaces_previous_groups() {
        let mut store = RecordStore::new();
        store.publish(&issue("I_1", 2));
        store.publish(&json!({ "reactable": issue("I_1", 5) }));
        assert_eq!(store.reaction_groups("I_1").unwrap()[0].total(), 5);
    }

    #[test]
    fn test_publish_skips_null_and_malformed_groups() {
        let mut store = RecordStore::new();
        let payload = json!([
            { "id": "I_1", "reactionGroups": null },
            { "id": "I_2", "reactionGroups": [{ "content": "NOPE" }] }
        ]);
        assert_eq!(store.publish(&payload), 0);
        assert!(store.reaction_groups("I_1").is_none());
    }

    #[test]
    fn test_payloads_by_fingerprint() {
        let mut store = RecordStore::new();
        let fingerprint = Fingerprint::new(&POSTS_QUERY, &json!({}));
        assert!(store.payload(&fingerprint).is_none());

        store.store_payload(fingerprint.clone(), Arc::new(json!({ "gitHub": null })));
        assert_eq!(*store.payload(&fingerprint).unwrap(), json!({ "gitHub": null }));
    }
}
