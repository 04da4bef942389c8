//! Opened facts read from the game's own save file.
//!
//! The save stores every ship log fact under `shipLogFactSaves` with a
//! `revealOrder`; a negative order means the fact is still hidden.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::codec::OpenedSet;
use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
pub struct SaveFile {
    #[serde(rename = "shipLogFactSaves", default)]
    pub fact_saves: BTreeMap<String, Value>,
}

impl SaveFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn opened_facts(&self) -> OpenedSet {
        get_save_opened_facts(&self.fact_saves)
    }
}

/// `revealOrder` of a fact record, if it has a usable one.
fn reveal_order(record: &Value) -> Option<i64> {
    record.get("revealOrder")?.as_i64()
}

/// Keys of every fact whose record has `revealOrder >= 0`.
/// Records without a numeric `revealOrder` are skipped.
pub fn get_save_opened_facts(facts: &BTreeMap<String, Value>) -> OpenedSet {
    facts
        .iter()
        .filter(|(_, record)| reveal_order(record).is_some_and(|order| order >= 0))
        .map(|(key, _)| key.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn revealed_facts_only() {
        let save = SaveFile::from_json(
            r#"{
                "loopCount": 12,
                "shipLogFactSaves": {
                    "TH_VILLAGE_X1": { "revealOrder": 0, "read": true },
                    "TH_VILLAGE_X2": { "revealOrder": 7 },
                    "GD_OCEAN_X1": { "revealOrder": -1 }
                }
            }"#,
        )
        .unwrap();
        let opened = save.opened_facts();
        assert_eq!(opened.len(), 2);
        assert!(opened.contains("TH_VILLAGE_X1"));
        assert!(opened.contains("TH_VILLAGE_X2"));
        assert!(!opened.contains("GD_OCEAN_X1"));
    }

    #[test]
    fn malformed_records_are_excluded() {
        let facts = BTreeMap::from([
            ("A".to_string(), json!({ "revealOrder": "3" })),
            ("B".to_string(), json!(null)),
            ("C".to_string(), json!({})),
            ("D".to_string(), json!({ "revealOrder": 2.5 })),
            ("E".to_string(), json!({ "revealOrder": 1 })),
        ]);
        let opened = get_save_opened_facts(&facts);
        assert_eq!(opened.into_iter().collect::<Vec<_>>(), vec!["E"]);
    }

    #[test]
    fn missing_fact_table_is_empty() {
        let save = SaveFile::from_json(r#"{ "loopCount": 1 }"#).unwrap();
        assert!(save.opened_facts().is_empty());
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(SaveFile::from_json("{ not json").is_err());
    }
}
