use serde::{Deserialize, Deserializer, Serialize};

/// A market from the contracts dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    #[serde(default)]
    pub creator_id: String,
    pub outcome_type: String,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub resolution_time: Option<i64>,
    pub created_time: i64,
    #[serde(default)]
    pub close_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_slugs")]
    pub group_slugs: Vec<String>,
}

impl Contract {
    /// True when the contract's outcome type is in `supported` (case-insensitive).
    pub fn has_outcome_type(&self, supported: &[String]) -> bool {
        supported
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&self.outcome_type))
    }

    /// The winning side, defined only once the contract has resolved.
    pub fn winning_outcome(&self) -> Option<&str> {
        if !self.is_resolved {
            return None;
        }
        self.resolution.as_deref().filter(|r| !r.is_empty())
    }

    /// Resolution timestamp, only for resolved contracts that recorded one.
    pub fn resolve_time(&self) -> Option<i64> {
        if self.is_resolved {
            self.resolution_time
        } else {
            None
        }
    }
}

/// Accepts a list of strings; anything else (null, object, scalar) becomes empty.
/// Non-string list entries are dropped.
fn lenient_slugs<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let slugs = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(slugs)
}
