use crate::error::DataFetchError;
use crate::NodeId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;

const LAST_UPDATED_KEYS: [&str; 2] = ["lastUpdated", "last_updated"];

/// One element of the input array, exactly as the payload describes it.
///
/// `parent_id` keeps three states apart:
/// * `None`: the key is absent (the record is dropped by the hierarchy builder)
/// * `Some(None)`: explicit `null` (a root candidate)
/// * `Some(Some(id))`: a parent reference, where `""` also counts as root
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub parent_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl RawRecord {
    pub fn new(id: &str, parent_id: Option<&str>, name: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            parent_id: Some(parent_id.map(str::to_string)),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// True when the record qualifies as the tree root (`null` or `""` parent).
    pub fn is_root_candidate(&self) -> bool {
        match &self.parent_id {
            Some(None) => true,
            Some(Some(parent)) => parent.is_empty(),
            None => false,
        }
    }
}

/// A record that survived filtering: it has an id and a defined parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl EmployeeRecord {
    /// Converts a raw record, or `None` when it lacks an id or its parent key.
    pub fn from_raw(raw: RawRecord) -> Option<Self> {
        let is_root = raw.is_root_candidate();
        let id = raw.id.filter(|id| !id.is_empty())?;
        let parent_id = raw.parent_id?;
        Some(Self {
            id: NodeId(id),
            parent_id: if is_root { None } else { parent_id.map(NodeId) },
            name: raw.name,
            title: raw.title,
            attributes: raw.attributes,
        })
    }
}

/// A decoded payload: the raw records plus the data set's last-updated stamp.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<RawRecord>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Dataset {
    pub fn from_json_str(json: &str) -> Result<Self, DataFetchError> {
        let records: Vec<RawRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataFetchError> {
        let records: Vec<RawRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<RawRecord>) -> Result<Self, DataFetchError> {
        if records.is_empty() {
            return Err(DataFetchError::Empty);
        }

        let last_updated = records.iter().find_map(|record| {
            LAST_UPDATED_KEYS
                .iter()
                .find_map(|key| record.attributes.get(*key))
                .and_then(timestamp_from_value)
        });

        Ok(Self {
            records,
            last_updated,
        })
    }
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                tracing::warn!("Ignoring unparseable lastUpdated value {:?}", raw);
            }
            parsed
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Parses the timestamp formats seen in exported HR data.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string))
}

// Only runs when the key is present, which is what separates `null` from absent.
// Objects and arrays are not references; they count as absent, not as `null`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(None)),
        value @ (Value::Object(_) | Value::Array(_)) => {
            tracing::debug!("Ignoring non-scalar parentId {}", value);
            Ok(None)
        }
        value => Ok(Some(scalar_to_string(value))),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_scalar(deserializer).map(Option::unwrap_or_default)
}
