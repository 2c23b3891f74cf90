use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Primary or foreign key of a stored row.
///
/// The remote store may key rows by integers or by strings (UUIDs), so both
/// shapes are accepted and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{}", id),
            RowId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for RowId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(id) => RowId::Int(id),
            Err(_) => RowId::Text(s.trim().to_string()),
        })
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        RowId::Int(id)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        RowId::Text(id.to_string())
    }
}

impl From<&RowId> for Value {
    fn from(id: &RowId) -> Self {
        match id {
            RowId::Int(id) => Value::from(*id),
            RowId::Text(id) => Value::from(id.as_str()),
        }
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        Value::from(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids_as_integers() {
        assert_eq!("42".parse::<RowId>().unwrap(), RowId::Int(42));
        assert_eq!(
            "0b7c-uuid".parse::<RowId>().unwrap(),
            RowId::Text("0b7c-uuid".to_string())
        );
    }

    #[test]
    fn deserializes_both_shapes() {
        let ids: Vec<RowId> = serde_json::from_str(r#"[5, "a1"]"#).unwrap();
        assert_eq!(ids, vec![RowId::Int(5), RowId::Text("a1".to_string())]);
        assert_eq!(Value::from(&ids[0]), serde_json::json!(5));
    }
}
