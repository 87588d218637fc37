use serde::{de::DeserializeOwned, Serialize};

/// A message exchanged between ranks, serialized as `{"<NAME>": {...}}`.
pub trait Fragment: Serialize + DeserializeOwned {
    const NAME: &'static str;

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut wrapped = serde_json::Map::new();
        wrapped.insert(Self::NAME.to_owned(), serde_json::to_value(self)?);
        Ok(serde_json::Value::Object(wrapped))
    }

    fn from_json(fragment: &str) -> Result<Self, serde_json::Error> {
        let v: serde_json::Value = serde_json::from_str(fragment)?;
        serde_json::from_value(v[Self::NAME].clone())
    }
}

/// Name of the fragment wrapped in `json`, if it looks like one.
pub fn fragment_name(json: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(json).ok()?;
    v.as_object()?.keys().next().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        fragments::{barrier::BarrierArrival, handshake::Hello},
        rank::Rank,
    };

    #[test]
    fn wraps_payload_in_its_name() {
        let hello = Hello {
            rank: Rank(2),
            world_size: 4,
        };
        let json = hello.to_json().unwrap().to_string();
        assert_eq!(json, r#"{"Hello":{"rank":2,"world_size":4}}"#);
        assert_eq!(fragment_name(&json).as_deref(), Some("Hello"));
        assert_eq!(Hello::from_json(&json).unwrap(), hello);
    }

    #[test]
    fn refuses_other_fragments() {
        let json = BarrierArrival { rank: Rank(1) }.to_json().unwrap().to_string();
        assert!(Hello::from_json(&json).is_err());
        assert_eq!(fragment_name("not json"), None);
    }
}
