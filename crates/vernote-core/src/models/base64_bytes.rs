//! Serde adapter for optional binary fields carried as base64 strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match data {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
    let Some(encoded) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if encoded.trim().is_empty() {
        return Ok(None);
    }
    STANDARD
        .decode(encoded.trim())
        .map(Some)
        .map_err(|error| D::Error::custom(format!("invalid base64 image: {error}")))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Holder {
        #[serde(default, with = "super")]
        image: Option<Vec<u8>>,
    }

    #[test]
    fn blank_string_reads_as_no_image() {
        let holder: Holder = serde_json::from_str(r#"{"image":"  "}"#).unwrap();
        assert_eq!(holder.image, None);
    }

    #[test]
    fn rejects_invalid_base64() {
        let error = serde_json::from_str::<Holder>(r#"{"image":"***"}"#).unwrap_err();
        assert!(error.to_string().contains("invalid base64"));
    }
}
