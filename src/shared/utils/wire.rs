//! Connect（proto3 JSON）形式のための serde ヘルパー
//!
//! proto3 JSON では 64bit 整数は文字列で送受信される。
//! 受信時は文字列・数値のどちらも受け付ける。

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;

struct U64Visitor;

impl<'de> Visitor<'de> for U64Visitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("u64 as a string or number")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
        u64::try_from(value).map_err(|_| E::custom(format!("負の値は指定できません: {value}")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<u64, E> {
        value
            .parse()
            .map_err(|_| E::custom(format!("u64として解析できません: {value}")))
    }
}

/// `u64` を文字列としてシリアライズする（`#[serde(with = ...)]` 用）
pub mod u64_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(U64Visitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Message {
        #[serde(with = "super::u64_string")]
        id: u64,
        #[serde(default, with = "super::u64_string")]
        amount: u64,
    }

    #[test]
    fn test_large_id_survives_as_string() {
        // 2^53 を超えるIDが丸められないこと
        let json = r#"{"id":"18446744073709551615"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.id, u64::MAX);
        assert_eq!(message.amount, 0);

        let encoded = serde_json::to_string(&message).unwrap();
        assert_eq!(encoded, r#"{"id":"18446744073709551615","amount":"0"}"#);
    }

    #[test]
    fn test_accepts_numeric_encoding() {
        let message: Message = serde_json::from_str(r#"{"id":42,"amount":"1050"}"#).unwrap();
        assert_eq!(message.id, 42);
        assert_eq!(message.amount, 1050);
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert!(serde_json::from_str::<Message>(r#"{"id":-1}"#).is_err());
        assert!(serde_json::from_str::<Message>(r#"{"id":"abc"}"#).is_err());
    }
}
