//! 反序列化辅助函数

use serde::{Deserialize, Deserializer};

// 自定义反序列化函数，支持字符串到i64的转换
pub fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if value <= i64::MAX as u64 {
                Ok(value as i64)
            } else {
                Err(Error::invalid_value(Unexpected::Unsigned(value), &self))
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

/// 区分"字段缺失"与"字段为 null"
///
/// 配合 `#[serde(default, deserialize_with = "deserialize_some")]` 使用，
/// 缺失时为 `None`，显式 null 时为 `Some(None)`。
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// 可选的整数 ID，接受数字或数字字符串，空字符串视为未提供
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Int(v)) => Ok(Some(v)),
        Some(RawId::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(RawId::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: '{s}'"))),
    }
}

/// 可选的 ID 列表，元素可以是数字或数字字符串
pub fn deserialize_optional_id_list<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    let Some(raw) = Option::<Vec<RawId>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let mut ids = Vec::with_capacity(raw.len());
    for item in raw {
        match item {
            RawId::Int(v) => ids.push(v),
            RawId::Str(s) if s.trim().is_empty() => {}
            RawId::Str(s) => ids.push(
                s.trim()
                    .parse()
                    .map_err(|_| serde::de::Error::custom(format!("invalid id: '{s}'")))?,
            ),
        }
    }
    Ok(Some(ids))
}
