use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Deserialize a field that can be either a single item or a vector of items
pub fn single_or_vec<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    struct SingleOrVec<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for SingleOrVec<T>
    where
        T: Deserialize<'de>,
    {
        type Value = Vec<T>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("single item or array of items")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
        where
            A: de::MapAccess<'de>,
        {
            // If we get a single object, wrap it in a vector
            let item = T::deserialize(de::value::MapAccessDeserializer::new(map))?;
            Ok(vec![item])
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(SingleOrVec(PhantomData))
}

/// Deserialize the `items` wrapper of a list response.
///
/// The upstream sends `""` (or omits the field) when nothing matched, and
/// `{"item": ...}` otherwise, where `item` is an object or an array.
pub fn items_wrapper<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged, bound = "T: Deserialize<'de>")]
    enum ItemsField<T> {
        Wrapped {
            #[serde(default, deserialize_with = "single_or_vec")]
            item: Vec<T>,
        },
        Blank(String),
    }

    match Option::<ItemsField<T>>::deserialize(deserializer)? {
        Some(ItemsField::Wrapped { item }) => Ok(item),
        Some(ItemsField::Blank(_)) | None => Ok(Vec::new()),
    }
}

/// Deserialize a count that may arrive as a number, a numeric string, or nothing
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| de::Error::custom(format!("count out of range: {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid count: {}", s))),
        _ => Ok(0),
    }
}

/// Deserialize a text field that may arrive as a string, number, or null
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(|v| value_to_string(&v))
        .unwrap_or_default())
}

/// Render a scalar JSON value as text; containers and null become empty
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Container {
        #[serde(deserialize_with = "single_or_vec")]
        items: Vec<Item>,
    }

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "items_wrapper")]
        items: Vec<Item>,
        #[serde(rename = "totalCount", default, deserialize_with = "lenient_u32")]
        total_count: u32,
    }

    #[test]
    fn test_single_item() {
        let json = r#"{"items": {"id": "1", "name": "Item 1"}}"#;
        let container: Container = serde_json::from_str(json).unwrap();
        assert_eq!(container.items.len(), 1);
        assert_eq!(container.items[0].id, "1");
    }

    #[test]
    fn test_multiple_items() {
        let json = r#"{"items": [{"id": "1", "name": "Item 1"}, {"id": "2", "name": "Item 2"}]}"#;
        let container: Container = serde_json::from_str(json).unwrap();
        assert_eq!(container.items.len(), 2);
        assert_eq!(container.items[1].id, "2");
    }

    #[test]
    fn test_items_wrapper_blank_string() {
        let body: Body = serde_json::from_str(r#"{"items": "", "totalCount": 0}"#).unwrap();
        assert!(body.items.is_empty());
        assert_eq!(body.total_count, 0);
    }

    #[test]
    fn test_items_wrapper_absent() {
        let body: Body = serde_json::from_str(r#"{"totalCount": "3"}"#).unwrap();
        assert!(body.items.is_empty());
        assert_eq!(body.total_count, 3);
    }

    #[test]
    fn test_items_wrapper_single_object() {
        let body: Body =
            serde_json::from_str(r#"{"items": {"item": {"id": "A", "name": "a"}}, "totalCount": 1}"#)
                .unwrap();
        assert_eq!(body.items, vec![Item { id: "A".into(), name: "a".into() }]);
    }

    #[test]
    fn test_items_wrapper_array() {
        let body: Body = serde_json::from_str(
            r#"{"items": {"item": [{"id": "A", "name": "a"}, {"id": "B", "name": "b"}]}, "totalCount": 2}"#,
        )
        .unwrap();
        assert_eq!(body.items.len(), 2);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&serde_json::json!("x")), "x");
        assert_eq!(value_to_string(&serde_json::json!(126.98)), "126.98");
        assert_eq!(value_to_string(&serde_json::json!(null)), "");
    }
}
