//! `serde` support, enabled by the `serde` feature.
//!
//! Serializing takes the read lock once and writes the plain value.
//! Deserializing builds a plain value first and wraps it in a new cell, so no
//! lock is held while the deserializer runs. To replace the value of a shared
//! cell, deserialize a plain value and pass it to `set`, which takes the write
//! lock once:
//!
//! ```
//! use safecell::{SafeInt, SafeStringMap};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), serde_json::Error> {
//! let counter = Arc::new(SafeInt::new(1));
//! counter.set(serde_json::from_str::<i64>("42")?);
//! assert_eq!(counter.get(), 42);
//!
//! let map = Arc::new(SafeStringMap::new());
//! let decoded: SafeStringMap = serde_json::from_str(r#"{"hello":"world"}"#)?;
//! decoded.copy_to(&map);
//! assert_eq!(map.get("hello"), "world");
//! # Ok(())
//! # }
//! ```
use crate::{SafeBool, SafeInt, SafeString, SafeStringMap, StringMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

impl Serialize for SafeBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.get())
    }
}

impl<'de> Deserialize<'de> for SafeBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(SafeBool::new)
    }
}

impl Serialize for SafeInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.get())
    }
}

impl<'de> Deserialize<'de> for SafeInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(SafeInt::new)
    }
}

impl Serialize for SafeString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.get())
    }
}

impl<'de> Deserialize<'de> for SafeString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SafeString::new)
    }
}

impl Serialize for SafeStringMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.with_read(|map| serializer.collect_map(map))
    }
}

impl<'de> Deserialize<'de> for SafeStringMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StringMap::deserialize(deserializer).map(SafeStringMap::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_serde_scalars() {
        let b: SafeBool = serde_json::from_str("true").unwrap();
        assert!(b.get());
        assert_eq!(serde_json::to_string(&b).unwrap(), "true");

        let i: SafeInt = serde_json::from_str("-42").unwrap();
        i.add(2);
        assert_eq!(serde_json::to_string(&i).unwrap(), "-40");

        let s: SafeString = serde_json::from_str(r#""hello""#).unwrap();
        s.add(" world");
        assert_eq!(serde_json::to_string(&s).unwrap(), r#""hello world""#);

        assert!(serde_json::from_str::<SafeInt>(r#""nope""#).is_err());
    }

    #[test]
    fn test_serde_map() {
        let map = SafeStringMap::from_iter([("foo", "bar")]);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"foo":"bar"}"#);

        let map: SafeStringMap = serde_json::from_str(r#"{"hello":"world"}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("hello"), "world");

        assert!(serde_json::from_str::<SafeStringMap>(r#"{"a":1}"#).is_err());
    }

    #[test]
    fn test_serde_set_in_place() {
        let flag = Arc::new(SafeBool::default());
        let name = Arc::new(SafeString::new("old"));
        let counter = Arc::new(SafeInt::new(7));

        let readers = (0..4)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    let v = counter.get();
                    assert!(v == 7 || v == -3);
                })
            })
            .collect::<Vec<_>>();
        counter.set(serde_json::from_str::<i64>("-3").unwrap());
        flag.set(serde_json::from_str::<bool>("true").unwrap());
        name.set(serde_json::from_str::<String>(r#""new""#).unwrap());
        readers.into_iter().for_each(|t| t.join().unwrap());

        assert_eq!(counter.get(), -3);
        assert!(flag.get());
        assert_eq!(name.get(), "new");

        // A failed decode leaves the cell untouched.
        assert!(serde_json::from_str::<i64>("oops").is_err());
        assert_eq!(counter.get(), -3);
    }

    #[test]
    fn test_serde_map_concurrent() {
        let map = Arc::new(SafeStringMap::from_iter([("foo", "bar")]));
        let writer = {
            let map = map.clone();
            std::thread::spawn(move || map.set("foo", "world"))
        };
        let encoded = serde_json::to_string(&*map).unwrap();
        writer.join().unwrap();

        assert!(encoded == r#"{"foo":"bar"}"# || encoded == r#"{"foo":"world"}"#);
        assert_eq!(
            serde_json::to_string(&*map).unwrap(),
            r#"{"foo":"world"}"#
        );
    }
}
