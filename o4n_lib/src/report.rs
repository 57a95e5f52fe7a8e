// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The result document printed by each of the tools:
/// `{"changed": .., "msg": .., "content": ..}`
#[derive(Debug, Serialize)]
pub struct ModuleOutput<C: Serialize> {
    pub changed: bool,
    pub msg: String,
    pub content: C,
}

impl<C: Serialize> ModuleOutput<C> {
    pub fn new(changed: bool, msg: impl Into<String>, content: C) -> Self {
        Self {
            changed,
            msg: msg.into(),
            content,
        }
    }

    pub fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(writer, self)
    }
}

/// Content wrapper used by the diff and find tools
#[derive(Debug, Serialize)]
pub struct DiffResults<T: Serialize> {
    #[serde(rename = "Diff_Results")]
    pub diff_results: T,
    #[serde(rename = "Total_execution_time")]
    pub total_execution_time: String,
}

impl<T: Serialize> DiffResults<T> {
    pub fn new(diff_results: T, elapsed: Duration) -> Self {
        Self {
            diff_results,
            total_execution_time: format_elapsed(elapsed),
        }
    }
}

/// Format a duration as `H:MM:SS[.ffffff]`
///
/// Example:
/// ```
/// use std::time::Duration;
/// use o4n_lib::report::format_elapsed;
/// assert_eq!(format_elapsed(Duration::from_micros(2101)), "0:00:00.002101");
/// assert_eq!(format_elapsed(Duration::from_secs(3723)), "1:02:03");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let micros = elapsed.as_micros();
    let secs = micros / 1_000_000;
    let fraction = micros % 1_000_000;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if fraction == 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{fraction:06}")
    }
}

/// A string keyed map that serializes its entries in insertion order.
/// Re-inserting a key replaces its value but keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: vec![],
            positions: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.positions.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.entries.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod report_tests {
    use super::*;

    #[test]
    fn ordered_map_keeps_first_position() {
        let mut map = OrderedMap::default();
        map.insert("b", 1);
        map.insert("a", 2);
        map.insert("b", 3);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&3));
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"b":3,"a":2}"#);
    }

    #[test]
    fn ordered_map_many_keys() {
        let mut map = OrderedMap::default();
        for index in 0..50_000 {
            map.insert(format!("match {index}"), index);
        }
        map.insert("match 7", 0);
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.get("match 7"), Some(&0));
        assert_eq!(map.get("match 49999"), Some(&49_999));
        assert_eq!(map.get("match 50000"), None);
        assert_eq!(map.keys().nth(7), Some("match 7"));
    }

    #[test]
    fn module_output() {
        let output = ModuleOutput::new(
            false,
            "done",
            DiffResults::new(vec!["x"], Duration::from_millis(134)),
        );
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["msg"], "done");
        assert_eq!(value["changed"], false);
        assert_eq!(value["content"]["Diff_Results"][0], "x");
        assert_eq!(value["content"]["Total_execution_time"], "0:00:00.134000");
    }
}
