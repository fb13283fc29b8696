use std::collections::BTreeMap;

use {
    chrono::{DateTime, Utc},
    waterline_common::time::{format_timestamp, parse_timestamp, truncate_millis},
};

use crate::{Error, Result, store::WATERMARK_KEY};

/// Group id → watermark, decoded from the persisted JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatermarkRecord {
    groups: BTreeMap<String, DateTime<Utc>>,
}

impl WatermarkRecord {
    /// Decode the persisted value. Anything other than an object of RFC 3339
    /// strings is corrupt.
    pub fn parse(raw: &str) -> Result<Self> {
        let encoded: BTreeMap<String, String> = serde_json::from_str(raw)
            .map_err(|e| Error::corrupt_state(WATERMARK_KEY, e))?;

        let mut groups = BTreeMap::new();
        for (group, ts) in encoded {
            let parsed = parse_timestamp(&ts).map_err(|e| {
                Error::corrupt_state(WATERMARK_KEY, format!("group '{group}': {ts:?}: {e}"))
            })?;
            groups.insert(group, truncate_millis(parsed));
        }
        Ok(Self { groups })
    }

    /// Encode as a compact JSON object.
    pub fn to_json(&self) -> Result<String> {
        let encoded: BTreeMap<&str, String> = self
            .groups
            .iter()
            .map(|(group, ts)| (group.as_str(), format_timestamp(ts)))
            .collect();
        Ok(serde_json::to_string(&encoded)?)
    }

    pub fn get(&self, group: &str) -> Option<DateTime<Utc>> {
        self.groups.get(group).copied()
    }

    /// Move `group` forward to `ts`. Returns `false` (and changes nothing)
    /// when `ts` is not newer than the current watermark.
    ///
    /// Watermarks are held at millisecond precision, matching the persisted
    /// form.
    pub fn advance(&mut self, group: &str, ts: DateTime<Utc>) -> bool {
        let ts = truncate_millis(ts);
        match self.groups.get_mut(group) {
            Some(current) if *current >= ts => false,
            Some(current) => {
                *current = ts;
                true
            },
            None => {
                self.groups.insert(group.to_string(), ts);
                true
            },
        }
    }

    /// Force every known group to `now`, including backwards. Never adds
    /// groups. Returns the updated group ids in sorted order.
    pub fn advance_all(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let now = truncate_millis(now);
        for ts in self.groups.values_mut() {
            *ts = now;
        }
        self.groups()
    }

    pub fn groups(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.groups.iter().map(|(g, ts)| (g.as_str(), *ts))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn ts(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn parses_and_encodes_compactly() {
        let record = WatermarkRecord::parse(
            r#"{"group-b":"2024-01-02T00:00:00.000Z","group-a":"2024-01-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"group-a":"2024-01-01T00:00:00.000Z","group-b":"2024-01-02T00:00:00.000Z"}"#
        );
    }

    #[rstest]
    #[case::not_json("not json")]
    #[case::array(r#"["a"]"#)]
    #[case::number_value(r#"{"g":42}"#)]
    #[case::bad_timestamp(r#"{"g":"last tuesday"}"#)]
    fn malformed_values_are_corrupt(#[case] raw: &str) {
        let err = WatermarkRecord::parse(raw).unwrap_err();
        assert!(err.is_corrupt_state(), "unexpected error: {err}");
    }

    #[test]
    fn empty_object_is_valid_and_empty() {
        assert!(WatermarkRecord::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn advance_is_monotonic() {
        let mut record = WatermarkRecord::default();
        assert!(record.advance("g", ts("2024-01-01T00:00:02.000Z")));
        assert!(!record.advance("g", ts("2024-01-01T00:00:01.000Z")));
        assert!(!record.advance("g", ts("2024-01-01T00:00:02.000Z")));
        assert_eq!(record.get("g"), Some(ts("2024-01-01T00:00:02.000Z")));
    }

    #[test]
    fn advance_holds_millisecond_precision() {
        let mut record = WatermarkRecord::default();
        assert!(record.advance("g", ts("2024-01-01T00:00:00.000500Z")));
        assert_eq!(record.get("g"), Some(ts("2024-01-01T00:00:00.000Z")));
        assert!(!record.advance("g", ts("2024-01-01T00:00:00.000900Z")));

        let reparsed = WatermarkRecord::parse(&record.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, record);
    }

    #[test]
    fn advance_all_can_move_backwards_and_never_adds() {
        let mut record = WatermarkRecord::default();
        record.advance("a", ts("2030-01-01T00:00:00.000Z"));
        record.advance("b", ts("2020-01-01T00:00:00.000Z"));

        let now = ts("2025-06-01T12:00:00.000Z");
        let updated = record.advance_all(now);

        assert_eq!(updated, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(record.get("a"), Some(now));
        assert_eq!(record.get("b"), Some(now));
        assert_eq!(record.len(), 2);
    }
}
