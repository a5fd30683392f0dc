//! Plain JSON report: an indented array of records

use crate::error::Result;
use crate::model::OutputRecord;

pub fn encode(records: &[OutputRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

pub fn decode(bytes: &[u8]) -> Result<Vec<OutputRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Notifications, Owner};

    fn sample() -> Vec<OutputRecord> {
        vec![
            OutputRecord {
                namespace: "shop".into(),
                image: "nginx:1.25".into(),
                image_id: "nginx@sha256:01".into(),
                environment: "prod".into(),
                engagement_tags: vec!["a".into(), "".into()],
                owners: vec![Owner { role: "lead".into(), uuid: "u".into(), name: "n".into() }],
                notifications: Notifications {
                    emails: vec!["ops@example.com".into()],
                    ..Notifications::default()
                },
                is_scan_malware: true,
                scan_lifetime_max_days: -3,
                ..OutputRecord::default()
            },
            OutputRecord {
                namespace: "shop".into(),
                image: "nginx:1.25".into(),
                image_id: "nginx:1.25".into(),
                skip: true,
                ..OutputRecord::default()
            },
        ]
    }

    #[test]
    fn test_decode_reverses_encode() {
        let records = sample();
        let bytes = encode(&records).unwrap();
        assert_eq!(decode(&bytes).unwrap(), records);
    }

    #[test]
    fn test_output_is_indented_and_deterministic() {
        let records = sample();
        let first = encode(&records).unwrap();
        let second = encode(&records).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        assert!(text.starts_with("[\n  {\n    \"namespace\": \"shop\""));
    }

    #[test]
    fn test_empty_collection_is_an_empty_array() {
        assert_eq!(encode(&[]).unwrap(), b"[]");
    }
}
