//! Opaque `bucket,key` references persisted in video records.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::traits::StorageError;

const SEPARATOR: char = ',';

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectReference {
    bucket: String,
    key: String,
}

impl ObjectReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Encode as the string stored in the metadata record.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl Display for ObjectReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}{}", self.bucket, SEPARATOR, self.key)
    }
}

impl FromStr for ObjectReference {
    type Err = StorageError;

    /// Requires exactly two non-empty comma-separated fields.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(SEPARATOR).collect();
        match fields.as_slice() {
            [bucket, key] if !bucket.is_empty() && !key.is_empty() => {
                Ok(ObjectReference::new(*bucket, *key))
            }
            _ => Err(StorageError::InvalidReference(format!(
                "expected 'bucket,key', got {} field(s) in {:?}",
                fields.len(),
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let reference = ObjectReference::new("tubely-assets", "landscape/abc.mp4");
        assert_eq!(reference.encode(), "tubely-assets,landscape/abc.mp4");

        let decoded: ObjectReference = reference.encode().parse().unwrap();
        assert_eq!(decoded, reference);
        assert_eq!(decoded.bucket(), "tubely-assets");
        assert_eq!(decoded.key(), "landscape/abc.mp4");
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        for bad in [
            "",
            "just-a-key.mp4",
            "a,b,c",
            ",key.mp4",
            "bucket,",
            "https://example.com/video.mp4",
        ] {
            let result = bad.parse::<ObjectReference>();
            assert!(
                matches!(result, Err(StorageError::InvalidReference(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
