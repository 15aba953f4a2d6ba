//! Decision record
//!
//! Persisted as a JSON object under the record id. Field names are the
//! persisted-format contract:
//!
//! ```text
//! {"id":..,"payload":..,"assertedDigest":..,"computedDigest":..,
//!  "txId":..,"txTimestamp":..,"source":..}
//! ```

use serde::{Deserialize, Serialize};

use crate::canonical;
use crate::digest::digest_hex;

/// Provenance tag written into every record by this contract
pub const SOURCE_TAG: &str = "zone2-chaincode";

/// An immutable, committed decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    /// Primary key
    pub id: String,
    /// Canonical JSON text of the submitted document
    pub payload: String,
    /// Digest supplied by the caller (normalized)
    pub asserted_digest: String,
    /// Digest computed over `payload`
    pub computed_digest: String,
    /// Commit transaction id
    pub tx_id: String,
    /// `<seconds>.<nanos>` or empty if the host had no timestamp
    pub tx_timestamp: String,
    /// Provenance marker
    pub source: String,
}

impl DecisionRecord {
    /// Encode for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode stored bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Re-derive the digest from the stored payload and check it against
    /// both stored digests. Also checks the payload is still canonical.
    ///
    /// Returns a description of the first discrepancy.
    pub fn check_integrity(&self) -> Result<(), String> {
        let recomputed = digest_hex(self.payload.as_bytes());
        if recomputed != self.computed_digest {
            return Err(format!(
                "payload digest {} does not match stored computedDigest {}",
                recomputed, self.computed_digest
            ));
        }
        if self.asserted_digest != self.computed_digest {
            return Err(format!(
                "assertedDigest {} does not match computedDigest {}",
                self.asserted_digest, self.computed_digest
            ));
        }
        match canonical::canonicalize_to_string(&self.payload) {
            Ok(c) if c == self.payload => Ok(()),
            Ok(_) => Err("payload is not in canonical form".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecisionRecord {
        let payload = r#"{"a":1,"b":2}"#.to_string();
        let digest = digest_hex(payload.as_bytes());
        DecisionRecord {
            id: "d1".to_string(),
            payload,
            asserted_digest: digest.clone(),
            computed_digest: digest,
            tx_id: "tx-1".to_string(),
            tx_timestamp: "1700000000.000000001".to_string(),
            source: SOURCE_TAG.to_string(),
        }
    }

    #[test]
    fn test_field_names() {
        let bytes = sample().to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "assertedDigest",
                "computedDigest",
                "id",
                "payload",
                "source",
                "txId",
                "txTimestamp"
            ]
        );
    }

    #[test]
    fn test_decode_stored_bytes() {
        let record = sample();
        let decoded = DecisionRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(DecisionRecord::from_bytes(&[0]).is_err());
        assert!(DecisionRecord::from_bytes(br#"{"id":"d1"}"#).is_err());
    }

    #[test]
    fn test_integrity_ok() {
        assert!(sample().check_integrity().is_ok());
    }

    #[test]
    fn test_integrity_detects_edited_payload() {
        let mut record = sample();
        record.payload = r#"{"a":1,"b":3}"#.to_string();
        assert!(record.check_integrity().is_err());
    }

    #[test]
    fn test_integrity_detects_non_canonical_payload() {
        let mut record = sample();
        record.payload = r#"{"b":2,"a":1}"#.to_string();
        let digest = digest_hex(record.payload.as_bytes());
        record.asserted_digest = digest.clone();
        record.computed_digest = digest;
        assert_eq!(
            record.check_integrity(),
            Err("payload is not in canonical form".to_string())
        );
    }
}
