//! Per-connection session metadata
//!
//! Captured once from the `setup` frame, write-once and read-only after
//! that, and used only for diagnostic logging. Nothing here outlives the
//! connection.

use serde::Deserialize;

/// Call metadata from the `setup` frame
///
/// The peer may include further fields (custom parameters and the like);
/// anything beyond these is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Peer-assigned session identifier
    pub session_id: String,
    /// Telephony call identifier
    pub call_sid: String,
    /// Originating address
    #[serde(default)]
    pub from: Option<String>,
    /// Destination address
    #[serde(default)]
    pub to: Option<String>,
    /// Call direction ("inbound" / "outbound")
    #[serde(default)]
    pub direction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_setup_parses() {
        let json = r#"{"sessionId": "s1", "callSid": "c1"}"#;
        let session: SessionInfo = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(session.session_id, "s1");
        assert_eq!(session.call_sid, "c1");
        assert!(session.from.is_none());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let json = r#"{
            "sessionId": "s1",
            "callSid": "c1",
            "customParameters": {"campaign": "summer"}
        }"#;
        let session: SessionInfo = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(session.session_id, "s1");
    }
}
