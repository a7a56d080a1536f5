//! Relay WebSocket frame types
//!
//! One JSON frame per WebSocket text message, dispatched on the `type` tag.
//! The inbound vocabulary is fixed by the voice-transport peer: `setup`,
//! `prompt`, `dtmf`, `interrupt`. Anything else lands on the `Unknown`
//! variant so an unrecognized tag is logged and ignored rather than treated
//! as a parse failure. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use super::session::SessionInfo;

// =============================================================================
// Inbound Frames (Peer -> Server)
// =============================================================================

/// Inbound frames from the voice-transport peer
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    /// Session metadata, sent once after the peer connects
    Setup(SessionInfo),

    /// One completed caller utterance; triggers one turn
    #[serde(rename_all = "camelCase")]
    Prompt {
        /// Transcribed caller speech
        voice_prompt: String,
        /// BCP-47 language tag of the transcription
        #[serde(default)]
        lang: Option<String>,
        /// Whether this is the final fragment of the utterance
        #[serde(default = "default_true")]
        last: bool,
    },

    /// Keypad press during the call
    Dtmf {
        /// The pressed digit
        digit: String,
    },

    /// Caller spoke over the reply being synthesized
    #[serde(rename_all = "camelCase")]
    Interrupt {
        /// What had been spoken back before the caller broke in
        utterance_until_interrupt: String,
        /// How far into playback the interruption happened
        duration_until_interrupt_ms: u64,
    },

    /// Any tag outside the known vocabulary
    #[serde(other)]
    Unknown,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Outbound Frames (Server -> Peer)
// =============================================================================

/// Outbound frames to the voice-transport peer
///
/// The relay emits exactly one kind of frame: a reply utterance for the
/// peer to synthesize.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    /// Reply text for speech synthesis
    Text {
        /// The reply utterance
        token: String,
        /// Always true: replies are sent whole, not streamed
        last: bool,
    },
}

impl OutboundFrame {
    /// Build the reply frame for a completed turn
    pub fn reply(token: String) -> Self {
        OutboundFrame::Text { token, last: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_frame_deserialization() {
        let json = r#"{
            "type": "setup",
            "sessionId": "s1",
            "callSid": "c1",
            "from": "+1555",
            "to": "+1666",
            "direction": "inbound"
        }"#;

        let frame: InboundFrame = serde_json::from_str(json).expect("Should deserialize");
        match frame {
            InboundFrame::Setup(session) => {
                assert_eq!(session.session_id, "s1");
                assert_eq!(session.call_sid, "c1");
                assert_eq!(session.from.as_deref(), Some("+1555"));
                assert_eq!(session.to.as_deref(), Some("+1666"));
                assert_eq!(session.direction.as_deref(), Some("inbound"));
            }
            _ => panic!("Expected Setup variant"),
        }
    }

    #[test]
    fn test_prompt_frame_deserialization() {
        let json = r#"{
            "type": "prompt",
            "voicePrompt": "I have five years of experience",
            "lang": "en-US",
            "last": true
        }"#;

        let frame: InboundFrame = serde_json::from_str(json).expect("Should deserialize");
        match frame {
            InboundFrame::Prompt {
                voice_prompt,
                lang,
                last,
            } => {
                assert_eq!(voice_prompt, "I have five years of experience");
                assert_eq!(lang.as_deref(), Some("en-US"));
                assert!(last);
            }
            _ => panic!("Expected Prompt variant"),
        }
    }

    #[test]
    fn test_prompt_defaults() {
        let json = r#"{"type": "prompt", "voicePrompt": "hello"}"#;
        let frame: InboundFrame = serde_json::from_str(json).expect("Should deserialize");
        match frame {
            InboundFrame::Prompt { lang, last, .. } => {
                assert!(lang.is_none());
                assert!(last);
            }
            _ => panic!("Expected Prompt variant"),
        }
    }

    #[test]
    fn test_dtmf_frame_deserialization() {
        let json = r#"{"type": "dtmf", "digit": "5"}"#;
        let frame: InboundFrame = serde_json::from_str(json).expect("Should deserialize");
        match frame {
            InboundFrame::Dtmf { digit } => assert_eq!(digit, "5"),
            _ => panic!("Expected Dtmf variant"),
        }
    }

    #[test]
    fn test_interrupt_frame_deserialization() {
        let json = r#"{
            "type": "interrupt",
            "utteranceUntilInterrupt": "Great, can you tell",
            "durationUntilInterruptMs": 1250
        }"#;

        let frame: InboundFrame = serde_json::from_str(json).expect("Should deserialize");
        match frame {
            InboundFrame::Interrupt {
                utterance_until_interrupt,
                duration_until_interrupt_ms,
            } => {
                assert_eq!(utterance_until_interrupt, "Great, can you tell");
                assert_eq!(duration_until_interrupt_ms, 1250);
            }
            _ => panic!("Expected Interrupt variant"),
        }
    }

    #[test]
    fn test_unknown_tag_maps_to_unknown() {
        let json = r#"{"type": "media", "payload": "abc"}"#;
        let frame: InboundFrame = serde_json::from_str(json).expect("Should deserialize");
        assert!(matches!(frame, InboundFrame::Unknown));
    }

    #[test]
    fn test_missing_tag_is_an_error() {
        let json = r#"{"voicePrompt": "hello"}"#;
        assert!(serde_json::from_str::<InboundFrame>(json).is_err());
    }

    #[test]
    fn test_reply_frame_serialization() {
        let frame = OutboundFrame::reply(
            "Great, can you tell me about your most recent project?".to_string(),
        );
        let json = serde_json::to_value(&frame).expect("Should serialize");

        assert_eq!(json["type"], "text");
        assert_eq!(
            json["token"],
            "Great, can you tell me about your most recent project?"
        );
        assert_eq!(json["last"], true);
    }
}
