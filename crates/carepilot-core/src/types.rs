use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Semantic kind of a chat turn. The tag doubles as the render hint for a
/// driving UI: plain bubble, clickable option buttons, or a panel trigger.
/// Only the options-bearing kinds carry an option list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessageKind {
    Text,
    Options { options: Vec<String> },
    SymptomChecker { options: Vec<String> },
    Appointment,
    Reminder,
    HealthTip,
    NearbyDoctors,
}

impl MessageKind {
    pub fn is_text(&self) -> bool {
        matches!(self, MessageKind::Text)
    }

    pub fn is_options(&self) -> bool {
        matches!(self, MessageKind::Options { .. })
    }
}

/// One conversational turn. Serialized self-describing (kind flattened into
/// a `type` tag) so persisted history snapshots replay without extra context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: MessageKind,
}

impl Message {
    pub fn new(sender: Sender, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn user_text(content: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageKind::Text, content)
    }

    pub fn bot_text(content: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageKind::Text, content)
    }

    pub fn bot_options(content: impl Into<String>, options: Vec<String>) -> Self {
        Self::new(Sender::Bot, MessageKind::Options { options }, content)
    }

    pub fn is_bot_text(&self) -> bool {
        self.sender == Sender::Bot && self.kind.is_text()
    }
}

/// The special-purpose panel a conversation can be in. `HistoryPanel` is
/// orthogonal to the rest: it is a side panel, not a form replacement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    SymptomChecker,
    Appointment,
    Reminder,
    HealthTips,
    NearbyProvider,
    HistoryPanel,
}

/// Authenticated user, as produced by the storage collaborator's auth side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

/// One persisted, bounded conversation summary. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryItem {
    pub id: Uuid,
    pub topic: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    pub messages: Vec<Message>,
}

/// A scheduled medication notification record, stored on the profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub medication_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    /// Local wall-clock time, "HH:MM".
    pub time: String,
    pub active: bool,
    /// Local date ("YYYY-MM-DD") of the last fired notification; guards
    /// against duplicate same-day firing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<String>,
}

impl Reminder {
    /// New active reminder from a validated form payload.
    pub fn from_draft(draft: ReminderDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            medication_name: draft.medication_name,
            dosage: draft.dosage,
            frequency: draft.frequency,
            time: draft.time,
            active: true,
            last_notified: None,
        }
    }
}

/// Reminder-form completion payload, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    pub medication_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicalInfo {
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiPersonalization {
    #[serde(default)]
    pub frequent_symptoms: Vec<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatHistoryItem>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The externally-owned profile aggregate. Only the sections the chat core
/// reads or writes are modeled; everything else round-trips through the
/// flattened maps so foreign writers' data survives a save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default)]
    pub basic_info: BasicInfo,
    #[serde(default)]
    pub medical_info: MedicalInfo,
    #[serde(default)]
    pub ai_personalization: AiPersonalization,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProfileData {
    /// Default document for a first login, seeded from the identity.
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            basic_info: BasicInfo {
                full_name: identity.display_name.clone(),
                email: identity.email.clone(),
                extra: BTreeMap::new(),
            },
            ..Self::default()
        }
    }
}

/// What one turn of the conversation produced: the messages appended to the
/// log (user echo included, in order) and the resulting panel state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionReply {
    pub messages: Vec<Message>,
    pub active_mode: Option<Mode>,
    pub history_open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_snapshot_is_self_describing() {
        let message = Message::new(
            Sender::Bot,
            MessageKind::SymptomChecker {
                options: vec!["Fever".to_owned(), "Cough".to_owned()],
            },
            "What symptoms are you experiencing?",
        );

        let raw = serde_json::to_value(&message).expect("message should serialize");
        assert_eq!(raw["type"], "symptom-checker");
        assert_eq!(raw["sender"], "bot");
        assert_eq!(raw["options"][0], "Fever");

        let back: Message = serde_json::from_value(raw).expect("message should deserialize");
        assert_eq!(back, message);
    }

    #[test]
    fn text_message_carries_no_options_field() {
        let message = Message::user_text("hello");
        let raw = serde_json::to_value(&message).expect("message should serialize");
        assert_eq!(raw["type"], "text");
        assert!(raw.get("options").is_none());
    }

    #[test]
    fn profile_round_trips_unknown_sections() {
        let raw = serde_json::json!({
            "basicInfo": { "fullName": "Ada", "email": "ada@example.com", "gender": "female" },
            "medicalInfo": { "reminders": [], "bloodGroup": "0+" },
            "healthMetrics": { "height": "170" },
            "aiPersonalization": { "frequentSymptoms": ["Headache"], "chatHistory": [] }
        });

        let profile: ProfileData =
            serde_json::from_value(raw.clone()).expect("profile should deserialize");
        assert_eq!(profile.basic_info.full_name, "Ada");
        assert_eq!(profile.ai_personalization.frequent_symptoms, ["Headache"]);

        let back = serde_json::to_value(&profile).expect("profile should serialize");
        assert_eq!(back["healthMetrics"]["height"], "170");
        assert_eq!(back["medicalInfo"]["bloodGroup"], "0+");
        assert_eq!(back["basicInfo"]["gender"], "female");
    }
}
