//! Local intent routing. Maps one user utterance (typed text or a clicked
//! option label) to a canned reply, a panel transition, or a delegation to
//! the model collaborator.

use crate::content;
use crate::types::{Message, MessageKind, Mode, Sender};

/// Outcome of routing one utterance.
#[derive(Debug, Clone)]
pub enum Classification {
    /// A fully-formed bot message to append verbatim.
    Direct(Message),
    /// Activate a panel. `offer` is appended before the switch when present;
    /// literal menu clicks carry none because the panel itself is the reply.
    ModeTransition { mode: Mode, offer: Option<Message> },
    /// No local rule matched; the caller asks the model collaborator.
    Delegate,
}

const SYMPTOM_KEYWORDS: &[&str] = &["symptom", "not feeling well", "sick"];
const APPOINTMENT_KEYWORDS: &[&str] = &["appointment", "schedule", "booking", "doctor"];
const REMINDER_KEYWORDS: &[&str] = &["medicine", "medication", "reminder"];
const TIP_KEYWORDS: &[&str] = &["tip", "advice", "health tips"];
const FAQ_KEYWORDS: &[&str] = &["faq", "question"];
const NEARBY_KEYWORDS: &[&str] = &["hospital", "nearby", "find", "location", "doctors near me"];
const GREETING_KEYWORDS: &[&str] = &["hello", "hi"];

/// Routes free-typed text. Case-insensitive substring rules, first match
/// wins; the ordering is product behavior, not an accident. Typed
/// "find nearby doctors" lands on the appointment rule because "doctor"
/// is checked first; the nearby panel is reached by clicking its menu
/// option or mentioning "hospital"/"nearby".
pub fn classify_text(text: &str) -> Classification {
    let lowered = text.to_lowercase();

    if contains_any(&lowered, SYMPTOM_KEYWORDS) || mentions_known_symptom(&lowered) {
        return Classification::ModeTransition {
            mode: Mode::SymptomChecker,
            offer: Some(symptom_offer()),
        };
    }
    if contains_any(&lowered, APPOINTMENT_KEYWORDS) {
        return Classification::ModeTransition {
            mode: Mode::Appointment,
            offer: Some(Message::new(
                Sender::Bot,
                MessageKind::Appointment,
                content::APPOINTMENT_OFFER,
            )),
        };
    }
    if contains_any(&lowered, REMINDER_KEYWORDS) {
        return Classification::ModeTransition {
            mode: Mode::Reminder,
            offer: Some(Message::new(
                Sender::Bot,
                MessageKind::Reminder,
                content::REMINDER_OFFER,
            )),
        };
    }
    if contains_any(&lowered, TIP_KEYWORDS) {
        let tip = content::random_health_tip();
        return Classification::Direct(Message::new(
            Sender::Bot,
            MessageKind::HealthTip,
            content::health_tip_reply(tip),
        ));
    }
    if contains_any(&lowered, FAQ_KEYWORDS) {
        return Classification::Direct(Message::bot_options(
            content::FAQ_OFFER,
            content::faq_questions(),
        ));
    }
    if contains_any(&lowered, NEARBY_KEYWORDS) {
        return Classification::ModeTransition {
            mode: Mode::NearbyProvider,
            offer: Some(Message::new(
                Sender::Bot,
                MessageKind::NearbyDoctors,
                content::NEARBY_OFFER,
            )),
        };
    }
    if contains_any(&lowered, GREETING_KEYWORDS) {
        return Classification::Direct(Message::bot_text(content::HELLO_REPLY));
    }

    Classification::Delegate
}

/// Routes an option-button click. Literal equality against the fixed menu
/// vocabulary takes precedence; symptom labels and FAQ questions resolve to
/// their canned explanations; anything else falls through to the free-text
/// rules.
pub fn classify_option(label: &str) -> Classification {
    match label {
        "Check symptoms" => return silent_transition(Mode::SymptomChecker),
        "Schedule appointment" => return silent_transition(Mode::Appointment),
        "Set medication reminder" => return silent_transition(Mode::Reminder),
        "Get health tips" => return silent_transition(Mode::HealthTips),
        "Find nearby doctors" => return silent_transition(Mode::NearbyProvider),
        content::VIEW_HISTORY_OPTION => return silent_transition(Mode::HistoryPanel),
        "Ask health questions" => {
            return Classification::Direct(Message::bot_options(
                content::FAQ_MENU,
                content::faq_questions(),
            ));
        }
        _ => {}
    }

    if content::known_symptom(label) {
        return Classification::Direct(Message::bot_text(content::symptom_detail(label)));
    }
    if content::is_faq_question(label) {
        return Classification::Direct(Message::bot_text(content::faq_answer(label)));
    }

    classify_text(label)
}

fn silent_transition(mode: Mode) -> Classification {
    Classification::ModeTransition { mode, offer: None }
}

fn symptom_offer() -> Message {
    Message::new(
        Sender::Bot,
        MessageKind::SymptomChecker {
            options: content::symptom_labels(),
        },
        content::SYMPTOM_OFFER,
    )
}

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

fn mentions_known_symptom(lowered: &str) -> bool {
    content::SYMPTOMS
        .iter()
        .any(|entry| lowered.contains(&entry.label.to_lowercase()))
}
