//! Static healthcare content: symptom guidance, tips, FAQs, appointment
//! slots, and the canned bot texts. None of this is clinical logic; it is
//! lookup-table material the assistant serves verbatim.

use rand::Rng;
use serde::Serialize;

pub struct SymptomEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub guidance: &'static str,
}

pub const SYMPTOMS: &[SymptomEntry] = &[
    SymptomEntry {
        id: "fever",
        label: "Fever",
        guidance: "Fever could indicate an infection. Monitor your temperature and stay hydrated.",
    },
    SymptomEntry {
        id: "cough",
        label: "Cough",
        guidance: "Coughs can be caused by infections, allergies, or irritants. If persistent, consider consulting a healthcare provider.",
    },
    SymptomEntry {
        id: "headache",
        label: "Headache",
        guidance: "Headaches can be due to stress, dehydration, or other factors. Rest and stay hydrated.",
    },
    SymptomEntry {
        id: "sore_throat",
        label: "Sore Throat",
        guidance: "Sore throats are often caused by viral infections. Warm liquids and rest may help.",
    },
    SymptomEntry {
        id: "fatigue",
        label: "Fatigue",
        guidance: "Fatigue can be caused by lack of sleep, stress, or underlying health conditions.",
    },
    SymptomEntry {
        id: "body_ache",
        label: "Body Ache",
        guidance: "Body aches often accompany infections or can be caused by physical exertion.",
    },
    SymptomEntry {
        id: "shortness_of_breath",
        label: "Shortness of Breath",
        guidance: "Shortness of breath could indicate a respiratory issue and should be evaluated by a healthcare professional.",
    },
    SymptomEntry {
        id: "nausea",
        label: "Nausea",
        guidance: "Nausea can be caused by digestive issues, motion sickness, or other factors.",
    },
    SymptomEntry {
        id: "dizziness",
        label: "Dizziness",
        guidance: "Dizziness may be caused by inner ear issues, low blood sugar, or dehydration.",
    },
    SymptomEntry {
        id: "rash",
        label: "Skin Rash",
        guidance: "Skin rashes can be caused by allergies, infections, or other skin conditions.",
    },
];

pub const HEALTH_TIPS: &[&str] = &[
    "Stay hydrated by drinking at least 8 glasses of water daily.",
    "Aim for 7-9 hours of quality sleep each night.",
    "Include a variety of fruits and vegetables in your diet.",
    "Exercise regularly - aim for at least 150 minutes of moderate activity per week.",
    "Practice stress management techniques like meditation or deep breathing.",
    "Maintain a balanced diet with appropriate portions.",
    "Take regular breaks from screen time to rest your eyes.",
    "Wash hands frequently to prevent the spread of germs.",
    "Schedule regular check-ups with your healthcare provider.",
    "Stay up to date with recommended vaccinations.",
];

pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const HEALTH_FAQS: &[Faq] = &[
    Faq {
        question: "How can I improve my sleep quality?",
        answer: "Maintain a regular sleep schedule, create a restful environment, limit screen time before bed, avoid caffeine and large meals in the evening, and consider relaxation techniques before bedtime.",
    },
    Faq {
        question: "What are the signs of dehydration?",
        answer: "Signs include increased thirst, dry mouth, fatigue, headache, dark-colored urine, and dizziness. Stay hydrated by drinking water regularly throughout the day.",
    },
    Faq {
        question: "How can I manage stress effectively?",
        answer: "Regular exercise, adequate sleep, mindfulness practices, maintaining social connections, and time management can all help reduce stress. Consider activities like yoga, meditation, or hobbies you enjoy.",
    },
    Faq {
        question: "When should I get a flu shot?",
        answer: "The best time to get a flu shot is before flu season begins, typically in early fall. However, getting vaccinated later can still provide protection during most of the flu season.",
    },
    Faq {
        question: "How much exercise do adults need?",
        answer: "Adults should aim for at least 150 minutes of moderate-intensity aerobic activity or 75 minutes of vigorous activity per week, plus muscle-strengthening activities at least twice a week.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppointmentSlot {
    pub id: u32,
    pub date: &'static str,
    pub time: &'static str,
    pub doctor: &'static str,
    pub specialty: &'static str,
}

pub const APPOINTMENT_SLOTS: &[AppointmentSlot] = &[
    AppointmentSlot { id: 1, date: "2025-05-02", time: "09:00 AM", doctor: "Dr. Sarah Johnson", specialty: "General Medicine" },
    AppointmentSlot { id: 2, date: "2025-05-02", time: "11:30 AM", doctor: "Dr. Sarah Johnson", specialty: "General Medicine" },
    AppointmentSlot { id: 3, date: "2025-05-03", time: "10:00 AM", doctor: "Dr. Michael Chen", specialty: "Internal Medicine" },
    AppointmentSlot { id: 4, date: "2025-05-03", time: "02:15 PM", doctor: "Dr. Michael Chen", specialty: "Internal Medicine" },
    AppointmentSlot { id: 5, date: "2025-05-04", time: "09:30 AM", doctor: "Dr. Emily Rodriguez", specialty: "Pediatrics" },
    AppointmentSlot { id: 6, date: "2025-05-04", time: "01:00 PM", doctor: "Dr. Emily Rodriguez", specialty: "Pediatrics" },
    AppointmentSlot { id: 7, date: "2025-05-05", time: "11:00 AM", doctor: "Dr. David Kim", specialty: "Cardiology" },
    AppointmentSlot { id: 8, date: "2025-05-05", time: "03:30 PM", doctor: "Dr. David Kim", specialty: "Cardiology" },
];

/// Main-menu option labels, in display order. These exact strings are part
/// of the option-click vocabulary.
pub const MENU_OPTIONS: &[&str] = &[
    "Check symptoms",
    "Schedule appointment",
    "Set medication reminder",
    "Get health tips",
    "Ask health questions",
    "Find nearby doctors",
];

pub const VIEW_HISTORY_OPTION: &str = "View chat history";

pub const GREETING: &str = "Hello! I'm your Smart Healthcare Assistant. How can I help you today?";

pub const HELLO_REPLY: &str = "Hello! I'm your Smart Healthcare Assistant. How can I help you today? You can ask about symptoms, schedule an appointment, set medication reminders, get health tips, or find nearby healthcare facilities.";

pub const SYMPTOM_OFFER: &str =
    "I can help you check your symptoms. What symptoms are you experiencing?";

pub const APPOINTMENT_OFFER: &str =
    "Would you like to schedule an appointment with a healthcare provider?";

pub const REMINDER_OFFER: &str =
    "I can help you set up medication reminders. Would you like to add one?";

pub const FAQ_OFFER: &str =
    "Here are some frequently asked health questions. Which one would you like to know more about?";

pub const FAQ_MENU: &str = "Here are some common health questions. Select one to learn more:";

pub const NEARBY_OFFER: &str =
    "I can help you find nearby hospitals and doctors. Would you like me to show you healthcare facilities in your area?";

pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

pub const SYMPTOM_FALLBACK: &str = "I don't have specific information about that symptom. It's best to consult with a healthcare professional for personalized advice.";

pub const FAQ_FALLBACK: &str = "I don't have information about that specific question.";

pub const REMINDER_INCOMPLETE: &str =
    "Please enter at least the medication name and time to set a reminder.";

pub const REMINDER_SAVE_FAILED: &str =
    "I couldn't save your reminder right now. Please try again in a moment.";

pub const APPOINTMENT_UNAVAILABLE: &str =
    "Sorry, there was an issue with scheduling your appointment. Please try again.";

pub fn symptom_labels() -> Vec<String> {
    SYMPTOMS.iter().map(|entry| entry.label.to_owned()).collect()
}

pub fn faq_questions() -> Vec<String> {
    HEALTH_FAQS
        .iter()
        .map(|faq| faq.question.to_owned())
        .collect()
}

/// Guidance text for one symptom label. Total: unknown labels get the
/// generic consult-a-professional line.
pub fn symptom_guidance(label: &str) -> &'static str {
    SYMPTOMS
        .iter()
        .find(|entry| entry.label.eq_ignore_ascii_case(label))
        .map(|entry| entry.guidance)
        .unwrap_or(SYMPTOM_FALLBACK)
}

pub fn known_symptom(label: &str) -> bool {
    SYMPTOMS
        .iter()
        .any(|entry| entry.label.eq_ignore_ascii_case(label))
}

/// Exact-match FAQ answer, or the generic fallback line.
pub fn faq_answer(question: &str) -> &'static str {
    HEALTH_FAQS
        .iter()
        .find(|faq| faq.question == question)
        .map(|faq| faq.answer)
        .unwrap_or(FAQ_FALLBACK)
}

pub fn is_faq_question(question: &str) -> bool {
    HEALTH_FAQS.iter().any(|faq| faq.question == question)
}

pub fn random_health_tip() -> &'static str {
    let index = rand::thread_rng().gen_range(0..HEALTH_TIPS.len());
    HEALTH_TIPS[index]
}

pub fn appointment_slot(id: u32) -> Option<&'static AppointmentSlot> {
    APPOINTMENT_SLOTS.iter().find(|slot| slot.id == id)
}

/// Offline symptom report for a free-text description: one guidance line per
/// recognized label plus the standing disclaimer. Used when the model
/// collaborator is unavailable.
pub fn symptom_report(description: &str) -> String {
    let lowered = description.to_lowercase();
    let mut lines = Vec::new();
    for entry in SYMPTOMS {
        if lowered.contains(&entry.label.to_lowercase()) {
            lines.push(format!("- {}: {}", entry.label, entry.guidance));
        }
    }
    if lines.is_empty() {
        lines.push(format!("- {SYMPTOM_FALLBACK}"));
    }

    format!(
        "Based on your symptoms, here's some general information:\n\n{}\n\nThis is not a medical diagnosis. Please consult a healthcare professional for proper evaluation and treatment.",
        lines.join("\n")
    )
}

pub fn welcome_back(name: &str) -> String {
    format!("Welcome back, {name}! How can I help you with your healthcare needs today?")
}

pub fn health_tip_reply(tip: &str) -> String {
    format!("Here's a health tip for you: {tip}")
}

pub fn symptom_detail(label: &str) -> String {
    format!("About {label}: {}", symptom_guidance(label))
}

pub fn provider_selected(name: &str, category: &str) -> String {
    format!("You selected {name}, {category}. Please schedule your appointment below.")
}

pub fn resumption_notice(topic: &str) -> String {
    format!("We're back in your earlier conversation about \"{topic}\". Feel free to pick up where we left off.")
}

pub fn appointment_confirmation(slot: &AppointmentSlot, location: Option<&str>) -> String {
    let mut lines = vec![
        "Your appointment has been scheduled:".to_owned(),
        String::new(),
        format!("Date: {}", slot.date),
        format!("Time: {}", slot.time),
        format!("Doctor: {}", slot.doctor),
        format!("Specialty: {}", slot.specialty),
    ];
    if let Some(location) = location {
        lines.push(format!("Location: {location}"));
    }
    lines.push(String::new());
    lines.push(
        "You will receive a confirmation email shortly. You can cancel or reschedule your appointment up to 24 hours before the scheduled time.".to_owned(),
    );
    lines.join("\n")
}

pub fn reminder_confirmation(name: &str, dosage: &str, frequency: &str, time: &str) -> String {
    let mut lines = vec![
        "Medication reminder set:".to_owned(),
        String::new(),
        format!("Medication: {name}"),
    ];
    if !dosage.is_empty() {
        lines.push(format!("Dosage: {dosage}"));
    }
    if !frequency.is_empty() {
        lines.push(format!("Frequency: {frequency}"));
    }
    lines.push(format!("Time: {time}"));
    lines.push(String::new());
    lines.push("I'll remind you to take your medication at the scheduled time.".to_owned());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symptom_guidance_is_total() {
        assert!(symptom_guidance("Headache").contains("stress"));
        assert!(symptom_guidance("headache").contains("stress"));
        assert_eq!(symptom_guidance("Elbow Pain"), SYMPTOM_FALLBACK);
    }

    #[test]
    fn faq_answer_is_total() {
        assert!(faq_answer("When should I get a flu shot?").contains("early fall"));
        assert_eq!(faq_answer("What is a flu shot?"), FAQ_FALLBACK);
    }

    #[test]
    fn random_tip_comes_from_the_table() {
        let tip = random_health_tip();
        assert!(HEALTH_TIPS.contains(&tip));
    }

    #[test]
    fn appointment_slot_lookup() {
        let slot = appointment_slot(3).expect("slot 3 should exist");
        assert_eq!(slot.doctor, "Dr. Michael Chen");
        assert!(appointment_slot(99).is_none());
    }

    #[test]
    fn symptom_report_lists_recognized_labels() {
        let report = symptom_report("Fever, Cough");
        assert!(report.contains("- Fever:"));
        assert!(report.contains("- Cough:"));
        assert!(report.contains("not a medical diagnosis"));
    }

    #[test]
    fn symptom_report_falls_back_when_nothing_matches() {
        let report = symptom_report("a strange tingling");
        assert!(report.contains(SYMPTOM_FALLBACK));
    }

    #[test]
    fn reminder_confirmation_skips_empty_fields() {
        let text = reminder_confirmation("Metformin", "", "", "08:00");
        assert!(text.contains("Medication: Metformin"));
        assert!(text.contains("Time: 08:00"));
        assert!(!text.contains("Dosage:"));
        assert!(!text.contains("Frequency:"));
    }
}
