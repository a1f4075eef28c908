use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{self, Classification};
use crate::content;
use crate::history::{HistoryPersister, DEFAULT_HISTORY_DEBOUNCE};
use crate::message_log::MessageLog;
use crate::model::{ModelProvider, ModelRequest};
use crate::modes::{ModeController, Transition};
use crate::places::{self, GeoPoint, Place, PlaceSearch};
use crate::profile::{ProfileStore, StoreError};
use crate::reminders::{ReminderNotifier, ReminderScheduler};
use crate::types::{
    ChatHistoryItem, Identity, Message, Mode, ProfileData, Reminder, ReminderDraft, Sender,
    SessionReply,
};

const HEALTH_SYSTEM_PROMPT: &str = r#"You are a professional healthcare assistant chatbot. Your role is to:

1. Provide general health information and education
2. Help users understand symptoms and when to seek medical care
3. Offer wellness tips and preventive care advice
4. Guide users through basic health assessments
5. Suggest when professional medical consultation is needed

IMPORTANT GUIDELINES:
- Always emphasize that you cannot replace professional medical diagnosis or treatment
- For serious symptoms or emergencies, always recommend seeking immediate medical attention
- Be empathetic, clear, and supportive in your responses
- Provide evidence-based information when possible
- If unsure about medical information, recommend consulting a healthcare provider
- Keep responses concise but informative
- Do not use simple, non-technical language when possible

Remember: You are providing general health information only, not medical diagnosis or treatment advice."#;

const NEARBY_CATEGORY: &str = "hospital";
const NEARBY_RESULT_LIMIT: usize = 15;

/// Randomized pause inserted before each bot reply so the conversation
/// does not feel instantaneous. `none` disables it for tests.
#[derive(Debug, Clone, Copy)]
pub struct TypingDelay {
    min_ms: u64,
    max_ms: u64,
}

impl TypingDelay {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms,
        }
    }

    pub fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    async fn pause(&self) {
        if self.max_ms == 0 {
            return;
        }
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.min_ms..=self.max_ms)
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self {
            min_ms: 500,
            max_ms: 1500,
        }
    }
}

/// Per-session tuning knobs. Defaults mirror the production values.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub typing: TypingDelay,
    pub history_debounce: Duration,
    pub search_radius_km: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            typing: TypingDelay::default(),
            history_debounce: DEFAULT_HISTORY_DEBOUNCE,
            search_radius_km: 10.0,
        }
    }
}

/// One user's conversation: the message log, the active panel slot, and
/// the collaborators that answer on the bot's behalf.
pub struct ChatSession {
    identity: Option<Identity>,
    log: Arc<MessageLog>,
    controller: Mutex<ModeController>,
    profile: Arc<RwLock<ProfileData>>,
    store: Arc<dyn ProfileStore>,
    model: Arc<dyn ModelProvider>,
    places: Arc<dyn PlaceSearch>,
    persister: HistoryPersister,
    scheduler: Option<ReminderScheduler>,
    typing: TypingDelay,
    search_radius_km: f64,
}

impl ChatSession {
    /// Opens a session seeded with a greeting. Authenticated sessions load
    /// the stored profile, record themselves as the active login, and arm
    /// any saved medication reminders.
    pub async fn open(
        store: Arc<dyn ProfileStore>,
        model: Arc<dyn ModelProvider>,
        places: Arc<dyn PlaceSearch>,
        notifier: Arc<dyn ReminderNotifier>,
        identity: Option<Identity>,
        config: SessionConfig,
    ) -> Self {
        let profile_data = match &identity {
            Some(identity) => match store.load_profile(identity).await {
                Ok(profile) => profile,
                Err(StoreError::NotFound) => ProfileData::for_identity(identity),
                Err(error) => {
                    warn!(?error, user_id = %identity.user_id, "profile load failed, starting fresh");
                    ProfileData::for_identity(identity)
                }
            },
            None => ProfileData::default(),
        };

        let greeting = match &identity {
            Some(identity) => {
                let name = display_name(&profile_data, identity);
                Message::bot_options(content::welcome_back(&name), main_menu())
            }
            None => Message::bot_options(content::GREETING, main_menu()),
        };

        let log = Arc::new(MessageLog::with_messages(vec![greeting]));
        let profile = Arc::new(RwLock::new(profile_data));

        let persister = HistoryPersister::new(
            Arc::clone(&store),
            Arc::clone(&log),
            Arc::clone(&profile),
            identity.clone(),
            config.history_debounce,
        );

        let scheduler = identity.clone().map(|identity| {
            ReminderScheduler::new(
                Arc::clone(&store),
                Arc::clone(&profile),
                notifier,
                identity,
            )
        });
        if let Some(scheduler) = &scheduler {
            scheduler.schedule_all().await;
        }

        if let Some(identity) = &identity {
            if let Err(error) = store.set_current_session(Some(identity)).await {
                warn!(?error, "failed to record active session");
            }
            info!(user_id = %identity.user_id, "session opened");
        } else {
            info!("guest session opened");
        }

        Self {
            identity,
            log,
            controller: Mutex::new(ModeController::default()),
            profile,
            store,
            model,
            places,
            persister,
            scheduler,
            typing: config.typing,
            search_radius_km: config.search_radius_km,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Full transcript, oldest first.
    pub async fn transcript(&self) -> Vec<Message> {
        self.log.snapshot().await
    }

    /// Current panel state without appending anything.
    pub async fn state(&self) -> SessionReply {
        self.reply_with(Vec::new()).await
    }

    /// Handles a typed message: echoes it into the log, classifies it, and
    /// appends whatever the route produces.
    pub async fn send_text(&self, text: &str) -> SessionReply {
        let mut appended = Vec::new();
        self.append(Message::user_text(text), &mut appended).await;

        let classification = classifier::classify_text(text);
        self.apply(classification, text, &mut appended).await;
        self.reply_with(appended).await
    }

    /// Handles a clicked option. The clicked label is echoed as a user
    /// message before routing, same as typed input.
    pub async fn select_option(&self, label: &str) -> SessionReply {
        let mut appended = Vec::new();
        self.append(Message::user_text(label), &mut appended).await;

        let classification = classifier::classify_option(label);
        self.apply(classification, label, &mut appended).await;
        self.reply_with(appended).await
    }

    /// Finishes the symptom checker with the user's free-text description.
    /// The description goes to the model for analysis; if that fails, a
    /// built-in per-symptom summary is used instead.
    pub async fn complete_symptom_check(&self, description: &str) -> SessionReply {
        self.finish_mode().await;
        let mut appended = Vec::new();
        self.typing.pause().await;

        let request = ModelRequest {
            system_prompt: HEALTH_SYSTEM_PROMPT.to_owned(),
            user_prompt: format!("I am experiencing the following symptoms: {description}"),
        };
        let reply = match self.model.complete(request).await {
            Ok(analysis) => Message::bot_text(analysis),
            Err(error) => {
                warn!(?error, "symptom analysis failed, using built-in summary");
                Message::bot_text(content::symptom_report(description))
            }
        };
        self.append(reply, &mut appended).await;
        self.reply_with(appended).await
    }

    /// Finishes the appointment panel with a chosen slot id. An unknown id
    /// still idles the panel but reports a scheduling problem.
    pub async fn complete_appointment(&self, slot_id: u32) -> SessionReply {
        let location = {
            let mut controller = self.controller.lock().await;
            controller.finish();
            controller.take_selected_provider()
        };

        let mut appended = Vec::new();
        self.typing.pause().await;

        let message = match content::appointment_slot(slot_id) {
            Some(slot) => {
                Message::bot_text(content::appointment_confirmation(slot, location.as_deref()))
            }
            None => {
                warn!(slot_id, "unknown appointment slot");
                Message::bot_text(content::APPOINTMENT_UNAVAILABLE)
            }
        };
        self.append(message, &mut appended).await;
        self.reply_with(appended).await
    }

    /// Finishes the reminder panel. A valid draft becomes an active
    /// reminder on the profile; authenticated sessions persist it and arm
    /// the notification timer.
    pub async fn complete_reminder(&self, draft: ReminderDraft) -> SessionReply {
        self.finish_mode().await;
        let mut appended = Vec::new();
        self.typing.pause().await;

        if draft.medication_name.trim().is_empty()
            || crate::reminders::parse_reminder_time(&draft.time).is_none()
        {
            self.append(Message::bot_text(content::REMINDER_INCOMPLETE), &mut appended)
                .await;
            return self.reply_with(appended).await;
        }

        let reminder = Reminder::from_draft(draft);
        {
            let mut profile = self.profile.write().await;
            profile.medical_info.reminders.push(reminder.clone());
        }

        let message = match &self.identity {
            Some(identity) => {
                let snapshot = self.profile.read().await.clone();
                match self.store.save_profile(identity, &snapshot).await {
                    Ok(()) => {
                        if let Some(scheduler) = &self.scheduler {
                            scheduler.schedule(reminder.clone()).await;
                        }
                        Message::bot_text(confirmation_for(&reminder))
                    }
                    Err(error) => {
                        warn!(?error, "reminder save failed");
                        let mut profile = self.profile.write().await;
                        profile
                            .medical_info
                            .reminders
                            .retain(|entry| entry.id != reminder.id);
                        Message::bot_text(content::REMINDER_SAVE_FAILED)
                    }
                }
            }
            // Guests keep the reminder for this session only.
            None => Message::bot_text(confirmation_for(&reminder)),
        };
        self.append(message, &mut appended).await;
        self.reply_with(appended).await
    }

    /// Finishes the health-tips panel with the selected tip or FAQ entry,
    /// appended verbatim as a bot message.
    pub async fn complete_health_tip(&self, tip: &str) -> SessionReply {
        self.finish_mode().await;
        let mut appended = Vec::new();
        self.typing.pause().await;
        self.append(Message::bot_text(tip), &mut appended).await;
        self.reply_with(appended).await
    }

    /// Finishes the nearby-provider panel with a chosen provider, then
    /// chains straight into appointment scheduling with the provider's
    /// address carried over as the appointment location.
    pub async fn complete_nearby(&self, name: &str, category: &str, address: &str) -> SessionReply {
        {
            let mut controller = self.controller.lock().await;
            controller.finish();
            controller.set_selected_provider(address.to_owned());
            controller.activate(Mode::Appointment);
        }

        let mut appended = Vec::new();
        self.typing.pause().await;
        self.append(
            Message::bot_text(content::provider_selected(name, category)),
            &mut appended,
        )
        .await;
        self.reply_with(appended).await
    }

    /// Dismisses the active panel without appending anything.
    pub async fn cancel_mode(&self) -> SessionReply {
        self.finish_mode().await;
        self.reply_with(Vec::new()).await
    }

    pub async fn open_history(&self) -> SessionReply {
        self.controller.lock().await.activate(Mode::HistoryPanel);
        self.reply_with(Vec::new()).await
    }

    pub async fn close_history(&self) -> SessionReply {
        self.controller.lock().await.close_history();
        self.reply_with(Vec::new()).await
    }

    /// Saved conversations, newest first.
    pub async fn history_items(&self) -> Vec<ChatHistoryItem> {
        self.profile.read().await.ai_personalization.chat_history.clone()
    }

    /// Replaces the live transcript with a saved conversation's snapshot
    /// and appends a resumption notice.
    pub async fn load_history_item(&self, id: Uuid) -> anyhow::Result<SessionReply> {
        let item = {
            let profile = self.profile.read().await;
            profile
                .ai_personalization
                .chat_history
                .iter()
                .find(|item| item.id == id)
                .cloned()
        };
        let Some(item) = item else {
            anyhow::bail!("unknown chat history item {id}");
        };

        self.log.replace_all(item.messages.clone()).await;
        let notice = Message::bot_text(content::resumption_notice(&item.topic));
        let mut appended = Vec::new();
        self.append(notice, &mut appended).await;
        // The swapped-in transcript is already stored; only growth beyond
        // it warrants a new history entry.
        self.persister.rebaseline().await;
        Ok(self.reply_with(appended).await)
    }

    /// One-tap reply suggestion for the latest bot message. Returns `None`
    /// when there is nothing to answer or the model declines.
    pub async fn suggest_reply(&self) -> Option<String> {
        let last_bot = self
            .log
            .snapshot()
            .await
            .into_iter()
            .rev()
            .find(|message| message.sender == Sender::Bot)?;
        match self.model.suggest_reply(&last_bot.content).await {
            Ok(suggestion) => Some(suggestion),
            Err(error) => {
                debug!(?error, "reply suggestion failed");
                None
            }
        }
    }

    /// Healthcare providers near the caller. Falls back to the built-in
    /// directory when no location is available or the search comes back
    /// empty or broken.
    pub async fn nearby_providers(&self, origin: Option<GeoPoint>) -> Vec<Place> {
        let Some(origin) = origin else {
            debug!("no caller location, serving fallback directory");
            return places::fallback_places(GeoPoint { lat: 0.0, lng: 0.0 });
        };
        match self
            .places
            .search_nearby(
                NEARBY_CATEGORY,
                origin,
                self.search_radius_km,
                NEARBY_RESULT_LIMIT,
            )
            .await
        {
            Ok(found) if !found.is_empty() => found,
            Ok(_) => {
                info!("nearby search empty, serving fallback directory");
                places::fallback_places(origin)
            }
            Err(error) => {
                warn!(?error, "nearby search failed, serving fallback directory");
                places::fallback_places(origin)
            }
        }
    }

    /// Ends the session: flushes pending history, disarms reminder timers,
    /// clears the recorded login, and resets the log to a fresh greeting.
    pub async fn close(&self) {
        self.persister.flush().await;
        if let Some(scheduler) = &self.scheduler {
            scheduler.cancel_all().await;
        }
        if let Some(identity) = &self.identity {
            if let Err(error) = self.store.set_current_session(None).await {
                warn!(?error, "failed to clear stored session");
            }
            info!(user_id = %identity.user_id, "session closed");
        }
        self.log
            .replace_all(vec![Message::bot_options(content::GREETING, main_menu())])
            .await;
        self.controller.lock().await.reset();
    }

    async fn apply(&self, classification: Classification, raw: &str, appended: &mut Vec<Message>) {
        match classification {
            Classification::Direct(message) => {
                self.typing.pause().await;
                self.append(message, appended).await;
            }
            Classification::ModeTransition { mode, offer } => {
                self.typing.pause().await;
                let mut controller = self.controller.lock().await;
                match controller.activate(mode) {
                    Transition::Entered => {
                        drop(controller);
                        if let Some(offer) = offer {
                            self.append(offer, appended).await;
                        }
                    }
                    Transition::Rejected => {
                        debug!(?mode, "a panel is already open, transition dropped");
                    }
                }
            }
            Classification::Delegate => {
                self.typing.pause().await;
                let reply = self.delegate(raw).await;
                self.append(reply, appended).await;
            }
        }
    }

    async fn delegate(&self, text: &str) -> Message {
        let request = ModelRequest {
            system_prompt: HEALTH_SYSTEM_PROMPT.to_owned(),
            user_prompt: text.to_owned(),
        };
        match self.model.complete(request).await {
            Ok(reply) => Message::bot_text(reply),
            Err(error) => {
                warn!(?error, "model completion failed");
                Message::bot_text(content::APOLOGY)
            }
        }
    }

    async fn append(&self, message: Message, appended: &mut Vec<Message>) {
        self.log.append(message.clone()).await;
        self.persister.poke().await;
        appended.push(message);
    }

    async fn finish_mode(&self) {
        self.controller.lock().await.finish();
    }

    async fn reply_with(&self, messages: Vec<Message>) -> SessionReply {
        let controller = self.controller.lock().await;
        SessionReply {
            messages,
            active_mode: controller.active(),
            history_open: controller.history_open(),
        }
    }
}

fn main_menu() -> Vec<String> {
    content::MENU_OPTIONS
        .iter()
        .map(|option| (*option).to_owned())
        .collect()
}

fn display_name(profile: &ProfileData, identity: &Identity) -> String {
    let full_name = profile.basic_info.full_name.trim();
    if full_name.is_empty() {
        identity.display_name.clone()
    } else {
        full_name.to_owned()
    }
}

fn confirmation_for(reminder: &Reminder) -> String {
    content::reminder_confirmation(
        &reminder.medication_name,
        &reminder.dosage,
        &reminder.frequency,
        &reminder.time,
    )
}
