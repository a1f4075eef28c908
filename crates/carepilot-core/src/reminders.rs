//! One-shot medication reminder notifications. Each active reminder gets a
//! task armed for the next occurrence of its HH:MM time; firing stamps the
//! reminder so the same day never notifies twice.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::profile::ProfileStore;
use crate::types::{Identity, ProfileData, Reminder};

#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn notify(&self, reminder: &Reminder) -> anyhow::Result<()>;
}

/// Default notifier: a structured log line. Deployments with a push channel
/// swap in their own implementation.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl ReminderNotifier for LogNotifier {
    async fn notify(&self, reminder: &Reminder) -> anyhow::Result<()> {
        info!(
            medication = %reminder.medication_name,
            time = %reminder.time,
            "medication reminder due"
        );
        Ok(())
    }
}

/// Arms one-shot notification tasks for a logged-in user's reminders.
/// Re-scheduling a reminder replaces its pending task, so at most one task
/// per reminder exists at a time.
pub struct ReminderScheduler {
    store: Arc<dyn ProfileStore>,
    profile: Arc<RwLock<ProfileData>>,
    notifier: Arc<dyn ReminderNotifier>,
    identity: Identity,
    pending: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        profile: Arc<RwLock<ProfileData>>,
        notifier: Arc<dyn ReminderNotifier>,
        identity: Identity,
    ) -> Self {
        Self {
            store,
            profile,
            notifier,
            identity,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Arms every active reminder in the profile. Called once per login; no
    /// look-ahead beyond each reminder's next occurrence.
    pub async fn schedule_all(&self) {
        let reminders = self.profile.read().await.medical_info.reminders.clone();
        info!(
            count = reminders.len(),
            user_id = %self.identity.user_id,
            "arming reminder notifications"
        );
        for reminder in reminders {
            self.schedule(reminder).await;
        }
    }

    /// Arms one reminder. Returns false when nothing was armed: inactive,
    /// already notified today, or an unparseable time.
    pub async fn schedule(&self, reminder: Reminder) -> bool {
        if !reminder.active {
            debug!(medication = %reminder.medication_name, "reminder inactive, not arming");
            return false;
        }

        let today = today_stamp();
        if reminder.last_notified.as_deref() == Some(today.as_str()) {
            debug!(
                medication = %reminder.medication_name,
                "reminder already notified today, not arming"
            );
            return false;
        }

        let Some(time) = parse_reminder_time(&reminder.time) else {
            warn!(time = %reminder.time, "reminder time not parseable, not arming");
            return false;
        };

        let delay = delay_until_next(time, Local::now().naive_local());
        let Ok(delay) = delay.to_std() else {
            return false;
        };

        debug!(
            medication = %reminder.medication_name,
            delay_secs = delay.as_secs(),
            "reminder armed"
        );

        let store = Arc::clone(&self.store);
        let profile = Arc::clone(&self.profile);
        let notifier = Arc::clone(&self.notifier);
        let identity = self.identity.clone();
        let id = reminder.id;

        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.remove(&id) {
            handle.abort();
        }
        pending.insert(
            id,
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                fire(store, profile, notifier, identity, reminder).await;
            }),
        );

        true
    }

    /// Reminders with a live task still waiting to fire. Fired one-shots
    /// leave their finished handle in the map; they are swept out here.
    pub async fn armed_count(&self) -> usize {
        let mut pending = self.pending.lock().await;
        pending.retain(|_, handle| !handle.is_finished());
        pending.len()
    }

    /// Drops all pending tasks. Called on logout.
    pub async fn cancel_all(&self) {
        let mut pending = self.pending.lock().await;
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }
}

async fn fire(
    store: Arc<dyn ProfileStore>,
    profile: Arc<RwLock<ProfileData>>,
    notifier: Arc<dyn ReminderNotifier>,
    identity: Identity,
    reminder: Reminder,
) {
    if let Err(error) = notifier.notify(&reminder).await {
        warn!(?error, medication = %reminder.medication_name, "reminder notification failed");
    }

    let today = today_stamp();
    let updated = {
        let mut profile = profile.write().await;
        if let Some(stored) = profile
            .medical_info
            .reminders
            .iter_mut()
            .find(|entry| entry.id == reminder.id)
        {
            stored.last_notified = Some(today);
        }
        profile.clone()
    };

    if let Err(error) = store.save_profile(&identity, &updated).await {
        warn!(?error, user_id = %identity.user_id, "reminder stamp save failed");
    }
}

pub(crate) fn parse_reminder_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Time until the next occurrence of `time`: later today if still ahead,
/// otherwise the same time tomorrow.
fn delay_until_next(time: NaiveTime, now: NaiveDateTime) -> chrono::Duration {
    let today_candidate = now.date().and_time(time);
    let target = if today_candidate > now {
        today_candidate
    } else {
        today_candidate + chrono::Duration::days(1)
    };
    target - now
}

fn today_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::profile::{InMemoryProfileStore, StoreError};
    use crate::types::ReminderDraft;

    struct CountingNotifier {
        fired: AtomicUsize,
    }

    impl CountingNotifier {
        fn new() -> Self {
            Self {
                fired: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReminderNotifier for CountingNotifier {
        async fn notify(&self, _reminder: &Reminder) -> anyhow::Result<()> {
            self.fired.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: "user-1".to_owned(),
            email: "user@example.com".to_owned(),
            display_name: "Jordan".to_owned(),
        }
    }

    fn reminder(time: &str) -> Reminder {
        Reminder::from_draft(ReminderDraft {
            medication_name: "Metformin".to_owned(),
            dosage: "500mg".to_owned(),
            frequency: "daily".to_owned(),
            time: time.to_owned(),
        })
    }

    fn scheduler(notifier: Arc<CountingNotifier>) -> (ReminderScheduler, Arc<RwLock<ProfileData>>) {
        let profile = Arc::new(RwLock::new(ProfileData::default()));
        let scheduler = ReminderScheduler::new(
            Arc::new(InMemoryProfileStore::new()),
            Arc::clone(&profile),
            notifier,
            identity(),
        );
        (scheduler, profile)
    }

    #[test]
    fn delay_targets_later_today_when_still_ahead() {
        let now = NaiveDate::from_ymd_opt(2025, 5, 2)
            .expect("valid date")
            .and_hms_opt(10, 0, 0)
            .expect("valid time");
        let time = NaiveTime::from_hms_opt(15, 30, 0).expect("valid time");
        assert_eq!(delay_until_next(time, now).num_minutes(), 330);
    }

    #[test]
    fn delay_rolls_to_tomorrow_when_already_passed() {
        let now = NaiveDate::from_ymd_opt(2025, 5, 2)
            .expect("valid date")
            .and_hms_opt(16, 0, 0)
            .expect("valid time");
        let time = NaiveTime::from_hms_opt(15, 30, 0).expect("valid time");
        assert_eq!(delay_until_next(time, now).num_minutes(), 23 * 60 + 30);
    }

    #[test]
    fn reminder_times_must_be_hh_mm() {
        assert!(parse_reminder_time("08:00").is_some());
        assert!(parse_reminder_time("23:59").is_some());
        assert!(parse_reminder_time("8 o'clock").is_none());
        assert!(parse_reminder_time("25:00").is_none());
    }

    #[tokio::test]
    async fn inactive_and_already_notified_reminders_are_skipped() {
        let notifier = Arc::new(CountingNotifier::new());
        let (scheduler, _profile) = scheduler(Arc::clone(&notifier));

        let mut inactive = reminder("08:00");
        inactive.active = false;
        assert!(!scheduler.schedule(inactive).await);

        let mut notified = reminder("08:00");
        notified.last_notified = Some(today_stamp());
        assert!(!scheduler.schedule(notified).await);

        assert_eq!(scheduler.armed_count().await, 0);
        assert_eq!(notifier.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rescheduling_replaces_the_pending_task() {
        let notifier = Arc::new(CountingNotifier::new());
        let (scheduler, _profile) = scheduler(Arc::clone(&notifier));

        let entry = reminder("23:59");
        assert!(scheduler.schedule(entry.clone()).await);
        assert!(scheduler.schedule(entry).await);
        assert_eq!(scheduler.armed_count().await, 1);

        scheduler.cancel_all().await;
        assert_eq!(scheduler.armed_count().await, 0);
    }

    #[tokio::test]
    async fn fired_tasks_drop_out_of_the_armed_count() {
        let notifier = Arc::new(CountingNotifier::new());
        let (scheduler, _profile) = scheduler(notifier);

        let mut fired = tokio::spawn(async {});
        (&mut fired).await.expect("task completes");
        scheduler.pending.lock().await.insert(Uuid::new_v4(), fired);
        scheduler.pending.lock().await.insert(
            Uuid::new_v4(),
            tokio::spawn(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }),
        );

        assert_eq!(scheduler.armed_count().await, 1);
        scheduler.cancel_all().await;
        assert_eq!(scheduler.armed_count().await, 0);
    }

    #[tokio::test]
    async fn firing_stamps_today_and_blocks_rearming() {
        let notifier = Arc::new(CountingNotifier::new());
        let (scheduler, profile) = scheduler(Arc::clone(&notifier));

        let entry = reminder("08:00");
        profile
            .write()
            .await
            .medical_info
            .reminders
            .push(entry.clone());

        fire(
            Arc::new(InMemoryProfileStore::new()),
            Arc::clone(&profile),
            Arc::clone(&notifier) as Arc<dyn ReminderNotifier>,
            identity(),
            entry.clone(),
        )
        .await;

        assert_eq!(notifier.fired.load(Ordering::SeqCst), 1);
        let stamped = profile.read().await.medical_info.reminders[0]
            .last_notified
            .clone();
        assert_eq!(stamped, Some(today_stamp()));

        let rearmed = scheduler
            .schedule(profile.read().await.medical_info.reminders[0].clone())
            .await;
        assert!(!rearmed);
    }

    #[tokio::test]
    async fn failing_store_only_logs() {
        struct FailingStore;

        #[async_trait]
        impl ProfileStore for FailingStore {
            async fn load_profile(&self, _identity: &Identity) -> Result<ProfileData, StoreError> {
                Err(StoreError::NotFound)
            }

            async fn save_profile(
                &self,
                _identity: &Identity,
                _profile: &ProfileData,
            ) -> Result<(), StoreError> {
                Err(StoreError::Backend(anyhow::anyhow!("disk on fire")))
            }

            async fn current_session(&self) -> Result<Option<Identity>, StoreError> {
                Ok(None)
            }

            async fn set_current_session(
                &self,
                _identity: Option<&Identity>,
            ) -> Result<(), StoreError> {
                Ok(())
            }
        }

        let notifier = Arc::new(CountingNotifier::new());
        let profile = Arc::new(RwLock::new(ProfileData::default()));
        fire(
            Arc::new(FailingStore),
            profile,
            notifier.clone() as Arc<dyn ReminderNotifier>,
            identity(),
            reminder("08:00"),
        )
        .await;

        assert_eq!(notifier.fired.load(Ordering::SeqCst), 1);
    }
}
