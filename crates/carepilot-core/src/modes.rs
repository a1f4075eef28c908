//! Single-slot state machine for the active specialized panel. At most one
//! form panel is open at a time; the history panel is a sidebar and may
//! stay open alongside any of them.

use crate::types::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    /// Another panel is already open; the request is dropped.
    Rejected,
}

#[derive(Debug, Default)]
pub struct ModeController {
    active: Option<Mode>,
    history_open: bool,
    selected_provider: Option<String>,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a panel. Form panels occupy the single slot and are refused
    /// while another form panel is open; the history panel only toggles its
    /// own flag.
    pub fn activate(&mut self, mode: Mode) -> Transition {
        if mode == Mode::HistoryPanel {
            self.history_open = true;
            return Transition::Entered;
        }
        if self.active.is_some() {
            return Transition::Rejected;
        }
        self.active = Some(mode);
        Transition::Entered
    }

    /// Returns the form slot to idle. Used for both completion and
    /// cancellation; whether a message gets appended is the caller's call.
    pub fn finish(&mut self) {
        self.active = None;
    }

    pub fn close_history(&mut self) {
        self.history_open = false;
    }

    pub fn active(&self) -> Option<Mode> {
        self.active
    }

    pub fn history_open(&self) -> bool {
        self.history_open
    }

    /// Remembers the provider location picked in the nearby panel so the next
    /// appointment confirmation can carry it.
    pub fn set_selected_provider(&mut self, location: String) {
        self.selected_provider = Some(location);
    }

    pub fn take_selected_provider(&mut self) -> Option<String> {
        self.selected_provider.take()
    }

    /// Drops all per-conversation state. Used on logout.
    pub fn reset(&mut self) {
        self.active = None;
        self.history_open = false;
        self.selected_provider = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_form_panel_at_a_time() {
        let mut controller = ModeController::new();
        assert_eq!(controller.activate(Mode::Appointment), Transition::Entered);
        assert_eq!(controller.activate(Mode::Reminder), Transition::Rejected);
        assert_eq!(controller.active(), Some(Mode::Appointment));

        controller.finish();
        assert_eq!(controller.active(), None);
        assert_eq!(controller.activate(Mode::Reminder), Transition::Entered);
    }

    #[test]
    fn history_panel_coexists_with_a_form_panel() {
        let mut controller = ModeController::new();
        assert_eq!(
            controller.activate(Mode::SymptomChecker),
            Transition::Entered
        );
        assert_eq!(controller.activate(Mode::HistoryPanel), Transition::Entered);
        assert_eq!(controller.active(), Some(Mode::SymptomChecker));
        assert!(controller.history_open());

        controller.close_history();
        assert!(!controller.history_open());
        assert_eq!(controller.active(), Some(Mode::SymptomChecker));
    }

    #[test]
    fn selected_provider_is_consumed_once() {
        let mut controller = ModeController::new();
        controller.set_selected_provider("123 Medical Center, Downtown".to_owned());
        assert_eq!(
            controller.take_selected_provider().as_deref(),
            Some("123 Medical Center, Downtown")
        );
        assert_eq!(controller.take_selected_provider(), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut controller = ModeController::new();
        controller.activate(Mode::HealthTips);
        controller.activate(Mode::HistoryPanel);
        controller.set_selected_provider("somewhere".to_owned());

        controller.reset();
        assert_eq!(controller.active(), None);
        assert!(!controller.history_open());
        assert_eq!(controller.take_selected_provider(), None);
    }
}
