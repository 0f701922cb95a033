//! Component state for the admin dashboard.
//!
//! Everything that outlives a render lives in the `AdminController`; the
//! component itself only keeps what the login form is typing, the
//! confirmation dialog currently waiting for an answer and the number of
//! writes still in flight.

use common::config::AppConfig;
use common::controller::AdminController;
use futures::channel::oneshot;

use super::helpers::ToastNotifier;
use crate::store::AnyStore;

pub type Controller = AdminController<AnyStore, ToastNotifier>;

/// A delete prompt on screen. Dropping `reply` answers "no".
pub struct PendingConfirmation {
    pub prompt: String,
    pub reply: oneshot::Sender<bool>,
}

pub struct AdminDashboard {
    pub controller: Controller,
    pub username: String,
    pub password: String,
    pub confirmation: Option<PendingConfirmation>,
    /// True until the silent store sign-in has answered.
    pub store_pending: bool,
    /// Guard for the one-time sign-in on first render.
    pub loaded: bool,
    /// Saves and deletes started but not yet finished.
    in_flight: usize,
}

impl AdminDashboard {
    pub fn new(config: AppConfig) -> Self {
        let store = AnyStore::for_backend(config.backend);
        Self {
            controller: AdminController::new(store, ToastNotifier, config),
            username: String::new(),
            password: String::new(),
            confirmation: None,
            store_pending: true,
            loaded: false,
            in_flight: 0,
        }
    }

    pub fn store(&self) -> AnyStore {
        self.controller.store().clone()
    }

    /// Shows `prompt`. A prompt already on screen is dropped and resolves
    /// as "no".
    pub fn ask_confirmation(&mut self, prompt: String, reply: oneshot::Sender<bool>) {
        self.confirmation = Some(PendingConfirmation { prompt, reply });
    }

    /// Answers and closes the open confirmation, if any.
    pub fn answer_confirmation(&mut self, answer: bool) {
        if let Some(pending) = self.confirmation.take() {
            let _ = pending.reply.send(answer);
        }
    }

    /// Closes the open confirmation without an answer.
    pub fn dismiss_confirmation(&mut self) {
        self.confirmation = None;
    }

    pub fn begin_write(&mut self) {
        self.in_flight += 1;
    }

    pub fn end_write(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// True while a save or delete has not reported back.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::BackendKind;
    use futures::executor::block_on;

    use crate::components::admin::helpers::await_answer;

    fn dashboard() -> AdminDashboard {
        AdminDashboard::new(AppConfig {
            backend: BackendKind::Memory,
            ..AppConfig::default()
        })
    }

    #[test]
    fn default_config_builds_a_dashboard() {
        let component = AdminDashboard::new(AppConfig::default());
        assert!(component.store_pending);
        assert!(!component.loaded);
        assert!(component.confirmation.is_none());
        assert!(!component.is_busy());
    }

    #[test]
    fn answering_sends_the_answer_and_closes_the_prompt() {
        for answer in [true, false] {
            let mut component = dashboard();
            let (reply, mut rx) = oneshot::channel();
            component.ask_confirmation("¿Eliminar?".to_string(), reply);
            assert_eq!(
                component.confirmation.as_ref().map(|p| p.prompt.as_str()),
                Some("¿Eliminar?")
            );

            component.answer_confirmation(answer);
            assert!(component.confirmation.is_none());
            assert_eq!(rx.try_recv(), Ok(Some(answer)));
        }
    }

    #[test]
    fn a_replaced_prompt_resolves_as_no() {
        let mut component = dashboard();
        let (first, first_rx) = oneshot::channel();
        let (second, mut second_rx) = oneshot::channel();
        component.ask_confirmation("primero".to_string(), first);
        component.ask_confirmation("segundo".to_string(), second);

        assert!(!block_on(await_answer(first_rx)));
        component.answer_confirmation(true);
        assert_eq!(second_rx.try_recv(), Ok(Some(true)));
    }

    #[test]
    fn a_dismissed_prompt_resolves_as_no() {
        let mut component = dashboard();
        let (reply, rx) = oneshot::channel();
        component.ask_confirmation("¿Eliminar?".to_string(), reply);

        component.dismiss_confirmation();
        assert!(component.confirmation.is_none());
        assert!(!block_on(await_answer(rx)));
    }

    #[test]
    fn busy_until_every_write_reports_back() {
        let mut component = dashboard();
        component.begin_write();
        component.begin_write();
        assert!(component.is_busy());

        component.end_write();
        assert!(component.is_busy());
        component.end_write();
        assert!(!component.is_busy());

        component.end_write();
        assert!(!component.is_busy());
    }
}

