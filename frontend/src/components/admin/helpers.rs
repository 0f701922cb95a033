//! Glue between the dashboard component and the shared controller.
//!
//! - **Toasts**: `ToastNotifier` renders controller notifications as
//!   temporary toasts at the bottom of the screen.
//! - **Confirmation**: `DialogConfirmation` shows the in-page confirm dialog
//!   and resolves once the user answers it.
//! - **Form fields**: mapping between editor inputs and record fields.

use async_trait::async_trait;
use common::confirm::Confirmation;
use common::controller::{EditTarget, Editor, EditorMode};
use common::notify::{Notification, NotificationLevel, Notifier, NOTIFICATION_TTL};
use futures::channel::oneshot;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;
use yew::html::Scope;

use super::messages::Msg;
use super::state::AdminDashboard;

/// Displays a temporary notification at the bottom of the screen. The toast
/// removes itself after `NOTIFICATION_TTL`.
pub fn show_toast(message: &str, level: NotificationLevel) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                let background = match level {
                    NotificationLevel::Info => "rgba(0, 0, 0, 0.8)",
                    NotificationLevel::Success => "#2e7d32",
                    NotificationLevel::Error => "#c62828",
                };
                let style = html_toast.style();
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", background).ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "4px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("font-family", "Arial, sans-serif").ok();

                if body.append_child(&html_toast).is_ok() {
                    let ttl = NOTIFICATION_TTL.as_millis() as u32;
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(ttl).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct ToastNotifier;

impl Notifier for ToastNotifier {
    fn notify(&self, notification: Notification) {
        if notification.level == NotificationLevel::Error {
            gloo_console::error!(notification.message.clone());
        }
        show_toast(&notification.message, notification.level);
    }
}

/// Asks through the dashboard's confirm dialog. A dialog that is closed
/// without an answer counts as "no".
pub struct DialogConfirmation {
    pub link: Scope<AdminDashboard>,
}

#[async_trait(?Send)]
impl Confirmation for DialogConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        self.link
            .send_message(Msg::AskConfirmation(prompt.to_string(), reply));
        await_answer(answer).await
    }
}

/// Resolves to the dialog's answer, or `false` once the prompt is dropped
/// without one (logout, or replaced by a newer prompt).
pub async fn await_answer(answer: oneshot::Receiver<bool>) -> bool {
    answer.await.unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Category,
    Site,
    Sku,
    Email,
    Role,
}

const EQUIPMENT_FIELDS: &[(Field, &str)] = &[
    (Field::Name, "Nombre"),
    (Field::Category, "Tipo"),
    (Field::Site, "Sede"),
    (Field::Sku, "SKU"),
];

const USER_FIELDS: &[(Field, &str)] = &[
    (Field::Name, "Nombre"),
    (Field::Email, "Email"),
    (Field::Role, "Rol"),
];

/// Form fields shown for a target, with their labels.
pub fn form_fields(target: &EditTarget) -> &'static [(Field, &'static str)] {
    match target {
        EditTarget::Equipment(_) => EQUIPMENT_FIELDS,
        EditTarget::User(_) => USER_FIELDS,
    }
}

pub fn field_value(target: &EditTarget, field: Field) -> &str {
    match (target, field) {
        (EditTarget::Equipment(r), Field::Name) => &r.fields.name,
        (EditTarget::Equipment(r), Field::Category) => &r.fields.category,
        (EditTarget::Equipment(r), Field::Site) => &r.fields.site,
        (EditTarget::Equipment(r), Field::Sku) => &r.fields.sku,
        (EditTarget::User(r), Field::Name) => &r.fields.name,
        (EditTarget::User(r), Field::Email) => &r.fields.email,
        (EditTarget::User(r), Field::Role) => &r.fields.role,
        _ => "",
    }
}

/// One input of the editor modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorInput {
    pub field: Field,
    pub label: &'static str,
    pub value: String,
    pub read_only: bool,
    pub required: bool,
}

/// Inputs for the editor, in form order. Every editable input is required,
/// so the browser refuses to submit an incomplete record.
pub fn editor_inputs(editor: &Editor) -> Vec<EditorInput> {
    let read_only = editor.mode == EditorMode::View;
    form_fields(&editor.target)
        .iter()
        .map(|&(field, label)| EditorInput {
            field,
            label,
            value: field_value(&editor.target, field).to_string(),
            read_only,
            required: !read_only,
        })
        .collect()
}

/// Writes `value` into the draft. Fields the target does not have are ignored.
pub fn set_field(target: &mut EditTarget, field: Field, value: String) {
    match (target, field) {
        (EditTarget::Equipment(r), Field::Name) => r.fields.name = value,
        (EditTarget::Equipment(r), Field::Category) => r.fields.category = value,
        (EditTarget::Equipment(r), Field::Site) => r.fields.site = value,
        (EditTarget::Equipment(r), Field::Sku) => r.fields.sku = value,
        (EditTarget::User(r), Field::Name) => r.fields.name = value,
        (EditTarget::User(r), Field::Email) => r.fields.email = value,
        (EditTarget::User(r), Field::Role) => r.fields.role = value,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::{Equipment, Record, User};

    #[test]
    fn every_form_field_round_trips_through_the_draft() {
        let mut targets = vec![
            EditTarget::Equipment(Record::new(Equipment::default())),
            EditTarget::User(Record::new(User::default())),
        ];
        for target in &mut targets {
            for (field, label) in form_fields(target) {
                set_field(target, *field, format!("{} value", label));
                assert_eq!(field_value(target, *field), format!("{} value", label));
            }
        }
    }

    #[test]
    fn fields_outside_the_target_are_ignored() {
        let mut target = EditTarget::User(Record::new(User::new("Ana", "ana@example.com", "Admin")));
        set_field(&mut target, Field::Sku, "EQP001".to_string());
        assert_eq!(field_value(&target, Field::Sku), "");
        assert_eq!(field_value(&target, Field::Name), "Ana");
    }

    #[test]
    fn editable_inputs_are_required_and_view_inputs_are_not() {
        let user = EditTarget::User(Record::new(User::new("Ana", "ana@example.com", "Admin")));
        for mode in [EditorMode::Add, EditorMode::Edit] {
            let editor = Editor {
                mode,
                target: user.clone(),
            };
            let inputs = editor_inputs(&editor);
            assert_eq!(inputs.len(), 3);
            assert!(inputs.iter().all(|input| input.required && !input.read_only));
        }

        let editor = Editor {
            mode: EditorMode::View,
            target: user,
        };
        let inputs = editor_inputs(&editor);
        assert!(inputs.iter().all(|input| !input.required && input.read_only));
        assert_eq!(inputs[1].label, "Email");
        assert_eq!(inputs[1].value, "ana@example.com");
    }
}
