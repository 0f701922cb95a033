//! Update function for the admin dashboard.
//!
//! Session and navigation messages go straight to the controller. Store
//! writes run in `spawn_local` on a `RecordClient` clone and come back as
//! `SaveFinished`/`DeleteFinished`, so a write started before logout still
//! reports its outcome. Only one write runs at a time; actions are disabled
//! until it reports back.

use std::rc::Rc;

use common::controller::{EditTarget, EventSink};
use common::model::{CollectionKind, Equipment, User};
use common::sync::SnapshotEvent;
use gloo_console::{error, log};
use yew::platform::spawn_local;
use yew::prelude::*;

use super::helpers::{set_field, DialogConfirmation};
use super::messages::{Msg, SaveResult};
use super::state::AdminDashboard;

pub fn update(component: &mut AdminDashboard, ctx: &Context<AdminDashboard>, msg: Msg) -> bool {
    match msg {
        Msg::StoreSignedIn(result) => {
            component.store_pending = false;
            match result {
                Ok(identity) => component.controller.attach_store_identity(identity),
                Err(e) => error!(format!("Store sign-in failed: {}", e)),
            }
            true
        }
        Msg::UpdateUsername(username) => {
            component.username = username;
            false
        }
        Msg::UpdatePassword(password) => {
            component.password = password;
            false
        }
        Msg::SubmitLogin => {
            let callback = ctx.link().callback(Msg::Snapshot);
            let sink: EventSink = Rc::new(move |event: SnapshotEvent| callback.emit(event));
            let username = component.username.clone();
            let password = std::mem::take(&mut component.password);
            if component.controller.login(&username, &password, sink).is_ok() {
                if let Some(client) = component.controller.client() {
                    let link = ctx.link().clone();
                    spawn_local(async move {
                        link.send_message(Msg::Initialized(client.initialize().await));
                    });
                }
            }
            true
        }
        Msg::Logout => {
            component.dismiss_confirmation();
            component.controller.logout();
            component.username.clear();
            true
        }
        Msg::Initialized(result) => {
            if let Ok(report) = result {
                log!(format!(
                    "Seeded {} equipment records and {} users",
                    report.equipment, report.users
                ));
            }
            false
        }
        Msg::Snapshot(event) => component.controller.apply_snapshot(event),
        Msg::Navigate(view) => component.controller.navigate(view),
        Msg::OpenEditor(mode, target) => component.controller.open_editor(mode, target),
        Msg::EditField(field, value) => {
            if let Some(editor) = component.controller.editor_mut() {
                set_field(&mut editor.target, field, value);
            }
            false
        }
        Msg::CloseEditor => {
            component.controller.close_editor();
            true
        }
        Msg::Save => {
            if component.is_busy() {
                return false;
            }
            let (Some(client), Some(editor)) =
                (component.controller.client(), component.controller.editor())
            else {
                return false;
            };
            let target = editor.target.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = match target {
                    EditTarget::Equipment(record) => {
                        SaveResult::Equipment(client.save::<Equipment>(record).await)
                    }
                    EditTarget::User(record) => SaveResult::User(client.save::<User>(record).await),
                };
                link.send_message(Msg::SaveFinished(result));
            });
            component.begin_write();
            true
        }
        Msg::SaveFinished(result) => {
            component.end_write();
            match &result {
                SaveResult::Equipment(result) => component.controller.finish_save(result),
                SaveResult::User(result) => component.controller.finish_save(result),
            }
            true
        }
        Msg::Delete(kind, id) => {
            if component.is_busy() {
                return false;
            }
            let Some(client) = component.controller.client() else {
                return false;
            };
            let confirmation = DialogConfirmation {
                link: ctx.link().clone(),
            };
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = match kind {
                    CollectionKind::Equipment => {
                        client.delete::<Equipment, _>(&id, &confirmation).await
                    }
                    CollectionKind::Users => client.delete::<User, _>(&id, &confirmation).await,
                };
                link.send_message(Msg::DeleteFinished(result));
            });
            component.begin_write();
            true
        }
        Msg::DeleteFinished(result) => {
            component.end_write();
            component.controller.finish_delete(&result);
            true
        }
        Msg::AskConfirmation(prompt, reply) => {
            component.ask_confirmation(prompt, reply);
            true
        }
        Msg::AnswerConfirmation(answer) => {
            component.answer_confirmation(answer);
            true
        }
    }
}
