//! View rendering for the admin dashboard.
//!
//! Unauthenticated sessions only ever see the login form. Once signed in,
//! a sidebar switches between the dashboard counters and the two record
//! tables; the editor modal and the confirm dialog overlay whichever view is
//! active.

use common::controller::{EditTarget, Editor, EditorMode, View};
use common::model::{CollectionKind, Equipment, Record, User};
use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::editor_inputs;
use super::messages::Msg;
use super::state::AdminDashboard;

pub fn view(component: &AdminDashboard, ctx: &Context<AdminDashboard>) -> Html {
    let link = ctx.link();
    if !component.controller.session().is_authenticated() {
        return build_login(component, link);
    }

    let content = match component.controller.view() {
        View::Users => build_users(component, link),
        View::Equipment => build_equipment(component, link),
        View::Dashboard | View::Login => build_dashboard(component),
    };

    html! {
        <div class="admin-root">
            { build_sidebar(component.controller.view(), link) }
            <main class="admin-content">
                { build_busy_indicator(component.is_busy()) }
                { content }
            </main>
            { component.controller.editor().map(|editor| build_editor(editor, component.is_busy(), link)).unwrap_or_default() }
            { build_confirmation(component, link) }
        </div>
    }
}

fn build_login(component: &AdminDashboard, link: &Scope<AdminDashboard>) -> Html {
    let onsubmit = link.callback(|e: SubmitEvent| {
        e.prevent_default();
        Msg::SubmitLogin
    });
    let on_username = link.callback(|e: InputEvent| {
        Msg::UpdateUsername(e.target_unchecked_into::<HtmlInputElement>().value())
    });
    let on_password = link.callback(|e: InputEvent| {
        Msg::UpdatePassword(e.target_unchecked_into::<HtmlInputElement>().value())
    });

    html! {
        <div class="login-root">
            <form class="login-card" {onsubmit}>
                <h1>{ "Panel de Administración" }</h1>
                <label for="username">{ "Usuario" }</label>
                <input id="username" type="text" autocomplete="username" required=true
                    value={component.username.clone()} oninput={on_username} />
                <label for="password">{ "Contraseña" }</label>
                <input id="password" type="password" autocomplete="current-password" required=true
                    value={component.password.clone()} oninput={on_password} />
                <button type="submit" class="btn primary" disabled={component.store_pending}>
                    { if component.store_pending { "Conectando..." } else { "Iniciar sesión" } }
                </button>
            </form>
        </div>
    }
}

fn build_sidebar(current: View, link: &Scope<AdminDashboard>) -> Html {
    let entry = |view: View, icon: &'static str, label: &'static str| {
        html! {
            <button
                class={classes!("nav-btn", (current == view).then_some("active"))}
                onclick={link.callback(move |_| Msg::Navigate(view))}
            >
                <span class="material-icons">{ icon }</span>
                { label }
            </button>
        }
    };

    html! {
        <nav class="sidebar">
            <div class="sidebar-title">{ "Inventario" }</div>
            { entry(View::Dashboard, "dashboard", "Dashboard") }
            { entry(View::Users, "people", "Usuarios") }
            { entry(View::Equipment, "devices", "Equipos") }
            <button class="nav-btn logout" onclick={link.callback(|_| Msg::Logout)}>
                <span class="material-icons">{ "logout" }</span>
                { "Cerrar sesión" }
            </button>
        </nav>
    }
}

fn build_busy_indicator(busy: bool) -> Html {
    if !busy {
        return html! {};
    }
    html! {
        <div class="busy-indicator">
            <span class="spinner"></span>
            { "Procesando..." }
        </div>
    }
}

fn build_dashboard(component: &AdminDashboard) -> Html {
    html! {
        <>
            <h2>{ "Dashboard" }</h2>
            <div class="stat-grid">
                <div class="stat-card">
                    <div class="stat-label">{ "Total de Usuarios" }</div>
                    <div class="stat-value">{ component.controller.users().len().to_string() }</div>
                </div>
                <div class="stat-card">
                    <div class="stat-label">{ "Total de Equipos" }</div>
                    <div class="stat-value">{ component.controller.equipment().len().to_string() }</div>
                </div>
            </div>
        </>
    }
}

/// Ver / Editar / Eliminar buttons for one table row.
fn row_actions(
    link: &Scope<AdminDashboard>,
    busy: bool,
    target: EditTarget,
    kind: CollectionKind,
    id: String,
) -> Html {
    let view_target = target.clone();
    html! {
        <td class="row-actions">
            <button class="btn" onclick={link.callback(move |_| Msg::OpenEditor(EditorMode::View, view_target.clone()))}>
                { "Ver" }
            </button>
            <button class="btn" disabled={busy} onclick={link.callback(move |_| Msg::OpenEditor(EditorMode::Edit, target.clone()))}>
                { "Editar" }
            </button>
            <button class="btn danger" disabled={busy} onclick={link.callback(move |_| Msg::Delete(kind, id.clone()))}>
                { "Eliminar" }
            </button>
        </td>
    }
}

fn build_equipment(component: &AdminDashboard, link: &Scope<AdminDashboard>) -> Html {
    let busy = component.is_busy();
    let records = component.controller.equipment().records();
    let rows = records
        .iter()
        .map(|record| {
            let id = record.id.clone().unwrap_or_default();
            html! {
                <tr key={id.clone()}>
                    <td>{ record.fields.name.clone() }</td>
                    <td>{ record.fields.category.clone() }</td>
                    <td>{ record.fields.site.clone() }</td>
                    <td>{ record.fields.sku.clone() }</td>
                    { row_actions(link, busy, EditTarget::Equipment(record.clone()), CollectionKind::Equipment, id) }
                </tr>
            }
        })
        .collect::<Html>();
    let on_add = link.callback(|_| {
        Msg::OpenEditor(
            EditorMode::Add,
            EditTarget::Equipment(Record::new(Equipment::default())),
        )
    });

    html! {
        <>
            <div class="section-header">
                <h2>{ "Gestión de Equipos" }</h2>
                <button class="btn primary" disabled={busy} onclick={on_add}>{ "Añadir Equipo" }</button>
            </div>
            {
                if records.is_empty() {
                    html! { <p class="empty">{ "No hay equipos registrados." }</p> }
                } else {
                    html! {
                        <table class="record-table">
                            <thead>
                                <tr>
                                    <th>{ "Nombre" }</th>
                                    <th>{ "Tipo" }</th>
                                    <th>{ "Sede" }</th>
                                    <th>{ "SKU" }</th>
                                    <th>{ "Acciones" }</th>
                                </tr>
                            </thead>
                            <tbody>{ rows }</tbody>
                        </table>
                    }
                }
            }
        </>
    }
}

fn build_users(component: &AdminDashboard, link: &Scope<AdminDashboard>) -> Html {
    let busy = component.is_busy();
    let records = component.controller.users().records();
    let rows = records
        .iter()
        .map(|record| {
            let id = record.id.clone().unwrap_or_default();
            html! {
                <tr key={id.clone()}>
                    <td>{ record.fields.name.clone() }</td>
                    <td>{ record.fields.email.clone() }</td>
                    <td>{ record.fields.role.clone() }</td>
                    { row_actions(link, busy, EditTarget::User(record.clone()), CollectionKind::Users, id) }
                </tr>
            }
        })
        .collect::<Html>();
    let on_add = link.callback(|_| {
        Msg::OpenEditor(EditorMode::Add, EditTarget::User(Record::new(User::default())))
    });

    html! {
        <>
            <div class="section-header">
                <h2>{ "Gestión de Usuarios" }</h2>
                <button class="btn primary" disabled={busy} onclick={on_add}>{ "Añadir Usuario" }</button>
            </div>
            {
                if records.is_empty() {
                    html! { <p class="empty">{ "No hay usuarios registrados." }</p> }
                } else {
                    html! {
                        <table class="record-table">
                            <thead>
                                <tr>
                                    <th>{ "Nombre" }</th>
                                    <th>{ "Email" }</th>
                                    <th>{ "Rol" }</th>
                                    <th>{ "Acciones" }</th>
                                </tr>
                            </thead>
                            <tbody>{ rows }</tbody>
                        </table>
                    }
                }
            }
        </>
    }
}

fn editor_title(editor: &Editor) -> String {
    let noun = match editor.target {
        EditTarget::Equipment(_) => "Equipo",
        EditTarget::User(_) => "Usuario",
    };
    match editor.mode {
        EditorMode::View => format!("Detalle de {}", noun),
        EditorMode::Edit => format!("Editar {}", noun),
        EditorMode::Add => format!("Añadir {}", noun),
    }
}

fn build_editor(editor: &Editor, busy: bool, link: &Scope<AdminDashboard>) -> Html {
    let read_only = editor.mode == EditorMode::View;
    let inputs = editor_inputs(editor)
        .into_iter()
        .map(|input| {
            let field = input.field;
            let oninput = link.callback(move |e: InputEvent| {
                Msg::EditField(field, e.target_unchecked_into::<HtmlInputElement>().value())
            });
            html! {
                <label class="form-field">
                    <span>{ input.label }</span>
                    <input type="text" readonly={input.read_only} required={input.required}
                        value={input.value} {oninput} />
                </label>
            }
        })
        .collect::<Html>();
    let onsubmit = link.callback(|e: SubmitEvent| {
        e.prevent_default();
        Msg::Save
    });

    html! {
        <div class="modal-backdrop">
            <form class="modal" {onsubmit}>
                <h3>{ editor_title(editor) }</h3>
                { inputs }
                <div class="modal-actions">
                    <button type="button" class="btn" onclick={link.callback(|_| Msg::CloseEditor)}>
                        { if read_only { "Cerrar" } else { "Cancelar" } }
                    </button>
                    {
                        if read_only {
                            html! {}
                        } else if busy {
                            html! {
                                <button type="submit" class="btn primary" disabled=true>
                                    <span class="spinner"></span>
                                    { "Guardando..." }
                                </button>
                            }
                        } else {
                            html! { <button type="submit" class="btn primary">{ "Guardar" }</button> }
                        }
                    }
                </div>
            </form>
        </div>
    }
}

fn build_confirmation(component: &AdminDashboard, link: &Scope<AdminDashboard>) -> Html {
    let Some(pending) = &component.confirmation else {
        return html! {};
    };
    html! {
        <div class="modal-backdrop confirm">
            <div class="modal">
                <p>{ pending.prompt.clone() }</p>
                <div class="modal-actions">
                    <button class="btn" onclick={link.callback(|_| Msg::AnswerConfirmation(false))}>
                        { "Cancelar" }
                    </button>
                    <button class="btn danger" onclick={link.callback(|_| Msg::AnswerConfirmation(true))}>
                        { "Eliminar" }
                    </button>
                </div>
            </div>
        </div>
    }
}
