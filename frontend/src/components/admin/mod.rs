//! Admin dashboard: root module wiring the Yew `Component` implementation
//! with submodules for state, update logic, view rendering, and helpers.
//!
//! On first render the component performs the silent store sign-in with
//! the configured token. That identity only grants store access; the
//! dashboard itself stays behind the login form.

use common::store::RecordStore;
use yew::platform::spawn_local;
use yew::prelude::*;

mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use props::AdminDashboardProps;
pub use state::AdminDashboard;

impl Component for AdminDashboard {
    type Message = Msg;
    type Properties = AdminDashboardProps;

    fn create(ctx: &Context<Self>) -> Self {
        AdminDashboard::new(ctx.props().config.clone())
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;

            let store = self.store();
            let token = self.controller.config().provisioned_token.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = store.sign_in(token.as_deref()).await;
                link.send_message(Msg::StoreSignedIn(result));
            });
        }
    }
}
