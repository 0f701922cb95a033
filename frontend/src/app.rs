use crate::components::admin::AdminDashboard;
use common::config::AppConfig;
use yew::{html, Component, Context, Html};

/// Reads the client configuration baked in at build time.
fn app_config() -> AppConfig {
    AppConfig::from_values(
        option_env!("ADMIN_APP_ID"),
        option_env!("ADMIN_TOKEN"),
        option_env!("ADMIN_BACKEND"),
    )
    .unwrap_or_else(|e| {
        gloo_console::error!(format!("Invalid configuration, using defaults: {}", e));
        AppConfig::default()
    })
}

pub struct App {
    config: AppConfig,
}

impl Component for App {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            config: app_config(),
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div>
                <AdminDashboard config={self.config.clone()} />
            </div>
        }
    }
}
