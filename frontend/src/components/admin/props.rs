use common::config::AppConfig;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct AdminDashboardProps {
    /// Read once, when the component is created.
    pub config: AppConfig,
}
