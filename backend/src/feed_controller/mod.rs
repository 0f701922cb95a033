pub mod identity;
pub mod state;
