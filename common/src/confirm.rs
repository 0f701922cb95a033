use async_trait::async_trait;

/// A blocking yes/no question put to the user.
///
/// Implementations resolve once the user has answered and must dismiss
/// their prompt whatever the answer was.
#[async_trait(?Send)]
pub trait Confirmation {
    async fn confirm(&self, prompt: &str) -> bool;
}
