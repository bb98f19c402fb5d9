use sticky_stack::StackError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// `mount` was called on a provider whose viewport listeners are already installed.
    #[error("provider is already mounted")]
    AlreadyMounted,
    /// The header outlived the provider it was attached to.
    #[error("provider has been dropped")]
    ProviderGone,
    #[error(transparent)]
    Stack(#[from] StackError),
}
