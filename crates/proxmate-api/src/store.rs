use crate::auth::Credentials;

/// Boxed error returned by credential store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Persistence capability for login credentials.
///
/// The core never decides where or how credentials are kept; it only asks a
/// store for them when a session is being established. Implementations live
/// outside this crate (OS keyring, in-memory).
pub trait CredentialStore: Send + Sync {
    /// Saved credentials, or `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Credentials>, StoreError>;

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;

    /// Forget the saved credentials. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}
