//! Service providers for modular registration.
//!
//! A provider groups related registrations. Eager providers register and boot
//! as soon as they are handed to
//! [`Container::register_provider`](crate::Container::register_provider).
//! Deferred providers that list the ids they provide are held back until one
//! of those ids is first requested.

use crate::container::Container;
use crate::error::DiResult;

/// A bundle of registrations.
///
/// # Example
///
/// ```rust
/// use ferrous_container::{Container, DiResult, ServiceProvider};
///
/// struct MailConfig { host: String }
///
/// struct MailProvider;
///
/// impl ServiceProvider for MailProvider {
///     fn register(&self, container: &Container) -> DiResult<()> {
///         container.singleton("mail.config", |_| MailConfig { host: "smtp.local".into() });
///         Ok(())
///     }
///
///     fn is_deferred(&self) -> bool {
///         true
///     }
///
///     fn provides(&self) -> Vec<String> {
///         vec!["mail.config".into()]
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let container = Container::new();
/// container.register_provider(MailProvider)?;
/// assert!(container.has("mail.config"));
///
/// let config = container.get_as::<MailConfig>("mail.config")?;
/// assert_eq!(config.host, "smtp.local");
/// # Ok(())
/// # }
/// ```
pub trait ServiceProvider: Send + Sync {
    /// Registers this provider's services.
    fn register(&self, container: &Container) -> DiResult<()>;

    /// Runs after `register`, once the provider's services are in place.
    fn boot(&self, _container: &Container) -> DiResult<()> {
        Ok(())
    }

    /// Whether registration waits for first use of a provided id.
    fn is_deferred(&self) -> bool {
        false
    }

    /// Ids a deferred provider registers. A deferred provider with no ids is
    /// loaded immediately.
    fn provides(&self) -> Vec<String> {
        Vec::new()
    }
}
