//! Alternative names for service ids.

use std::collections::HashMap;

/// Maps alias names to service ids.
///
/// Resolution is a single step: an alias of an alias is not followed.
///
/// ```rust
/// use ferrous_container::AliasManager;
///
/// let mut aliases = AliasManager::new();
/// aliases.add_alias("db", "database.connection");
///
/// assert_eq!(aliases.resolve_alias("db"), "database.connection");
/// assert_eq!(aliases.resolve_alias("cache"), "cache");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AliasManager {
    aliases: HashMap<String, String>,
}

impl AliasManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_alias(&mut self, alias: impl Into<String>, id: impl Into<String>) {
        self.aliases.insert(alias.into(), id.into());
    }

    /// Target of `alias`, or `alias` itself when it is not an alias.
    pub fn resolve_alias<'a>(&'a self, alias: &'a str) -> &'a str {
        self.aliases.get(alias).map(String::as_str).unwrap_or(alias)
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    pub fn remove_alias(&mut self, alias: &str) {
        self.aliases.remove(alias);
    }
}
