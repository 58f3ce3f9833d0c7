//! Service id helpers.
//!
//! Services are keyed by plain strings. Types that are autowired or looked up
//! by declared parameter type use their `std::any::type_name` as id, so a
//! registration under `id_of::<T>()` satisfies every parameter declared as `T`.

/// Returns the service id used for the type `T`.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::id_of;
///
/// struct Mailer;
/// assert!(id_of::<Mailer>().ends_with("Mailer"));
/// assert_eq!(id_of::<String>(), "alloc::string::String");
/// ```
#[inline]
pub fn id_of<T: ?Sized + 'static>() -> String {
    std::any::type_name::<T>().to_string()
}

/// Strips the module path from a type id, leaving the bare type name.
///
/// Used for log output and descriptor labels.
///
/// ```rust
/// use ferrous_container::key::short_name;
///
/// assert_eq!(short_name("app::db::Connection"), "Connection");
/// assert_eq!(short_name("cache"), "cache");
/// ```
pub fn short_name(id: &str) -> &str {
    // Generic arguments may contain `::` too, only look at the outer path.
    let outer = id.split('<').next().unwrap_or(id);
    match outer.rfind("::") {
        Some(pos) => &id[pos + 2..],
        None => id,
    }
}
