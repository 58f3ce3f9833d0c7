/// Unit tests for service id helpers

use ferrous_container::id_of;
use ferrous_container::key::short_name;

mod app {
    pub struct Mailer;
    pub trait Transport {}
}

#[test]
fn test_id_of_is_type_name() {
    assert_eq!(id_of::<String>(), std::any::type_name::<String>());
    assert_eq!(id_of::<u32>(), "u32");
    assert!(id_of::<app::Mailer>().ends_with("app::Mailer"));
}

#[test]
fn test_id_of_distinguishes_types() {
    assert_ne!(id_of::<u32>(), id_of::<u64>());
    assert_ne!(id_of::<app::Mailer>(), id_of::<dyn app::Transport>());
    assert!(id_of::<dyn app::Transport>().starts_with("dyn "));
}

#[test]
fn test_short_name() {
    assert_eq!(short_name("app::db::Connection"), "Connection");
    assert_eq!(short_name("Connection"), "Connection");
    assert_eq!(short_name("logger.file"), "logger.file");
    assert_eq!(short_name(""), "");
}

#[test]
fn test_short_name_keeps_generic_arguments() {
    assert_eq!(short_name("alloc::vec::Vec<app::Job>"), "Vec<app::Job>");
    assert_eq!(short_name("Option<core::time::Duration>"), "Option<core::time::Duration>");
}
