//! Configuration module for fault_core
//!
//! The core has no runtime configuration; its limits are fixed at compile
//! time. Reporting preferences live in `fault_report`.

pub mod constants;

pub use constants::compile_time;

/// Check whether a capability group name collides with a record field
pub fn is_reserved_field(name: &str) -> bool {
    compile_time::record::RESERVED_FIELDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_fields() {
        assert!(is_reserved_field("message"));
        assert!(is_reserved_field("chain"));
        assert!(!is_reserved_field("formatters"));
        assert_eq!(compile_time::catalog::MAX_TEMPLATE_REPLACEMENTS, 100);
    }
}
