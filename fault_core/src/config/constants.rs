pub mod compile_time {
    pub mod catalog {
        /// Maximum placeholder substitutions in a single message template
        /// SECURITY: Bounds template expansion work per resolution
        pub const MAX_TEMPLATE_REPLACEMENTS: usize = 100;

        /// Placeholder syntax: `{{ key }}`, key without whitespace or `}`
        pub const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([^}\s]+)\s*\}\}";
    }

    pub mod record {
        /// Instance field names a capability group may never shadow
        pub const RESERVED_FIELDS: &[&str] = &[
            "id",
            "timestamp",
            "severity",
            "message",
            "code",
            "metadata",
            "cause",
            "name",
            "chain",
            "class",
        ];

        /// Positional arguments accepted after the message
        pub const MAX_POSITIONAL_ARGUMENTS: usize = 3;
    }
}
