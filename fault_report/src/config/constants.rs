pub mod compile_time {
    pub mod logging {
        /// Maximum records retained by a memory logger
        /// RESOURCE: Oldest entries are dropped beyond this
        pub const MEMORY_LOG_CAPACITY: usize = 1000;

        /// `log` crate target used by the facade logger
        pub const FACADE_TARGET: &str = "fault";
    }

    pub mod formatting {
        /// Largest accepted JSON indent width
        pub const MAX_JSON_INDENT: usize = 16;

        /// Default JSON indent width
        pub const DEFAULT_JSON_INDENT: usize = 2;

        /// Indent unit for nested chain lines
        pub const CHAIN_INDENT: &str = "    ";

        /// Marker preceding every nested chain line
        pub const CHAIN_BRANCH: &str = "└── ";
    }
}
