pub mod cli_consts {
    //! Client Configuration Constants
    //!
    //! This module contains all configuration constants for the client,
    //! organized by functional area.

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// API client configuration
    pub mod api {
        use std::time::Duration;

        /// Environment variable holding the API base URL.
        pub const API_URL_ENV: &str = "CLOUDOPS_API_URL";

        /// Environment variable naming a deployment (`local`, `staging`, `production`).
        pub const ENVIRONMENT_ENV: &str = "CLOUDOPS_ENVIRONMENT";

        /// Base URL used when no override is configured.
        pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

        /// Fixed request timeout (milliseconds)
        pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

        /// Helper function to get the request timeout
        pub const fn request_timeout() -> Duration {
            Duration::from_millis(REQUEST_TIMEOUT_MS)
        }
    }

    // =============================================================================
    // DURABLE STORAGE
    // =============================================================================

    /// Durable client storage layout
    pub mod storage {
        /// Key holding the raw bearer token.
        pub const AUTH_TOKEN_KEY: &str = "auth_token";

        /// Key holding the serialized user record.
        pub const USER_KEY: &str = "user";

        /// Directory under `$HOME` that holds client state.
        pub const STORAGE_DIR: &str = ".cloudops";

        /// File name of the key-value store.
        pub const STORAGE_FILE: &str = "storage.json";
    }

    // =============================================================================
    // EVENTS
    // =============================================================================

    /// Maximum number of buffered session events
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // DASHBOARD
    // =============================================================================

    /// Dashboard derivation constants
    pub mod dashboard {
        /// Compliance scores at or above this are shown as healthy.
        pub const SCORE_GOOD_THRESHOLD: u32 = 95;

        /// Compliance scores at or above this (and below good) are shown as fair.
        pub const SCORE_FAIR_THRESHOLD: u32 = 85;

        /// Days used to project a monthly cost from the latest daily cost.
        pub const MONTHLY_PROJECTION_DAYS: f64 = 30.0;

        /// Page size requested from the alerts endpoint.
        pub const ALERTS_PAGE_SIZE: u32 = 50;
    }
}
