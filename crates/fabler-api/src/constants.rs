//! API constants.

/// API version segment for all routes and the OpenAPI spec.
pub const API_VERSION: &str = "v1";

/// Versioned prefix every domain route group is nested under.
pub const API_PREFIX: &str = "/api/v1";
