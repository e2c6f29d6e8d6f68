/// Versioned prefix every resource route is nested under
pub const API_PREFIX: &str = "/api/v1";

/// Path the OpenAPI document is served from
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Path the RapiDoc UI is served from
pub const DOCS_PATH: &str = "/docs";

/// Shortest query accepted by the text search endpoints
pub const MIN_SEARCH_QUERY_LEN: usize = 2;
