pub const ACCEPT_HEADER: &str = "Accept";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const USER_AGENT_HEADER: &str = "User-Agent";
pub const CONTINUATION_TOKEN_HEADER: &str = "x-ms-continuationtoken";
pub const USER_AGENT: &str = "identity-sync-azure-devops";

pub const CORE_API_VERSION: &str = "7.1";
pub const TEAMS_API_VERSION: &str = "7.1-preview.3";
pub const GRAPH_API_VERSION: &str = "7.1-preview.1";
pub const USER_ENTITLEMENTS_API_VERSION: &str = "7.1-preview.3";

pub const HOSTED_DOMAIN: &str = "dev.azure.com";
pub const GRAPH_HOST: &str = "vssps.dev.azure.com";
pub const ENTITLEMENTS_HOST: &str = "vsaex.dev.azure.com";
