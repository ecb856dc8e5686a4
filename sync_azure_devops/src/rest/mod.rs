//! AzureDevOpsRestClient and generic utilities to help with Azure DevOps
//! API requests

mod error;

pub use error::ApiError;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use sync_core::connectors::nodes::Page;
use sync_core::logging::{debug, error};
use url::Url;
use uuid::Uuid;

use crate::api::{DevOpsApi, IdentityQuery};
use crate::consts;
use crate::creds::AzureDevOpsCredentials;
use crate::nodes::{
    user::PagedUserEntitlements, AccessControlList, GitRepository, GraphGroup, GraphMembership,
    Identity, SecurityNamespace, TeamMember, TeamProjectReference, UserEntitlement,
    UserEntitlementsPostResponse, ValueList, ValueOf, WebApiTeam,
};

/// Client options.
#[derive(Default, Debug, Clone)]
pub struct AzureDevOpsRestConfig {
    /// Enable/disable retry logic for transient failures.
    pub retry: bool,
}

/// The service hosting an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Area {
    /// Projects, teams, security, git
    Core,
    /// Graph and identities
    Graph,
    /// User entitlements
    Entitlements,
}

/// Wrapper struct for http functionality
pub struct AzureDevOpsRestClient {
    personal_access_token: String,
    organization_url: Url,
    http_client: ClientWithMiddleware,
}

impl AzureDevOpsRestClient {
    /// Build a client for the organization at `organization_url`.
    pub fn new(
        organization_url: &str,
        personal_access_token: &str,
        config: AzureDevOpsRestConfig,
    ) -> Result<Self> {
        let credentials = AzureDevOpsCredentials {
            personal_access_token: personal_access_token.to_owned(),
            organization_url: organization_url.to_owned(),
        };
        Self::from_credentials(credentials, config)
    }

    pub(crate) fn from_credentials(
        credentials: AzureDevOpsCredentials,
        config: AzureDevOpsRestConfig,
    ) -> Result<Self> {
        credentials.validate()?;
        let organization_url = credentials.organization_url()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let mut client_builder = ClientBuilder::new(reqwest::Client::new());
        if config.retry {
            client_builder =
                client_builder.with(RetryTransientMiddleware::new_with_policy(retry_policy))
        }

        Ok(Self {
            personal_access_token: credentials.personal_access_token,
            organization_url,
            http_client: client_builder.build(),
        })
    }

    /// Base URL for an area. Hosted organizations split areas across
    /// subdomains; anything else serves every area from one URL.
    pub(crate) fn area_url(&self, area: Area) -> Result<Url, ApiError> {
        let mut url = self.organization_url.clone();
        if url.host_str() != Some(consts::HOSTED_DOMAIN) {
            return Ok(url);
        }
        let host = match area {
            Area::Core => return Ok(url),
            Area::Graph => consts::GRAPH_HOST,
            Area::Entitlements => consts::ENTITLEMENTS_HOST,
        };
        url.set_host(Some(host))
            .map_err(|e| ApiError::InvalidArgument(format!("setting host {host}: {e}")))?;
        Ok(url)
    }

    /// Full URL for `segments` under an area. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, area: Area, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.area_url(area)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidArgument("organization url cannot be a base".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds an authenticated request.
    pub(crate) fn build_request(
        &self,
        method: Method,
        url: Url,
        api_version: &str,
    ) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .basic_auth("", Some(&self.personal_access_token))
            .header(consts::ACCEPT_HEADER, "application/json")
            .header(consts::USER_AGENT_HEADER, consts::USER_AGENT)
            .query(&[("api-version", api_version)])
    }
}

/// A decoded body plus the continuation header, if any.
pub(crate) struct Fetched<T> {
    pub(crate) body: T,
    pub(crate) continuation_token: Option<String>,
}

#[async_trait]
pub(crate) trait FetchJson {
    /// Send the request, classify failures and decode the JSON body.
    async fn fetch_json_response<T: DeserializeOwned + Send>(self) -> Result<Fetched<T>, ApiError>;

    /// Send the request and discard the body.
    async fn fetch_empty_response(self) -> Result<(), ApiError>;
}

async fn send_checked(req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let resp = req.send().await.map_err(|e| {
        error!("error with request: {e}");
        ApiError::from(e)
    })?;

    let status = resp.status();
    let url = resp.url().to_string();
    if status == StatusCode::NOT_FOUND {
        debug!("not found: {url}");
        return Err(ApiError::NotFound { url });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        error!("error with request - bad response ({status} {url}): {body}");
        return Err(ApiError::Status {
            status: status.as_u16(),
            url,
            body,
        });
    }
    Ok(resp)
}

#[async_trait]
impl FetchJson for RequestBuilder {
    async fn fetch_json_response<T: DeserializeOwned + Send>(self) -> Result<Fetched<T>, ApiError> {
        let resp = send_checked(self).await?;
        let url = resp.url().to_string();
        let continuation_token = resp
            .headers()
            .get(consts::CONTINUATION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);

        let text = resp.text().await?;
        let body = serde_json::from_str(&text).map_err(|source| {
            error!("error parsing json response ({url}): {source}");
            ApiError::Decode { url, source }
        })?;

        Ok(Fetched {
            body,
            continuation_token,
        })
    }

    async fn fetch_empty_response(self) -> Result<(), ApiError> {
        send_checked(self).await?;
        Ok(())
    }
}

#[async_trait]
impl DevOpsApi for AzureDevOpsRestClient {
    async fn list_user_entitlements(
        &self,
        token: Option<String>,
    ) -> Result<Page<UserEntitlement>, ApiError> {
        let url = self.endpoint(Area::Entitlements, &["_apis", "userentitlements"])?;
        let mut req = self.build_request(Method::GET, url, consts::USER_ENTITLEMENTS_API_VERSION);
        if let Some(t) = &token {
            req = req.query(&[("continuationToken", t)]);
        }
        let fetched: Fetched<PagedUserEntitlements> = req.fetch_json_response().await?;
        let next = fetched
            .body
            .continuation_token
            .and_then(|t| t.into_token());
        Ok(Page::with_token(fetched.body.members, next))
    }

    async fn add_user_entitlement(
        &self,
        entitlement: UserEntitlement,
    ) -> Result<UserEntitlementsPostResponse, ApiError> {
        let url = self.endpoint(Area::Entitlements, &["_apis", "userentitlements"])?;
        let fetched = self
            .build_request(Method::POST, url, consts::USER_ENTITLEMENTS_API_VERSION)
            .header(consts::CONTENT_TYPE_HEADER, "application/json")
            .json(&entitlement)
            .fetch_json_response()
            .await?;
        Ok(fetched.body)
    }

    async fn list_projects(
        &self,
        token: Option<String>,
    ) -> Result<Page<TeamProjectReference>, ApiError> {
        let url = self.endpoint(Area::Core, &["_apis", "projects"])?;
        let mut req = self.build_request(Method::GET, url, consts::CORE_API_VERSION);
        match token.as_deref().map(str::parse::<u64>) {
            Some(Ok(offset)) => req = req.query(&[("continuationToken", offset)]),
            Some(Err(_)) => debug!("ignoring non-numeric project continuation token {token:?}"),
            None => (),
        }
        let fetched: Fetched<ValueList<TeamProjectReference>> = req.fetch_json_response().await?;
        Ok(Page::with_token(
            fetched.body.value,
            fetched.continuation_token,
        ))
    }

    async fn list_teams(&self) -> Result<Vec<WebApiTeam>, ApiError> {
        let url = self.endpoint(Area::Core, &["_apis", "teams"])?;
        let fetched: Fetched<ValueList<WebApiTeam>> = self
            .build_request(Method::GET, url, consts::TEAMS_API_VERSION)
            .fetch_json_response()
            .await?;
        Ok(fetched.body.value)
    }

    async fn list_team_members(
        &self,
        project_id: &str,
        team_id: &str,
    ) -> Result<Vec<TeamMember>, ApiError> {
        let url = self.endpoint(
            Area::Core,
            &["_apis", "projects", project_id, "teams", team_id, "members"],
        )?;
        let fetched: Fetched<ValueList<TeamMember>> = self
            .build_request(Method::GET, url, consts::CORE_API_VERSION)
            .fetch_json_response()
            .await?;
        Ok(fetched.body.value)
    }

    async fn list_groups(&self, token: Option<String>) -> Result<Page<GraphGroup>, ApiError> {
        let url = self.endpoint(Area::Graph, &["_apis", "graph", "groups"])?;
        let mut req = self.build_request(Method::GET, url, consts::GRAPH_API_VERSION);
        if let Some(t) = &token {
            req = req.query(&[("continuationToken", t)]);
        }
        let fetched: Fetched<ValueList<GraphGroup>> = req.fetch_json_response().await?;
        Ok(Page::with_token(
            fetched.body.value,
            fetched.continuation_token,
        ))
    }

    async fn read_identities(&self, query: IdentityQuery) -> Result<Vec<Identity>, ApiError> {
        let (key, values) = match query {
            IdentityQuery::ByIds(ids) => ("identityIds", ids),
            IdentityQuery::ByDescriptors(descriptors) => ("descriptors", descriptors),
        };
        let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
        if values.is_empty() {
            return Err(ApiError::InvalidArgument(format!("no {key} given")));
        }

        let url = self.endpoint(Area::Graph, &["_apis", "identities"])?;
        // unknown descriptors come back as null entries
        let fetched: Fetched<ValueList<Option<Identity>>> = self
            .build_request(Method::GET, url, consts::CORE_API_VERSION)
            .query(&[(key, values.join(",").as_str()), ("queryMembership", "expanded")])
            .fetch_json_response()
            .await?;
        Ok(fetched.body.value.into_iter().flatten().collect())
    }

    async fn query_security_namespaces(
        &self,
        namespace_id: Option<Uuid>,
    ) -> Result<Vec<SecurityNamespace>, ApiError> {
        let id = namespace_id.map(|id| id.to_string());
        let mut segments = vec!["_apis", "securitynamespaces"];
        if let Some(id) = &id {
            segments.push(id);
        }
        let url = self.endpoint(Area::Core, &segments)?;
        let fetched: Fetched<ValueList<SecurityNamespace>> = self
            .build_request(Method::GET, url, consts::CORE_API_VERSION)
            .fetch_json_response()
            .await?;
        Ok(fetched.body.value)
    }

    async fn query_access_control_lists(
        &self,
        namespace_id: Uuid,
        token: Option<String>,
    ) -> Result<Vec<AccessControlList>, ApiError> {
        let id = namespace_id.to_string();
        let url = self.endpoint(Area::Core, &["_apis", "accesscontrollists", &id])?;
        let mut req = self
            .build_request(Method::GET, url, consts::CORE_API_VERSION)
            .query(&[("includeExtendedInfo", "true")]);
        if let Some(t) = &token {
            req = req.query(&[("token", t)]);
        }
        let fetched: Fetched<ValueList<AccessControlList>> = req.fetch_json_response().await?;
        Ok(fetched.body.value)
    }

    async fn list_repositories(&self, project: &str) -> Result<Vec<GitRepository>, ApiError> {
        let url = self.endpoint(Area::Core, &[project, "_apis", "git", "repositories"])?;
        let fetched: Fetched<ValueList<GitRepository>> = self
            .build_request(Method::GET, url, consts::CORE_API_VERSION)
            .fetch_json_response()
            .await?;
        Ok(fetched.body.value)
    }

    async fn get_descriptor(&self, storage_key: Uuid) -> Result<String, ApiError> {
        let key = storage_key.to_string();
        let url = self.endpoint(Area::Graph, &["_apis", "graph", "descriptors", &key])?;
        let fetched: Fetched<ValueOf<String>> = self
            .build_request(Method::GET, url, consts::GRAPH_API_VERSION)
            .fetch_json_response()
            .await?;
        Ok(fetched.body.value)
    }

    async fn get_membership(
        &self,
        subject: &str,
        container: &str,
    ) -> Result<GraphMembership, ApiError> {
        let url = self.membership_url(subject, container)?;
        let fetched = self
            .build_request(Method::GET, url, consts::GRAPH_API_VERSION)
            .fetch_json_response()
            .await?;
        Ok(fetched.body)
    }

    async fn add_membership(
        &self,
        subject: &str,
        container: &str,
    ) -> Result<GraphMembership, ApiError> {
        let url = self.membership_url(subject, container)?;
        let fetched = self
            .build_request(Method::PUT, url, consts::GRAPH_API_VERSION)
            .fetch_json_response()
            .await?;
        Ok(fetched.body)
    }

    async fn remove_membership(&self, subject: &str, container: &str) -> Result<(), ApiError> {
        let url = self.membership_url(subject, container)?;
        self.build_request(Method::DELETE, url, consts::GRAPH_API_VERSION)
            .fetch_empty_response()
            .await
    }
}

impl AzureDevOpsRestClient {
    fn membership_url(&self, subject: &str, container: &str) -> Result<Url, ApiError> {
        if subject.is_empty() || container.is_empty() {
            return Err(ApiError::InvalidArgument(
                "membership descriptors must not be empty".to_owned(),
            ));
        }
        self.endpoint(
            Area::Graph,
            &["_apis", "graph", "memberships", subject, container],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> Result<AzureDevOpsRestClient> {
        AzureDevOpsRestClient::new(url, "pat", Default::default())
    }

    #[test]
    fn hosted_organization_splits_areas() -> Result<()> {
        let c = client("https://dev.azure.com/acme")?;
        assert_eq!(
            c.endpoint(Area::Graph, &["_apis", "graph", "groups"])?.as_str(),
            "https://vssps.dev.azure.com/acme/_apis/graph/groups"
        );
        assert_eq!(
            c.endpoint(Area::Entitlements, &["_apis", "userentitlements"])?
                .as_str(),
            "https://vsaex.dev.azure.com/acme/_apis/userentitlements"
        );
        assert_eq!(
            c.endpoint(Area::Core, &["_apis", "projects"])?.as_str(),
            "https://dev.azure.com/acme/_apis/projects"
        );
        Ok(())
    }

    #[test]
    fn other_hosts_use_one_base() -> Result<()> {
        let c = client("https://tfs.example.com/DefaultCollection/")?;
        assert_eq!(
            c.endpoint(Area::Graph, &["_apis", "graph", "groups"])?.as_str(),
            "https://tfs.example.com/DefaultCollection/_apis/graph/groups"
        );
        Ok(())
    }

    #[test]
    fn path_segments_are_encoded() -> Result<()> {
        let c = client("https://dev.azure.com/acme")?;
        assert_eq!(
            c.endpoint(Area::Core, &["My Project", "_apis", "git", "repositories"])?
                .as_str(),
            "https://dev.azure.com/acme/My%20Project/_apis/git/repositories"
        );
        Ok(())
    }
}
