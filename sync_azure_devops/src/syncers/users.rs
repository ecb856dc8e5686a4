use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sync_core::connectors::nodes::{
    AccountInfo, Entitlement, Grant, Page, Resource, ResourceId, ResourceType,
};
use sync_core::connectors::{AccountManager, ResourceSyncer};

use crate::api::DevOpsApi;
use crate::resource_types::USER;
use crate::write;

/// Organization users. Users hold grants but offer no entitlements.
pub(crate) struct UserSyncer {
    api: Arc<dyn DevOpsApi>,
}

impl UserSyncer {
    pub(crate) fn new(api: Arc<dyn DevOpsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &USER
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: Option<&str>,
    ) -> Result<Page<Resource>> {
        let page = self
            .api
            .list_user_entitlements(token.map(str::to_owned))
            .await
            .context("listing user entitlements")?;
        Ok(Page::with_token(
            page.items.into_iter().map(Resource::from).collect(),
            page.next_token,
        ))
    }

    async fn entitlements(&self, _resource: &Resource) -> Result<Vec<Entitlement>> {
        Ok(vec![])
    }

    async fn grants(&self, _resource: &Resource) -> Result<Vec<Grant>> {
        Ok(vec![])
    }
}

#[async_trait]
impl AccountManager for UserSyncer {
    async fn create_account(&self, account: &AccountInfo) -> Result<Resource> {
        write::create_account(self.api.as_ref(), account).await
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::api::MockDevOpsApi;
    use crate::nodes::{GraphUser, UserEntitlement};

    #[tokio::test]
    async fn list_passes_the_token_through() -> Result<()> {
        let mut api = MockDevOpsApi::new();
        api.expect_list_user_entitlements()
            .with(eq(Some("abc".to_owned())))
            .times(1)
            .returning(|_| {
                Ok(Page::with_token(
                    vec![UserEntitlement {
                        user: Some(GraphUser {
                            descriptor: Some("aad.jane".to_owned()),
                            display_name: Some("Jane".to_owned()),
                            mail_address: Some("jane@example.com".to_owned()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                    Some("def".to_owned()),
                ))
            });

        let syncer = UserSyncer::new(Arc::new(api));
        let page = syncer.list(None, Some("abc")).await?;
        assert_eq!(page.next_token.as_deref(), Some("def"));
        assert_eq!(page.items[0].id, ResourceId::new("user", "aad.jane"));
        assert_eq!(
            page.items[0].profile_value("email"),
            Some("jane@example.com")
        );
        assert!(syncer.entitlements(&page.items[0]).await?.is_empty());
        Ok(())
    }
}
