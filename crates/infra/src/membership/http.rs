use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use gridbill_assets::GroupMember;
use gridbill_core::GroupId;

use super::{MembershipError, MembershipProvider, MembershipResult};
use crate::config::AmmpConfig;

/// Membership provider backed by the asset/data HTTP API.
///
/// `GET {base_url}/asset-groups/{group_id}/assets`. The request timeout comes
/// from [`AmmpConfig`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpMembershipProvider {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

/// Accepted response shapes: a bare member array or `{ "assets": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MembersPayload {
    List(Vec<GroupMember>),
    Wrapped { assets: Vec<GroupMember> },
}

impl MembersPayload {
    fn into_members(self) -> Vec<GroupMember> {
        match self {
            MembersPayload::List(members) => members,
            MembersPayload::Wrapped { assets } => assets,
        }
    }
}

impl HttpMembershipProvider {
    pub fn new(config: &AmmpConfig) -> MembershipResult<Self> {
        let base_url = Url::parse(config.base_url())
            .map_err(|e| MembershipError::Provider(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(MembershipError::Provider(format!(
                "base url cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MembershipError::Provider(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token().map(str::to_string),
        })
    }

    fn members_url(&self, group_id: &GroupId) -> MembershipResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MembershipError::Provider("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["asset-groups", group_id.as_str(), "assets"]);
        Ok(url)
    }
}

#[async_trait]
impl MembershipProvider for HttpMembershipProvider {
    async fn group_members(&self, group_id: &GroupId) -> MembershipResult<Vec<GroupMember>> {
        let url = self.members_url(group_id)?;
        debug!(group_id = %group_id, url = %url, "fetching group members");

        let mut req = self.client.get(url);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| MembershipError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MembershipError::UnknownGroup(group_id.clone()));
        }
        if !status.is_success() {
            return Err(MembershipError::Http {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| MembershipError::Network(e.to_string()))?;
        let payload: MembersPayload =
            serde_json::from_slice(&body).map_err(|e| MembershipError::Malformed(e.to_string()))?;

        Ok(payload.into_members())
    }
}
