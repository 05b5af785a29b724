//! Remote-call collaborators. The controller is agnostic to transport and
//! authentication; anything implementing [`ActionGateway`] can settle an
//! action. [`HttpActionGateway`] maps actions onto the feed API's REST
//! surface.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use shared::{
    domain::{Action, ActionKind, ActionState, TargetId},
    error::ApiError,
    protocol::{ActionOutcome, ActionRequest, ActionResponse},
};
use url::Url;

#[async_trait]
pub trait ActionGateway: Send + Sync {
    /// Applies one mutation remotely. Attempted exactly once per cycle by the
    /// controller; retries, if any, are the implementor's concern.
    async fn apply(&self, action: &Action) -> Result<ActionOutcome>;
}

/// Placeholder wiring for contexts with no remote backend configured.
pub struct MissingActionGateway;

#[async_trait]
impl ActionGateway for MissingActionGateway {
    async fn apply(&self, action: &Action) -> Result<ActionOutcome> {
        Err(anyhow!(
            "no action gateway configured for {:?} on {:?}",
            action.kind,
            action.target
        ))
    }
}

pub struct HttpActionGateway {
    http: Client,
    base_url: Url,
}

impl HttpActionGateway {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let mut raw = base_url.as_ref().to_string();
        // Url::join treats a missing trailing slash as a file segment.
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .with_context(|| format!("invalid feed api base url: {}", base_url.as_ref()))?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    /// Engaging mutations (save, hide, pin, block) POST; their reversals
    /// DELETE the same resource.
    fn endpoint(&self, action: &Action) -> Result<(Method, Url)> {
        let engaged = match &action.next {
            ActionState::Flag(value) => *value,
            ActionState::Pinned(at) => at.is_some(),
        };
        let method = if engaged { Method::POST } else { Method::DELETE };
        let path = match (action.kind, &action.target) {
            (ActionKind::ToggleBookmark, TargetId::Post(id)) => format!("posts/{id}/bookmark"),
            (ActionKind::HidePost, TargetId::Post(id)) => format!("posts/{id}/hide"),
            (ActionKind::PinPost, TargetId::Post(id)) => format!("posts/{id}/pin"),
            (ActionKind::ToggleDownvote, TargetId::Post(id)) => format!("posts/{id}/downvote"),
            (ActionKind::BlockSource, TargetId::Source(id)) => {
                format!("feed-settings/blocked-sources/{id}")
            }
            (ActionKind::BlockTag, TargetId::Tag(tag)) => {
                format!("feed-settings/blocked-tags/{tag}")
            }
            (kind, target) => {
                return Err(anyhow!("unsupported target {target:?} for {kind:?}"));
            }
        };
        let url = self
            .base_url
            .join(&path)
            .with_context(|| format!("failed to build feed api url for {path}"))?;
        Ok((method, url))
    }
}

#[async_trait]
impl ActionGateway for HttpActionGateway {
    async fn apply(&self, action: &Action) -> Result<ActionOutcome> {
        let (method, url) = self.endpoint(action)?;
        let response = self
            .http
            .request(method.clone(), url.clone())
            .json(&ActionRequest::from(action))
            .send()
            .await
            .with_context(|| format!("failed to reach feed api: {method} {url}"))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(ActionOutcome::default());
        }
        if !status.is_success() {
            if let Ok(api_error) = response.json::<ApiError>().await {
                return Err(api_error.into());
            }
            return Err(anyhow!("feed api returned {status} for {method} {url}"));
        }

        let body: ActionResponse = response
            .json()
            .await
            .with_context(|| format!("invalid feed api response body from {url}"))?;
        Ok(body.into())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
