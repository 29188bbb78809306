//! GET/POST/DELETE against the service account collection and item endpoints.

use std::sync::{Arc, LazyLock};

use serde::Serialize;
use url::Url;

use crate::descriptor::{RemoteState, ServiceAccount};
use crate::error::{LocatorError, TransportError};
use crate::template::{TemplateVars, expand};
use crate::transport::{Credential, HttpTransport};

pub const DEFAULT_BASE_URL: &str = "https://iam.googleapis.com/v1/";
pub const COLLECTION_TEMPLATE: &str = "projects/{{project}}/serviceAccounts";
pub const ITEM_TEMPLATE: &str = "projects/{{project}}/serviceAccounts/{{name}}";

static DEFAULT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"));

/// Remote object accessor for service accounts.
///
/// Locators are built with [`collection_url`](Self::collection_url) and
/// [`item_url`](Self::item_url); the network operations take them as-is.
#[derive(Clone)]
pub struct ServiceAccountApi {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
}

impl std::fmt::Debug for ServiceAccountApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountApi")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ServiceAccountApi {
    /// Accessor against the public endpoint.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE.clone(),
        }
    }

    /// Accessor against another endpoint. A trailing `/` is added when
    /// missing so relative paths append instead of replacing the last segment.
    pub fn with_base_url(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
    ) -> Result<Self, url::ParseError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            transport,
            base_url: Url::parse(&base)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL addressing every account under `project`.
    pub fn collection_url(&self, project: &str) -> Result<Url, LocatorError> {
        let vars = TemplateVars::new().with("project", project);
        self.locate(COLLECTION_TEMPLATE, &vars)
    }

    /// URL addressing one account.
    pub fn item_url(&self, project: &str, name: &str) -> Result<Url, LocatorError> {
        let vars = TemplateVars::new()
            .with("project", project)
            .with("name", name);
        self.locate(ITEM_TEMPLATE, &vars)
    }

    // Values are encoded as path segments so `#`, `?` and `/` stay inside them.
    // The URL parser treats `%2E` like `.`, so dot segments are refused outright.
    fn locate(&self, template: &str, vars: &TemplateVars) -> Result<Url, LocatorError> {
        if let Some(dots) = vars.values().find(|v| is_dot_segment(v)) {
            return Err(LocatorError::DotSegment(dots.to_string()));
        }
        let encoded = vars.map_values(|v| urlencoding::encode(v).into_owned());
        let path = expand(template, &encoded)?;
        Ok(self.base_url.join(&path)?)
    }

    /// GET the item. 200 is `Found`, 404 is `NotFound`, anything else fails.
    pub async fn fetch(
        &self,
        item: &Url,
        credential: &Credential,
    ) -> Result<RemoteState, TransportError> {
        tracing::debug!(method = "GET", url = %item, "network request");

        let resp = self.transport.get(item.as_str(), credential).await?;
        match resp.status {
            200 => {
                let account: ServiceAccount =
                    serde_json::from_str(&resp.body).map_err(|source| TransportError::Decode {
                        url: item.to_string(),
                        source,
                    })?;
                Ok(RemoteState::Found(account))
            }
            404 => Ok(RemoteState::NotFound),
            status => Err(TransportError::status(item.as_str(), status, resp.body)),
        }
    }

    /// POST `body` to the collection. Any 2xx succeeds.
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        collection: &Url,
        body: &B,
        credential: &Credential,
    ) -> Result<(), TransportError> {
        let body = serde_json::to_value(body).map_err(TransportError::Encode)?;
        tracing::debug!(method = "POST", url = %collection, %body, "network request");

        let resp = self
            .transport
            .post_json(collection.as_str(), credential, &body)
            .await?;
        if !resp.is_success() {
            return Err(TransportError::status(collection.as_str(), resp.status, resp.body));
        }
        Ok(())
    }

    /// DELETE the item. Any 2xx succeeds.
    pub async fn delete(&self, item: &Url, credential: &Credential) -> Result<(), TransportError> {
        tracing::debug!(method = "DELETE", url = %item, "network request");

        let resp = self.transport.delete(item.as_str(), credential).await?;
        if !resp.is_success() {
            return Err(TransportError::status(item.as_str(), resp.status, resp.body));
        }
        Ok(())
    }
}

pub(crate) fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use serde_json::json;

    fn api(fake: &Arc<FakeTransport>) -> ServiceAccountApi {
        ServiceAccountApi::new(fake.clone())
    }

    fn cred() -> Credential {
        Credential::bearer("t")
    }

    #[test]
    fn test_urls() {
        let api = api(&Arc::new(FakeTransport::new()));
        assert_eq!(
            api.collection_url("proj0").unwrap().as_str(),
            "https://iam.googleapis.com/v1/projects/proj0/serviceAccounts"
        );
        assert_eq!(
            api.item_url("proj0", "custom0").unwrap().as_str(),
            "https://iam.googleapis.com/v1/projects/proj0/serviceAccounts/custom0"
        );
    }

    #[test]
    fn test_item_url_encodes_segments() {
        let api = api(&Arc::new(FakeTransport::new()));
        let url = api.item_url("test project#0 data", "a/b?c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://iam.googleapis.com/v1/projects/test%20project%230%20data/serviceAccounts/a%2Fb%3Fc"
        );
        assert!(url.fragment().is_none());
        assert!(url.query().is_none());
    }

    #[test]
    fn test_dot_segments_rejected() {
        let api = api(&Arc::new(FakeTransport::new()));
        assert_eq!(
            api.item_url("p", "..").unwrap_err(),
            LocatorError::DotSegment("..".into())
        );
        assert_eq!(
            api.item_url("p", ".").unwrap_err(),
            LocatorError::DotSegment(".".into())
        );
        assert_eq!(
            api.collection_url("..").unwrap_err(),
            LocatorError::DotSegment("..".into())
        );
        assert_eq!(
            api.item_url("p", "...").unwrap().as_str(),
            "https://iam.googleapis.com/v1/projects/p/serviceAccounts/..."
        );
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let fake = Arc::new(FakeTransport::new());
        let api = ServiceAccountApi::with_base_url(fake, "http://127.0.0.1:9000/v1").unwrap();
        assert_eq!(
            api.collection_url("p").unwrap().as_str(),
            "http://127.0.0.1:9000/v1/projects/p/serviceAccounts"
        );
    }

    #[tokio::test]
    async fn test_fetch_found() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_response(200, json!({"name": "n1", "displayName": "d1"}).to_string());
        let api = api(&fake);

        let item = api.item_url("p1", "n1").unwrap();
        match api.fetch(&item, &cred()).await.unwrap() {
            RemoteState::Found(sa) => assert_eq!(sa.display_name.as_deref(), Some("d1")),
            RemoteState::NotFound => panic!("expected Found"),
        }
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].url, item.as_str());
        assert_eq!(calls[0].token, "t");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_response(404, "");
        let api = api(&fake);
        let item = api.item_url("p1", "n1").unwrap();
        assert_eq!(api.fetch(&item, &cred()).await.unwrap(), RemoteState::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_other_status_is_error() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_response(500, "backend error");
        let api = api(&fake);
        let item = api.item_url("p1", "n1").unwrap();
        let err = api.fetch(&item, &cred()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_fetch_unparseable_body_is_error() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_response(200, "<html>");
        let api = api(&fake);
        let item = api.item_url("p1", "n1").unwrap();
        let err = api.fetch(&item, &cred()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_create_accepts_any_2xx() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_response(201, "{}");
        let api = api(&fake);
        let collection = api.collection_url("p1").unwrap();

        api.create(&collection, &json!({"name": "n1"}), &cred())
            .await
            .unwrap();
        let calls = fake.calls();
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, collection.as_str());
        assert_eq!(calls[0].body, Some(json!({"name": "n1"})));
    }

    #[tokio::test]
    async fn test_delete_rejects_non_2xx() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_response(403, "denied");
        let api = api(&fake);
        let item = api.item_url("p1", "n1").unwrap();
        let err = api.delete(&item, &cred()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(403));
    }
}
