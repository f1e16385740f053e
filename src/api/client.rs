use anyhow::{anyhow, Context};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::service::types::*;
use super::types::*;

/// HTTP client for the route analysis API.
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    base: Url,
}

impl Client {
    /// `base` is the API root, e.g. `http://localhost:8000/api/v1`.
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        let base: Url = base
            .parse()
            .map_err(|e| anyhow!("{} is not a valid url: {}", base, e))?;

        if base.cannot_be_a_base() {
            return Err(anyhow!("{base} cannot be used as a base url"));
        }

        Ok(Self {
            inner: client,
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base url", self.base))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> anyhow::Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("failed to {what}"))?
            .error_for_status()
            .with_context(|| format!("failed to {what}"))?
            .json()
            .await
            .with_context(|| format!("failed to {what}: invalid response body"))?;

        Ok(response)
    }

    pub async fn routes(&self, skip: usize, limit: usize) -> anyhow::Result<Vec<RouteWithStopCount>> {
        let mut url = self.url(&["routes"])?;
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());

        self.send(self.inner.get(url), "fetch routes").await
    }

    pub async fn route_stats(&self) -> anyhow::Result<RouteAndStopCount> {
        let url = self.url(&["routes", "total_routes_and_stops"])?;
        self.send(self.inner.get(url), "fetch route stats").await
    }

    pub async fn comparison(&self, route_id: &str) -> anyhow::Result<RouteComparison> {
        let url = self.url(&["routes", route_id, "comparison"])?;
        self.send(
            self.inner.get(url),
            &format!("fetch comparison for route {route_id}"),
        )
        .await
    }

    pub async fn generate_planned_route(&self, route_id: &str) -> anyhow::Result<PlannedRouteResponse> {
        let url = self.url(&["routes", route_id, "generate", "planned_routes"])?;
        self.send(self.inner.post(url), "generate planned route").await
    }

    pub async fn metrics(&self, route_id: &str) -> anyhow::Result<RouteMetricsResponse> {
        let url = self.url(&["routes", route_id, "metrics"])?;
        self.send(self.inner.get(url), "fetch route metrics").await
    }

    pub async fn health(&self) -> anyhow::Result<HealthResponse> {
        let mut url = self.base.clone();
        url.set_path("/health");
        self.send(self.inner.get(url), "check health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_under_the_api_root() {
        let client = Client::new("http://localhost:8000/api/v1").unwrap();
        let url = client.url(&["routes", "R1", "comparison"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/routes/R1/comparison");

        let client = Client::new("http://localhost:8000/api/v1/").unwrap();
        let url = client.url(&["routes"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/routes");
    }

    #[test]
    fn route_ids_are_escaped() {
        let client = Client::new("http://localhost:8000/api/v1").unwrap();
        let url = client.url(&["routes", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/routes/a%2Fb");
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(Client::new("not a url").is_err());
        assert!(Client::new("mailto:someone@example.com").is_err());
    }
}
