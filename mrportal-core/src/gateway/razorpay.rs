//! Razorpay Orders API client.

use super::{GatewayError, OrderRequest, PaymentGateway};
use crate::config::{GatewayConfig, Secret};
use async_trait::async_trait;
use mrportal_sdk::objects::payment::{GatewayOrder, GatewayOrderList, OrderListQuery};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the gateway's REST API, authenticated with basic auth.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    client: Client,
    api_base: Url,
    key_id: String,
    key_secret: Secret,
}

#[derive(Debug, Serialize)]
struct ListOrdersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<i64>,
    count: u32,
}

impl RazorpayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.key_id, Some(self.key_secret.expose()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, GatewayError> {
        let response = self.authed(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(operation, status = %status, "Gateway response");

        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            warn!(operation, status = %status, body = %body, "Gateway request failed");
            Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let order: GatewayOrder = self
            .send(
                self.client.post(self.endpoint(&["orders"])).json(request),
                "create_order",
            )
            .await?;
        info!(
            order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            "Gateway order created"
        );
        Ok(order)
    }

    async fn list_orders(&self, query: &OrderListQuery) -> Result<GatewayOrderList, GatewayError> {
        let params = ListOrdersParams {
            from: query.from,
            to: query.to,
            count: query.count_or_default(),
        };
        self.send(
            self.client.get(self.endpoint(&["orders"])).query(&params),
            "list_orders",
        )
        .await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        self.send(
            self.client.get(self.endpoint(&["orders", order_id])),
            "fetch_order",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base: &str) -> RazorpayClient {
        RazorpayClient::new(&GatewayConfig {
            key_id: "rzp_test_key".into(),
            key_secret: Secret::new("secret"),
            api_base: Url::parse(base).unwrap(),
            currency: "INR".into(),
            timeout: Duration::from_secs(5),
            require_order_token: false,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("https://api.razorpay.com/v1/");
        assert_eq!(
            c.endpoint(&["orders"]).as_str(),
            "https://api.razorpay.com/v1/orders"
        );
        assert_eq!(
            c.endpoint(&["orders", "order_ABC"]).as_str(),
            "https://api.razorpay.com/v1/orders/order_ABC"
        );
    }

    #[test]
    fn test_order_id_is_path_escaped() {
        let c = client("https://api.razorpay.com/v1");
        assert_eq!(
            c.endpoint(&["orders", "../payments"]).as_str(),
            "https://api.razorpay.com/v1/orders/..%2Fpayments"
        );
    }
}
