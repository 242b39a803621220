use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};

use crate::{
    config::VividConfig,
    order_record::fields::{ORDER_ID, STATUS},
    xml::{parse_order_detail, parse_orders, parse_transfer_response, vendor_message},
    OrderRecord,
    OrderStatus,
    TransferRequest,
    TransferResult,
    VividApiError,
    RETRANSFER_STATUS,
};

const GET_ORDERS: &str = "/getOrders";
const GET_RETRANSFER_PENDING: &str = "/getRetransferPendingOrders";
const GET_ORDER: &str = "/getOrder";
const TRANSFER_VIA_URL: &str = "/transferOrderViaURL";

/// The longest slice of an error body that is echoed back in an [`VividApiError::ApiError`].
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone)]
pub struct VividApi {
    config: VividConfig,
    client: Arc<Client>,
}

/// Maps an HTTP status onto the error taxonomy. Only a 200 counts as success.
pub fn check_status(status: u16, body: String) -> Result<String, VividApiError> {
    match status {
        200 => Ok(body),
        429 => Err(VividApiError::RateLimited),
        status => {
            let mut message = body.trim().to_string();
            if message.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY).rev().find(|i| message.is_char_boundary(*i)).unwrap_or(0);
                message.truncate(cut);
                message.push('…');
            }
            if message.is_empty() {
                message = "Check your token or connection.".to_string();
            }
            Err(VividApiError::ApiError { status, message })
        },
    }
}

impl VividApi {
    /// Creates a new client. Fails with [`VividApiError::MissingCredential`] if no API token has been configured, so
    /// nothing is ever sent without one.
    pub fn new(config: VividConfig) -> Result<Self, VividApiError> {
        if !config.has_token() {
            return Err(VividApiError::MissingCredential);
        }
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        let client = Client::builder()
            .user_agent("Vivid Order Porter")
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| VividApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &VividConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    async fn get_xml(&self, path: &str, params: &[(&str, &str)]) -> Result<String, VividApiError> {
        let url = self.url(path);
        trace!("🎫️ GET {url}");
        let token = self.config.api_token.reveal().as_str();
        let mut query = vec![("apiToken", token)];
        query.extend_from_slice(params);
        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        trace!("🎫️ GET {path} returned HTTP {status} ({} bytes)", body.len());
        check_status(status, body)
    }

    /// Fetches the summary records for every order in the given status.
    pub async fn fetch_orders(&self, status: OrderStatus) -> Result<Vec<OrderRecord>, VividApiError> {
        debug!("🎫️ Fetching {status} orders");
        let body = self.get_xml(GET_ORDERS, &[("status", status.as_str())]).await?;
        let orders = parse_orders(&body)?;
        info!("🎫️ Fetched {} {status} orders", orders.len());
        Ok(orders)
    }

    /// Fetches the orders awaiting a retransfer. The endpoint does not report a status, so every record is tagged
    /// with [`RETRANSFER_STATUS`].
    pub async fn fetch_retransfer_pending(&self) -> Result<Vec<OrderRecord>, VividApiError> {
        debug!("🎫️ Fetching orders pending retransfer");
        let body = self.get_xml(GET_RETRANSFER_PENDING, &[]).await?;
        let orders = parse_orders(&body)?
            .into_iter()
            .map(|order| order.with_field(STATUS, RETRANSFER_STATUS))
            .collect::<Vec<OrderRecord>>();
        info!("🎫️ Fetched {} orders pending retransfer", orders.len());
        Ok(orders)
    }

    /// Fetches the full detail for a single order. The returned record always carries the requested order id.
    pub async fn fetch_order_detail(&self, order_id: &str) -> Result<OrderRecord, VividApiError> {
        debug!("🎫️ Fetching detail for order #{order_id}");
        let body = self.get_xml(GET_ORDER, &[("orderId", order_id)]).await?;
        let mut order = parse_order_detail(&body)?;
        if order.order_id().is_none() {
            order.set(ORDER_ID, order_id);
        }
        trace!("🎫️ Order #{order_id} detail has {} fields", order.len());
        Ok(order)
    }

    /// Submits transfer URLs for an order.
    ///
    /// A rate-limit response is an error. Any other rejection by the vendor is reported as an unsuccessful
    /// [`TransferResult`] carrying the vendor's message.
    pub async fn submit_transfer(&self, request: &TransferRequest) -> Result<TransferResult, VividApiError> {
        let urls = request.validate().map_err(VividApiError::InvalidRequest)?;
        let source = if request.transfer_source.is_empty() {
            self.config.transfer_source.as_str()
        } else {
            request.transfer_source.as_str()
        };
        let mut form = vec![
            ("apiToken", self.config.api_token.reveal().as_str()),
            ("orderId", request.order_id.as_str()),
            ("orderToken", request.order_token.as_str()),
        ];
        form.extend(urls.iter().map(|url| ("transferURLList", *url)));
        form.push(("transferSource", source));
        form.push(("transferSourceURL", request.transfer_source_url.as_deref().unwrap_or_default()));
        debug!("🎫️ Submitting {} transfer URL(s) for order #{}", urls.len(), request.order_id);
        let response = self.client.post(self.url(TRANSFER_VIA_URL)).form(&form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let result = match status {
            200 => parse_transfer_response(&body)?,
            429 => return Err(VividApiError::RateLimited),
            status => {
                let message =
                    vendor_message(&body).unwrap_or_else(|| format!("HTTP {status}. Transfer was not accepted."));
                TransferResult { success: false, message }
            },
        };
        if result.success {
            info!("🎫️ Transfer for order #{} accepted: {}", request.order_id, result.message);
        } else {
            warn!("🎫️ Transfer for order #{} rejected: {}", request.order_id, result.message);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(check_status(200, "<orders/>".into()).unwrap(), "<orders/>");
        assert!(matches!(check_status(429, "slow down".into()), Err(VividApiError::RateLimited)));
        match check_status(401, "".into()) {
            Err(VividApiError::ApiError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Check your token or connection.");
            },
            other => panic!("Unexpected result: {other:?}"),
        }
        // Anything other than exactly 200 is an error, including other 2xx codes
        assert!(matches!(check_status(204, "".into()), Err(VividApiError::ApiError { status: 204, .. })));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "é".repeat(500);
        match check_status(500, body) {
            Err(VividApiError::ApiError { message, .. }) => assert!(message.len() <= MAX_ERROR_BODY + 3),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn no_token_no_client() {
        let config = VividConfig::default();
        assert!(matches!(VividApi::new(config), Err(VividApiError::MissingCredential)));
        let config = VividConfig::default().with_token("  ");
        assert!(matches!(VividApi::new(config), Err(VividApiError::MissingCredential)));
    }

    #[test]
    fn urls() {
        let config = VividConfig::default().with_token("t").with_api_url("http://localhost:9999/v1/");
        let api = VividApi::new(config).unwrap();
        assert_eq!(api.url(GET_ORDERS), "http://localhost:9999/v1/getOrders");
    }
}
