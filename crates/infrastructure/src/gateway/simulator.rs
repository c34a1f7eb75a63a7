use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use orchestrator_core::{GatewayConfig, OrchestratorError, OrchestratorResult};
use orchestrator_domain::{operation, Parameters, ProtocolGateway};
use rand::Rng;
use serde_json::{json, Value};
use tracing::{debug, info};

const DEFAULT_COORDINATES: &str = "12.9716,77.5946";

const KNOWN_LOCATIONS: &[(&str, &str)] = &[
    ("airport", "12.9499,77.6681"),
    ("mg road", "12.9758,77.6096"),
    ("indiranagar", "12.9784,77.6408"),
    ("koramangala", "12.9338,77.6241"),
];

/// 模拟的 Beckn 协议网关
///
/// 按领域构造 Beckn 请求报文（只记录日志，不发送），等待一段模拟延迟后返回
/// 领域相关的响应。search 分配新的交易ID，其余操作回显 `transactionId`。
pub struct SimulatedGateway {
    endpoints: HashMap<String, String>,
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        info!(
            "Simulated gateway initialized with {} endpoints, latency {}ms",
            config.endpoints.len(),
            config.simulated_latency_ms
        );
        Self {
            endpoints: config.endpoints.clone(),
            latency: Duration::from_millis(config.simulated_latency_ms),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn endpoint(&self, domain: &str) -> OrchestratorResult<&str> {
        self.endpoints
            .get(domain)
            .map(String::as_str)
            .ok_or_else(|| OrchestratorError::gateway(format!("Unsupported domain: {domain}")))
    }

    async fn round_trip(&self, domain: &str, action: &str, request: &Value) -> OrchestratorResult<()> {
        let endpoint = self.endpoint(domain)?;
        debug!(
            domain = %domain,
            action = %action,
            "Would send request to {}/{}: {}",
            endpoint,
            action,
            request
        );

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(())
    }

    fn generate_transaction_id() -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut rng = rand::rng();
        let suffix: String = (0..8)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        format!("txn_{}_{}", Utc::now().timestamp_millis(), suffix)
    }

    fn geocode(location: &str) -> &'static str {
        let lowered = location.to_lowercase();
        KNOWN_LOCATIONS
            .iter()
            .find(|(name, _)| lowered.contains(name))
            .map(|(_, coordinates)| *coordinates)
            .unwrap_or(DEFAULT_COORDINATES)
    }

    fn required_transaction_id(action: &str, parameters: &Parameters) -> OrchestratorResult<String> {
        parameters
            .get("transactionId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| OrchestratorError::gateway(format!("{action} requires transactionId")))
    }

    fn envelope(domain: &str, action: &str, transaction_id: &str, message: Value) -> Value {
        json!({
            "context": {
                "domain": domain,
                "action": action,
                "transaction_id": transaction_id,
            },
            "message": message,
        })
    }

    fn search_request(domain: &str, transaction_id: &str, parameters: &Parameters) -> Value {
        let text = |key: &str| Self::text(parameters, key);
        let delivery = parameters
            .get("delivery")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let intent = match domain {
            "mobility" => {
                let start = if text("origin") == "current location" {
                    "use_device_location"
                } else {
                    Self::geocode(text("origin"))
                };
                json!({
                    "fulfillment": {
                        "start": {"location": {"gps": start}},
                        "end": {"location": {"gps": Self::geocode(text("destination"))}},
                    }
                })
            }
            "retail" => json!({
                "item": {"descriptor": {"name": text("product")}},
                "fulfillment": {"type": if delivery { "home-delivery" } else { "store-pickup" }},
            }),
            "food" => {
                let mut intent = json!({
                    "item": {"descriptor": {"name": text("food")}},
                    "fulfillment": {"type": if delivery { "home-delivery" } else { "dine-in" }},
                });
                if let Some(restaurant) = parameters.get("restaurant") {
                    intent["provider"] = json!({"descriptor": {"name": restaurant}});
                }
                intent
            }
            _ => json!({"parameters": parameters}),
        };

        Self::envelope(domain, operation::SEARCH, transaction_id, json!({"intent": intent}))
    }

    fn search_response(domain: &str, transaction_id: &str, parameters: &Parameters) -> Value {
        let service = |id: &str, name: &Value, price: u64, eta: &str| {
            json!({
                "id": id,
                "name": name,
                "price": price,
                "currency": "INR",
                "estimatedTime": eta,
            })
        };

        let options = match domain {
            "mobility" => json!([
                {
                    "provider": "Namma Yatri",
                    "services": [service("ny-auto-1", &json!("Auto Rickshaw"), 150, "15 min")],
                },
                {
                    "provider": "Uber",
                    "services": [
                        service("uber-go-1", &json!("Uber Go"), 250, "12 min"),
                        service("uber-premier-1", &json!("Uber Premier"), 450, "10 min"),
                    ],
                },
                {
                    "provider": "Ola",
                    "services": [service("ola-mini-1", &json!("Ola Mini"), 280, "14 min")],
                },
            ]),
            "retail" => {
                let product = parameters.get("product").cloned().unwrap_or(Value::Null);
                json!([
                    {
                        "provider": "Amazon",
                        "services": [service("amz-product-1", &product, 45999, "2 days")],
                    },
                    {
                        "provider": "Flipkart",
                        "services": [service("flp-product-1", &product, 46999, "3 days")],
                    },
                ])
            }
            "food" => {
                let provider = parameters
                    .get("restaurant")
                    .cloned()
                    .unwrap_or_else(|| json!("Domino's Pizza"));
                let food = parameters
                    .get("food")
                    .cloned()
                    .unwrap_or_else(|| json!("Pepperoni Pizza"));
                json!([
                    {
                        "provider": provider,
                        "services": [service("food-item-1", &food, 450, "30 min")],
                    },
                ])
            }
            _ => json!([]),
        };

        json!({
            "transactionId": transaction_id,
            "options": options,
        })
    }

    fn text<'a>(parameters: &'a Parameters, key: &str) -> &'a str {
        parameters.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn field(parameters: &Parameters, key: &str) -> Value {
        parameters.get(key).cloned().unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ProtocolGateway for SimulatedGateway {
    async fn search(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value> {
        info!(domain = %domain, "Searching");
        self.endpoint(domain)?;

        let transaction_id = Self::generate_transaction_id();
        let request = Self::search_request(domain, &transaction_id, parameters);
        self.round_trip(domain, operation::SEARCH, &request).await?;

        Ok(Self::search_response(domain, &transaction_id, parameters))
    }

    async fn select(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value> {
        info!(domain = %domain, "Selecting");
        self.endpoint(domain)?;
        let transaction_id = Self::required_transaction_id(operation::SELECT, parameters)?;

        let request = Self::envelope(
            domain,
            operation::SELECT,
            &transaction_id,
            json!({"order": {"items": [{"id": Self::field(parameters, "itemId")}]}}),
        );
        self.round_trip(domain, operation::SELECT, &request).await?;

        let price = json!({"value": 300, "currency": "INR"});
        Ok(json!({
            "transactionId": transaction_id,
            "order": {
                "id": format!("order-{}", Utc::now().timestamp_millis()),
                "provider": Self::field(parameters, "provider"),
                "items": [{"id": Self::field(parameters, "itemId"), "price": price}],
                "quote": {
                    "price": price,
                    "breakup": [{"title": "Item Price", "price": price}],
                },
            },
        }))
    }

    async fn init(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value> {
        info!(domain = %domain, "Initializing");
        self.endpoint(domain)?;
        let transaction_id = Self::required_transaction_id(operation::INIT, parameters)?;

        let request = Self::envelope(
            domain,
            operation::INIT,
            &transaction_id,
            json!({
                "order": {
                    "items": Self::field(parameters, "items"),
                    "fulfillment": Self::field(parameters, "fulfillment"),
                    "billing": Self::field(parameters, "billing"),
                }
            }),
        );
        self.round_trip(domain, operation::INIT, &request).await?;

        Ok(json!({
            "transactionId": transaction_id,
            "order": {
                "id": Self::field(parameters, "orderId"),
                "provider": Self::field(parameters, "provider"),
                "items": Self::field(parameters, "items"),
                "fulfillment": Self::field(parameters, "fulfillment"),
                "billing": Self::field(parameters, "billing"),
                "payment": {
                    "uri": "https://payment-gateway.example.com/pay?id=123",
                    "tl_method": "http/get",
                    "params": {
                        "amount": "300.00",
                        "currency": "INR",
                        "transaction_id": transaction_id,
                    },
                },
            },
        }))
    }

    async fn confirm(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value> {
        info!(domain = %domain, "Confirming");
        self.endpoint(domain)?;
        let transaction_id = Self::required_transaction_id(operation::CONFIRM, parameters)?;

        let request = Self::envelope(
            domain,
            operation::CONFIRM,
            &transaction_id,
            json!({
                "order": {
                    "items": Self::field(parameters, "items"),
                    "fulfillment": Self::field(parameters, "fulfillment"),
                    "billing": Self::field(parameters, "billing"),
                    "payment": Self::field(parameters, "payment"),
                }
            }),
        );
        self.round_trip(domain, operation::CONFIRM, &request).await?;

        let mut fulfillment = match parameters.get("fulfillment") {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Parameters::new(),
        };
        fulfillment.insert(
            "state".to_string(),
            json!({"descriptor": {"name": "Order Confirmed"}}),
        );
        fulfillment.insert("tracking".to_string(), json!(true));
        fulfillment.insert(
            "agent".to_string(),
            json!({"name": "Delivery Agent", "phone": "+919876543210"}),
        );

        let mut payment = match parameters.get("payment") {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Parameters::new(),
        };
        payment.insert("status".to_string(), json!("PAID"));

        Ok(json!({
            "transactionId": transaction_id,
            "order": {
                "id": Self::field(parameters, "orderId"),
                "state": "CONFIRMED",
                "provider": Self::field(parameters, "provider"),
                "items": Self::field(parameters, "items"),
                "fulfillment": fulfillment,
                "billing": Self::field(parameters, "billing"),
                "payment": payment,
            },
        }))
    }
}
