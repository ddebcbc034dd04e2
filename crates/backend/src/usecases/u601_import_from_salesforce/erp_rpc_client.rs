use crate::connector::ports::{Criterion, ErpStore, ProductChange};
use crate::connector::{ConnectorError, FieldMap, RecordId};
use crate::shared::config::ErpConfig;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OnceCell;

/// Клиент ERP по JSON-RPC (`/jsonrpc`, сервисы `common` и `object`)
pub struct ErpRpcClient {
    client: reqwest::Client,
    endpoint: String,
    config: ErpConfig,
    uid: OnceCell<i64>,
    next_id: AtomicU64,
}

impl ErpRpcClient {
    pub fn new(config: &ErpConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/jsonrpc", config.url.trim_end_matches('/')),
            config: config.clone(),
            uid: OnceCell::new(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, ConnectorError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {"service": service, "method": method, "args": args},
            "id": id,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ConnectorError::Erp(format!("Network error for {}: {}", self.endpoint, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Erp(format!("HTTP {}: {}", status, body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ConnectorError::Erp(format!("Invalid JSON-RPC response: {}", e)))?;
        rpc_result(body)
    }

    async fn uid(&self) -> Result<i64, ConnectorError> {
        self.uid
            .get_or_try_init(|| async {
                tracing::info!(
                    "ERP: login {} on database {}",
                    self.config.login,
                    self.config.database
                );
                let result = self
                    .call(
                        "common",
                        "login",
                        json!([self.config.database, self.config.login, self.config.password]),
                    )
                    .await?;
                result.as_i64().ok_or_else(|| {
                    ConnectorError::Erp(format!("Login refused for {}", self.config.login))
                })
            })
            .await
            .copied()
    }

    async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, ConnectorError> {
        let uid = self.uid().await?;
        tracing::debug!("ERP: {}.{}", model, method);
        self.call(
            "object",
            "execute_kw",
            json!([
                self.config.database,
                uid,
                self.config.password,
                model,
                method,
                args,
                kwargs
            ]),
        )
        .await
    }
}

/// `result` ответа или ошибка из объекта `error`
fn rpc_result(body: Value) -> Result<Value, ConnectorError> {
    if let Some(error) = body.get("error") {
        let message = error
            .pointer("/data/message")
            .or_else(|| error.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(ConnectorError::Erp(message.to_string()));
    }
    body.get("result")
        .cloned()
        .ok_or_else(|| ConnectorError::Erp("JSON-RPC response without result".to_string()))
}

fn to_object(values: &FieldMap) -> Value {
    Value::Object(values.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Map<_, _>>())
}

/// Значения onchange-правила: `{"value": {...}}`
fn onchange_values(result: Value) -> FieldMap {
    match result.get("value") {
        Some(Value::Object(values)) => values.clone().into_iter().collect(),
        _ => FieldMap::new(),
    }
}

fn ids_from(result: &Value) -> Result<Vec<RecordId>, ConnectorError> {
    result
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .ok_or_else(|| ConnectorError::Erp(format!("Expected a list of ids, got {}", result)))
}

fn optional_id(id: Option<RecordId>) -> Value {
    id.map(Value::from).unwrap_or(Value::Bool(false))
}

#[async_trait]
impl ErpStore for ErpRpcClient {
    async fn create(&self, model: &str, values: &FieldMap) -> Result<RecordId, ConnectorError> {
        let result = self
            .execute_kw(model, "create", json!([to_object(values)]), json!({}))
            .await?;
        result
            .as_i64()
            .ok_or_else(|| ConnectorError::Erp(format!("{}.create returned {}", model, result)))
    }

    async fn write(
        &self,
        model: &str,
        ids: &[RecordId],
        values: &FieldMap,
    ) -> Result<(), ConnectorError> {
        self.execute_kw(model, "write", json!([ids, to_object(values)]), json!({}))
            .await?;
        Ok(())
    }

    async fn unlink(&self, model: &str, ids: &[RecordId]) -> Result<(), ConnectorError> {
        self.execute_kw(model, "unlink", json!([ids]), json!({}))
            .await?;
        Ok(())
    }

    async fn browse(&self, model: &str, id: RecordId) -> Result<Option<FieldMap>, ConnectorError> {
        let result = self
            .execute_kw(model, "read", json!([[id]]), json!({}))
            .await?;
        match result.as_array().and_then(|rows| rows.first()) {
            Some(Value::Object(row)) => Ok(Some(row.clone().into_iter().collect())),
            _ => Ok(None),
        }
    }

    async fn search(
        &self,
        model: &str,
        criteria: &[Criterion],
    ) -> Result<Vec<RecordId>, ConnectorError> {
        let domain: Vec<Value> = criteria.iter().map(Criterion::to_domain).collect();
        let result = self
            .execute_kw(model, "search", json!([domain]), json!({}))
            .await?;
        ids_from(&result)
    }

    async fn sale_order_onchange_partner(
        &self,
        partner_id: RecordId,
    ) -> Result<FieldMap, ConnectorError> {
        let result = self
            .execute_kw(
                "sale.order",
                "onchange_partner_id",
                json!([[], partner_id]),
                json!({}),
            )
            .await?;
        Ok(onchange_values(result))
    }

    async fn sale_order_line_product_change(
        &self,
        change: &ProductChange,
    ) -> Result<FieldMap, ConnectorError> {
        let result = self
            .execute_kw(
                "sale.order.line",
                "product_id_change",
                json!([[], optional_id(change.pricelist_id), optional_id(change.product_id)]),
                json!({
                    "qty": change.quantity,
                    "partner_id": optional_id(change.partner_id),
                    "date_order": change.date_order.clone().map(Value::from).unwrap_or(Value::Bool(false)),
                    "fiscal_position": optional_id(change.fiscal_position_id),
                }),
            )
            .await?;
        Ok(onchange_values(result))
    }
}
