use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_salesforce_backend::aggregate::{RecordId, SalesforceBackendId};
use contracts::domain::a002_salesforce_binding::aggregate::{Binding, SalesforceModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::connector::ports::Binder;
use crate::connector::ConnectorError;
use crate::shared::data::db::get_connection;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_salesforce_binding")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub backend_id: String,
    pub model: String,
    pub salesforce_id: String,
    pub erp_id: i64,
    pub shipping_partner_id: Option<i64>,
    pub sync_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Binding {
    type Error = ConnectorError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let model = SalesforceModel::from_code(&m.model).ok_or_else(|| {
            ConnectorError::Storage(format!("Unknown binding model {}", m.model))
        })?;
        let id = Uuid::parse_str(&m.id)
            .map_err(|e| ConnectorError::Storage(format!("Invalid binding id: {}", e)))?;
        let backend_id = Uuid::parse_str(&m.backend_id)
            .map_err(|e| ConnectorError::Storage(format!("Invalid backend id: {}", e)))?;
        Ok(Binding {
            id,
            backend_id: SalesforceBackendId(backend_id),
            model,
            salesforce_id: m.salesforce_id,
            erp_id: m.erp_id,
            shipping_partner_id: m.shipping_partner_id,
            sync_date: m.sync_date,
        })
    }
}

fn storage(e: DbErr) -> ConnectorError {
    ConnectorError::Storage(e.to_string())
}

/// Привязки одного backend в SQLite
pub struct SqliteBinder {
    backend_id: SalesforceBackendId,
    db: DatabaseConnection,
}

impl SqliteBinder {
    pub fn new(backend_id: SalesforceBackendId, db: DatabaseConnection) -> Self {
        Self { backend_id, db }
    }

    fn conn(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn find(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
    ) -> Result<Option<Model>, ConnectorError> {
        Entity::find()
            .filter(Column::BackendId.eq(self.backend_id.value().to_string()))
            .filter(Column::Model.eq(model.code()))
            .filter(Column::SalesforceId.eq(salesforce_id))
            .one(self.conn())
            .await
            .map_err(storage)
    }
}

#[async_trait]
impl Binder for SqliteBinder {
    async fn to_binding(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
    ) -> Result<Option<Binding>, ConnectorError> {
        self.find(model, salesforce_id)
            .await?
            .map(Binding::try_from)
            .transpose()
    }

    async fn bind(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
        erp_id: RecordId,
    ) -> Result<Binding, ConnectorError> {
        let saved = match self.find(model, salesforce_id).await? {
            Some(existing) => {
                let mut active = ActiveModel::from(existing);
                active.erp_id = Set(erp_id);
                active.sync_date = Set(Utc::now());
                active.update(self.conn()).await.map_err(storage)?
            }
            None => {
                let binding =
                    Binding::new(self.backend_id, model, salesforce_id.to_string(), erp_id);
                let active = ActiveModel {
                    id: Set(binding.id.to_string()),
                    backend_id: Set(self.backend_id.value().to_string()),
                    model: Set(model.code().to_string()),
                    salesforce_id: Set(binding.salesforce_id.clone()),
                    erp_id: Set(erp_id),
                    shipping_partner_id: Set(None),
                    sync_date: Set(binding.sync_date),
                };
                active.insert(self.conn()).await.map_err(storage)?
            }
        };
        Binding::try_from(saved)
    }

    async fn set_shipping_partner(
        &self,
        binding_id: Uuid,
        partner_id: Option<RecordId>,
    ) -> Result<(), ConnectorError> {
        use sea_orm::sea_query::Expr;
        Entity::update_many()
            .col_expr(Column::ShippingPartnerId, Expr::value(partner_id))
            .filter(Column::Id.eq(binding_id.to_string()))
            .exec(self.conn())
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn unbind(&self, binding_id: Uuid) -> Result<(), ConnectorError> {
        Entity::delete_by_id(binding_id.to_string())
            .exec(self.conn())
            .await
            .map_err(storage)?;
        Ok(())
    }
}

/// Все привязки backend (для просмотра через API)
pub async fn list_by_backend(backend_id: Uuid) -> anyhow::Result<Vec<Binding>> {
    let rows = Entity::find()
        .filter(Column::BackendId.eq(backend_id.to_string()))
        .all(get_connection())
        .await?;
    rows.into_iter()
        .map(|row| Binding::try_from(row).map_err(anyhow::Error::from))
        .collect()
}
