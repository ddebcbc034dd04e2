use chrono::{DateTime, Utc};
use contracts::domain::a001_salesforce_backend::aggregate::{
    PricelistEntryMapping, ProductMaster, SalesforceBackend, SalesforceBackendId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_salesforce_backend")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub login_url: String,
    pub api_version: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub username: String,
    pub password: String,
    pub security_token: String,
    pub sales_team_id: Option<i64>,
    pub product_master: String,
    pub default_currency: String,
    pub entry_mappings_json: String,
    pub last_sync_json: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn product_master_code(master: ProductMaster) -> &'static str {
    match master {
        ProductMaster::Salesforce => "sf",
        ProductMaster::Erp => "erp",
    }
}

fn parse_product_master(code: &str) -> ProductMaster {
    match code {
        "erp" => ProductMaster::Erp,
        _ => ProductMaster::Salesforce,
    }
}

impl From<Model> for SalesforceBackend {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let entry_mappings: Vec<PricelistEntryMapping> =
            serde_json::from_str(&m.entry_mappings_json).unwrap_or_else(|e| {
                tracing::warn!("Backend {}: invalid entry mappings: {}", m.id, e);
                Vec::new()
            });
        let last_sync: BTreeMap<String, DateTime<Utc>> =
            serde_json::from_str(&m.last_sync_json).unwrap_or_else(|e| {
                tracing::warn!("Backend {}: invalid last sync marks: {}", m.id, e);
                BTreeMap::new()
            });

        SalesforceBackend {
            base: BaseAggregate::with_metadata(
                SalesforceBackendId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            login_url: m.login_url,
            api_version: m.api_version,
            consumer_key: m.consumer_key,
            consumer_secret: m.consumer_secret,
            username: m.username,
            password: m.password,
            security_token: m.security_token,
            sales_team_id: m.sales_team_id,
            product_master: parse_product_master(&m.product_master),
            default_currency: m.default_currency,
            entry_mappings,
            last_sync,
        }
    }
}

fn to_active(aggregate: &SalesforceBackend) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        login_url: Set(aggregate.login_url.clone()),
        api_version: Set(aggregate.api_version.clone()),
        consumer_key: Set(aggregate.consumer_key.clone()),
        consumer_secret: Set(aggregate.consumer_secret.clone()),
        username: Set(aggregate.username.clone()),
        password: Set(aggregate.password.clone()),
        security_token: Set(aggregate.security_token.clone()),
        sales_team_id: Set(aggregate.sales_team_id),
        product_master: Set(product_master_code(aggregate.product_master).to_string()),
        default_currency: Set(aggregate.default_currency.clone()),
        entry_mappings_json: Set(serde_json::to_string(&aggregate.entry_mappings)?),
        last_sync_json: Set(serde_json::to_string(&aggregate.last_sync)?),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    })
}

pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<SalesforceBackend>> {
    let mut items: Vec<SalesforceBackend> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    items.sort_by(|a, b| {
        a.base
            .description
            .to_lowercase()
            .cmp(&b.base.description.to_lowercase())
    });
    Ok(items)
}

/// Удалённые backend не возвращаются
pub async fn get_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> anyhow::Result<Option<SalesforceBackend>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(db: &DatabaseConnection, aggregate: &SalesforceBackend) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate)?.insert(db).await?;
    Ok(uuid)
}

pub async fn update(db: &DatabaseConnection, aggregate: &SalesforceBackend) -> anyhow::Result<()> {
    let mut active = to_active(aggregate)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

/// Сохранить только отметки последней синхронизации
pub async fn update_last_sync(
    db: &DatabaseConnection,
    id: Uuid,
    last_sync: &BTreeMap<String, DateTime<Utc>>,
) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    Entity::update_many()
        .col_expr(Column::LastSyncJson, Expr::value(serde_json::to_string(last_sync)?))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn soft_delete(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
