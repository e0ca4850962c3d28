// src/db/remote_repo.rs

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        gateway::{PgGateway, RowGateway},
        mapping::{self, Row},
        records::RemoteRecord,
    },
};

/// Repositório tipado do backend remoto. Um só para todas as entidades.
#[derive(Clone)]
pub struct RemoteRepository {
    gateway: Arc<dyn RowGateway>,
}

fn row_id(row: &Row, key: &str) -> Option<Uuid> {
    row.get(key)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

impl RemoteRepository {
    pub fn new(gateway: Arc<dyn RowGateway>) -> Self {
        Self { gateway }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(Arc::new(PgGateway::new(pool)))
    }

    // Filhos de um lote de pais, agrupados por pai e por tabela.
    async fn children_for<T: RemoteRecord>(
        &self,
        parent_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, HashMap<&'static str, Vec<Row>>>, AppError> {
        let mut grouped: HashMap<Uuid, HashMap<&'static str, Vec<Row>>> = HashMap::new();
        for child in T::CHILDREN {
            let rows = self
                .gateway
                .select_children(child.table, child.parent_key, parent_ids)
                .await?;
            for row in rows {
                let Some(parent) = row_id(&row, child.parent_key) else {
                    continue;
                };
                grouped
                    .entry(parent)
                    .or_default()
                    .entry(child.table)
                    .or_default()
                    .push(row);
            }
        }
        Ok(grouped)
    }

    pub async fn fetch_all<T: RemoteRecord>(&self) -> Result<Vec<T>, AppError> {
        let rows = self.gateway.select_all(T::TABLE).await?;
        let ids: Vec<Uuid> = rows.iter().filter_map(|r| row_id(r, "id")).collect();
        let mut children = self.children_for::<T>(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let own = row_id(&row, "id")
                    .and_then(|id| children.remove(&id))
                    .unwrap_or_default();
                mapping::from_row(row, own)
            })
            .collect()
    }

    /// Registro inexistente é `Ok(None)`, não erro.
    pub async fn fetch_by_id<T: RemoteRecord>(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let Some(row) = self.gateway.select_by_id(T::TABLE, id).await? else {
            return Ok(None);
        };
        let mut children = self.children_for::<T>(&[id]).await?;
        let own = children.remove(&id).unwrap_or_default();
        mapping::from_row(row, own).map(Some)
    }

    pub async fn insert<T: RemoteRecord>(&self, record: &T) -> Result<(), AppError> {
        let set = mapping::to_row(record)?;
        self.gateway.insert(&set).await
    }

    pub async fn update<T: RemoteRecord>(&self, record: &T) -> Result<(), AppError> {
        let set = mapping::to_row(record)?;
        if !self.gateway.update(record.id(), &set).await? {
            return Err(AppError::not_found(T::NAME, record.id()));
        }
        Ok(())
    }

    pub async fn delete<T: RemoteRecord>(&self, id: Uuid) -> Result<bool, AppError> {
        self.gateway.delete(T::TABLE, id).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryGateway;
    use super::*;
    use crate::models::prospect::{FollowUp, FollowUpType, PipelineStage, Prospect, ServiceType};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn prospect(name: &str, follow_ups: usize) -> Prospect {
        let at = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let owner = Uuid::new_v4();
        Prospect {
            id: Uuid::new_v4(),
            name: name.into(),
            company: None,
            email: "ana@empresa.mx".into(),
            phone: "555".into(),
            address: None,
            stage: PipelineStage::Cotizacion,
            estimated_value: Decimal::from(40000),
            probability: 50,
            salesperson_id: owner,
            service_of_interest: ServiceType::Branding,
            notes: None,
            created_at: at,
            last_updated_at: at,
            follow_ups: (0..follow_ups)
                .map(|i| FollowUp {
                    id: Uuid::new_v4(),
                    kind: FollowUpType::Email,
                    description: format!("seguimiento {i}"),
                    outcome: None,
                    next_follow_up: None,
                    user_id: owner,
                    date: at + Duration::minutes(i as i64),
                })
                .collect(),
            client_id: None,
            loss_reason: None,
        }
    }

    #[tokio::test]
    async fn fetch_by_id_of_unknown_record_is_none() {
        let repo = RemoteRepository::new(Arc::new(MemoryGateway::default()));
        let found: Option<Prospect> = repo.fetch_by_id(Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn children_are_batched_per_parent() {
        let gateway = Arc::new(MemoryGateway::default());
        let repo = RemoteRepository::new(gateway.clone());
        let ana = prospect("Ana", 3);
        let beto = prospect("Beto", 1);
        repo.insert(&ana).await.unwrap();
        repo.insert(&beto).await.unwrap();
        assert_eq!(gateway.count("prospect_follow_ups"), 4);

        let all: Vec<Prospect> = repo.fetch_all().await.unwrap();
        assert_eq!(all, vec![ana.clone(), beto]);

        let one: Prospect = repo.fetch_by_id(ana.id).await.unwrap().unwrap();
        assert_eq!(one.follow_ups.len(), 3);
        assert_eq!(one.follow_ups[2].description, "seguimiento 2");
    }

    #[tokio::test]
    async fn update_rewrites_children() {
        let gateway = Arc::new(MemoryGateway::default());
        let repo = RemoteRepository::new(gateway.clone());
        let mut ana = prospect("Ana", 2);
        repo.insert(&ana).await.unwrap();

        ana.follow_ups.truncate(1);
        ana.stage = PipelineStage::Proceso;
        repo.update(&ana).await.unwrap();

        assert_eq!(gateway.count("prospect_follow_ups"), 1);
        let back: Prospect = repo.fetch_by_id(ana.id).await.unwrap().unwrap();
        assert_eq!(back, ana);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let repo = RemoteRepository::new(Arc::new(MemoryGateway::default()));
        let err = repo.update(&prospect("Ana", 0)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_reports_whether_something_was_removed() {
        let repo = RemoteRepository::new(Arc::new(MemoryGateway::default()));
        let ana = prospect("Ana", 0);
        repo.insert(&ana).await.unwrap();
        assert!(repo.delete::<Prospect>(ana.id).await.unwrap());
        assert!(!repo.delete::<Prospect>(ana.id).await.unwrap());
    }
}
