// src/services/console_service.rs

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    common::{clock::Clock, error::AppError},
    db::{RemoteRecord, RemoteRepository},
    models::{
        client::{Client, NewClient},
        finance::{
            Commission, CommissionState, NewCommission, NewRecurringService, NewServicePayment,
            NewTransaction, RecurringService, RecurringState, Transaction,
        },
        marketing::{
            Campaign, CampaignState, Content, Lead, LeadState, NewCampaign, NewContent, NewLead,
            NewPackage, Package,
        },
        project::{AccessCredential, NewProject, Project, ProjectPatch},
        prospect::{FollowUp, NewFollowUp, NewProspect, PipelineStage, Prospect, ProspectPatch},
        quote::{NewQuote, Quote, QuoteState},
        support::{NewTicket, NewTicketReply, Ticket, TicketStatus},
        user::User,
    },
    services::pipeline::StageChange,
    store::{ConsoleStore, Conversion, Entity, LocalStorage, StoreOptions, Stored},
};

/// Fachada assíncrona do console, compartilhada pelos handlers.
///
/// Cada comando aplica a mudança no store, espelha no backend remoto (se houver)
/// e grava o snapshot local. Se o remoto falhar, a mudança local é desfeita e o
/// erro sobe para quem chamou.
#[derive(Clone)]
pub struct ConsoleService {
    store: Arc<RwLock<ConsoleStore>>,
    remote: Option<RemoteRepository>,
    storage: Option<LocalStorage>,
    // snapshot + gravação acontecem um de cada vez
    save_lock: Arc<Mutex<()>>,
}

impl ConsoleService {
    pub fn new(
        store: ConsoleStore,
        remote: Option<RemoteRepository>,
        storage: Option<LocalStorage>,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            remote,
            storage,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Monta o store: snapshot local primeiro, depois o conteúdo remoto por cima.
    pub async fn bootstrap(
        clock: Arc<dyn Clock>,
        options: StoreOptions,
        remote: Option<RemoteRepository>,
        storage: Option<LocalStorage>,
    ) -> Result<Self, AppError> {
        let mut store = ConsoleStore::new(clock, options);

        if let Some(storage) = &storage {
            let reader = storage.clone();
            let loaded = tokio::task::spawn_blocking(move || reader.load())
                .await
                .map_err(anyhow::Error::from)??;
            match loaded {
                Some(state) => {
                    store.restore(state);
                    tracing::info!("✅ Snapshot local carregado de {}", storage.path().display());
                }
                None => tracing::info!("Nenhum snapshot em {}, começando vazio", storage.path().display()),
            }
        }

        if let Some(remote) = &remote {
            store.replace_all(remote.fetch_all::<Client>().await?);
            store.replace_all(remote.fetch_all::<Prospect>().await?);
            store.replace_all(remote.fetch_all::<Project>().await?);
            store.replace_all(remote.fetch_all::<Ticket>().await?);
            store.replace_all(remote.fetch_all::<Campaign>().await?);
            store.replace_all(remote.fetch_all::<Transaction>().await?);
            store.replace_all(remote.fetch_all::<Package>().await?);
            store.replace_all(remote.fetch_all::<RecurringService>().await?);
            store.replace_all(remote.fetch_all::<Content>().await?);
            store.replace_all(remote.fetch_all::<Quote>().await?);
            store.replace_all(remote.fetch_all::<Lead>().await?);
            store.replace_all(remote.fetch_all::<Commission>().await?);
            tracing::info!("✅ Coleções sincronizadas com o backend remoto");
        }

        Ok(Self::new(store, remote, storage))
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list<T: Stored>(&self) -> Vec<T> {
        self.store.read().await.all::<T>().to_vec()
    }

    /// `None` quando não existe.
    pub async fn get<T: Stored>(&self, id: Uuid) -> Option<T> {
        self.store.read().await.get::<T>(id).cloned()
    }

    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        self.get::<User>(id).await
    }

    /// Leitura livre sobre o store (métricas, visões agregadas).
    pub async fn read<R>(&self, f: impl FnOnce(&ConsoleStore) -> R) -> R {
        let store = self.store.read().await;
        f(&*store)
    }

    // =========================================================================
    //  ESPELHAMENTO + DESFAZER
    // =========================================================================

    async fn persist(&self) {
        let Some(storage) = self.storage.clone() else {
            return;
        };
        // Tirado já com a trava: uma gravação nunca sobrescreve outra mais nova.
        let _guard = self.save_lock.lock().await;
        let snapshot = self.store.read().await.snapshot();
        match tokio::task::spawn_blocking(move || storage.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Falha ao gravar o snapshot local: {:?}", e),
            Err(e) => tracing::error!("Tarefa de gravação do snapshot abortada: {:?}", e),
        }
    }

    async fn created<T: RemoteRecord + Stored>(&self, record: T) -> Result<T, AppError> {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.insert(&record).await {
                tracing::warn!("Backend remoto recusou {} {}: desfazendo", T::NAME, record.id());
                let _ = self.store.write().await.delete::<T>(record.id());
                return Err(e);
            }
        }
        tracing::info!("{} {} criado", T::NAME, record.id());
        self.persist().await;
        Ok(record)
    }

    /// Aplica `apply` sobre o registro `id` e espelha o resultado.
    async fn edit<T, R, F>(&self, id: Uuid, apply: F) -> Result<R, AppError>
    where
        T: RemoteRecord + Stored + PartialEq,
        F: FnOnce(&mut ConsoleStore) -> Result<R, AppError>,
    {
        let (before, after, result) = {
            let mut store = self.store.write().await;
            let before = store
                .get::<T>(id)
                .cloned()
                .ok_or_else(|| AppError::not_found(T::NAME, id))?;
            let result = apply(&mut *store)?;
            let after = store
                .get::<T>(id)
                .cloned()
                .ok_or_else(|| AppError::not_found(T::NAME, id))?;
            (before, after, result)
        };

        if before == after {
            return Ok(result);
        }

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.update(&after).await {
                tracing::warn!("Backend remoto recusou a edição de {} {}: desfazendo", T::NAME, id);
                self.store.write().await.put(before);
                return Err(e);
            }
        }
        self.persist().await;
        Ok(result)
    }

    /// Remove sem cascata. Devolve o registro removido.
    pub async fn delete<T: RemoteRecord + Stored>(&self, id: Uuid) -> Result<T, AppError> {
        let removed = self.store.write().await.delete::<T>(id)?;
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete::<T>(id).await {
                tracing::warn!("Backend remoto recusou a remoção de {} {}: desfazendo", T::NAME, id);
                self.store.write().await.put(removed);
                return Err(e);
            }
        }
        tracing::info!("{} {} removido", T::NAME, id);
        self.persist().await;
        Ok(removed)
    }

    // =========================================================================
    //  FUNIL
    // =========================================================================

    pub async fn create_prospect(&self, input: NewProspect) -> Result<Prospect, AppError> {
        let prospect = self.store.write().await.create_prospect(input)?;
        self.created(prospect).await
    }

    pub async fn update_prospect(&self, id: Uuid, patch: ProspectPatch) -> Result<Prospect, AppError> {
        self.edit::<Prospect, _, _>(id, move |store| store.update_prospect(id, patch))
            .await
    }

    pub async fn move_prospect(
        &self,
        id: Uuid,
        stage: PipelineStage,
    ) -> Result<(StageChange, Prospect), AppError> {
        let outcome = self
            .edit::<Prospect, _, _>(id, move |store| store.move_prospect(id, stage))
            .await?;
        if let StageChange::Moved { from, to } = outcome.0 {
            tracing::info!("Prospecto {} movido de {} para {}", id, from.as_str(), to.as_str());
        }
        Ok(outcome)
    }

    pub async fn add_follow_up(
        &self,
        id: Uuid,
        input: NewFollowUp,
        user_id: Uuid,
    ) -> Result<(FollowUp, Prospect), AppError> {
        self.edit::<Prospect, _, _>(id, move |store| store.add_follow_up(id, input, user_id))
            .await
    }

    /// Conversão mexe em dois registros: cria o cliente e fecha o prospecto.
    pub async fn convert_prospect(&self, id: Uuid) -> Result<Conversion, AppError> {
        let (before, conversion) = {
            let mut store = self.store.write().await;
            let before = store
                .get::<Prospect>(id)
                .cloned()
                .ok_or_else(|| AppError::not_found(Prospect::NAME, id))?;
            (before, store.convert_prospect(id)?)
        };
        if !conversion.created {
            return Ok(conversion);
        }

        if let Some(remote) = &self.remote {
            let client_id = conversion.client.id;
            let mirrored = match remote.insert(&conversion.client).await {
                Ok(()) => match remote.update(&conversion.prospect).await {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        if let Err(undo) = remote.delete::<Client>(client_id).await {
                            tracing::error!(
                                "Cliente {} ficou órfão no backend remoto (prospecto {}): {:?}",
                                client_id,
                                id,
                                undo
                            );
                        }
                        Err(e)
                    }
                },
                Err(e) => Err(e),
            };
            if let Err(e) = mirrored {
                tracing::warn!("Backend remoto recusou a conversão do prospecto {}: desfazendo", id);
                let mut store = self.store.write().await;
                if let Err(undo) = store.delete::<Client>(client_id) {
                    tracing::error!("Falha ao desfazer o cliente {} localmente: {:?}", client_id, undo);
                }
                store.put(before);
                return Err(e);
            }
        }

        tracing::info!("Prospecto {} convertido no cliente {}", id, conversion.client.id);
        self.persist().await;
        Ok(conversion)
    }

    // =========================================================================
    //  CLIENTES E COTIZAÇÕES
    // =========================================================================

    pub async fn create_client(&self, input: NewClient) -> Result<Client, AppError> {
        let client = self.store.write().await.create_client(input)?;
        self.created(client).await
    }

    pub async fn create_quote(&self, input: NewQuote, created_by: Uuid) -> Result<Quote, AppError> {
        let quote = self.store.write().await.create_quote(input, created_by)?;
        self.created(quote).await
    }

    pub async fn set_quote_state(&self, id: Uuid, state: QuoteState) -> Result<Quote, AppError> {
        self.edit::<Quote, _, _>(id, move |store| store.set_quote_state(id, state))
            .await
    }

    // =========================================================================
    //  PROJETOS E TICKETS
    // =========================================================================

    pub async fn create_project(&self, input: NewProject) -> Result<Project, AppError> {
        let project = self.store.write().await.create_project(input)?;
        self.created(project).await
    }

    pub async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, AppError> {
        self.edit::<Project, _, _>(id, move |store| store.update_project(id, patch))
            .await
    }

    pub async fn toggle_task(&self, project_id: Uuid, task_id: Uuid) -> Result<Project, AppError> {
        self.edit::<Project, _, _>(project_id, move |store| store.toggle_task(project_id, task_id))
            .await
    }

    pub async fn add_project_file(
        &self,
        project_id: Uuid,
        name: String,
        url: String,
    ) -> Result<Project, AppError> {
        self.edit::<Project, _, _>(project_id, move |store| {
            store.add_project_file(project_id, name, url)
        })
        .await
    }

    pub async fn add_project_access(
        &self,
        project_id: Uuid,
        access: AccessCredential,
    ) -> Result<Project, AppError> {
        self.edit::<Project, _, _>(project_id, move |store| {
            store.add_project_access(project_id, access)
        })
        .await
    }

    pub async fn create_ticket(&self, input: NewTicket) -> Result<Ticket, AppError> {
        let ticket = self.store.write().await.create_ticket(input)?;
        self.created(ticket).await
    }

    pub async fn reply_ticket(
        &self,
        id: Uuid,
        input: NewTicketReply,
        author_id: Option<Uuid>,
    ) -> Result<Ticket, AppError> {
        self.edit::<Ticket, _, _>(id, move |store| store.reply_ticket(id, input, author_id))
            .await
    }

    pub async fn set_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<Ticket, AppError> {
        self.edit::<Ticket, _, _>(id, move |store| store.set_ticket_status(id, status))
            .await
    }

    // =========================================================================
    //  FINANCEIRO E COMISSÕES
    // =========================================================================

    pub async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction, AppError> {
        let transaction = self.store.write().await.create_transaction(input)?;
        self.created(transaction).await
    }

    pub async fn create_recurring_service(
        &self,
        input: NewRecurringService,
    ) -> Result<RecurringService, AppError> {
        let service = self.store.write().await.create_recurring_service(input)?;
        self.created(service).await
    }

    pub async fn record_service_payment(
        &self,
        id: Uuid,
        input: NewServicePayment,
    ) -> Result<RecurringService, AppError> {
        self.edit::<RecurringService, _, _>(id, move |store| store.record_service_payment(id, input))
            .await
    }

    pub async fn set_recurring_state(
        &self,
        id: Uuid,
        state: RecurringState,
    ) -> Result<RecurringService, AppError> {
        self.edit::<RecurringService, _, _>(id, move |store| store.set_recurring_state(id, state))
            .await
    }

    pub async fn create_commission(&self, input: NewCommission) -> Result<Commission, AppError> {
        let commission = self.store.write().await.create_commission(input)?;
        self.created(commission).await
    }

    pub async fn commission_for_project(&self, project_id: Uuid) -> Result<Commission, AppError> {
        let commission = self.store.write().await.commission_for_project(project_id)?;
        self.created(commission).await
    }

    pub async fn advance_commission(
        &self,
        id: Uuid,
        next: CommissionState,
    ) -> Result<Commission, AppError> {
        self.edit::<Commission, _, _>(id, move |store| store.advance_commission(id, next))
            .await
    }

    // =========================================================================
    //  MARKETING
    // =========================================================================

    pub async fn create_campaign(&self, input: NewCampaign) -> Result<Campaign, AppError> {
        let campaign = self.store.write().await.create_campaign(input)?;
        self.created(campaign).await
    }

    pub async fn set_campaign_state(&self, id: Uuid, state: CampaignState) -> Result<Campaign, AppError> {
        self.edit::<Campaign, _, _>(id, move |store| store.set_campaign_state(id, state))
            .await
    }

    pub async fn create_lead(&self, input: NewLead) -> Result<Lead, AppError> {
        let lead = self.store.write().await.create_lead(input)?;
        self.created(lead).await
    }

    pub async fn set_lead_state(&self, id: Uuid, state: LeadState) -> Result<Lead, AppError> {
        self.edit::<Lead, _, _>(id, move |store| store.set_lead_state(id, state))
            .await
    }

    pub async fn create_package(&self, input: NewPackage) -> Result<Package, AppError> {
        let package = self.store.write().await.create_package(input)?;
        self.created(package).await
    }

    pub async fn create_content(&self, input: NewContent) -> Result<Content, AppError> {
        let content = self.store.write().await.create_content(input)?;
        self.created(content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::clock::ManualClock,
        db::remote_repo::testing::MemoryGateway,
        models::prospect::ServiceType,
        store::seed::SALES_DIEGO_ID,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()))
    }

    fn ana() -> NewProspect {
        NewProspect {
            name: "Ana".into(),
            company: Some("Café Ana".into()),
            email: "ana@cafe.mx".into(),
            phone: "5551234567".into(),
            address: None,
            stage: Some(PipelineStage::Cotizacion),
            estimated_value: Decimal::from(40000),
            probability: 50,
            salesperson_id: SALES_DIEGO_ID,
            service_of_interest: ServiceType::TiendaOnline,
            notes: None,
        }
    }

    fn service_with(gateway: Arc<MemoryGateway>) -> ConsoleService {
        let store = ConsoleStore::new(clock(), StoreOptions::default());
        ConsoleService::new(store, Some(RemoteRepository::new(gateway)), None)
    }

    #[tokio::test]
    async fn remote_failure_undoes_a_create() {
        let gateway = Arc::new(MemoryGateway::failing());
        let service = service_with(gateway);

        let err = service.create_prospect(ana()).await.unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
        assert!(service.list::<Prospect>().await.is_empty());
    }

    #[tokio::test]
    async fn remote_failure_undoes_an_edit() {
        let gateway = Arc::new(MemoryGateway::default());
        let service = service_with(gateway.clone());
        let prospect = service.create_prospect(ana()).await.unwrap();

        gateway.fail_writes.store(true, Ordering::SeqCst);
        let result = service.move_prospect(prospect.id, PipelineStage::Proceso).await;

        assert!(result.is_err());
        let stored = service.get::<Prospect>(prospect.id).await.unwrap();
        assert_eq!(stored, prospect);
    }

    #[tokio::test]
    async fn remote_failure_undoes_a_delete() {
        let gateway = Arc::new(MemoryGateway::default());
        let service = service_with(gateway.clone());
        let prospect = service.create_prospect(ana()).await.unwrap();

        gateway.fail_writes.store(true, Ordering::SeqCst);
        assert!(service.delete::<Prospect>(prospect.id).await.is_err());
        assert!(service.get::<Prospect>(prospect.id).await.is_some());
    }

    #[tokio::test]
    async fn remote_failure_undoes_a_conversion() {
        let gateway = Arc::new(MemoryGateway::default());
        let service = service_with(gateway.clone());
        let prospect = service.create_prospect(ana()).await.unwrap();

        gateway.fail_writes.store(true, Ordering::SeqCst);
        assert!(service.convert_prospect(prospect.id).await.is_err());

        assert!(service.list::<Client>().await.is_empty());
        let stored = service.get::<Prospect>(prospect.id).await.unwrap();
        assert!(stored.client_id.is_none());
        assert_eq!(stored.stage, PipelineStage::Cotizacion);
    }

    #[tokio::test]
    async fn failed_conversion_leaves_local_state_clean_when_remote_undo_fails() {
        let gateway = Arc::new(MemoryGateway::default());
        let service = service_with(gateway.clone());
        let prospect = service.create_prospect(ana()).await.unwrap();

        // o insert do cliente passa; o update do prospecto e a remoção falham
        gateway.fail_after(1);
        assert!(service.convert_prospect(prospect.id).await.is_err());

        assert!(service.list::<Client>().await.is_empty());
        let stored = service.get::<Prospect>(prospect.id).await.unwrap();
        assert_eq!(stored, prospect);
        assert_eq!(gateway.count("clients"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_commands_all_reach_the_snapshot() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "console");
        let service = ConsoleService::bootstrap(clock(), StoreOptions::default(), None, Some(storage.clone()))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    let mut input = ana();
                    input.name = format!("Ana {i}");
                    service.create_prospect(input).await.unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let reloaded = ConsoleService::bootstrap(clock(), StoreOptions::default(), None, Some(storage))
            .await
            .unwrap();
        assert_eq!(reloaded.list::<Prospect>().await.len(), 16);
    }

    #[tokio::test]
    async fn conversion_is_mirrored_remotely() {
        let gateway = Arc::new(MemoryGateway::default());
        let service = service_with(gateway.clone());
        let prospect = service.create_prospect(ana()).await.unwrap();

        let conversion = service.convert_prospect(prospect.id).await.unwrap();

        assert_eq!(gateway.count("clients"), 1);
        let repo = RemoteRepository::new(gateway);
        let remote: Prospect = repo.fetch_by_id(prospect.id).await.unwrap().unwrap();
        assert_eq!(remote.client_id, Some(conversion.client.id));
    }

    #[tokio::test]
    async fn same_stage_drop_skips_the_remote() {
        let gateway = Arc::new(MemoryGateway::default());
        let service = service_with(gateway.clone());
        let prospect = service.create_prospect(ana()).await.unwrap();

        // um no-op não pode falhar mesmo com o remoto fora do ar
        gateway.fail_writes.store(true, Ordering::SeqCst);
        let (change, _) = service
            .move_prospect(prospect.id, PipelineStage::Cotizacion)
            .await
            .unwrap();
        assert_eq!(change, StageChange::Unchanged);
    }

    #[tokio::test]
    async fn snapshot_survives_a_restart() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "console");

        let first = ConsoleService::bootstrap(clock(), StoreOptions::default(), None, Some(storage.clone()))
            .await
            .unwrap();
        let prospect = first.create_prospect(ana()).await.unwrap();

        let second = ConsoleService::bootstrap(clock(), StoreOptions::default(), None, Some(storage))
            .await
            .unwrap();
        assert_eq!(second.get::<Prospect>(prospect.id).await, Some(prospect));
        assert!(second.find_user(SALES_DIEGO_ID).await.is_some());
    }

    #[tokio::test]
    async fn bootstrap_prefers_remote_contents() {
        let gateway = Arc::new(MemoryGateway::default());
        let seeded = service_with(gateway.clone());
        let prospect = seeded.create_prospect(ana()).await.unwrap();

        let fresh = ConsoleService::bootstrap(
            clock(),
            StoreOptions::default(),
            Some(RemoteRepository::new(gateway)),
            None,
        )
        .await
        .unwrap();

        assert_eq!(fresh.list::<Prospect>().await, vec![prospect]);
    }
}
