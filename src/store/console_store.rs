// src/store/console_store.rs

use std::sync::Arc;

use chrono::Datelike;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{clock::Clock, error::AppError},
    models::{
        client::{Client, ClientView, NewClient},
        finance::{
            Commission, CommissionState, NewCommission, NewRecurringService, NewServicePayment,
            NewTransaction, RecurringService, RecurringState, ServicePayment, Transaction,
        },
        marketing::{
            Campaign, CampaignState, Content, ContentState, Lead, LeadState, NewCampaign, NewContent,
            NewLead, NewPackage, Package,
        },
        project::{AccessCredential, ChecklistTask, NewProject, Project, ProjectFile, ProjectPatch, ProjectStatus},
        prospect::{FollowUp, NewFollowUp, NewProspect, PipelineStage, Prospect, ProspectPatch},
        quote::{NewLineItem, NewQuote, Quote, QuoteState},
        support::{NewTicket, NewTicketReply, Ticket, TicketReply, TicketStatus},
        user::User,
        validation::clamp_percent,
    },
    services::{
        metrics::{self, DEFAULT_COMMISSION_PERCENT},
        pipeline::{self, ConversionPolicy, StageChange},
    },
    store::{
        collection::{Collection, Entity},
        numbering::{next_number, QUOTE_PREFIX, TICKET_PREFIX},
        persist::PersistedState,
        seed::sample_users,
    },
};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub default_country: String,
    pub conversion_policy: ConversionPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_country: "México".to_string(),
            conversion_policy: ConversionPolicy::default(),
        }
    }
}

/// Resultado de "converter em cliente".
#[derive(Debug, Clone)]
pub struct Conversion {
    pub client: Client,
    pub prospect: Prospect,
    /// `false` quando a política idempotente devolveu o cliente existente.
    pub created: bool,
}

fn amount_overflow() -> AppError {
    AppError::InvalidInput("Os valores da cotização excedem o limite numérico.".to_string())
}

/// O contêiner de estado do console. Não é global: quem precisa recebe uma instância.
pub struct ConsoleStore {
    clock: Arc<dyn Clock>,
    options: StoreOptions,

    users: Collection<User>,
    prospects: Collection<Prospect>,
    clients: Collection<Client>,
    quotes: Collection<Quote>,
    projects: Collection<Project>,
    campaigns: Collection<Campaign>,
    leads: Collection<Lead>,
    tickets: Collection<Ticket>,
    recurring_services: Collection<RecurringService>,
    transactions: Collection<Transaction>,
    commissions: Collection<Commission>,
    packages: Collection<Package>,
    contents: Collection<Content>,
}

/// Liga um tipo de entidade à sua coleção dentro do store.
pub trait Stored: Entity + Sized {
    fn collection(store: &ConsoleStore) -> &Collection<Self>;
    fn collection_mut(store: &mut ConsoleStore) -> &mut Collection<Self>;
}

macro_rules! stored {
    ($($ty:ty => $field:ident, $name:literal;)*) => {
        $(
            impl Entity for $ty {
                const NAME: &'static str = $name;
                fn id(&self) -> Uuid {
                    self.id
                }
            }

            impl Stored for $ty {
                fn collection(store: &ConsoleStore) -> &Collection<Self> {
                    &store.$field
                }
                fn collection_mut(store: &mut ConsoleStore) -> &mut Collection<Self> {
                    &mut store.$field
                }
            }
        )*
    };
}

stored! {
    User => users, "Usuário";
    Prospect => prospects, "Prospecto";
    Client => clients, "Cliente";
    Quote => quotes, "Cotização";
    Project => projects, "Projeto";
    Campaign => campaigns, "Campanha";
    Lead => leads, "Lead";
    Ticket => tickets, "Ticket";
    RecurringService => recurring_services, "Serviço recorrente";
    Transaction => transactions, "Transação";
    Commission => commissions, "Comissão";
    Package => packages, "Pacote";
    Content => contents, "Conteúdo";
}

impl ConsoleStore {
    pub fn new(clock: Arc<dyn Clock>, options: StoreOptions) -> Self {
        let users = Collection::from_vec(sample_users(clock.now()));
        Self {
            clock,
            options,
            users,
            prospects: Collection::new(),
            clients: Collection::new(),
            quotes: Collection::new(),
            projects: Collection::new(),
            campaigns: Collection::new(),
            leads: Collection::new(),
            tickets: Collection::new(),
            recurring_services: Collection::new(),
            transactions: Collection::new(),
            commissions: Collection::new(),
            packages: Collection::new(),
            contents: Collection::new(),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    // =========================================================================
    //  ACESSO GENÉRICO
    // =========================================================================

    pub fn all<T: Stored>(&self) -> &[T] {
        T::collection(self).all()
    }

    pub fn get<T: Stored>(&self, id: Uuid) -> Option<&T> {
        T::collection(self).get(id)
    }

    fn require<T: Stored>(&self, id: Uuid) -> Result<&T, AppError> {
        self.get::<T>(id).ok_or_else(|| AppError::not_found(T::NAME, id))
    }

    fn require_mut<T: Stored>(&mut self, id: Uuid) -> Result<&mut T, AppError> {
        T::collection_mut(self)
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(T::NAME, id))
    }

    /// Remove sem cascata: referências de outros registros ficam órfãs.
    pub fn delete<T: Stored>(&mut self, id: Uuid) -> Result<T, AppError> {
        T::collection_mut(self)
            .remove(id)
            .ok_or_else(|| AppError::not_found(T::NAME, id))
    }

    /// Usado pelo desfazer do serviço quando o backend remoto falha.
    pub fn put<T: Stored>(&mut self, record: T) -> Option<T> {
        T::collection_mut(self).replace(record)
    }

    pub fn replace_all<T: Stored>(&mut self, records: Vec<T>) {
        *T::collection_mut(self) = Collection::from_vec(records);
    }

    // =========================================================================
    //  SNAPSHOT
    // =========================================================================

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            clients: self.clients.all().to_vec(),
            prospects: self.prospects.all().to_vec(),
            projects: self.projects.all().to_vec(),
            tickets: self.tickets.all().to_vec(),
            campaigns: self.campaigns.all().to_vec(),
            transactions: self.transactions.all().to_vec(),
            packages: self.packages.all().to_vec(),
            recurring_services: self.recurring_services.all().to_vec(),
            contents: self.contents.all().to_vec(),
            quotes: self.quotes.all().to_vec(),
            leads: self.leads.all().to_vec(),
            commissions: self.commissions.all().to_vec(),
        }
    }

    /// Usuários não são tocados.
    pub fn restore(&mut self, state: PersistedState) {
        self.clients = Collection::from_vec(state.clients);
        self.prospects = Collection::from_vec(state.prospects);
        self.projects = Collection::from_vec(state.projects);
        self.tickets = Collection::from_vec(state.tickets);
        self.campaigns = Collection::from_vec(state.campaigns);
        self.transactions = Collection::from_vec(state.transactions);
        self.packages = Collection::from_vec(state.packages);
        self.recurring_services = Collection::from_vec(state.recurring_services);
        self.contents = Collection::from_vec(state.contents);
        self.quotes = Collection::from_vec(state.quotes);
        self.leads = Collection::from_vec(state.leads);
        self.commissions = Collection::from_vec(state.commissions);
    }

    // =========================================================================
    //  PROSPECTOS / FUNIL
    // =========================================================================

    pub fn create_prospect(&mut self, input: NewProspect) -> Result<Prospect, AppError> {
        input.validate()?;
        let now = self.now();
        let prospect = Prospect {
            id: Uuid::new_v4(),
            name: input.name,
            company: input.company,
            email: input.email,
            phone: input.phone,
            address: input.address,
            stage: input.stage.unwrap_or(PipelineStage::Contacto),
            estimated_value: input.estimated_value,
            probability: clamp_percent(input.probability),
            salesperson_id: input.salesperson_id,
            service_of_interest: input.service_of_interest,
            notes: input.notes,
            created_at: now,
            last_updated_at: now,
            follow_ups: Vec::new(),
            client_id: None,
            loss_reason: None,
        };
        self.prospects.insert(prospect.clone());
        Ok(prospect)
    }

    pub fn update_prospect(&mut self, id: Uuid, patch: ProspectPatch) -> Result<Prospect, AppError> {
        patch.validate()?;
        let now = self.now();
        let prospect = self.require_mut::<Prospect>(id)?;

        if let Some(stage) = patch.stage {
            pipeline::apply_stage_change(prospect, stage, now);
        }
        if let Some(name) = patch.name {
            prospect.name = name;
        }
        if let Some(company) = patch.company {
            prospect.company = Some(company);
        }
        if let Some(email) = patch.email {
            prospect.email = email;
        }
        if let Some(phone) = patch.phone {
            prospect.phone = phone;
        }
        if let Some(address) = patch.address {
            prospect.address = Some(address);
        }
        if let Some(value) = patch.estimated_value {
            prospect.estimated_value = value;
        }
        if let Some(probability) = patch.probability {
            prospect.probability = clamp_percent(probability);
        }
        if let Some(owner) = patch.salesperson_id {
            prospect.salesperson_id = owner;
        }
        if let Some(service) = patch.service_of_interest {
            prospect.service_of_interest = service;
        }
        if let Some(notes) = patch.notes {
            prospect.notes = Some(notes);
        }
        if let Some(reason) = patch.loss_reason {
            // string vazia reabre a oportunidade
            prospect.loss_reason = if reason.trim().is_empty() { None } else { Some(reason) };
        }
        pipeline::touch(prospect, now);
        Ok(prospect.clone())
    }

    /// Soltar no quadro. Mesma etapa = nada acontece.
    pub fn move_prospect(
        &mut self,
        id: Uuid,
        stage: PipelineStage,
    ) -> Result<(StageChange, Prospect), AppError> {
        let now = self.now();
        let prospect = self.require_mut::<Prospect>(id)?;
        let change = pipeline::apply_stage_change(prospect, stage, now);
        Ok((change, prospect.clone()))
    }

    pub fn add_follow_up(
        &mut self,
        id: Uuid,
        input: NewFollowUp,
        user_id: Uuid,
    ) -> Result<(FollowUp, Prospect), AppError> {
        input.validate()?;
        let now = self.now();
        let prospect = self.require_mut::<Prospect>(id)?;
        let entry = pipeline::append_follow_up(prospect, input, user_id, now);
        Ok((entry, prospect.clone()))
    }

    pub fn convert_prospect(&mut self, id: Uuid) -> Result<Conversion, AppError> {
        let now = self.now();
        let prospect = self.require::<Prospect>(id)?.clone();

        if let Some(existing_id) = prospect.client_id {
            match self.options.conversion_policy {
                ConversionPolicy::Repeat => {}
                ConversionPolicy::Reject => return Err(AppError::AlreadyConverted(id)),
                ConversionPolicy::Idempotent => {
                    // se o cliente sumiu (apagado), converte de novo
                    if let Some(client) = self.get::<Client>(existing_id) {
                        return Ok(Conversion {
                            client: client.clone(),
                            prospect,
                            created: false,
                        });
                    }
                }
            }
        }

        let client = pipeline::client_from_prospect(
            &prospect,
            Uuid::new_v4(),
            &self.options.default_country,
            now,
        );
        self.clients.insert(client.clone());

        let prospect = self.require_mut::<Prospect>(id)?;
        pipeline::mark_converted(prospect, client.id, now);

        Ok(Conversion {
            client,
            prospect: prospect.clone(),
            created: true,
        })
    }

    /// Cotizações cujo prospecto o usuário enxerga. Sem o prospecto, só quem vê tudo.
    pub fn visible_quotes(&self, user_id: Uuid, see_all: bool) -> Vec<Quote> {
        self.quotes
            .all()
            .iter()
            .filter(|q| {
                see_all
                    || self
                        .prospects
                        .get(q.prospect_id)
                        .is_some_and(|p| p.salesperson_id == user_id)
            })
            .cloned()
            .collect()
    }

    /// Prospectos visíveis para um usuário: todos, ou só os dele.
    pub fn visible_prospects(&self, user_id: Uuid, see_all: bool) -> Vec<Prospect> {
        self.prospects
            .all()
            .iter()
            .filter(|p| see_all || p.salesperson_id == user_id)
            .cloned()
            .collect()
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub fn create_client(&mut self, input: NewClient) -> Result<Client, AppError> {
        input.validate()?;
        let client = Client {
            id: Uuid::new_v4(),
            name: input.name,
            company: input.company,
            email: input.email,
            phone: input.phone,
            address: input.address,
            city: input.city,
            country: input
                .country
                .unwrap_or_else(|| self.options.default_country.clone()),
            origin_lead: input.origin_lead,
            sales_assignee: input.sales_assignee,
            total_value: input.total_value,
            active_projects_count: 0,
            notes: input.notes,
            prospect_id: None,
            created_at: self.now(),
        };
        self.clients.insert(client.clone());
        Ok(client)
    }

    pub fn client_view(&self, id: Uuid) -> Option<ClientView> {
        let client = self.clients.get(id)?;
        Some(metrics::client_view(client, self.projects.all(), self.transactions.all()))
    }

    pub fn client_views(&self) -> Vec<ClientView> {
        self.clients
            .all()
            .iter()
            .map(|c| metrics::client_view(c, self.projects.all(), self.transactions.all()))
            .collect()
    }

    // =========================================================================
    //  COTIZAÇÕES
    // =========================================================================

    pub fn create_quote(&mut self, input: NewQuote, created_by: Uuid) -> Result<Quote, AppError> {
        input.validate()?;
        let prospect = self.require::<Prospect>(input.prospect_id)?;
        let client_id = input.client_id.or(prospect.client_id);
        let now = self.now();

        let number = next_number(
            QUOTE_PREFIX,
            now.year(),
            self.quotes.all().iter().map(|q| q.number.as_str()),
        );

        let items = input
            .items
            .into_iter()
            .map(NewLineItem::into_line)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(amount_overflow)?;

        let mut quote = Quote {
            id: Uuid::new_v4(),
            number,
            prospect_id: input.prospect_id,
            client_id,
            items,
            subtotal: Default::default(),
            discount_percent: input.discount_percent,
            discount_amount: Default::default(),
            tax_percent: input.tax_percent,
            tax_amount: Default::default(),
            total: Default::default(),
            state: QuoteState::Borrador,
            validity_days: input.validity_days,
            notes: input.notes,
            created_by,
            created_at: now,
            updated_at: now,
        };
        quote.apply_totals().ok_or_else(amount_overflow)?;
        self.quotes.insert(quote.clone());
        Ok(quote)
    }

    pub fn set_quote_state(&mut self, id: Uuid, state: QuoteState) -> Result<Quote, AppError> {
        let now = self.now();
        let quote = self.require_mut::<Quote>(id)?;
        quote.state = state;
        quote.updated_at = now;
        Ok(quote.clone())
    }

    // =========================================================================
    //  PROJETOS
    // =========================================================================

    pub fn create_project(&mut self, input: NewProject) -> Result<Project, AppError> {
        input.validate()?;
        self.require::<Client>(input.client_id)?;
        let now = self.now();
        let project = Project {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            client_id: input.client_id,
            quote_id: input.quote_id,
            service: input.service,
            status: ProjectStatus::Pendiente,
            priority: input.priority,
            progress: 0,
            developer_ids: input.developer_ids,
            budget: input.budget,
            start_date: input.start_date,
            due_date: input.due_date,
            checklist: input
                .checklist
                .into_iter()
                .map(|title| ChecklistTask {
                    id: Uuid::new_v4(),
                    title,
                    done: false,
                })
                .collect(),
            files: Vec::new(),
            accesses: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.projects.insert(project.clone());
        Ok(project)
    }

    pub fn update_project(&mut self, id: Uuid, patch: ProjectPatch) -> Result<Project, AppError> {
        patch.validate()?;
        if patch.developer_ids.as_ref().is_some_and(|d| d.is_empty()) {
            return Err(AppError::InvalidInput(
                "Um projeto precisa de ao menos um desenvolvedor.".into(),
            ));
        }
        let now = self.now();
        let project = self.require_mut::<Project>(id)?;
        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = Some(description);
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(priority) = patch.priority {
            project.priority = priority;
        }
        if let Some(progress) = patch.progress {
            project.progress = clamp_percent(progress);
        }
        if let Some(developers) = patch.developer_ids {
            project.developer_ids = developers;
        }
        if let Some(budget) = patch.budget {
            project.budget = budget;
        }
        if let Some(due) = patch.due_date {
            project.due_date = Some(due);
        }
        project.updated_at = now;
        Ok(project.clone())
    }

    pub fn toggle_task(&mut self, project_id: Uuid, task_id: Uuid) -> Result<Project, AppError> {
        let now = self.now();
        let project = self.require_mut::<Project>(project_id)?;
        let task = project
            .checklist
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::not_found("Tarefa", task_id))?;
        task.done = !task.done;
        project.updated_at = now;
        Ok(project.clone())
    }

    pub fn add_project_file(
        &mut self,
        project_id: Uuid,
        name: String,
        url: String,
    ) -> Result<Project, AppError> {
        let now = self.now();
        let project = self.require_mut::<Project>(project_id)?;
        project.files.push(ProjectFile {
            id: Uuid::new_v4(),
            name,
            url,
            uploaded_at: now,
        });
        project.updated_at = now;
        Ok(project.clone())
    }

    pub fn add_project_access(
        &mut self,
        project_id: Uuid,
        access: AccessCredential,
    ) -> Result<Project, AppError> {
        let now = self.now();
        let project = self.require_mut::<Project>(project_id)?;
        project.accesses.push(access);
        project.updated_at = now;
        Ok(project.clone())
    }

    // =========================================================================
    //  TICKETS
    // =========================================================================

    pub fn create_ticket(&mut self, input: NewTicket) -> Result<Ticket, AppError> {
        input.validate()?;
        self.require::<Client>(input.client_id)?;
        let now = self.now();
        let number = next_number(
            TICKET_PREFIX,
            now.year(),
            self.tickets.all().iter().map(|t| t.number.as_str()),
        );
        let ticket = Ticket {
            id: Uuid::new_v4(),
            number,
            client_id: input.client_id,
            project_id: input.project_id,
            subject: input.subject,
            description: input.description,
            priority: input.priority,
            status: TicketStatus::Abierto,
            assigned_to: input.assigned_to,
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.tickets.insert(ticket.clone());
        Ok(ticket)
    }

    pub fn reply_ticket(
        &mut self,
        id: Uuid,
        input: NewTicketReply,
        author_id: Option<Uuid>,
    ) -> Result<Ticket, AppError> {
        input.validate()?;
        let now = self.now();
        let ticket = self.require_mut::<Ticket>(id)?;
        ticket.replies.push(TicketReply {
            id: Uuid::new_v4(),
            author_id,
            message: input.message,
            from_client: input.from_client,
            created_at: now,
        });
        ticket.updated_at = now;
        Ok(ticket.clone())
    }

    pub fn set_ticket_status(&mut self, id: Uuid, status: TicketStatus) -> Result<Ticket, AppError> {
        let now = self.now();
        let ticket = self.require_mut::<Ticket>(id)?;
        ticket.status = status;
        ticket.updated_at = now;
        Ok(ticket.clone())
    }

    // =========================================================================
    //  FINANCEIRO
    // =========================================================================

    pub fn create_transaction(&mut self, input: NewTransaction) -> Result<Transaction, AppError> {
        input.validate()?;
        if input.category.kind() != input.kind {
            return Err(AppError::InvalidInput(format!(
                "A categoria {:?} não pertence ao tipo {:?}.",
                input.category, input.kind
            )));
        }
        let transaction = Transaction {
            id: Uuid::new_v4(),
            kind: input.kind,
            category: input.category,
            amount: input.amount,
            description: input.description,
            date: input.date,
            client_id: input.client_id,
            project_id: input.project_id,
            payment_method: input.payment_method,
            created_at: self.now(),
        };
        self.transactions.insert(transaction.clone());
        Ok(transaction)
    }

    pub fn create_recurring_service(
        &mut self,
        input: NewRecurringService,
    ) -> Result<RecurringService, AppError> {
        input.validate()?;
        self.require::<Client>(input.client_id)?;
        let service = RecurringService {
            id: Uuid::new_v4(),
            client_id: input.client_id,
            service: input.service,
            description: input.description,
            monthly_price: input.monthly_price,
            renewal_date: input.renewal_date,
            state: RecurringState::Activo,
            payments: Vec::new(),
            created_at: self.now(),
        };
        self.recurring_services.insert(service.clone());
        Ok(service)
    }

    pub fn record_service_payment(
        &mut self,
        id: Uuid,
        input: NewServicePayment,
    ) -> Result<RecurringService, AppError> {
        input.validate()?;
        let service = self.require_mut::<RecurringService>(id)?;
        service.payments.push(ServicePayment {
            id: Uuid::new_v4(),
            amount: input.amount,
            date: input.date,
            method: input.method,
            reference: input.reference,
        });
        Ok(service.clone())
    }

    pub fn set_recurring_state(
        &mut self,
        id: Uuid,
        state: RecurringState,
    ) -> Result<RecurringService, AppError> {
        let service = self.require_mut::<RecurringService>(id)?;
        service.state = state;
        Ok(service.clone())
    }

    // =========================================================================
    //  COMISSÕES
    // =========================================================================

    pub fn create_commission(&mut self, input: NewCommission) -> Result<Commission, AppError> {
        input.validate()?;
        let commission = Commission {
            id: Uuid::new_v4(),
            salesperson_id: input.salesperson_id,
            project_id: input.project_id,
            client_id: input.client_id,
            amount: Commission::amount_for(input.sale_amount, input.percentage),
            sale_amount: input.sale_amount,
            percentage: input.percentage,
            state: CommissionState::Pendiente,
            paid_at: None,
            created_at: self.now(),
        };
        self.commissions.insert(commission.clone());
        Ok(commission)
    }

    /// Comissão de um projeto fechado: vendedor do cliente, orçamento do projeto
    /// e o percentual do vendedor (10% se não houver).
    pub fn commission_for_project(&mut self, project_id: Uuid) -> Result<Commission, AppError> {
        let project = self.require::<Project>(project_id)?;
        let client = self.require::<Client>(project.client_id)?;
        let salesperson = self.require::<User>(client.sales_assignee)?;

        let input = NewCommission {
            salesperson_id: salesperson.id,
            project_id: project.id,
            client_id: client.id,
            sale_amount: project.budget,
            percentage: salesperson
                .commission_percent
                .unwrap_or(DEFAULT_COMMISSION_PERCENT),
        };
        self.create_commission(input)
    }

    pub fn advance_commission(
        &mut self,
        id: Uuid,
        next: CommissionState,
    ) -> Result<Commission, AppError> {
        let now = self.now();
        let commission = self.require_mut::<Commission>(id)?;
        if !commission.state.can_advance_to(next) {
            return Err(AppError::InvalidTransition {
                from: commission.state.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        commission.state = next;
        if next == CommissionState::Pagada {
            commission.paid_at = Some(now);
        }
        Ok(commission.clone())
    }

    // =========================================================================
    //  MARKETING
    // =========================================================================

    pub fn create_campaign(&mut self, input: NewCampaign) -> Result<Campaign, AppError> {
        input.validate()?;
        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: input.name,
            platform: input.platform,
            kind: input.kind,
            state: input.state,
            client_id: input.client_id,
            budget: input.budget,
            spent: input.spent,
            leads: input.leads,
            conversions: input.conversions,
            cost_per_lead: input.cost_per_lead,
            roi: input.roi,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: self.now(),
        };
        self.campaigns.insert(campaign.clone());
        Ok(campaign)
    }

    pub fn set_campaign_state(&mut self, id: Uuid, state: CampaignState) -> Result<Campaign, AppError> {
        let campaign = self.require_mut::<Campaign>(id)?;
        campaign.state = state;
        Ok(campaign.clone())
    }

    pub fn create_lead(&mut self, input: NewLead) -> Result<Lead, AppError> {
        input.validate()?;
        let lead = Lead {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            origin: input.origin,
            campaign_id: input.campaign_id,
            state: LeadState::Nuevo,
            interest: input.interest,
            notes: input.notes,
            created_at: self.now(),
        };
        self.leads.insert(lead.clone());
        Ok(lead)
    }

    pub fn set_lead_state(&mut self, id: Uuid, state: LeadState) -> Result<Lead, AppError> {
        let lead = self.require_mut::<Lead>(id)?;
        lead.state = state;
        Ok(lead.clone())
    }

    pub fn create_package(&mut self, input: NewPackage) -> Result<Package, AppError> {
        input.validate()?;
        let package = Package {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            services: input.services,
            active: true,
            created_at: self.now(),
        };
        self.packages.insert(package.clone());
        Ok(package)
    }

    pub fn create_content(&mut self, input: NewContent) -> Result<Content, AppError> {
        input.validate()?;
        let content = Content {
            id: Uuid::new_v4(),
            title: input.title,
            platform: input.platform,
            client_id: input.client_id,
            state: ContentState::Borrador,
            scheduled_for: input.scheduled_for,
            created_at: self.now(),
        };
        self.contents.insert(content.clone());
        Ok(content)
    }
}
