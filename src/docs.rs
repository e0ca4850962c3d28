// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::middleware::session::USER_HEADER;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Pipeline ---
        handlers::prospects::list_prospects,
        handlers::prospects::get_board,
        handlers::prospects::get_prospect,
        handlers::prospects::create_prospect,
        handlers::prospects::update_prospect,
        handlers::prospects::delete_prospect,
        handlers::prospects::move_stage,
        handlers::prospects::add_follow_up,
        handlers::prospects::convert_prospect,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::delete_client,

        // --- Quotes ---
        handlers::quotes::list_quotes,
        handlers::quotes::create_quote,
        handlers::quotes::set_quote_state,
        handlers::quotes::delete_quote,

        // --- Projects ---
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::toggle_task,
        handlers::projects::add_file,
        handlers::projects::add_access,
        handlers::projects::create_project_commission,
        handlers::projects::delete_project,

        // --- Support ---
        handlers::tickets::list_tickets,
        handlers::tickets::create_ticket,
        handlers::tickets::reply_ticket,
        handlers::tickets::set_ticket_status,

        // --- Finance ---
        handlers::finance::list_transactions,
        handlers::finance::create_transaction,
        handlers::finance::list_recurring,
        handlers::finance::create_recurring,
        handlers::finance::record_payment,
        handlers::finance::set_recurring_state,
        handlers::finance::upcoming_renewals,

        // --- Commissions ---
        handlers::commissions::list_commissions,
        handlers::commissions::commission_totals,
        handlers::commissions::create_commission,
        handlers::commissions::advance_commission,

        // --- Marketing ---
        handlers::marketing::list_campaigns,
        handlers::marketing::create_campaign,
        handlers::marketing::set_campaign_state,
        handlers::marketing::list_leads,
        handlers::marketing::create_lead,
        handlers::marketing::set_lead_state,
        handlers::marketing::list_packages,
        handlers::marketing::create_package,
        handlers::marketing::list_contents,
        handlers::marketing::create_content,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_monthly_series,
        handlers::dashboard::get_leaderboard,
        handlers::dashboard::get_pipeline_columns,
        handlers::dashboard::get_campaign_totals,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::list_users,
    ),
    components(
        schemas(
            // --- PIPELINE ---
            models::prospect::PipelineStage,
            models::prospect::ServiceType,
            models::prospect::FollowUpType,
            models::prospect::FollowUp,
            models::prospect::Prospect,
            models::prospect::NewProspect,
            models::prospect::ProspectPatch,
            models::prospect::NewFollowUp,
            services::pipeline::StageChange,
            services::pipeline::BoardColumn,
            handlers::prospects::MoveStagePayload,
            handlers::prospects::StageMoveResponse,
            handlers::prospects::ConversionResponse,
            handlers::prospects::FollowUpResponse,

            // --- CLIENTS ---
            models::client::LeadOrigin,
            models::client::Client,
            models::client::ClientView,
            models::client::NewClient,

            // --- QUOTES ---
            models::quote::QuoteState,
            models::quote::QuoteLineItem,
            models::quote::QuoteTotals,
            models::quote::Quote,
            models::quote::NewLineItem,
            models::quote::NewQuote,
            handlers::quotes::QuoteStatePayload,
            handlers::quotes::QuoteResponse,

            // --- PROJECTS ---
            models::project::ProjectStatus,
            models::project::Priority,
            models::project::ChecklistTask,
            models::project::ProjectFile,
            models::project::AccessCredential,
            models::project::Project,
            models::project::NewProject,
            models::project::ProjectPatch,
            handlers::projects::ProjectResponse,
            handlers::projects::AddFilePayload,
            handlers::projects::AddAccessPayload,

            // --- SUPPORT ---
            models::support::TicketPriority,
            models::support::TicketStatus,
            models::support::TicketReply,
            models::support::Ticket,
            models::support::NewTicket,
            models::support::NewTicketReply,
            handlers::tickets::TicketStatusPayload,

            // --- FINANCE ---
            models::finance::TransactionType,
            models::finance::TransactionCategory,
            models::finance::PaymentMethod,
            models::finance::RecurringState,
            models::finance::CommissionState,
            models::finance::Transaction,
            models::finance::NewTransaction,
            models::finance::ServicePayment,
            models::finance::RecurringService,
            models::finance::NewRecurringService,
            models::finance::NewServicePayment,
            models::finance::Commission,
            models::finance::NewCommission,
            handlers::finance::RecurringStatePayload,
            handlers::commissions::CommissionStatePayload,

            // --- MARKETING ---
            models::marketing::Platform,
            models::marketing::CampaignType,
            models::marketing::CampaignState,
            models::marketing::LeadState,
            models::marketing::ContentState,
            models::marketing::Campaign,
            models::marketing::NewCampaign,
            models::marketing::Lead,
            models::marketing::NewLead,
            models::marketing::Package,
            models::marketing::NewPackage,
            models::marketing::Content,
            models::marketing::NewContent,
            handlers::marketing::CampaignStatePayload,
            handlers::marketing::LeadStatePayload,

            // --- DASHBOARD ---
            models::dashboard::MonthlyPoint,
            models::dashboard::LeaderboardEntry,
            models::dashboard::PipelineColumn,
            models::dashboard::CampaignTotals,
            models::dashboard::CommissionTotals,
            models::dashboard::DashboardSummary,

            // --- USERS ---
            models::user::Role,
            models::user::Department,
            models::user::Permission,
            models::user::User,
        )
    ),
    tags(
        (name = "Pipeline", description = "Prospectos, quadro Kanban e conversão em cliente"),
        (name = "Clients", description = "Clientes e agregados recalculados"),
        (name = "Quotes", description = "Cotizações numeradas com itens e totais"),
        (name = "Projects", description = "Projetos, checklist, arquivos e acessos"),
        (name = "Support", description = "Tickets de suporte e respostas"),
        (name = "Finance", description = "Transações e serviços recorrentes"),
        (name = "Commissions", description = "Comissões de vendedores"),
        (name = "Marketing", description = "Campanhas, leads, pacotes e conteúdos"),
        (name = "Dashboard", description = "Indicadores e gráficos gerenciais"),
        (name = "Users", description = "Equipe e sessão")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "x_user_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_HEADER))),
        );
    }
}
