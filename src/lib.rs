// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc};

/// Router completo da API. A sessão é resolvida em cada handler (`CurrentUser`).
pub fn build_router(app_state: AppState) -> Router {
    let prospect_routes = Router::new()
        .route(
            "/",
            post(handlers::prospects::create_prospect).get(handlers::prospects::list_prospects),
        )
        .route("/board", get(handlers::prospects::get_board))
        .route(
            "/{id}",
            get(handlers::prospects::get_prospect)
                .patch(handlers::prospects::update_prospect)
                .delete(handlers::prospects::delete_prospect),
        )
        .route("/{id}/stage", post(handlers::prospects::move_stage))
        .route("/{id}/follow-ups", post(handlers::prospects::add_follow_up))
        .route("/{id}/convert", post(handlers::prospects::convert_prospect));

    let client_routes = Router::new()
        .route(
            "/",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client).delete(handlers::clients::delete_client),
        );

    let quote_routes = Router::new()
        .route(
            "/",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route("/{id}", delete(handlers::quotes::delete_quote))
        .route("/{id}/state", patch(handlers::quotes::set_quote_state));

    let project_routes = Router::new()
        .route(
            "/",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/{id}",
            patch(handlers::projects::update_project).delete(handlers::projects::delete_project),
        )
        .route(
            "/{id}/tasks/{task_id}/toggle",
            post(handlers::projects::toggle_task),
        )
        .route("/{id}/files", post(handlers::projects::add_file))
        .route("/{id}/accesses", post(handlers::projects::add_access))
        .route(
            "/{id}/commission",
            post(handlers::projects::create_project_commission),
        );

    let ticket_routes = Router::new()
        .route(
            "/",
            post(handlers::tickets::create_ticket).get(handlers::tickets::list_tickets),
        )
        .route("/{id}/replies", post(handlers::tickets::reply_ticket))
        .route("/{id}/status", patch(handlers::tickets::set_ticket_status));

    let finance_routes = Router::new()
        .route(
            "/transactions",
            post(handlers::finance::create_transaction).get(handlers::finance::list_transactions),
        )
        .route(
            "/recurring",
            post(handlers::finance::create_recurring).get(handlers::finance::list_recurring),
        )
        .route("/recurring/{id}/payments", post(handlers::finance::record_payment))
        .route("/recurring/{id}/state", patch(handlers::finance::set_recurring_state))
        .route("/renewals", get(handlers::finance::upcoming_renewals));

    let commission_routes = Router::new()
        .route(
            "/",
            post(handlers::commissions::create_commission)
                .get(handlers::commissions::list_commissions),
        )
        .route("/totals", get(handlers::commissions::commission_totals))
        .route("/{id}/state", patch(handlers::commissions::advance_commission));

    let marketing_routes = Router::new()
        .route(
            "/campaigns",
            post(handlers::marketing::create_campaign).get(handlers::marketing::list_campaigns),
        )
        .route(
            "/campaigns/{id}/state",
            patch(handlers::marketing::set_campaign_state),
        )
        .route(
            "/leads",
            post(handlers::marketing::create_lead).get(handlers::marketing::list_leads),
        )
        .route("/leads/{id}/state", patch(handlers::marketing::set_lead_state))
        .route(
            "/packages",
            post(handlers::marketing::create_package).get(handlers::marketing::list_packages),
        )
        .route(
            "/contents",
            post(handlers::marketing::create_content).get(handlers::marketing::list_contents),
        );

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/monthly", get(handlers::dashboard::get_monthly_series))
        .route("/leaderboard", get(handlers::dashboard::get_leaderboard))
        .route("/pipeline", get(handlers::dashboard::get_pipeline_columns))
        .route("/campaigns", get(handlers::dashboard::get_campaign_totals));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/me", get(handlers::users::get_me));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/prospects", prospect_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/quotes", quote_routes)
        .nest("/api/projects", project_routes)
        .nest("/api/tickets", ticket_routes)
        .nest("/api/finance", finance_routes)
        .nest("/api/commissions", commission_routes)
        .nest("/api/marketing", marketing_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/users", user_routes)
        .with_state(app_state)
}
