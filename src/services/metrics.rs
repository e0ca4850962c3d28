// src/services/metrics.rs

//! Métricas derivadas. Tudo aqui é função pura sobre as coleções:
//! nada de estado escondido e nada de relógio. Quem chama passa o "agora".

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::{
    client::{Client, ClientView},
    dashboard::{
        CampaignTotals, CommissionTotals, DashboardSummary, LeaderboardEntry, MonthLocale,
        MonthlyPoint, PipelineColumn,
    },
    finance::{Commission, CommissionState, RecurringService, RecurringState, Transaction, TransactionType},
    marketing::Campaign,
    project::Project,
    prospect::{PipelineStage, Prospect},
    user::User,
};

/// Meta mensal usada quando o vendedor não tem uma definida.
pub const DEFAULT_MONTHLY_GOAL: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);
/// Comissão (%) usada quando o vendedor não tem uma definida.
pub const DEFAULT_COMMISSION_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

// =========================================================================
//  FUNIL
// =========================================================================

/// Σ valor estimado × probabilidade / 100, em todas as etapas.
pub fn weighted_pipeline_value(prospects: &[Prospect]) -> Decimal {
    prospects.iter().map(weighted_value).sum()
}

fn weighted_value(prospect: &Prospect) -> Decimal {
    prospect.estimated_value * Decimal::from(prospect.probability) / Decimal::ONE_HUNDRED
}

pub fn average_probability(prospects: &[Prospect]) -> Decimal {
    if prospects.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = prospects.iter().map(|p| Decimal::from(p.probability)).sum();
    sum / Decimal::from(prospects.len())
}

/// Percentual de prospectos na etapa fechada.
pub fn conversion_rate(prospects: &[Prospect]) -> Decimal {
    if prospects.is_empty() {
        return Decimal::ZERO;
    }
    let closed = prospects.iter().filter(|p| p.stage.is_closed()).count();
    Decimal::from(closed) / Decimal::from(prospects.len()) * Decimal::ONE_HUNDRED
}

/// Totais por coluna, na ordem do quadro.
pub fn pipeline_columns(prospects: &[Prospect]) -> Vec<PipelineColumn> {
    PipelineStage::ALL
        .iter()
        .map(|stage| {
            let in_stage = prospects.iter().filter(|p| p.stage == *stage);
            let mut column = PipelineColumn {
                stage: *stage,
                label: stage.label().to_string(),
                count: 0,
                total_value: Decimal::ZERO,
                weighted_value: Decimal::ZERO,
            };
            for prospect in in_stage {
                column.count += 1;
                column.total_value += prospect.estimated_value;
                column.weighted_value += weighted_value(prospect);
            }
            column
        })
        .collect()
}

// =========================================================================
//  RANKING E COMISSÕES
// =========================================================================

/// Ranking de vendas fechadas por vendedor (admins também vendem).
/// Ordem decrescente por total; empates mantêm a ordem original dos usuários.
pub fn sales_leaderboard(users: &[User], prospects: &[Prospect]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = users
        .iter()
        .filter(|user| user.role.sells())
        .map(|user| {
            let closed = prospects
                .iter()
                .filter(|p| p.salesperson_id == user.id && p.stage.is_closed());

            let mut total_sales = Decimal::ZERO;
            let mut closed_deals = 0u32;
            for prospect in closed {
                total_sales += prospect.estimated_value;
                closed_deals += 1;
            }

            let goal = user.monthly_goal.unwrap_or(DEFAULT_MONTHLY_GOAL);
            let commission_percent = user.commission_percent.unwrap_or(DEFAULT_COMMISSION_PERCENT);

            LeaderboardEntry {
                user_id: user.id,
                name: user.name.clone(),
                total_sales,
                closed_deals,
                goal,
                commission_percent,
                commission: total_sales * commission_percent / Decimal::ONE_HUNDRED,
                goal_progress: ratio_percent(total_sales, goal),
            }
        })
        .collect();

    // sort_by é estável
    entries.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    entries
}

/// Soma dos registros de comissão por estado. Não precisa bater com o ranking.
pub fn commission_totals(commissions: &[Commission]) -> CommissionTotals {
    commissions
        .iter()
        .fold(CommissionTotals::default(), |mut totals, commission| {
            match commission.state {
                CommissionState::Pendiente => totals.pending += commission.amount,
                CommissionState::Aprobada => totals.approved += commission.amount,
                CommissionState::Pagada => totals.paid += commission.amount,
            }
            totals.total += commission.amount;
            totals
        })
}

// =========================================================================
//  FINANCEIRO
// =========================================================================

/// Série dos últimos `months_back` meses terminando no mês de `now` (inclusive).
/// Sempre `months_back` pontos, do mais antigo para o atual.
pub fn monthly_series(
    transactions: &[Transaction],
    months_back: u32,
    now: DateTime<Utc>,
    locale: MonthLocale,
) -> Vec<MonthlyPoint> {
    let today = now.date_naive();
    let anchor = today.with_day(1).unwrap_or(today);

    (0..months_back)
        .rev()
        .filter_map(|back| anchor.checked_sub_months(Months::new(back)))
        .map(|month_start| {
            let (income, expense) = month_totals(transactions, month_start);
            MonthlyPoint {
                month: locale.short_month(month_start.month()).to_string(),
                year: month_start.year(),
                income,
                expense,
                net: income - expense,
            }
        })
        .collect()
}

fn month_totals(transactions: &[Transaction], month_start: NaiveDate) -> (Decimal, Decimal) {
    transactions
        .iter()
        .filter(|t| t.date.month() == month_start.month() && t.date.year() == month_start.year())
        .fold((Decimal::ZERO, Decimal::ZERO), |(income, expense), t| match t.kind {
            TransactionType::Ingreso => (income + t.amount, expense),
            TransactionType::Egreso => (income, expense + t.amount),
        })
}

/// (novo − anterior) / anterior × 100, com 0 quando a base é 0.
pub fn percent_change(value: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    (value - previous) / previous * Decimal::ONE_HUNDRED
}

fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}

pub fn monthly_recurring_revenue(services: &[RecurringService]) -> Decimal {
    services
        .iter()
        .filter(|s| s.state == RecurringState::Activo)
        .map(|s| s.monthly_price)
        .sum()
}

/// Serviços ativos que renovam entre hoje e hoje + `within_days`, o mais próximo primeiro.
pub fn upcoming_renewals(
    services: &[RecurringService],
    today: NaiveDate,
    within_days: i64,
) -> Vec<&RecurringService> {
    // janela negativa não pega nada; janela além do calendário vai até o fim dele
    let Ok(days) = u64::try_from(within_days) else {
        return Vec::new();
    };
    let limit = today
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX);
    let mut due: Vec<&RecurringService> = services
        .iter()
        .filter(|s| s.state == RecurringState::Activo)
        .filter(|s| s.renewal_date >= today && s.renewal_date <= limit)
        .collect();
    due.sort_by_key(|s| s.renewal_date);
    due
}

// =========================================================================
//  CLIENTES E CAMPANHAS
// =========================================================================

/// Agregados do cliente recalculados a partir de projetos e transações.
pub fn client_view(client: &Client, projects: &[Project], transactions: &[Transaction]) -> ClientView {
    let income_total = transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Ingreso && t.client_id == Some(client.id))
        .map(|t| t.amount)
        .sum();
    let active_projects = projects
        .iter()
        .filter(|p| p.client_id == client.id && p.status.is_active())
        .count() as u32;

    ClientView {
        client: client.clone(),
        income_total,
        active_projects,
    }
}

/// Somatório simples sobre um conjunto (já filtrado) de campanhas.
pub fn campaign_totals<'a, I>(campaigns: I) -> CampaignTotals
where
    I: IntoIterator<Item = &'a Campaign>,
{
    campaigns
        .into_iter()
        .fold(CampaignTotals::default(), |mut totals, campaign| {
            totals.budget += campaign.budget;
            totals.spent += campaign.spent;
            totals.leads += u64::from(campaign.leads);
            totals.conversions += u64::from(campaign.conversions);
            totals
        })
}

// =========================================================================
//  CARDS DO DASHBOARD
// =========================================================================

pub fn dashboard_summary(
    prospects: &[Prospect],
    transactions: &[Transaction],
    services: &[RecurringService],
    now: DateTime<Utc>,
) -> DashboardSummary {
    let series = monthly_series(transactions, 2, now, MonthLocale::default());
    let income_last_month = series.first().map(|p| p.income).unwrap_or_default();
    let income_this_month = series.last().map(|p| p.income).unwrap_or_default();

    DashboardSummary {
        weighted_pipeline_value: weighted_pipeline_value(prospects),
        average_probability: average_probability(prospects),
        conversion_rate: conversion_rate(prospects),
        open_prospects: prospects.iter().filter(|p| p.is_open()).count() as u32,
        income_this_month,
        income_last_month,
        income_change: percent_change(income_this_month, income_last_month),
        monthly_recurring_revenue: monthly_recurring_revenue(services),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        client::LeadOrigin,
        finance::{PaymentMethod, TransactionCategory},
        marketing::{CampaignState, CampaignType, Platform},
        project::{Priority, ProjectStatus},
        prospect::ServiceType,
        user::{Department, Role},
    };
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn prospect(owner: Uuid, value: i64, probability: u8, stage: PipelineStage) -> Prospect {
        Prospect {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            company: None,
            email: "ana@example.com".into(),
            phone: "5550000".into(),
            address: None,
            stage,
            estimated_value: Decimal::from(value),
            probability,
            salesperson_id: owner,
            service_of_interest: ServiceType::PaginaWeb,
            notes: None,
            created_at: now(),
            last_updated_at: now(),
            follow_ups: Vec::new(),
            client_id: None,
            loss_reason: None,
        }
    }

    fn user(name: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{name}@agencia.mx"),
            role,
            department: Department::Ventas,
            monthly_goal: None,
            commission_percent: None,
            active: true,
            created_at: now(),
        }
    }

    fn transaction(kind: TransactionType, amount: i64, date: NaiveDate) -> Transaction {
        let category = match kind {
            TransactionType::Ingreso => TransactionCategory::Proyecto,
            TransactionType::Egreso => TransactionCategory::Software,
        };
        Transaction {
            id: Uuid::new_v4(),
            kind,
            category,
            amount: Decimal::from(amount),
            description: String::new(),
            date,
            client_id: None,
            project_id: None,
            payment_method: PaymentMethod::Transferencia,
            created_at: now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weighted_value_sums_value_times_probability() {
        let owner = Uuid::new_v4();
        let prospects = vec![
            prospect(owner, 40000, 50, PipelineStage::Cotizacion),
            prospect(owner, 10000, 25, PipelineStage::Contacto),
            prospect(owner, 5000, 100, PipelineStage::Entregado),
        ];
        assert_eq!(weighted_pipeline_value(&prospects), Decimal::from(27500));
        assert_eq!(weighted_pipeline_value(&[]), Decimal::ZERO);
    }

    #[test]
    fn average_and_conversion_guard_empty_input() {
        assert_eq!(average_probability(&[]), Decimal::ZERO);
        assert_eq!(conversion_rate(&[]), Decimal::ZERO);

        let owner = Uuid::new_v4();
        let prospects = vec![
            prospect(owner, 1, 20, PipelineStage::Contacto),
            prospect(owner, 1, 60, PipelineStage::Entregado),
            prospect(owner, 1, 40, PipelineStage::Proceso),
            prospect(owner, 1, 80, PipelineStage::Entregado),
        ];
        assert_eq!(average_probability(&prospects), Decimal::from(50));
        assert_eq!(conversion_rate(&prospects), Decimal::from(50));
    }

    #[test]
    fn monthly_series_has_fixed_length_and_ends_at_now() {
        let transactions = vec![
            transaction(TransactionType::Ingreso, 1000, date(2024, 3, 2)),
            transaction(TransactionType::Egreso, 300, date(2024, 3, 20)),
            transaction(TransactionType::Ingreso, 500, date(2024, 1, 31)),
            // mesmo mês, outro ano: fica de fora
            transaction(TransactionType::Ingreso, 9999, date(2023, 3, 5)),
        ];
        let series = monthly_series(&transactions, 6, now(), MonthLocale::Es);

        assert_eq!(series.len(), 6);
        let labels: Vec<&str> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(labels, vec!["Oct", "Nov", "Dic", "Ene", "Feb", "Mar"]);
        assert_eq!(series[0].year, 2023);

        let current = series.last().unwrap();
        assert_eq!(current.year, 2024);
        assert_eq!(current.income, Decimal::from(1000));
        assert_eq!(current.expense, Decimal::from(300));
        assert_eq!(current.net, Decimal::from(700));
        assert_eq!(series[3].income, Decimal::from(500));
    }

    #[test]
    fn monthly_series_english_labels() {
        let series = monthly_series(&[], 2, now(), MonthLocale::En);
        let labels: Vec<&str> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(labels, vec!["Feb", "Mar"]);
    }

    #[test]
    fn leaderboard_defaults_and_ordering() {
        let ana = user("ana", Role::Vendedor);
        let mut beto = user("beto", Role::Vendedor);
        beto.monthly_goal = Some(Decimal::from(50000));
        beto.commission_percent = Some(Decimal::from(5));
        let carla = user("carla", Role::Admin);
        let soporte = user("sop", Role::Soporte);

        let prospects = vec![
            prospect(ana.id, 40000, 50, PipelineStage::Entregado),
            prospect(beto.id, 60000, 90, PipelineStage::Entregado),
            // não fechado: não conta
            prospect(ana.id, 90000, 90, PipelineStage::Proceso),
        ];

        let users = vec![ana.clone(), beto.clone(), carla.clone(), soporte];
        let board = sales_leaderboard(&users, &prospects);

        assert_eq!(board.len(), 3);
        assert_eq!(board[0].user_id, beto.id);
        assert_eq!(board[0].commission, Decimal::from(3000));
        assert_eq!(board[0].goal_progress, Decimal::from(120));

        assert_eq!(board[1].user_id, ana.id);
        assert_eq!(board[1].total_sales, Decimal::from(40000));
        assert_eq!(board[1].goal, DEFAULT_MONTHLY_GOAL);
        assert_eq!(board[1].commission_percent, DEFAULT_COMMISSION_PERCENT);
        assert_eq!(board[1].commission, Decimal::from(4000));

        assert_eq!(board[2].user_id, carla.id);
        assert_eq!(board[2].total_sales, Decimal::ZERO);
    }

    #[test]
    fn leaderboard_ties_keep_user_order() {
        let a = user("a", Role::Vendedor);
        let b = user("b", Role::Vendedor);
        let board = sales_leaderboard(&[a.clone(), b.clone()], &[]);
        assert_eq!(board[0].user_id, a.id);
        assert_eq!(board[1].user_id, b.id);
    }

    #[test]
    fn percent_change_guards_zero_baseline() {
        assert_eq!(percent_change(Decimal::from(50), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_change(Decimal::from(150), Decimal::from(100)), Decimal::from(50));
        assert_eq!(percent_change(Decimal::from(50), Decimal::from(100)), Decimal::from(-50));
    }

    #[test]
    fn pipeline_columns_follow_board_order() {
        let owner = Uuid::new_v4();
        let prospects = vec![
            prospect(owner, 1000, 50, PipelineStage::Proceso),
            prospect(owner, 3000, 10, PipelineStage::Proceso),
        ];
        let columns = pipeline_columns(&prospects);
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[0].stage, PipelineStage::Contacto);
        assert_eq!(columns[0].count, 0);
        assert_eq!(columns[2].count, 2);
        assert_eq!(columns[2].total_value, Decimal::from(4000));
        assert_eq!(columns[2].weighted_value, Decimal::from(800));
    }

    #[test]
    fn client_view_recomputes_aggregates() {
        let client = Client {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            company: None,
            email: "ana@example.com".into(),
            phone: "1".into(),
            address: None,
            city: None,
            country: "México".into(),
            origin_lead: LeadOrigin::Referido,
            sales_assignee: Uuid::new_v4(),
            total_value: Decimal::from(40000),
            active_projects_count: 0,
            notes: None,
            prospect_id: None,
            created_at: now(),
        };
        let mut paid = transaction(TransactionType::Ingreso, 12000, date(2024, 3, 1));
        paid.client_id = Some(client.id);
        let mut cost = transaction(TransactionType::Egreso, 500, date(2024, 3, 1));
        cost.client_id = Some(client.id);

        let project = |status| Project {
            id: Uuid::new_v4(),
            name: "p".into(),
            description: None,
            client_id: client.id,
            quote_id: None,
            service: ServiceType::Seo,
            status,
            priority: Priority::Media,
            progress: 0,
            developer_ids: vec![],
            budget: Decimal::ZERO,
            start_date: date(2024, 3, 1),
            due_date: None,
            checklist: vec![],
            files: vec![],
            accesses: vec![],
            created_at: now(),
            updated_at: now(),
        };
        let projects = vec![
            project(ProjectStatus::EnDesarrollo),
            project(ProjectStatus::Entregado),
            project(ProjectStatus::Pendiente),
        ];

        let view = client_view(&client, &projects, &[paid, cost]);
        assert_eq!(view.income_total, Decimal::from(12000));
        assert_eq!(view.active_projects, 2);
        assert_eq!(view.client.active_projects_count, 0);
    }

    #[test]
    fn campaign_totals_sum_the_given_set() {
        let campaign = |budget: i64, leads: u32, state| Campaign {
            id: Uuid::new_v4(),
            name: "c".into(),
            platform: Platform::Facebook,
            kind: CampaignType::Leads,
            state,
            client_id: None,
            budget: Decimal::from(budget),
            spent: Decimal::from(budget / 2),
            leads,
            conversions: leads / 2,
            cost_per_lead: Decimal::ZERO,
            roi: Decimal::ZERO,
            start_date: date(2024, 1, 1),
            end_date: None,
            created_at: now(),
        };
        let campaigns = vec![
            campaign(1000, 10, CampaignState::Activa),
            campaign(3000, 30, CampaignState::Finalizada),
        ];
        let active = campaign_totals(campaigns.iter().filter(|c| c.state == CampaignState::Activa));
        assert_eq!(active.budget, Decimal::from(1000));
        assert_eq!(active.leads, 10);

        let all = campaign_totals(&campaigns);
        assert_eq!(all.spent, Decimal::from(2000));
        assert_eq!(all.conversions, 20);
    }

    #[test]
    fn recurring_revenue_and_renewals() {
        let service = |price: i64, renewal: NaiveDate, state| RecurringService {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            service: ServiceType::Hosting,
            description: None,
            monthly_price: Decimal::from(price),
            renewal_date: renewal,
            state,
            payments: vec![],
            created_at: now(),
        };
        let services = vec![
            service(500, date(2024, 3, 30), RecurringState::Activo),
            service(800, date(2024, 3, 18), RecurringState::Activo),
            service(900, date(2024, 3, 16), RecurringState::Pausado),
            service(100, date(2024, 6, 1), RecurringState::Activo),
        ];
        assert_eq!(monthly_recurring_revenue(&services), Decimal::from(1400));

        let due = upcoming_renewals(&services, date(2024, 3, 15), 30);
        let prices: Vec<Decimal> = due.iter().map(|s| s.monthly_price).collect();
        assert_eq!(prices, vec![Decimal::from(800), Decimal::from(500)]);

        assert_eq!(upcoming_renewals(&services, date(2024, 3, 15), i64::MAX).len(), 3);
        assert_eq!(upcoming_renewals(&services, date(2024, 3, 15), 1_000_000_000).len(), 3);
        assert!(upcoming_renewals(&services, date(2024, 3, 15), -1).is_empty());
    }

    #[test]
    fn summary_compares_with_previous_month() {
        let transactions = vec![
            transaction(TransactionType::Ingreso, 1500, date(2024, 3, 1)),
            transaction(TransactionType::Ingreso, 1000, date(2024, 2, 10)),
        ];
        let summary = dashboard_summary(&[], &transactions, &[], now());
        assert_eq!(summary.income_this_month, Decimal::from(1500));
        assert_eq!(summary.income_last_month, Decimal::from(1000));
        assert_eq!(summary.income_change, Decimal::from(50));
        assert_eq!(summary.weighted_pipeline_value, Decimal::ZERO);
    }

    #[test]
    fn commission_totals_split_by_state() {
        let commission = |amount: i64, state| Commission {
            id: Uuid::new_v4(),
            salesperson_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            sale_amount: Decimal::from(amount * 10),
            percentage: Decimal::from(10),
            amount: Decimal::from(amount),
            state,
            paid_at: None,
            created_at: now(),
        };
        let totals = commission_totals(&[
            commission(100, CommissionState::Pendiente),
            commission(200, CommissionState::Pagada),
            commission(50, CommissionState::Pendiente),
        ]);
        assert_eq!(totals.pending, Decimal::from(150));
        assert_eq!(totals.approved, Decimal::ZERO);
        assert_eq!(totals.paid, Decimal::from(200));
        assert_eq!(totals.total, Decimal::from(350));
    }
}
