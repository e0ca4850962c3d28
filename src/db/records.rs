// src/db/records.rs

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    models::{
        client::Client,
        finance::{Commission, RecurringService, Transaction},
        marketing::{Campaign, Content, Lead, Package},
        project::Project,
        prospect::Prospect,
        quote::Quote,
        support::Ticket,
    },
    store::collection::Entity,
};

/// Coleção filha guardada numa tabela própria, ligada ao pai por `parent_key`.
#[derive(Debug)]
pub struct ChildTable {
    /// Campo (camelCase) do registro pai que contém a lista.
    pub field: &'static str,
    pub table: &'static str,
    pub parent_key: &'static str,
    /// Campos numéricos do item filho (camelCase).
    pub numeric: &'static [&'static str],
}

/// Entidade que tem tabela no backend remoto.
pub trait RemoteRecord: Entity + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Campos numéricos (camelCase). Se vierem como texto, viram número na leitura.
    const NUMERIC: &'static [&'static str] = &[];
    const CHILDREN: &'static [ChildTable] = &[];
}

impl RemoteRecord for Prospect {
    const TABLE: &'static str = "prospects";
    const NUMERIC: &'static [&'static str] = &["estimatedValue", "probability"];
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        field: "followUps",
        table: "prospect_follow_ups",
        parent_key: "prospect_id",
        numeric: &[],
    }];
}

impl RemoteRecord for Client {
    const TABLE: &'static str = "clients";
    const NUMERIC: &'static [&'static str] = &["totalValue", "activeProjectsCount"];
}

impl RemoteRecord for Quote {
    const TABLE: &'static str = "quotes";
    const NUMERIC: &'static [&'static str] = &[
        "subtotal",
        "discountPercent",
        "discountAmount",
        "taxPercent",
        "taxAmount",
        "total",
        "validityDays",
    ];
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        field: "items",
        table: "quote_items",
        parent_key: "quote_id",
        numeric: &["quantity", "unitPrice", "total"],
    }];
}

impl RemoteRecord for Project {
    const TABLE: &'static str = "projects";
    const NUMERIC: &'static [&'static str] = &["progress", "budget"];
    const CHILDREN: &'static [ChildTable] = &[
        ChildTable {
            field: "checklist",
            table: "project_tasks",
            parent_key: "project_id",
            numeric: &[],
        },
        ChildTable {
            field: "files",
            table: "project_files",
            parent_key: "project_id",
            numeric: &[],
        },
        ChildTable {
            field: "accesses",
            table: "project_accesses",
            parent_key: "project_id",
            numeric: &[],
        },
    ];
}

impl RemoteRecord for Ticket {
    const TABLE: &'static str = "tickets";
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        field: "replies",
        table: "ticket_replies",
        parent_key: "ticket_id",
        numeric: &[],
    }];
}

impl RemoteRecord for RecurringService {
    const TABLE: &'static str = "recurring_services";
    const NUMERIC: &'static [&'static str] = &["monthlyPrice"];
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        field: "payments",
        table: "service_payments",
        parent_key: "recurring_service_id",
        numeric: &["amount"],
    }];
}

impl RemoteRecord for Transaction {
    const TABLE: &'static str = "transactions";
    const NUMERIC: &'static [&'static str] = &["amount"];
}

impl RemoteRecord for Commission {
    const TABLE: &'static str = "commissions";
    const NUMERIC: &'static [&'static str] = &["saleAmount", "percentage", "amount"];
}

impl RemoteRecord for Campaign {
    const TABLE: &'static str = "campaigns";
    const NUMERIC: &'static [&'static str] =
        &["budget", "spent", "leads", "conversions", "costPerLead", "roi"];
}

impl RemoteRecord for Lead {
    const TABLE: &'static str = "leads";
}

impl RemoteRecord for Package {
    const TABLE: &'static str = "packages";
    const NUMERIC: &'static [&'static str] = &["price"];
}

impl RemoteRecord for Content {
    const TABLE: &'static str = "contents";
}
