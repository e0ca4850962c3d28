// src/db/mapping.rs

//! Tradução entre os modelos (camelCase, listas embutidas) e as linhas do
//! banco (snake_case, listas em tabelas filhas). Funções puras: sem I/O.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::{
    common::error::AppError,
    db::records::{ChildTable, RemoteRecord},
};

pub type Row = Map<String, Value>;

/// Coluna de ordenação das tabelas filhas.
pub const POSITION: &str = "position";

#[derive(Debug, Clone, PartialEq)]
pub struct ChildRows {
    pub table: &'static str,
    pub parent_key: &'static str,
    pub rows: Vec<Row>,
}

/// Uma linha principal mais as linhas filhas que a acompanham.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    pub table: &'static str,
    pub row: Row,
    pub children: Vec<ChildRows>,
}

// =========================================================================
//  NOMES
// =========================================================================

pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn rename_keys(row: Row, rename: fn(&str) -> String) -> Row {
    row.into_iter().map(|(k, v)| (rename(&k), v)).collect()
}

// Texto numérico ("40000.00") vira número; o resto fica como veio.
fn coerce_numbers(object: &mut Row, fields: &[&str]) {
    for field in fields {
        let Some(Value::String(raw)) = object.get(*field) else {
            continue;
        };
        let raw = raw.trim();
        let number = match raw.parse::<i64>() {
            Ok(int) => Some(Number::from(int)),
            Err(_) => raw.parse::<f64>().ok().and_then(Number::from_f64),
        };
        if let Some(number) = number {
            object.insert((*field).to_string(), Value::Number(number));
        }
    }
}

fn into_object(value: Value, table: &str) -> Result<Row, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InvalidInput(format!(
            "Registro de '{}' não é um objeto JSON: {}",
            table, other
        ))),
    }
}

// =========================================================================
//  MODELO -> LINHA
// =========================================================================

pub fn to_row<T: RemoteRecord>(record: &T) -> Result<RowSet, AppError> {
    let mut object = into_object(serde_json::to_value(record)?, T::TABLE)?;
    let parent_id = Value::String(record.id().to_string());

    let mut children = Vec::with_capacity(T::CHILDREN.len());
    for child in T::CHILDREN {
        let items = match object.remove(child.field) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let rows = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                let mut row = rename_keys(into_object(item, child.table)?, camel_to_snake);
                row.insert(child.parent_key.to_string(), parent_id.clone());
                row.insert(POSITION.to_string(), Value::from(position as u64));
                Ok(row)
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        children.push(ChildRows {
            table: child.table,
            parent_key: child.parent_key,
            rows,
        });
    }

    Ok(RowSet {
        table: T::TABLE,
        row: rename_keys(object, camel_to_snake),
        children,
    })
}

// =========================================================================
//  LINHA -> MODELO
// =========================================================================

fn attach_child(object: &mut Row, child: &ChildTable, mut rows: Vec<Row>) {
    rows.sort_by_key(|row| row.get(POSITION).and_then(Value::as_u64).unwrap_or(u64::MAX));
    let items = rows
        .into_iter()
        .map(|mut row| {
            row.remove(child.parent_key);
            row.remove(POSITION);
            let mut item = rename_keys(row, snake_to_camel);
            coerce_numbers(&mut item, child.numeric);
            Value::Object(item)
        })
        .collect();
    object.insert(child.field.to_string(), Value::Array(items));
}

/// `children` traz, por tabela filha, as linhas deste pai (em qualquer ordem).
pub fn from_row<T: RemoteRecord>(
    row: Row,
    mut children: HashMap<&'static str, Vec<Row>>,
) -> Result<T, AppError> {
    let mut object = rename_keys(row, snake_to_camel);
    coerce_numbers(&mut object, T::NUMERIC);

    for child in T::CHILDREN {
        let rows = children.remove(child.table).unwrap_or_default();
        attach_child(&mut object, child, rows);
    }

    Ok(serde_json::from_value(Value::Object(object))?)
}
