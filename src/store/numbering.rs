// src/store/numbering.rs

//! Numeração legível (`TKT-2024-001`, `COT-2024-001`).
//! O próximo número sai do maior já emitido, não de um contador em memória,
//! então recarregar o snapshot não repete números.

pub const TICKET_PREFIX: &str = "TKT";
pub const QUOTE_PREFIX: &str = "COT";

pub fn next_number<'a, I>(prefix: &str, year: i32, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let head = format!("{prefix}-{year}-");
    let last = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(&head))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{head}{:03}", last + 1)
}
