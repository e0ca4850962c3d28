// src/store/collection.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Qualquer registro guardado no store.
pub trait Entity: Clone {
    /// Nome usado nas mensagens de erro ("Prospecto", "Cliente"...).
    const NAME: &'static str;

    fn id(&self) -> Uuid;
}

/// Coleção ordenada por inserção. Busca linear: as coleções do console são pequenas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// "Não encontrado" é `None`, nunca erro.
    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    /// Troca o registro com o mesmo id e devolve o antigo.
    /// Se o id não existir, o item é anexado no fim.
    pub fn replace(&mut self, item: T) -> Option<T> {
        match self.get_mut(item.id()) {
            Some(slot) => Some(std::mem::replace(slot, item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}
