use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::drink::{
    Drink, NewDrink, Recipe, RECIPE_MAX_CHARS, TITLE_MAX_CHARS,
};
use crate::database::repository::DrinkRepository;

/// In-process drinks table. Enforces the same unique-title constraint as the
/// PostgreSQL schema and never hands out an id twice.
#[derive(Default)]
pub struct MemoryDrinkRepository {
    table: RwLock<Table>,
}

#[derive(Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, Drink>,
}

impl Table {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }

    fn push(&mut self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        check_widths(&drink.title, &drink.recipe)?;
        if self.title_taken(&drink.title, None) {
            return Err(DatabaseError::Conflict(format!("title '{}' already exists", drink.title)));
        }

        self.last_id += 1;
        let stored = Drink {
            id: self.last_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        self.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

/// Same column limits as the PostgreSQL schema, checked on the stored recipe text
fn check_widths(title: &str, recipe: &Recipe) -> Result<(), DatabaseError> {
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DatabaseError::Constraint(format!(
            "title longer than {} characters",
            TITLE_MAX_CHARS
        )));
    }
    let text = recipe.to_storage()?;
    if text.chars().count() > RECIPE_MAX_CHARS {
        return Err(DatabaseError::Constraint(format!(
            "recipe longer than {} characters",
            RECIPE_MAX_CHARS
        )));
    }
    Ok(())
}

impl MemoryDrinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkRepository for MemoryDrinkRepository {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let mut table = self.table.write().await;
        let stored = table.push(drink)?;
        debug!("Inserted drink {} ({})", stored.id, stored.title);
        Ok(stored)
    }

    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError> {
        check_widths(&drink.title, &drink.recipe)?;
        let mut table = self.table.write().await;
        if table.title_taken(&drink.title, Some(drink.id)) {
            return Err(DatabaseError::Conflict(format!("title '{}' already exists", drink.title)));
        }

        match table.rows.get_mut(&drink.id) {
            Some(row) => {
                *row = drink.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("drink {}", drink.id))),
        }
    }

    async fn delete(&self, drink: &Drink) -> Result<(), DatabaseError> {
        match self.table.write().await.rows.remove(&drink.id) {
            Some(_) => Ok(()),
            None => Err(DatabaseError::NotFound(format!("drink {}", drink.id))),
        }
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        let mut table = self.table.write().await;
        table.rows.clear();
        table.push(NewDrink::seed())?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
