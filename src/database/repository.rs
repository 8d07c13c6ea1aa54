use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::drink::{Drink, DrinkRow, NewDrink};

/// CRUD gateway over the drinks table
#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// All drinks in insertion (id) order
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError>;

    /// Persist a new drink and return it with its assigned id
    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError>;

    /// Persist the current state of an already-loaded drink
    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError>;

    async fn delete(&self, drink: &Drink) -> Result<(), DatabaseError>;

    /// Wipe all drinks and insert the seed record
    async fn reset(&self) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// PostgreSQL-backed repository
pub struct PgDrinkRepository {
    pool: PgPool,
}

impl PgDrinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrinkRepository for PgDrinkRepository {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Drink::try_from(row).map_err(DatabaseError::from))
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Drink::try_from).transpose()?)
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let recipe = drink.recipe.to_storage()?;
        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        Ok(Drink::try_from(row)?)
    }

    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let recipe = drink.recipe.to_storage()?;
        let result = sqlx::query("UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3")
            .bind(&drink.title)
            .bind(&recipe)
            .bind(drink.id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("drink {}", drink.id)));
        }
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(drink.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("drink {}", drink.id)));
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        DatabaseManager::reset(&self.pool).await
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
