use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Errors raised while building or reading a drink
#[derive(Debug, thiserror::Error)]
pub enum DrinkError {
    #[error("Payload must be a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Recipe serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One recipe component, e.g. `{"name": "milk", "color": "grey", "parts": 1}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// Ingredient as shown to anonymous callers: no name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// Ordered ingredient list, stored as JSON text in the `recipe` column
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

/// Request bodies may carry a single ingredient object instead of a list
#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl Recipe {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    /// Parse a recipe from request JSON (array of ingredients or a lone ingredient)
    pub fn from_payload(value: Value) -> Result<Self, DrinkError> {
        match serde_json::from_value::<RecipeInput>(value) {
            Ok(RecipeInput::Many(list)) => Ok(Self(list)),
            Ok(RecipeInput::One(single)) => Ok(Self(vec![single])),
            Err(e) => Err(DrinkError::InvalidField {
                field: "recipe",
                reason: e.to_string(),
            }),
        }
    }

    /// Text form persisted in the `recipe` column
    pub fn to_storage(&self) -> Result<String, DrinkError> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn from_storage(text: &str) -> Result<Self, DrinkError> {
        Ok(Self(serde_json::from_str(text)?))
    }

    pub fn short(&self) -> Vec<ShortIngredient> {
        self.0
            .iter()
            .map(|i| ShortIngredient {
                color: i.color.clone(),
                parts: i.parts,
            })
            .collect()
    }
}

/// Column widths of the `drinks` table, in characters
pub const TITLE_MAX_CHARS: usize = 80;
pub const RECIPE_MAX_CHARS: usize = 180;

/// Raw row as stored in the `drinks` table
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

/// A persisted drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// Public projection: ingredient names hidden
#[derive(Debug, Clone, Serialize)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

/// Detail projection: full ingredients
#[derive(Debug, Clone, Serialize)]
pub struct DrinkLong {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.short(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.ingredients().to_vec(),
        }
    }
}

impl TryFrom<DrinkRow> for Drink {
    type Error = DrinkError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            recipe: Recipe::from_storage(&row.recipe)?,
        })
    }
}

/// Validated create payload, not yet assigned an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

impl NewDrink {
    /// Validate a POST body `{title, recipe}`
    pub fn from_payload(value: Value) -> Result<Self, DrinkError> {
        let Value::Object(mut map) = value else {
            return Err(DrinkError::NotAnObject);
        };

        let title = match map.remove("title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(DrinkError::MissingField("title"))
            }
            Some(_) => {
                return Err(DrinkError::InvalidField {
                    field: "title",
                    reason: "expected a string".to_string(),
                })
            }
        };

        let recipe = match map.remove("recipe") {
            None | Some(Value::Null) => return Err(DrinkError::MissingField("recipe")),
            Some(v) => Recipe::from_payload(v)?,
        };

        Ok(Self { title, recipe })
    }

    /// Record inserted by a database reset
    pub fn seed() -> Self {
        Self {
            title: "water".to_string(),
            recipe: Recipe::new(vec![Ingredient {
                name: "water".to_string(),
                color: "blue".to_string(),
                parts: 1,
            }]),
        }
    }
}

/// Validated PATCH body; `None` means leave the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

impl DrinkPatch {
    /// Validate a PATCH body. Absent and falsy values (`null`, `false`, `0`, `""`,
    /// `[]`, `{}`) count as "unchanged".
    pub fn from_payload(value: Value) -> Result<Self, DrinkError> {
        let Value::Object(mut map) = value else {
            return Err(DrinkError::NotAnObject);
        };

        let title = match map.remove("title").filter(|v| !is_falsy(v)) {
            None => None,
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(DrinkError::InvalidField {
                    field: "title",
                    reason: "must not be blank".to_string(),
                })
            }
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                return Err(DrinkError::InvalidField {
                    field: "title",
                    reason: "expected a string".to_string(),
                })
            }
        };

        let recipe = match map.remove("recipe").filter(|v| !is_falsy(v)) {
            None => None,
            Some(v) => Some(Recipe::from_payload(v)?),
        };

        Ok(Self { title, recipe })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    /// Apply the set fields onto a loaded drink
    pub fn apply(self, drink: &mut Drink) {
        if let Some(title) = self.title {
            drink.title = title;
        }
        if let Some(recipe) = self.recipe {
            drink.recipe = recipe;
        }
    }
}

/// JSON values a PATCH treats as "not provided"
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_recipe() -> Recipe {
        Recipe::new(vec![
            Ingredient {
                name: "espresso".to_string(),
                color: "brown".to_string(),
                parts: 1,
            },
            Ingredient {
                name: "milk".to_string(),
                color: "white".to_string(),
                parts: 3,
            },
        ])
    }

    #[test]
    fn recipe_storage_round_trip_preserves_order() {
        let recipe = sample_recipe();
        let text = recipe.to_storage().unwrap();
        assert_eq!(Recipe::from_storage(&text).unwrap(), recipe);

        let empty = Recipe::default();
        assert_eq!(Recipe::from_storage(&empty.to_storage().unwrap()).unwrap(), empty);
    }

    #[test]
    fn short_projection_hides_names() {
        let drink = Drink {
            id: 7,
            title: "latte".to_string(),
            recipe: sample_recipe(),
        };

        let short = serde_json::to_value(drink.short()).unwrap();
        assert_eq!(
            short,
            json!({
                "id": 7,
                "title": "latte",
                "recipe": [
                    {"color": "brown", "parts": 1},
                    {"color": "white", "parts": 3}
                ]
            })
        );

        let long = serde_json::to_value(drink.long()).unwrap();
        assert_eq!(long["recipe"][0]["name"], "espresso");
        assert_eq!(long["recipe"][1]["name"], "milk");
    }

    #[test]
    fn new_drink_accepts_single_ingredient_object() {
        let drink = NewDrink::from_payload(json!({
            "title": "water",
            "recipe": {"name": "water", "color": "blue", "parts": 1}
        }))
        .unwrap();
        assert_eq!(drink, NewDrink::seed());
    }

    #[test]
    fn new_drink_rejects_bad_payloads() {
        assert!(matches!(
            NewDrink::from_payload(json!({"recipe": []})),
            Err(DrinkError::MissingField("title"))
        ));
        assert!(matches!(
            NewDrink::from_payload(json!({"title": "  ", "recipe": []})),
            Err(DrinkError::MissingField("title"))
        ));
        assert!(matches!(
            NewDrink::from_payload(json!({"title": "tea"})),
            Err(DrinkError::MissingField("recipe"))
        ));
        assert!(matches!(
            NewDrink::from_payload(json!({"title": "tea", "recipe": "hot water"})),
            Err(DrinkError::InvalidField { field: "recipe", .. })
        ));
        assert!(matches!(
            NewDrink::from_payload(json!({"title": "tea", "recipe": [{"color": "green"}]})),
            Err(DrinkError::InvalidField { field: "recipe", .. })
        ));
        assert!(matches!(
            NewDrink::from_payload(json!(["tea"])),
            Err(DrinkError::NotAnObject)
        ));
    }

    #[test]
    fn patch_treats_empty_values_as_unchanged() {
        let patch = DrinkPatch::from_payload(json!({"title": "", "recipe": []})).unwrap();
        assert!(patch.is_empty());

        let patch = DrinkPatch::from_payload(json!({})).unwrap();
        assert!(patch.is_empty());

        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!({})] {
            let body = json!({"title": falsy.clone(), "recipe": falsy.clone()});
            let patch = DrinkPatch::from_payload(body).unwrap();
            assert!(patch.is_empty(), "value {}", falsy);
        }
    }

    #[test]
    fn patch_rejects_blank_title_like_create() {
        assert!(matches!(
            NewDrink::from_payload(json!({"title": "  ", "recipe": []})),
            Err(DrinkError::MissingField("title"))
        ));
        assert!(matches!(
            DrinkPatch::from_payload(json!({"title": "  "})),
            Err(DrinkError::InvalidField { field: "title", .. })
        ));
        assert!(matches!(
            DrinkPatch::from_payload(json!({"title": true})),
            Err(DrinkError::InvalidField { field: "title", .. })
        ));
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut drink = Drink {
            id: 1,
            title: "latte".to_string(),
            recipe: sample_recipe(),
        };

        DrinkPatch::from_payload(json!({"title": "flat white"}))
            .unwrap()
            .apply(&mut drink);
        assert_eq!(drink.title, "flat white");
        assert_eq!(drink.recipe, sample_recipe());

        DrinkPatch::from_payload(json!({"recipe": [{"name": "tea", "color": "green", "parts": 2}]}))
            .unwrap()
            .apply(&mut drink);
        assert_eq!(drink.title, "flat white");
        assert_eq!(drink.recipe.ingredients().len(), 1);
        assert_eq!(drink.recipe.ingredients()[0].name, "tea");
    }

    #[test]
    fn stored_row_converts_to_drink() {
        let row = DrinkRow {
            id: 3,
            title: "water".to_string(),
            recipe: r#"[{"name": "water", "color": "blue", "parts": 1}]"#.to_string(),
        };
        let drink = Drink::try_from(row).unwrap();
        assert_eq!(drink.recipe, NewDrink::seed().recipe);

        let corrupt = DrinkRow {
            id: 4,
            title: "broken".to_string(),
            recipe: "not json".to_string(),
        };
        assert!(Drink::try_from(corrupt).is_err());
    }
}
