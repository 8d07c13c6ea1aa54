pub mod drink;

pub use drink::{
    Drink, DrinkError, DrinkLong, DrinkPatch, DrinkShort, Ingredient, NewDrink, Recipe,
    RECIPE_MAX_CHARS, TITLE_MAX_CHARS,
};
