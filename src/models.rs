use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{categories, ingredients, recipe_categories, recipe_ingredients, recipes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct Category {
    #[serde(default)]
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct Ingredient {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub amount: String, //free text, e.g. "200 g"
}

/// A recipe with its ingredient names and category label.
///
/// `id` is assigned by the store; whatever a client sends is ignored.
/// An empty `category` means the recipe has no category row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Recipe {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub category: String,
}

/// Search result row: only the recipe's identifier and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable)]
pub(crate) struct RecipeSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct RecipeRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl RecipeRow {
    pub(crate) fn into_recipe(self, ingredients: Vec<String>, category: String) -> Recipe {
        Recipe {
            id: self.id,
            name: self.name,
            description: self.description,
            ingredients,
            category,
        }
    }
}

// mutable columns of a recipe row; None clears the description on update
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RecipeFields<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

impl<'a> From<&'a Recipe> for RecipeFields<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        RecipeFields {
            name: &recipe.name,
            description: recipe.description.as_deref(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub(crate) struct RecipeIngredient<'a> {
    pub recipe_id: i32,   //foreign key
    pub ingredient: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipe_categories)]
pub(crate) struct RecipeCategory<'a> {
    pub recipe_id: i32, //foreign key
    pub category: &'a str,
}
