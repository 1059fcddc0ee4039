//! Recipe persistence and search.
//!
//! A recipe is stored as one `recipes` row plus its associations: one
//! `recipe_ingredients` row per ingredient name and at most one
//! `recipe_categories` row. Writes touch all three tables inside a single
//! transaction, so readers never see a recipe with a partial ingredient set.

use std::collections::HashMap;

use diesel::prelude::*;

use crate::error::StoreError;
use crate::models::{Recipe, RecipeCategory, RecipeFields, RecipeIngredient, RecipeRow, RecipeSummary};
use crate::schema::{recipe_categories, recipe_ingredients, recipes};

pub(crate) fn find_all_recipes(conn: &mut SqliteConnection) -> Result<Vec<Recipe>, StoreError> {
    let rows = recipes::table
        .order(recipes::id)
        .select(RecipeRow::as_select())
        .load(conn)?;
    with_associations(rows, conn)
}

pub(crate) fn find_recipe(recipe_id: i32, conn: &mut SqliteConnection) -> Result<Recipe, StoreError> {
    let row = recipes::table
        .find(recipe_id)
        .select(RecipeRow::as_select())
        .first(conn)?;
    with_associations(vec![row], conn)?
        .pop()
        .ok_or(StoreError::NotFound)
}

/// Inserts the recipe and its associations; nothing is kept if any insert fails.
pub(crate) fn create_recipe(recipe: Recipe, conn: &mut SqliteConnection) -> Result<Recipe, StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let recipe_id = diesel::insert_into(recipes::table)
            .values(RecipeFields::from(&recipe))
            .returning(recipes::id)
            .get_result::<i32>(conn)?;
        insert_associations(recipe_id, &recipe, conn)?;

        log::debug!(
            "created recipe {} with {} ingredients",
            recipe_id,
            recipe.ingredients.len()
        );
        Ok(Recipe { id: recipe_id, ..recipe })
    })
}

/// Rewrites the recipe row and replaces every association with the new lists.
///
/// An unknown `recipe_id` is reported as [`StoreError::NotFound`] and the
/// transaction is rolled back.
pub(crate) fn update_recipe(
    recipe_id: i32,
    recipe: Recipe,
    conn: &mut SqliteConnection,
) -> Result<Recipe, StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let updated = diesel::update(recipes::table.find(recipe_id))
            .set(RecipeFields::from(&recipe))
            .execute(conn)?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        delete_associations(recipe_id, conn)?;
        insert_associations(recipe_id, &recipe, conn)?;

        log::debug!(
            "updated recipe {} with {} ingredients",
            recipe_id,
            recipe.ingredients.len()
        );
        Ok(Recipe { id: recipe_id, ..recipe })
    })
}

pub(crate) fn delete_recipe(recipe_id: i32, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let deleted = diesel::delete(recipes::table.find(recipe_id)).execute(conn)?;
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        delete_associations(recipe_id, conn)?;

        log::debug!("deleted recipe {}", recipe_id);
        Ok(())
    })
}

/// Recipes linked to any of `ingredients` and, when `category` is non-empty,
/// filed under exactly that category. Empty filters are skipped.
pub(crate) fn search_recipes(
    ingredients: &[String],
    category: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<RecipeSummary>, StoreError> {
    let mut query = recipes::table
        .select((recipes::id, recipes::name))
        .order(recipes::id)
        .into_boxed();

    if !ingredients.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient.eq_any(ingredients))
                    .select(recipe_ingredients::recipe_id),
            ),
        );
    }

    if !category.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_categories::table
                    .filter(recipe_categories::category.eq(category))
                    .select(recipe_categories::recipe_id),
            ),
        );
    }

    Ok(query.load::<RecipeSummary>(conn)?)
}

fn insert_associations(
    recipe_id: i32,
    recipe: &Recipe,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    let rows: Vec<RecipeIngredient> = recipe
        .ingredients
        .iter()
        .map(|ingredient| RecipeIngredient {
            recipe_id,
            ingredient,
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&rows)
            .execute(conn)?;
    }

    if !recipe.category.is_empty() {
        diesel::insert_into(recipe_categories::table)
            .values(RecipeCategory {
                recipe_id,
                category: &recipe.category,
            })
            .execute(conn)?;
    }
    Ok(())
}

fn delete_associations(recipe_id: i32, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    diesel::delete(recipe_categories::table.find(recipe_id)).execute(conn)?;
    Ok(())
}

// two queries for the whole batch instead of two per recipe
fn with_associations(
    rows: Vec<RecipeRow>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Recipe>, StoreError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

    let mut ingredients: HashMap<i32, Vec<String>> = HashMap::new();
    for (recipe_id, ingredient) in recipe_ingredients::table
        .filter(recipe_ingredients::recipe_id.eq_any(&ids))
        .select((recipe_ingredients::recipe_id, recipe_ingredients::ingredient))
        .load::<(i32, String)>(conn)?
    {
        ingredients.entry(recipe_id).or_default().push(ingredient);
    }

    let mut categories: HashMap<i32, String> = recipe_categories::table
        .filter(recipe_categories::recipe_id.eq_any(&ids))
        .select((recipe_categories::recipe_id, recipe_categories::category))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let names = ingredients.remove(&row.id).unwrap_or_default();
            let category = categories.remove(&row.id).unwrap_or_default();
            row.into_recipe(names, category)
        })
        .collect())
}
