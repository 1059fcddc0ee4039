use crate::error::StoreError;
use crate::models::{Category, Ingredient};
use diesel::prelude::*;

pub(crate) fn find_all_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, StoreError> {
    use crate::schema::categories::dsl::*;

    Ok(categories.order(id).load::<Category>(conn)?)
}

pub(crate) fn find_category(
    category_id: i32,
    conn: &mut SqliteConnection,
) -> Result<Category, StoreError> {
    use crate::schema::categories::dsl::*;

    Ok(categories.find(category_id).first::<Category>(conn)?)
}

pub(crate) fn create_category(
    category: Category,
    conn: &mut SqliteConnection,
) -> Result<Category, StoreError> {
    use crate::schema::categories::dsl::*;

    let category_id = diesel::insert_into(categories)
        .values(name.eq(&category.name))
        .returning(id)
        .get_result::<i32>(conn)?;
    Ok(Category {
        id: category_id,
        ..category
    })
}

pub(crate) fn update_category(
    category_id: i32,
    category: Category,
    conn: &mut SqliteConnection,
) -> Result<Category, StoreError> {
    use crate::schema::categories::dsl::*;

    let updated = diesel::update(categories.find(category_id))
        .set(name.eq(&category.name))
        .execute(conn)?;
    if updated == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(Category {
        id: category_id,
        ..category
    })
}

pub(crate) fn delete_category(category_id: i32, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    use crate::schema::categories::dsl::*;

    let deleted = diesel::delete(categories.find(category_id)).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub(crate) fn find_all_ingredients(
    conn: &mut SqliteConnection,
) -> Result<Vec<Ingredient>, StoreError> {
    use crate::schema::ingredients::dsl::*;

    Ok(ingredients.order(id).load::<Ingredient>(conn)?)
}

pub(crate) fn find_ingredient(
    ingredient_id: i32,
    conn: &mut SqliteConnection,
) -> Result<Ingredient, StoreError> {
    use crate::schema::ingredients::dsl::*;

    Ok(ingredients.find(ingredient_id).first::<Ingredient>(conn)?) //primary key, so at most one row
}

pub(crate) fn create_ingredient(
    ingredient: Ingredient,
    conn: &mut SqliteConnection,
) -> Result<Ingredient, StoreError> {
    use crate::schema::ingredients::dsl::*;

    let ingredient_id = diesel::insert_into(ingredients)
        .values((name.eq(&ingredient.name), amount.eq(&ingredient.amount)))
        .returning(id)
        .get_result::<i32>(conn)?;
    Ok(Ingredient {
        id: ingredient_id,
        ..ingredient
    })
}

pub(crate) fn update_ingredient(
    ingredient_id: i32,
    ingredient: Ingredient,
    conn: &mut SqliteConnection,
) -> Result<Ingredient, StoreError> {
    use crate::schema::ingredients::dsl::*;

    let updated = diesel::update(ingredients.find(ingredient_id))
        .set((name.eq(&ingredient.name), amount.eq(&ingredient.amount)))
        .execute(conn)?;
    if updated == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(Ingredient {
        id: ingredient_id,
        ..ingredient
    })
}

pub(crate) fn delete_ingredient(
    ingredient_id: i32,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    use crate::schema::ingredients::dsl::*;

    let deleted = diesel::delete(ingredients.find(ingredient_id)).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
