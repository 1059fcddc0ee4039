diesel::table! {
    categories (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Integer,
        name -> Text,
        amount -> Text,
    }
}

diesel::table! {
    recipes (id) {
        id -> Integer,
        name -> Text,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    recipe_ingredients (recipe_id, ingredient) {
        recipe_id -> Integer,
        ingredient -> Text,
    }
}

diesel::table! {
    recipe_categories (recipe_id) {
        recipe_id -> Integer,
        category -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    categories,
    ingredients,
    recipes,
    recipe_ingredients,
    recipe_categories,
);
