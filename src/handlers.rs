use actix_web::{delete, get, post, put, web, Error, HttpResponse};
use diesel::SqliteConnection;
use failsafe::backoff::EqualJittered;
use failsafe::failure_policy::{ConsecutiveFailures, OrElse, SuccessRateOverTimeWindow};
use failsafe::{CircuitBreaker, StateMachine};
use serde::Serialize;

use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::{Category, Ingredient, Recipe};
use crate::{query, recipes};

pub(crate) type CircuitBreakerType = StateMachine<
    OrElse<SuccessRateOverTimeWindow<EqualJittered>, ConsecutiveFailures<EqualJittered>>,
    (),
>;

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

/// Runs a store operation on the blocking pool behind the circuit breaker.
///
/// Only failures that reflect on the database (see [`StoreError::trips_breaker`])
/// count against the breaker.
async fn run<T, F>(
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
    operation: F,
) -> Result<T, Error>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let result = web::block(move || {
        let outcome = circuit_breaker.call_with(
            |err: &StoreError| err.trips_breaker(),
            || {
                let mut conn = pool.get()?;
                operation(&mut conn)
            },
        );
        match outcome {
            Ok(value) => Ok(value),
            Err(failsafe::Error::Inner(err)) => Err(err),
            Err(failsafe::Error::Rejected) => {
                //breaker is open, sql db is not responsive
                log::warn!("circuit breaker rejected a database call");
                Err(StoreError::Failure("database is unavailable".into()))
            }
        }
    })
    .await??;
    Ok(result)
}

#[get("/categories")]
async fn get_all_categories(
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let categories = run(pool, circuit_breaker, query::find_all_categories).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[post("/categories")]
async fn create_category(
    category: web::Json<Category>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let category = category.into_inner();
    let category = run(pool, circuit_breaker, move |conn| {
        query::create_category(category, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[get("/categories/{id}")]
async fn get_category(
    category_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let category_id = category_id.into_inner();
    let category = run(pool, circuit_breaker, move |conn| {
        query::find_category(category_id, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[put("/categories/{id}")]
async fn update_category(
    category_id: web::Path<i32>,
    category: web::Json<Category>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let category_id = category_id.into_inner();
    let category = category.into_inner();
    let category = run(pool, circuit_breaker, move |conn| {
        query::update_category(category_id, category, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/categories/{id}")]
async fn delete_category(
    category_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let category_id = category_id.into_inner();
    run(pool, circuit_breaker, move |conn| {
        query::delete_category(category_id, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(Message {
        message: "Category deleted successfully",
    }))
}

#[get("/ingredients")]
async fn get_all_ingredients(
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let ingredients = run(pool, circuit_breaker, query::find_all_ingredients).await?;
    Ok(HttpResponse::Ok().json(ingredients))
}

#[post("/ingredients")]
async fn create_ingredient(
    ingredient: web::Json<Ingredient>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let ingredient = ingredient.into_inner();
    let ingredient = run(pool, circuit_breaker, move |conn| {
        query::create_ingredient(ingredient, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

#[get("/ingredients/{id}")]
async fn get_ingredient(
    ingredient_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let ingredient_id = ingredient_id.into_inner();
    let ingredient = run(pool, circuit_breaker, move |conn| {
        query::find_ingredient(ingredient_id, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

#[put("/ingredients/{id}")]
async fn update_ingredient(
    ingredient_id: web::Path<i32>,
    ingredient: web::Json<Ingredient>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let ingredient_id = ingredient_id.into_inner();
    let ingredient = ingredient.into_inner();
    let ingredient = run(pool, circuit_breaker, move |conn| {
        query::update_ingredient(ingredient_id, ingredient, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

#[delete("/ingredients/{id}")]
async fn delete_ingredient(
    ingredient_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let ingredient_id = ingredient_id.into_inner();
    run(pool, circuit_breaker, move |conn| {
        query::delete_ingredient(ingredient_id, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(Message {
        message: "Ingredient deleted successfully",
    }))
}

#[get("/recipes")]
async fn get_all_recipes(
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let recipes = run(pool, circuit_breaker, recipes::find_all_recipes).await?;
    Ok(HttpResponse::Ok().json(recipes))
}

#[post("/recipes")]
async fn create_recipe(
    recipe: web::Json<Recipe>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let recipe = recipe.into_inner();
    let recipe = run(pool, circuit_breaker, move |conn| {
        recipes::create_recipe(recipe, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(recipe))
}

/// Search filters. `ingredients` may repeat:
/// `/recipes/search?ingredients=flour&ingredients=sugar&category=dessert`.
#[derive(Debug, Default, PartialEq)]
struct SearchParams {
    ingredients: Vec<String>,
    category: String,
}

impl SearchParams {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = SearchParams::default();
        // values are matched exactly as stored, so they are not trimmed
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "ingredients" => params.ingredients.push(value),
                "category" => params.category = value,
                _ => {}
            }
        }
        params
    }
}

// registered before /recipes/{id} so "search" is never parsed as an id
#[get("/recipes/search")]
async fn search_recipes(
    pairs: web::Query<Vec<(String, String)>>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let params = SearchParams::from_pairs(pairs.into_inner());
    let recipes = run(pool, circuit_breaker, move |conn| {
        recipes::search_recipes(&params.ingredients, &params.category, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(recipes))
}

#[get("/recipes/{id}")]
async fn get_recipe(
    recipe_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let recipe_id = recipe_id.into_inner();
    let recipe = run(pool, circuit_breaker, move |conn| {
        recipes::find_recipe(recipe_id, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(recipe))
}

#[put("/recipes/{id}")]
async fn update_recipe(
    recipe_id: web::Path<i32>,
    recipe: web::Json<Recipe>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let recipe_id = recipe_id.into_inner();
    let recipe = recipe.into_inner();
    let recipe = run(pool, circuit_breaker, move |conn| {
        recipes::update_recipe(recipe_id, recipe, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(recipe))
}

#[delete("/recipes/{id}")]
async fn delete_recipe(
    recipe_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    circuit_breaker: web::Data<CircuitBreakerType>,
) -> Result<HttpResponse, Error> {
    let recipe_id = recipe_id.into_inner();
    run(pool, circuit_breaker, move |conn| {
        recipes::delete_recipe(recipe_id, conn)
    })
    .await?;
    Ok(HttpResponse::Ok().json(Message {
        message: "Recipe deleted successfully",
    }))
}

pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_all_categories)
        .service(create_category)
        .service(get_category)
        .service(update_category)
        .service(delete_category)
        .service(get_all_ingredients)
        .service(create_ingredient)
        .service(get_ingredient)
        .service(update_ingredient)
        .service(delete_ingredient)
        .service(get_all_recipes)
        .service(create_recipe)
        .service(search_recipes)
        .service(get_recipe)
        .service(update_recipe)
        .service(delete_recipe);
}
