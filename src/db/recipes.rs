use sqlx::{PgConnection, PgPool};

use crate::models::{Recipe, RecipeSummary};
use crate::recipe::payload::RecipeFields;

/// Restricts a recipe listing to recipes carrying any of the given tags and
/// any of the given ingredients. `None` means no restriction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

pub async fn list(
    pool: &PgPool,
    owner: i64,
    filter: &RecipeFilter,
) -> Result<Vec<RecipeSummary>, sqlx::Error> {
    sqlx::query_as::<_, RecipeSummary>(
        "SELECT r.id, r.title, r.time_minutes, r.price, r.link,
                COALESCE(
                    (SELECT array_agg(rt.tag_id ORDER BY rt.tag_id)
                     FROM recipe_tags rt WHERE rt.recipe_id = r.id),
                    '{}'
                ) AS tags,
                COALESCE(
                    (SELECT array_agg(ri.ingredient_id ORDER BY ri.ingredient_id)
                     FROM recipe_ingredients ri WHERE ri.recipe_id = r.id),
                    '{}'
                ) AS ingredients
         FROM recipes r
         WHERE r.user_id = $1
           AND ($2::BIGINT[] IS NULL OR EXISTS (
               SELECT 1 FROM recipe_tags rt WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
           ))
           AND ($3::BIGINT[] IS NULL OR EXISTS (
               SELECT 1 FROM recipe_ingredients ri
               WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)
           ))
         ORDER BY r.id DESC",
    )
    .bind(owner)
    .bind(filter.tags.as_deref())
    .bind(filter.ingredients.as_deref())
    .fetch_all(pool)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: i64,
    owner: i64,
) -> Result<Option<Recipe>, sqlx::Error> {
    sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .fetch_optional(executor)
        .await
}

/// Scoped lookup that locks the row until the surrounding transaction ends.
pub async fn find_for_update(
    conn: &mut PgConnection,
    id: i64,
    owner: i64,
) -> Result<Option<Recipe>, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        "SELECT * FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    owner: i64,
    fields: &RecipeFields,
) -> Result<Recipe, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        "INSERT INTO recipes (user_id, title, time_minutes, price, link)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(owner)
    .bind(&fields.title)
    .bind(fields.time_minutes)
    .bind(fields.price)
    .bind(fields.link.as_deref())
    .fetch_one(conn)
    .await
}

/// Overwrites the scalar columns. `user_id` and `image` are never touched here.
pub async fn update(
    conn: &mut PgConnection,
    id: i64,
    owner: i64,
    fields: &RecipeFields,
) -> Result<Recipe, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        "UPDATE recipes
         SET title = $3, time_minutes = $4, price = $5, link = $6, updated_at = now()
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .bind(&fields.title)
    .bind(fields.time_minutes)
    .bind(fields.price)
    .bind(fields.link.as_deref())
    .fetch_one(conn)
    .await
}

pub async fn set_image(
    conn: &mut PgConnection,
    id: i64,
    owner: i64,
    image: &str,
) -> Result<Recipe, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        "UPDATE recipes SET image = $3, updated_at = now()
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .bind(image)
    .fetch_one(conn)
    .await
}

/// Replaces the recipe's tag set.
pub async fn set_tags(
    conn: &mut PgConnection,
    recipe_id: i64,
    tag_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "INSERT INTO recipe_tags (recipe_id, tag_id)
         SELECT $1, unnest($2::BIGINT[])
         ON CONFLICT DO NOTHING",
    )
    .bind(recipe_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Replaces the recipe's ingredient set.
pub async fn set_ingredients(
    conn: &mut PgConnection,
    recipe_id: i64,
    ingredient_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id)
         SELECT $1, unnest($2::BIGINT[])
         ON CONFLICT DO NOTHING",
    )
    .bind(recipe_id)
    .bind(ingredient_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Deletes a scoped recipe. Returns `None` when nothing matched, otherwise the
/// image path the row held.
pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: i64,
    owner: i64,
) -> Result<Option<Option<String>>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>(
        "DELETE FROM recipes WHERE id = $1 AND user_id = $2 RETURNING image",
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(executor)
    .await
}
