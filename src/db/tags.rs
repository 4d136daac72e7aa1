use sqlx::{PgConnection, PgPool};

use crate::models::Tag;

/// Tags owned by `owner`, ordered by name descending. With `assigned_only`,
/// only tags attached to at least one recipe.
pub async fn list(pool: &PgPool, owner: i64, assigned_only: bool) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        "SELECT * FROM tags t
         WHERE t.user_id = $1
           AND ($2 = false OR EXISTS (SELECT 1 FROM recipe_tags rt WHERE rt.tag_id = t.id))
         ORDER BY t.name DESC, t.id DESC",
    )
    .bind(owner)
    .bind(assigned_only)
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &PgPool, owner: i64, name: &str) -> Result<Tag, sqlx::Error> {
    sqlx::query_as::<_, Tag>("INSERT INTO tags (user_id, name) VALUES ($1, $2) RETURNING *")
        .bind(owner)
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64, owner: i64) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    owner: i64,
    name: &str,
) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        "UPDATE tags SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Returns false when no tag with this id belongs to `owner`.
pub async fn delete(pool: &PgPool, id: i64, owner: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The subset of `ids` that belong to `owner`.
pub async fn owned_ids(
    conn: &mut PgConnection,
    owner: i64,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)")
        .bind(owner)
        .bind(ids)
        .fetch_all(conn)
        .await
}

pub async fn list_for_recipe(
    conn: &mut PgConnection,
    recipe_id: i64,
) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        "SELECT t.* FROM tags t
         JOIN recipe_tags rt ON rt.tag_id = t.id
         WHERE rt.recipe_id = $1
         ORDER BY t.id",
    )
    .bind(recipe_id)
    .fetch_all(conn)
    .await
}
