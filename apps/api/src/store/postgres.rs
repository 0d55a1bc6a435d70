use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use tracing::info;

use crate::errors::AppError;
use crate::models::fridge::DEFAULT_FRIDGE_COLOR;
use crate::models::item::{check_quantity, quantity_too_large, ItemRow, MAX_QUANTITY};
use crate::models::shopping::ShoppingRow;
use crate::models::{DatedItem, Fridge, ItemUpdate, NewFridge, NewItem, ShoppingEntry};
use crate::shopping::list::entry_key;
use crate::store::{fridge_not_found, item_not_found, AddOutcome, InventoryStore};

const FRIDGE_SELECT: &str = r#"
    SELECT f.id, f.owner, f.name, f.color,
           COALESCE(
               array_agg(m.user_id ORDER BY m.user_id) FILTER (WHERE m.user_id IS NOT NULL),
               '{}'
           ) AS shared_with
    FROM fridges f
    LEFT JOIN fridge_members m ON m.fridge_id = f.id
"#;

const ITEM_COLUMNS: &str = "fridge_id, item_id, name, expiration_date, quantity, details";

#[derive(FromRow)]
struct UpsertedItemRow {
    #[sqlx(flatten)]
    item: ItemRow,
    inserted: bool,
}

impl From<UpsertedItemRow> for AddOutcome {
    fn from(upserted: UpsertedItemRow) -> Self {
        AddOutcome {
            item: upserted.item.into(),
            created: upserted.inserted,
        }
    }
}

/// PostgreSQL-backed store. Expects the schema from `db::ensure_schema`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_db_quantity(quantity: u32) -> Result<i32, AppError> {
    // MAX_QUANTITY is i32::MAX, so the cast cannot wrap.
    check_quantity(quantity).map(|q| q as i32)
}

fn overflow_error(current: Option<i32>, added: i32) -> AppError {
    let current = current.map_or(0, |q| u64::try_from(q).unwrap_or(0));
    quantity_too_large(current + u64::try_from(added).unwrap_or(0))
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn list_fridges(&self, user_id: &str) -> Result<Vec<Fridge>, AppError> {
        let sql = format!(
            "{FRIDGE_SELECT}
             WHERE f.owner = $1
                OR EXISTS (SELECT 1 FROM fridge_members x WHERE x.fridge_id = f.id AND x.user_id = $1)
             GROUP BY f.id
             ORDER BY f.id"
        );
        let fridges = sqlx::query_as::<_, Fridge>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(fridges)
    }

    async fn get_fridge(&self, fridge_id: i64) -> Result<Fridge, AppError> {
        let sql = format!("{FRIDGE_SELECT} WHERE f.id = $1 GROUP BY f.id");
        sqlx::query_as::<_, Fridge>(&sql)
            .bind(fridge_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| fridge_not_found(fridge_id))
    }

    async fn create_fridge(&self, new: NewFridge) -> Result<Fridge, AppError> {
        let color = new.color.unwrap_or_else(|| DEFAULT_FRIDGE_COLOR.to_string());
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO fridges (owner, name, color) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&new.owner)
        .bind(&new.name)
        .bind(&color)
        .fetch_one(&self.pool)
        .await?;

        info!("Created fridge {id} for {}", new.owner);
        Ok(Fridge {
            id,
            owner: new.owner,
            name: new.name,
            color,
            shared_with: Vec::new(),
        })
    }

    async fn delete_fridge(&self, fridge_id: i64) -> Result<(), AppError> {
        // Members and items go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM fridges WHERE id = $1")
            .bind(fridge_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(fridge_not_found(fridge_id));
        }
        Ok(())
    }

    async fn share_fridge(&self, fridge_id: i64, user_id: &str) -> Result<Fridge, AppError> {
        let fridge = self.get_fridge(fridge_id).await?;
        if fridge.is_visible_to(user_id) {
            return Ok(fridge);
        }
        sqlx::query(
            "INSERT INTO fridge_members (fridge_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(fridge_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        self.get_fridge(fridge_id).await
    }

    async fn list_items(&self, fridge_id: i64) -> Result<Vec<DatedItem>, AppError> {
        self.get_fridge(fridge_id).await?;
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE fridge_id = $1 ORDER BY seq"
        ))
        .bind(fridge_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DatedItem::from).collect())
    }

    async fn get_item(&self, fridge_id: i64, item_id: i64) -> Result<DatedItem, AppError> {
        self.get_fridge(fridge_id).await?;
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE fridge_id = $1 AND item_id = $2"
        ))
        .bind(fridge_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(DatedItem::from)
            .ok_or_else(|| item_not_found(fridge_id, item_id))
    }

    async fn add_item(&self, fridge_id: i64, new: NewItem) -> Result<AddOutcome, AppError> {
        self.get_fridge(fridge_id).await?;
        let quantity = to_db_quantity(new.quantity.unwrap_or(1))?;

        // xmax is 0 only for freshly inserted tuples. The WHERE guard leaves
        // the row untouched, and returns nothing, when the sum would overflow.
        let upserted: Option<UpsertedItemRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO items (fridge_id, item_id, name, expiration_date, quantity, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (fridge_id, item_id)
                DO UPDATE SET quantity = items.quantity + EXCLUDED.quantity
                WHERE items.quantity::bigint + EXCLUDED.quantity <= $7
            RETURNING {ITEM_COLUMNS}, (xmax = 0) AS inserted
            "#
        ))
        .bind(fridge_id)
        .bind(new.id)
        .bind(&new.name)
        .bind(&new.expiration_date)
        .bind(quantity)
        .bind(Json(&new.details))
        .bind(i64::from(MAX_QUANTITY))
        .fetch_optional(&self.pool)
        .await?;

        match upserted {
            Some(upserted) => Ok(upserted.into()),
            None => {
                let current: Option<i32> = sqlx::query_scalar(
                    "SELECT quantity FROM items WHERE fridge_id = $1 AND item_id = $2",
                )
                .bind(fridge_id)
                .bind(new.id)
                .fetch_optional(&self.pool)
                .await?;
                Err(overflow_error(current, quantity))
            }
        }
    }

    async fn update_item(
        &self,
        fridge_id: i64,
        item_id: i64,
        update: ItemUpdate,
    ) -> Result<DatedItem, AppError> {
        self.get_fridge(fridge_id).await?;
        let quantity = update.quantity.map(to_db_quantity).transpose()?;
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            r#"
            UPDATE items
            SET name = COALESCE($3, name),
                expiration_date = COALESCE($4, expiration_date),
                quantity = COALESCE($5, quantity)
            WHERE fridge_id = $1 AND item_id = $2
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(fridge_id)
        .bind(item_id)
        .bind(update.name)
        .bind(update.expiration_date)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;
        row.map(DatedItem::from)
            .ok_or_else(|| item_not_found(fridge_id, item_id))
    }

    async fn delete_items(&self, fridge_id: i64, item_ids: &[i64]) -> Result<usize, AppError> {
        self.get_fridge(fridge_id).await?;
        let result = sqlx::query("DELETE FROM items WHERE fridge_id = $1 AND item_id = ANY($2)")
            .bind(fridge_id)
            .bind(item_ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }

    async fn list_shopping(&self, user_id: &str) -> Result<Vec<ShoppingEntry>, AppError> {
        let rows: Vec<ShoppingRow> = sqlx::query_as(
            "SELECT name, quantity FROM shopping_entries WHERE user_id = $1 ORDER BY seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ShoppingEntry::from).collect())
    }

    async fn add_shopping(
        &self,
        user_id: &str,
        name: &str,
        quantity: u32,
    ) -> Result<ShoppingEntry, AppError> {
        let quantity = to_db_quantity(quantity)?;
        let key = entry_key(name);
        let row: Option<ShoppingRow> = sqlx::query_as(
            r#"
            INSERT INTO shopping_entries (user_id, name_key, name, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, name_key)
                DO UPDATE SET quantity = shopping_entries.quantity + EXCLUDED.quantity
                WHERE shopping_entries.quantity::bigint + EXCLUDED.quantity <= $5
            RETURNING name, quantity
            "#,
        )
        .bind(user_id)
        .bind(&key)
        .bind(name.trim())
        .bind(quantity)
        .bind(i64::from(MAX_QUANTITY))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                let current: Option<i32> = sqlx::query_scalar(
                    "SELECT quantity FROM shopping_entries WHERE user_id = $1 AND name_key = $2",
                )
                .bind(user_id)
                .bind(&key)
                .fetch_optional(&self.pool)
                .await?;
                Err(overflow_error(current, quantity))
            }
        }
    }

    async fn remove_shopping(&self, user_id: &str, name: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM shopping_entries WHERE user_id = $1 AND name_key = $2")
                .bind(user_id)
                .bind(entry_key(name))
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_shopping(&self, user_id: &str) -> Result<usize, AppError> {
        let result = sqlx::query("DELETE FROM shopping_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}
