use crate::DbError;
use core_types::{Client, ExchangeRate, Item, ItemDraft, NewClient, NewExchangeRate, NewUser, User};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Row};

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// The shortened client record embedded in item responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: i64,
    pub client_code: String,
    pub name: String,
    pub phone: String,
}

impl From<&Client> for ClientSummary {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            client_code: client.client_code.clone(),
            name: client.name.clone(),
            phone: client.phone.clone(),
        }
    }
}

/// An item joined with the client that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemWithClient {
    #[serde(flatten)]
    pub item: Item,
    pub client: ClientSummary,
}

/// A client row as shown in the paginated listing, with its item count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOverview {
    #[serde(flatten)]
    pub client: Client,
    pub items_count: i64,
}

/// A client together with all of its items, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub items: Vec<Item>,
}

const CLIENT_COLUMNS: &str = "id, client_code, name, phone, email, address, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, client_id, product_code, arrival_date, quantity, weight, \
     price_usd, exchange_rate, amount_kzt, cost_price, margin, notes, created_at, updated_at";
const RATE_COLUMNS: &str = "id, currency_from, currency_to, rate, date, created_at";

fn item_with_client_from_row(row: &PgRow) -> Result<ItemWithClient, sqlx::Error> {
    let item = Item::from_row(row)?;
    let client = ClientSummary {
        id: row.try_get("client_ref_id")?,
        client_code: row.try_get("client_ref_code")?,
        name: row.try_get("client_ref_name")?,
        phone: row.try_get("client_ref_phone")?,
    };
    Ok(ItemWithClient { item, client })
}

fn user_from_row(row: &PgRow) -> Result<User, DbError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse()?,
        client_id: row.try_get("client_id")?,
        created_at: row.try_get("created_at")?,
    })
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==========================================================================
    // Clients
    // ==========================================================================

    /// Fetches one page of clients (newest first) with their item counts,
    /// plus the total row count for the pagination envelope. The optional
    /// search matches name, client code, or phone as a case-insensitive
    /// substring.
    pub async fn list_clients(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<(Vec<ClientOverview>, i64), DbError> {
        let pattern = search.map(|s| format!("%{s}%"));
        let offset = (page - 1) * limit;

        let rows = sqlx::query(
            r#"
            SELECT c.id, c.client_code, c.name, c.phone, c.email, c.address,
                   c.created_at, c.updated_at,
                   COUNT(i.id) AS items_count
            FROM clients AS c
            LEFT JOIN items AS i ON i.client_id = c.id
            WHERE ($1::TEXT IS NULL
                   OR c.name ILIKE $1 OR c.client_code ILIKE $1 OR c.phone ILIKE $1)
            GROUP BY c.id
            ORDER BY c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut clients = Vec::with_capacity(rows.len());
        for row in &rows {
            clients.push(ClientOverview {
                client: Client::from_row(row)?,
                items_count: row.try_get("items_count")?,
            });
        }

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM clients AS c
            WHERE ($1::TEXT IS NULL
                   OR c.name ILIKE $1 OR c.client_code ILIKE $1 OR c.phone ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((clients, total))
    }

    /// Fetches a single client together with all of its items, newest first.
    pub async fn get_client_detail(&self, id: i64) -> Result<Option<ClientDetail>, DbError> {
        let Some(client) = self.find_client(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE client_id = $1 ORDER BY created_at DESC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ClientDetail { client, items }))
    }

    pub async fn find_client(&self, id: i64) -> Result<Option<Client>, DbError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn find_client_by_code(&self, client_code: &str) -> Result<Option<Client>, DbError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE client_code = $1"
        ))
        .bind(client_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    /// Checks whether a client code is already in use, optionally ignoring
    /// one client id (the row being updated).
    pub async fn client_code_taken(
        &self,
        client_code: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DbError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM clients
                WHERE client_code = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(client_code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create_client(&self, new: &NewClient) -> Result<Client, DbError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (client_code, name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(&new.client_code)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(new.email.as_deref())
        .bind(new.address.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    /// Replaces a client's fields. Returns `None` when the id does not exist.
    pub async fn update_client(
        &self,
        id: i64,
        new: &NewClient,
    ) -> Result<Option<Client>, DbError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET client_code = $1, name = $2, phone = $3, email = $4, address = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(&new.client_code)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(new.email.as_deref())
        .bind(new.address.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    /// Deletes a client; dependent items go with it via the foreign key
    /// cascade. Returns `false` when the id does not exist.
    pub async fn delete_client(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==========================================================================
    // Items
    // ==========================================================================

    /// Fetches one page of items (newest first) with their owning clients,
    /// plus the total row count. Optional filters: exact client id and
    /// case-insensitive product-code substring.
    pub async fn list_items(
        &self,
        page: i64,
        limit: i64,
        client_id: Option<i64>,
        product_code: Option<&str>,
    ) -> Result<(Vec<ItemWithClient>, i64), DbError> {
        let code_pattern = product_code.map(|s| format!("%{s}%"));
        let offset = (page - 1) * limit;

        let rows = sqlx::query(
            r#"
            SELECT i.id, i.client_id, i.product_code, i.arrival_date, i.quantity,
                   i.weight, i.price_usd, i.exchange_rate, i.amount_kzt,
                   i.cost_price, i.margin, i.notes, i.created_at, i.updated_at,
                   c.id AS client_ref_id, c.client_code AS client_ref_code,
                   c.name AS client_ref_name, c.phone AS client_ref_phone
            FROM items AS i
            JOIN clients AS c ON c.id = i.client_id
            WHERE ($1::BIGINT IS NULL OR i.client_id = $1)
              AND ($2::TEXT IS NULL OR i.product_code ILIKE $2)
            ORDER BY i.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(client_id)
        .bind(code_pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(item_with_client_from_row(row)?);
        }

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM items AS i
            WHERE ($1::BIGINT IS NULL OR i.client_id = $1)
              AND ($2::TEXT IS NULL OR i.product_code ILIKE $2)
            "#,
        )
        .bind(client_id)
        .bind(code_pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn find_item(&self, id: i64) -> Result<Option<ItemWithClient>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT i.id, i.client_id, i.product_code, i.arrival_date, i.quantity,
                   i.weight, i.price_usd, i.exchange_rate, i.amount_kzt,
                   i.cost_price, i.margin, i.notes, i.created_at, i.updated_at,
                   c.id AS client_ref_id, c.client_code AS client_ref_code,
                   c.name AS client_ref_name, c.phone AS client_ref_phone
            FROM items AS i
            JOIN clients AS c ON c.id = i.client_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(item_with_client_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn create_item(&self, draft: &ItemDraft) -> Result<Item, DbError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (client_id, product_code, arrival_date, quantity, weight,
                               price_usd, exchange_rate, amount_kzt, cost_price, margin, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(draft.client_id)
        .bind(&draft.product_code)
        .bind(draft.arrival_date)
        .bind(draft.quantity)
        .bind(draft.weight)
        .bind(draft.price_usd)
        .bind(draft.exchange_rate)
        .bind(draft.amount_kzt)
        .bind(draft.cost_price)
        .bind(draft.margin)
        .bind(draft.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    /// Replaces an item's fields. Returns `None` when the id does not exist.
    pub async fn update_item(&self, id: i64, draft: &ItemDraft) -> Result<Option<Item>, DbError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET client_id = $1, product_code = $2, arrival_date = $3, quantity = $4,
                weight = $5, price_usd = $6, exchange_rate = $7, amount_kzt = $8,
                cost_price = $9, margin = $10, notes = $11, updated_at = NOW()
            WHERE id = $12
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(draft.client_id)
        .bind(&draft.product_code)
        .bind(draft.arrival_date)
        .bind(draft.quantity)
        .bind(draft.weight)
        .bind(draft.price_usd)
        .bind(draft.exchange_rate)
        .bind(draft.amount_kzt)
        .bind(draft.cost_price)
        .bind(draft.margin)
        .bind(draft.notes.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Deletes an item. Returns `false` when the id does not exist.
    pub async fn delete_item(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetches the full item snapshot the analytics engine aggregates over.
    pub async fn items_snapshot(&self) -> Result<Vec<Item>, DbError> {
        let items =
            sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items"))
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    /// Fetches the client roster used to resolve names in analytics output.
    pub async fn clients_snapshot(&self) -> Result<Vec<Client>, DbError> {
        let clients =
            sqlx::query_as::<_, Client>(&format!("SELECT {CLIENT_COLUMNS} FROM clients"))
                .fetch_all(&self.pool)
                .await?;
        Ok(clients)
    }

    // ==========================================================================
    // Exchange rates
    // ==========================================================================

    /// Fetches the most recent rates for a currency pair, newest date first.
    pub async fn list_exchange_rates(
        &self,
        currency_from: &str,
        currency_to: &str,
        limit: i64,
    ) -> Result<Vec<ExchangeRate>, DbError> {
        let rates = sqlx::query_as::<_, ExchangeRate>(&format!(
            r#"
            SELECT {RATE_COLUMNS} FROM exchange_rates
            WHERE currency_from = $1 AND currency_to = $2
            ORDER BY date DESC
            LIMIT $3
            "#
        ))
        .bind(currency_from)
        .bind(currency_to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rates)
    }

    pub async fn latest_exchange_rate(
        &self,
        currency_from: &str,
        currency_to: &str,
    ) -> Result<Option<ExchangeRate>, DbError> {
        let rate = sqlx::query_as::<_, ExchangeRate>(&format!(
            r#"
            SELECT {RATE_COLUMNS} FROM exchange_rates
            WHERE currency_from = $1 AND currency_to = $2
            ORDER BY date DESC
            LIMIT 1
            "#
        ))
        .bind(currency_from)
        .bind(currency_to)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rate)
    }

    /// Records a rate for a (from, to, date) triple. A write for an existing
    /// triple overwrites the stored rate instead of duplicating the row.
    /// Returns the stored row and whether it was newly created.
    pub async fn upsert_exchange_rate(
        &self,
        new: &NewExchangeRate,
    ) -> Result<(ExchangeRate, bool), DbError> {
        let existing = sqlx::query_as::<_, ExchangeRate>(&format!(
            r#"
            SELECT {RATE_COLUMNS} FROM exchange_rates
            WHERE currency_from = $1 AND currency_to = $2 AND date = $3
            "#
        ))
        .bind(&new.currency_from)
        .bind(&new.currency_to)
        .bind(new.date)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(existing) = existing {
            tracing::debug!(
                id = existing.id,
                date = %existing.date,
                "Overwriting stored exchange rate."
            );
            let updated = sqlx::query_as::<_, ExchangeRate>(&format!(
                "UPDATE exchange_rates SET rate = $1 WHERE id = $2 RETURNING {RATE_COLUMNS}"
            ))
            .bind(new.rate)
            .bind(existing.id)
            .fetch_one(&self.pool)
            .await?;
            return Ok((updated, false));
        }

        let created = sqlx::query_as::<_, ExchangeRate>(&format!(
            r#"
            INSERT INTO exchange_rates (currency_from, currency_to, rate, date)
            VALUES ($1, $2, $3, $4)
            RETURNING {RATE_COLUMNS}
            "#
        ))
        .bind(&new.currency_from)
        .bind(&new.currency_to)
        .bind(new.rate)
        .bind(new.date)
        .fetch_one(&self.pool)
        .await?;
        Ok((created, true))
    }

    // ==========================================================================
    // Users
    // ==========================================================================

    pub async fn find_user(&self, id: i64) -> Result<Option<User>, DbError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, client_id, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, client_id, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Finds the portal account backing a client, if one was ever created.
    pub async fn find_user_by_client(&self, client_id: i64) -> Result<Option<User>, DbError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, client_id, created_at FROM users WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn create_user(&self, new: &NewUser) -> Result<User, DbError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role, client_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, role, client_id, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(new.client_id)
        .fetch_one(&self.pool)
        .await?;
        user_from_row(&row)
    }
}
