use crate::models::{
    Category, Menu, NewMenu, NewOrder, NewOrderDetail, NewUser, Order, OrderDetail, Role,
    RoleType, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

/// RepoError
///
/// Storage-layer failure. Never swallowed: it propagates to the handler, where
/// `AppError` decides between a 400 (constraint violation) and a logged 500.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    /// True for unique, foreign-key and check violations raised by Postgres.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            RepoError::Database(sqlx::Error::Database(db)) => {
                db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation()
            }
            RepoError::Database(_) => false,
        }
    }
}

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers and services talk
/// to `Arc<dyn Repository>` and never know whether Postgres or the in-memory store
/// sits behind it.
///
/// Lookups return `Ok(None)` for absent ids; deletes return `Ok(false)` when nothing
/// was removed. Updates take the fully merged record and write every column.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Roles ---
    async fn list_roles(&self) -> Result<Vec<Role>, RepoError>;
    async fn get_role(&self, id: i64) -> Result<Option<Role>, RepoError>;
    async fn get_role_by_type(&self, role_type: RoleType) -> Result<Option<Role>, RepoError>;
    /// Resolves every id that exists; unknown ids are silently absent from the result.
    async fn get_roles_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, RepoError>;
    async fn create_role(&self, role_type: RoleType) -> Result<Role, RepoError>;
    async fn update_role(&self, role: &Role) -> Result<Option<Role>, RepoError>;
    async fn delete_role(&self, id: i64) -> Result<bool, RepoError>;
    /// Number of users currently linked to the role.
    async fn count_role_holders(&self, role_id: i64) -> Result<i64, RepoError>;

    // --- Users ---
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    /// Inserts the user and its role links atomically. `role_ids` must already be resolved.
    async fn create_user(&self, user: NewUser, role_ids: &[i64]) -> Result<User, RepoError>;
    /// Writes the profile columns; when `role_ids` is given the role set is replaced.
    async fn update_user(
        &self,
        user: &User,
        role_ids: Option<&[i64]>,
    ) -> Result<Option<User>, RepoError>;
    async fn delete_user(&self, id: i64) -> Result<bool, RepoError>;

    // --- Categories ---
    async fn list_categories(&self) -> Result<Vec<Category>, RepoError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepoError>;
    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;
    async fn create_category(&self, name: &str) -> Result<Category, RepoError>;
    async fn update_category(&self, category: &Category) -> Result<Option<Category>, RepoError>;
    async fn delete_category(&self, id: i64) -> Result<bool, RepoError>;
    async fn count_menus_in_category(&self, category_id: i64) -> Result<i64, RepoError>;

    // --- Menus ---
    async fn list_menus(&self) -> Result<Vec<Menu>, RepoError>;
    async fn get_menu(&self, id: i64) -> Result<Option<Menu>, RepoError>;
    async fn get_menu_by_name(&self, name: &str) -> Result<Option<Menu>, RepoError>;
    async fn create_menu(&self, menu: NewMenu) -> Result<Menu, RepoError>;
    async fn update_menu(&self, menu: &Menu) -> Result<Option<Menu>, RepoError>;
    async fn delete_menu(&self, id: i64) -> Result<bool, RepoError>;
    /// Number of line items (of any order) referencing the menu.
    async fn count_details_for_menu(&self, menu_id: i64) -> Result<i64, RepoError>;

    // --- Orders ---
    async fn list_orders(&self) -> Result<Vec<Order>, RepoError>;
    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError>;
    async fn list_orders_for_client(&self, client_id: i64) -> Result<Vec<Order>, RepoError>;
    /// Orders whose `created_at` lies in `[start, end]`, both bounds inclusive.
    async fn list_orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepoError>;
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError>;
    async fn update_order(&self, order: &Order) -> Result<Option<Order>, RepoError>;
    async fn delete_order(&self, id: i64) -> Result<bool, RepoError>;

    // --- Order Details ---
    async fn list_order_details(&self) -> Result<Vec<OrderDetail>, RepoError>;
    async fn get_order_detail(&self, id: i64) -> Result<Option<OrderDetail>, RepoError>;
    async fn list_details_for_order(&self, order_id: i64) -> Result<Vec<OrderDetail>, RepoError>;
    async fn create_order_detail(&self, detail: NewOrderDetail) -> Result<OrderDetail, RepoError>;
    async fn update_order_detail(
        &self,
        detail: &OrderDetail,
    ) -> Result<Option<OrderDetail>, RepoError>;
    async fn delete_order_detail(&self, id: i64) -> Result<bool, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are runtime-checked (`query_as::<_, T>`), so building the crate does not
/// need a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the `user_roles JOIN roles` lookup.
#[derive(FromRow)]
struct UserRoleRow {
    user_id: i64,
    id: i64,
    role_type: RoleType,
}

/// Loads the role sets of several users in a single round trip.
async fn load_roles(
    conn: &mut PgConnection,
    user_ids: &[i64],
) -> Result<HashMap<i64, Vec<Role>>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRoleRow>(
        r#"
        SELECT ur.user_id, r.id, r.role_type
        FROM user_roles ur
        JOIN roles r ON r.id = ur.role_id
        WHERE ur.user_id = ANY($1)
        ORDER BY r.id
        "#,
    )
    .bind(user_ids.to_vec())
    .fetch_all(&mut *conn)
    .await?;

    let mut by_user: HashMap<i64, Vec<Role>> = HashMap::new();
    for row in rows {
        by_user.entry(row.user_id).or_default().push(Role {
            id: row.id,
            role_type: row.role_type,
        });
    }
    Ok(by_user)
}

async fn with_roles(conn: &mut PgConnection, mut users: Vec<User>) -> Result<Vec<User>, sqlx::Error> {
    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    let mut roles = load_roles(conn, &ids).await?;
    for user in &mut users {
        user.roles = roles.remove(&user.id).unwrap_or_default();
    }
    Ok(users)
}

async fn link_roles(conn: &mut PgConnection, user_id: i64, role_ids: &[i64]) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(role_ids.to_vec())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- ROLES ---

    async fn list_roles(&self) -> Result<Vec<Role>, RepoError> {
        Ok(sqlx::query_as::<_, Role>("SELECT id, role_type FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_role(&self, id: i64) -> Result<Option<Role>, RepoError> {
        Ok(sqlx::query_as::<_, Role>("SELECT id, role_type FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_role_by_type(&self, role_type: RoleType) -> Result<Option<Role>, RepoError> {
        Ok(sqlx::query_as::<_, Role>("SELECT id, role_type FROM roles WHERE role_type = $1")
            .bind(role_type)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_roles_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, RepoError> {
        Ok(sqlx::query_as::<_, Role>(
            "SELECT id, role_type FROM roles WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_role(&self, role_type: RoleType) -> Result<Role, RepoError> {
        Ok(sqlx::query_as::<_, Role>(
            "INSERT INTO roles (role_type) VALUES ($1) RETURNING id, role_type",
        )
        .bind(role_type)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_role(&self, role: &Role) -> Result<Option<Role>, RepoError> {
        Ok(sqlx::query_as::<_, Role>(
            "UPDATE roles SET role_type = $2 WHERE id = $1 RETURNING id, role_type",
        )
        .bind(role.id)
        .bind(role.role_type)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_role(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_role_holders(&self, role_id: i64) -> Result<i64, RepoError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await?)
    }

    // --- USERS ---

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        let users = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash, first_name, last_name, address, phone, created_at
               FROM users ORDER BY id"#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(with_roles(&mut conn, users).await?)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash, first_name, last_name, address, phone, created_at
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match user {
            Some(user) => Ok(with_roles(&mut conn, vec![user]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash, first_name, last_name, address, phone, created_at
               FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        match user {
            Some(user) => Ok(with_roles(&mut conn, vec![user]).await?.pop()),
            None => Ok(None),
        }
    }

    /// create_user
    ///
    /// Inserts the user row and its `user_roles` links inside one transaction. If any
    /// statement fails the transaction is dropped and nothing is persisted.
    async fn create_user(&self, user: NewUser, role_ids: &[i64]) -> Result<User, RepoError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, address, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id, username, email, password_hash, first_name, last_name, address, phone, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.phone)
        .fetch_one(&mut *tx)
        .await?;

        link_roles(&mut tx, created.id, role_ids).await?;
        let created = with_roles(&mut tx, vec![created]).await?.pop();

        tx.commit().await?;
        created.ok_or(RepoError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_user(
        &self,
        user: &User,
        role_ids: Option<&[i64]>,
    ) -> Result<Option<User>, RepoError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, first_name = $5,
                last_name = $6, address = $7, phone = $8
            WHERE id = $1
            RETURNING id, username, email, password_hash, first_name, last_name, address, phone, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.phone)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        if let Some(role_ids) = role_ids {
            sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                .bind(updated.id)
                .execute(&mut *tx)
                .await?;
            link_roles(&mut tx, updated.id, role_ids).await?;
        }

        let updated = with_roles(&mut tx, vec![updated]).await?.pop();
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        // Role links go with the user (ON DELETE CASCADE on user_roles.user_id).
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        Ok(sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepoError> {
        Ok(sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepoError> {
        Ok(sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, created_at) VALUES ($1, NOW()) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_category(&self, category: &Category) -> Result<Option<Category>, RepoError> {
        Ok(sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(category.id)
        .bind(&category.name)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_category(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_menus_in_category(&self, category_id: i64) -> Result<i64, RepoError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menus WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?)
    }

    // --- MENUS ---

    async fn list_menus(&self) -> Result<Vec<Menu>, RepoError> {
        Ok(sqlx::query_as::<_, Menu>(
            "SELECT id, name, price, category_id, description, stock, created_at FROM menus ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_menu(&self, id: i64) -> Result<Option<Menu>, RepoError> {
        Ok(sqlx::query_as::<_, Menu>(
            "SELECT id, name, price, category_id, description, stock, created_at FROM menus WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_menu_by_name(&self, name: &str) -> Result<Option<Menu>, RepoError> {
        Ok(sqlx::query_as::<_, Menu>(
            "SELECT id, name, price, category_id, description, stock, created_at FROM menus WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_menu(&self, menu: NewMenu) -> Result<Menu, RepoError> {
        Ok(sqlx::query_as::<_, Menu>(
            r#"
            INSERT INTO menus (name, price, category_id, description, stock, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, name, price, category_id, description, stock, created_at
            "#,
        )
        .bind(&menu.name)
        .bind(menu.price)
        .bind(menu.category_id)
        .bind(&menu.description)
        .bind(menu.stock)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_menu(&self, menu: &Menu) -> Result<Option<Menu>, RepoError> {
        Ok(sqlx::query_as::<_, Menu>(
            r#"
            UPDATE menus
            SET name = $2, price = $3, category_id = $4, description = $5, stock = $6
            WHERE id = $1
            RETURNING id, name, price, category_id, description, stock, created_at
            "#,
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.price)
        .bind(menu.category_id)
        .bind(&menu.description)
        .bind(menu.stock)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_menu(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_details_for_menu(&self, menu_id: i64) -> Result<i64, RepoError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_details WHERE menu_id = $1")
            .bind(menu_id)
            .fetch_one(&self.pool)
            .await?)
    }

    // --- ORDERS ---

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        Ok(sqlx::query_as::<_, Order>(
            "SELECT id, client_id, created_at, total_price, status FROM orders ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        Ok(sqlx::query_as::<_, Order>(
            "SELECT id, client_id, created_at, total_price, status FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_orders_for_client(&self, client_id: i64) -> Result<Vec<Order>, RepoError> {
        Ok(sqlx::query_as::<_, Order>(
            "SELECT id, client_id, created_at, total_price, status FROM orders WHERE client_id = $1 ORDER BY created_at",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepoError> {
        Ok(sqlx::query_as::<_, Order>(
            r#"
            SELECT id, client_id, created_at, total_price, status
            FROM orders
            WHERE created_at >= $1 AND created_at <= $2
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        Ok(sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (client_id, created_at, total_price, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, client_id, created_at, total_price, status
            "#,
        )
        .bind(order.client_id)
        .bind(order.created_at)
        .bind(order.total_price)
        .bind(order.status)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_order(&self, order: &Order) -> Result<Option<Order>, RepoError> {
        Ok(sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET client_id = $2, total_price = $3, status = $4
            WHERE id = $1
            RETURNING id, client_id, created_at, total_price, status
            "#,
        )
        .bind(order.id)
        .bind(order.client_id)
        .bind(order.total_price)
        .bind(order.status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_order(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- ORDER DETAILS ---

    async fn list_order_details(&self) -> Result<Vec<OrderDetail>, RepoError> {
        Ok(sqlx::query_as::<_, OrderDetail>(
            "SELECT id, order_id, menu_id, price, comment, quantity, status FROM order_details ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_order_detail(&self, id: i64) -> Result<Option<OrderDetail>, RepoError> {
        Ok(sqlx::query_as::<_, OrderDetail>(
            "SELECT id, order_id, menu_id, price, comment, quantity, status FROM order_details WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_details_for_order(&self, order_id: i64) -> Result<Vec<OrderDetail>, RepoError> {
        Ok(sqlx::query_as::<_, OrderDetail>(
            "SELECT id, order_id, menu_id, price, comment, quantity, status FROM order_details WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_order_detail(&self, detail: NewOrderDetail) -> Result<OrderDetail, RepoError> {
        Ok(sqlx::query_as::<_, OrderDetail>(
            r#"
            INSERT INTO order_details (order_id, menu_id, price, comment, quantity, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_id, menu_id, price, comment, quantity, status
            "#,
        )
        .bind(detail.order_id)
        .bind(detail.menu_id)
        .bind(detail.price)
        .bind(&detail.comment)
        .bind(detail.quantity)
        .bind(detail.status)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_order_detail(
        &self,
        detail: &OrderDetail,
    ) -> Result<Option<OrderDetail>, RepoError> {
        Ok(sqlx::query_as::<_, OrderDetail>(
            r#"
            UPDATE order_details
            SET order_id = $2, menu_id = $3, price = $4, comment = $5, quantity = $6, status = $7
            WHERE id = $1
            RETURNING id, order_id, menu_id, price, comment, quantity, status
            "#,
        )
        .bind(detail.id)
        .bind(detail.order_id)
        .bind(detail.menu_id)
        .bind(detail.price)
        .bind(&detail.comment)
        .bind(detail.quantity)
        .bind(detail.status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_order_detail(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM order_details WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
