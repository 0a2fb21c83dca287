use crate::{
    models::{
        Category, Menu, NewMenu, NewOrder, NewOrderDetail, NewUser, Order, OrderDetail, Role,
        RoleType, User,
    },
    repository::{RepoError, Repository},
};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

/// In-process tables. Ids are allocated per table starting at 1, like BIGSERIAL.
#[derive(Default)]
struct Tables {
    roles: BTreeMap<i64, Role>,
    users: BTreeMap<i64, User>,
    // (user_id, role_id)
    user_roles: BTreeSet<(i64, i64)>,
    categories: BTreeMap<i64, Category>,
    menus: BTreeMap<i64, Menu>,
    orders: BTreeMap<i64, Order>,
    order_details: BTreeMap<i64, OrderDetail>,
    next_id: BTreeMap<&'static str, i64>,
}

impl Tables {
    fn allocate(&mut self, table: &'static str) -> i64 {
        let next = self.next_id.entry(table).or_insert(0);
        *next += 1;
        *next
    }

    fn user_with_roles(&self, user: &User) -> User {
        let mut user = user.clone();
        user.roles = self
            .user_roles
            .iter()
            .filter(|(user_id, _)| *user_id == user.id)
            .filter_map(|(_, role_id)| self.roles.get(role_id).cloned())
            .collect();
        user
    }

    fn replace_links(&mut self, user_id: i64, role_ids: &[i64]) {
        self.user_roles.retain(|(linked_user, _)| *linked_user != user_id);
        for role_id in role_ids {
            self.user_roles.insert((user_id, *role_id));
        }
    }
}

/// Postgres `timestamptz` keeps microseconds; stored rows here match that.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// InMemoryRepository
///
/// A `Repository` held entirely in memory. Used by the test suites and by
/// `APP_STORAGE=memory` for running the API without Postgres. It never fails,
/// and it does not enforce unique or foreign-key constraints itself: the service
/// layer checks those before writing, exactly as it does in front of Postgres.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds admin (1), employee (2) and customer (3), mirroring the initial migration.
    pub fn with_default_roles() -> Self {
        let mut tables = Tables::default();
        for role_type in [RoleType::Admin, RoleType::Employee, RoleType::Customer] {
            let id = tables.allocate("roles");
            tables.roles.insert(id, Role { id, role_type });
        }
        Self {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- Roles ---

    async fn list_roles(&self) -> Result<Vec<Role>, RepoError> {
        Ok(self.tables.read().await.roles.values().cloned().collect())
    }

    async fn get_role(&self, id: i64) -> Result<Option<Role>, RepoError> {
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }

    async fn get_role_by_type(&self, role_type: RoleType) -> Result<Option<Role>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.values().find(|r| r.role_type == role_type).cloned())
    }

    async fn get_roles_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .roles
            .values()
            .filter(|role| ids.contains(&role.id))
            .cloned()
            .collect())
    }

    async fn create_role(&self, role_type: RoleType) -> Result<Role, RepoError> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate("roles");
        let role = Role { id, role_type };
        tables.roles.insert(id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, role: &Role) -> Result<Option<Role>, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.roles.get_mut(&role.id).map(|stored| {
            stored.role_type = role.role_type;
            stored.clone()
        }))
    }

    async fn delete_role(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.roles.remove(&id).is_some())
    }

    async fn count_role_holders(&self, role_id: i64) -> Result<i64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.user_roles.iter().filter(|(_, r)| *r == role_id).count() as i64)
    }

    // --- Users ---

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().map(|u| tables.user_with_roles(u)).collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|u| tables.user_with_roles(u)))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| tables.user_with_roles(u)))
    }

    async fn create_user(&self, user: NewUser, role_ids: &[i64]) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate("users");
        let row = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            address: user.address,
            phone: user.phone,
            created_at: now(),
            roles: Vec::new(),
        };
        tables.users.insert(id, row.clone());
        tables.replace_links(id, role_ids);
        Ok(tables.user_with_roles(&row))
    }

    async fn update_user(
        &self,
        user: &User,
        role_ids: Option<&[i64]>,
    ) -> Result<Option<User>, RepoError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.users.get_mut(&user.id) else {
            return Ok(None);
        };
        // created_at is immutable.
        let created_at = stored.created_at;
        *stored = User {
            created_at,
            roles: Vec::new(),
            ..user.clone()
        };
        let row = stored.clone();
        if let Some(role_ids) = role_ids {
            tables.replace_links(user.id, role_ids);
        }
        Ok(Some(tables.user_with_roles(&row)))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tables.replace_links(id, &[]);
        }
        Ok(removed)
    }

    // --- Categories ---

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.name == name).cloned())
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate("categories");
        let category = Category {
            id,
            name: name.to_string(),
            created_at: now(),
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, category: &Category) -> Result<Option<Category>, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.categories.get_mut(&category.id).map(|stored| {
            stored.name = category.name.clone();
            stored.clone()
        }))
    }

    async fn delete_category(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.categories.remove(&id).is_some())
    }

    async fn count_menus_in_category(&self, category_id: i64) -> Result<i64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .menus
            .values()
            .filter(|m| m.category_id == Some(category_id))
            .count() as i64)
    }

    // --- Menus ---

    async fn list_menus(&self) -> Result<Vec<Menu>, RepoError> {
        Ok(self.tables.read().await.menus.values().cloned().collect())
    }

    async fn get_menu(&self, id: i64) -> Result<Option<Menu>, RepoError> {
        Ok(self.tables.read().await.menus.get(&id).cloned())
    }

    async fn get_menu_by_name(&self, name: &str) -> Result<Option<Menu>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.menus.values().find(|m| m.name == name).cloned())
    }

    async fn create_menu(&self, menu: NewMenu) -> Result<Menu, RepoError> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate("menus");
        let menu = Menu {
            id,
            name: menu.name,
            price: menu.price,
            category_id: menu.category_id,
            description: menu.description,
            stock: menu.stock,
            created_at: now(),
        };
        tables.menus.insert(id, menu.clone());
        Ok(menu)
    }

    async fn update_menu(&self, menu: &Menu) -> Result<Option<Menu>, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.menus.get_mut(&menu.id).map(|stored| {
            *stored = Menu {
                created_at: stored.created_at,
                ..menu.clone()
            };
            stored.clone()
        }))
    }

    async fn delete_menu(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.menus.remove(&id).is_some())
    }

    async fn count_details_for_menu(&self, menu_id: i64) -> Result<i64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .order_details
            .values()
            .filter(|d| d.menu_id == menu_id)
            .count() as i64)
    }

    // --- Orders ---

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        Ok(self.tables.read().await.orders.values().cloned().collect())
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn list_orders_for_client(&self, client_id: i64) -> Result<Vec<Order>, RepoError> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.client_id == client_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepoError> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.created_at >= start && o.created_at <= end)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate("orders");
        let order = Order {
            id,
            client_id: order.client_id,
            created_at: order.created_at.trunc_subsecs(6),
            total_price: order.total_price,
            status: order.status,
        };
        tables.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, order: &Order) -> Result<Option<Order>, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.get_mut(&order.id).map(|stored| {
            stored.client_id = order.client_id;
            stored.total_price = order.total_price;
            stored.status = order.status;
            stored.clone()
        }))
    }

    async fn delete_order(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.orders.remove(&id).is_some())
    }

    // --- Order Details ---

    async fn list_order_details(&self) -> Result<Vec<OrderDetail>, RepoError> {
        Ok(self.tables.read().await.order_details.values().cloned().collect())
    }

    async fn get_order_detail(&self, id: i64) -> Result<Option<OrderDetail>, RepoError> {
        Ok(self.tables.read().await.order_details.get(&id).cloned())
    }

    async fn list_details_for_order(&self, order_id: i64) -> Result<Vec<OrderDetail>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .order_details
            .values()
            .filter(|d| d.order_id == Some(order_id))
            .cloned()
            .collect())
    }

    async fn create_order_detail(&self, detail: NewOrderDetail) -> Result<OrderDetail, RepoError> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate("order_details");
        let detail = OrderDetail {
            id,
            order_id: detail.order_id,
            menu_id: detail.menu_id,
            price: detail.price,
            comment: detail.comment,
            quantity: detail.quantity,
            status: detail.status,
        };
        tables.order_details.insert(id, detail.clone());
        Ok(detail)
    }

    async fn update_order_detail(
        &self,
        detail: &OrderDetail,
    ) -> Result<Option<OrderDetail>, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.order_details.get_mut(&detail.id).map(|stored| {
            *stored = detail.clone();
            stored.clone()
        }))
    }

    async fn delete_order_detail(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.order_details.remove(&id).is_some())
    }
}
