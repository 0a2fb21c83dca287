use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::AppError;

// --- Enumerations (Mapped to Postgres ENUM types) ---

/// RoleType
///
/// The three access tiers of the system. Serialized in lowercase both in JSON and
/// in the `role_type` Postgres enum, and carried verbatim in the token `roles` claim.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "role_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RoleType {
    Admin,
    Employee,
    #[default]
    Customer,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Admin => "admin",
            RoleType::Employee => "employee",
            RoleType::Customer => "customer",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(RoleType::Admin),
            "employee" => Ok(RoleType::Employee),
            "customer" => Ok(RoleType::Customer),
            other => Err(AppError::Validation(format!("Unknown role type '{other}'."))),
        }
    }
}

/// OrderStatus
///
/// Lifecycle of an order. Only `Created -> Preparing` is driven by the server
/// (finalize); every other value is assigned directly through an update.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "order_status")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Created,
    Preparing,
    Ready,
    Served,
    Cancelled,
    Paid,
}

/// Status of a single line item. Cancelled items never count towards a total.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "order_detail_status")]
#[ts(export)]
pub enum OrderDetailStatus {
    #[default]
    Created,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// A row of the `roles` table. `role_type` is unique across the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Role {
    pub id: i64,
    pub role_type: RoleType,
}

/// User
///
/// Internal representation of a row of the `users` table, including the Argon2
/// password hash. Never serialized to clients; handlers answer with `UserPublic`.
///
/// `roles` is not a column: repositories fill it from the `user_roles` link table.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub roles: Vec<Role>,
}

impl User {
    /// The role types carried into the token `roles` claim.
    pub fn role_types(&self) -> Vec<RoleType> {
        self.roles.iter().map(|role| role.role_type).collect()
    }
}

/// UserPublic
///
/// Output schema for user endpoints. Strips the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            address: user.address,
            phone: user.phone,
            created_at: user.created_at,
            roles: user.roles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Menu
///
/// A sellable item. Orders reference menus through their line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub price: f64,
    // Nullable FK to categories.id.
    pub category_id: Option<i64>,
    pub description: String,
    pub stock: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Order
///
/// `total_price` is whatever the caller supplied until the order is finalized,
/// at which point it is recomputed from the live line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Order {
    pub id: i64,
    // FK to users.id.
    pub client_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub total_price: f64,
    pub status: OrderStatus,
}

/// OrderDetail
///
/// One line item. Stored as an independent row filtered by `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: Option<i64>,
    pub menu_id: i64,
    pub price: f64,
    pub comment: String,
    pub quantity: i32,
    pub status: OrderDetailStatus,
}

impl OrderDetail {
    /// `price * quantity`, ignoring status.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

// --- Repository Inputs (validated, id-less rows) ---

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub name: String,
    pub price: f64,
    pub category_id: Option<i64>,
    pub description: String,
    pub stock: i32,
}

/// `created_at` is stamped by the caller so date-window queries stay deterministic.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: i64,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderDetail {
    pub order_id: Option<i64>,
    pub menu_id: i64,
    pub price: f64,
    pub comment: String,
    pub quantity: i32,
    pub status: OrderDetailStatus,
}

// --- Validation Helpers ---

fn check_len(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters."
        )));
    }
    Ok(())
}

fn check_required(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty.")));
    }
    check_len(field, value, max)
}

fn check_email(email: &str) -> Result<(), AppError> {
    check_len("email", email, 255)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::Validation(format!("'{email}' is not a valid email address."))),
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!("{field} must be greater than or equal to 0.")));
    }
    Ok(())
}

fn check_positive_price(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::Validation("total_price must be greater than 0.".to_string()));
    }
    Ok(())
}

fn check_quantity(value: i32) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::Validation("quantity must be greater than 0.".to_string()));
    }
    Ok(())
}

fn check_stock(value: i32) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::Validation("stock must be greater than or equal to 0.".to_string()));
    }
    Ok(())
}

// --- Request Payloads (Input Schemas) ---

/// SignupRequest
///
/// Self-registration payload (POST /users/signup). A `role_ids` hint may be present
/// for client compatibility but is never honored: signup always yields a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<i64>>,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_profile(
            &self.username,
            &self.email,
            &self.first_name,
            &self.last_name,
            &self.phone,
        )?;
        check_required("password", &self.password, usize::MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// TokenResponse
///
/// Returned by login and signup. `token_type` is always "bearer".
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// CreateUserRequest
///
/// Administrative user creation (POST /users) with an explicit role selection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub role_ids: Vec<i64>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_profile(
            &self.username,
            &self.email,
            &self.first_name,
            &self.last_name,
            &self.phone,
        )?;
        check_required("password", &self.password, usize::MAX)
    }
}

fn validate_profile(
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    phone: &str,
) -> Result<(), AppError> {
    check_required("username", username, 50)?;
    check_email(email)?;
    check_len("first_name", first_name, 50)?;
    check_len("last_name", last_name, 50)?;
    check_len("phone", phone, 30)
}

/// UpdateUserRequest
///
/// Partial update payload (PUT /users/{id}). `apply` merges the profile fields;
/// `password` and `role_ids` need hashing and role resolution and are handled
/// by the accounts service.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<i64>>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(username) = &self.username {
            check_required("username", username, 50)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(password) = &self.password {
            check_required("password", password, usize::MAX)?;
        }
        if let Some(first_name) = &self.first_name {
            check_len("first_name", first_name, 50)?;
        }
        if let Some(last_name) = &self.last_name {
            check_len("last_name", last_name, 50)?;
        }
        if let Some(phone) = &self.phone {
            check_len("phone", phone, 30)?;
        }
        Ok(())
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(address) = &self.address {
            user.address = address.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = phone.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RoleRequest {
    pub role_type: RoleType,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_required("name", &self.name, 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        match &self.name {
            Some(name) => check_required("name", name, 100),
            None => Ok(()),
        }
    }

    pub fn apply(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
    }
}

/// CreateMenuRequest
///
/// `price` and `stock` default to 0 when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateMenuRequest {
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub stock: i32,
}

impl CreateMenuRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_required("name", &self.name, 100)?;
        check_non_negative("price", self.price)?;
        check_len("description", &self.description, 255)?;
        check_stock(self.stock)
    }
}

impl From<CreateMenuRequest> for NewMenu {
    fn from(req: CreateMenuRequest) -> Self {
        Self {
            name: req.name,
            price: req.price,
            category_id: req.category_id,
            description: req.description,
            stock: req.stock,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateMenuRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
}

impl UpdateMenuRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            check_required("name", name, 100)?;
        }
        if let Some(price) = self.price {
            check_non_negative("price", price)?;
        }
        if let Some(description) = &self.description {
            check_len("description", description, 255)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        Ok(())
    }

    pub fn apply(&self, menu: &mut Menu) {
        if let Some(name) = &self.name {
            menu.name = name.clone();
        }
        if let Some(price) = self.price {
            menu.price = price;
        }
        if let Some(category_id) = self.category_id {
            menu.category_id = Some(category_id);
        }
        if let Some(description) = &self.description {
            menu.description = description.clone();
        }
        if let Some(stock) = self.stock {
            menu.stock = stock;
        }
    }
}

/// CreateOrderRequest
///
/// Input payload for POST /orders. `status` defaults to `Created`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateOrderRequest {
    pub client_id: i64,
    pub total_price: f64,
    #[serde(default)]
    pub status: OrderStatus,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_positive_price(self.total_price)
    }
}

/// UpdateOrderRequest
///
/// Partial update payload (PUT /orders/{id}). Unset fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl UpdateOrderRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        match self.total_price {
            Some(total_price) => check_positive_price(total_price),
            None => Ok(()),
        }
    }

    pub fn apply(&self, order: &mut Order) {
        if let Some(client_id) = self.client_id {
            order.client_id = client_id;
        }
        if let Some(total_price) = self.total_price {
            order.total_price = total_price;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
    }
}

/// CreateOrderDetailRequest
///
/// Input payload for POST /orderdetails. When `price` is omitted the menu's current
/// price is used; `status` defaults to `Created` and `comment` to an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateOrderDetailRequest {
    pub order_id: i64,
    pub menu_id: i64,
    #[serde(default)]
    pub status: OrderDetailStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub comment: String,
    pub quantity: i32,
}

impl CreateOrderDetailRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(price) = self.price {
            check_non_negative("price", price)?;
        }
        check_len("comment", &self.comment, 255)?;
        check_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateOrderDetailRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderDetailStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

impl UpdateOrderDetailRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(price) = self.price {
            check_non_negative("price", price)?;
        }
        if let Some(comment) = &self.comment {
            check_len("comment", comment, 255)?;
        }
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        Ok(())
    }

    pub fn apply(&self, detail: &mut OrderDetail) {
        if let Some(order_id) = self.order_id {
            detail.order_id = Some(order_id);
        }
        if let Some(menu_id) = self.menu_id {
            detail.menu_id = menu_id;
        }
        if let Some(status) = self.status {
            detail.status = status;
        }
        if let Some(price) = self.price {
            detail.price = price;
        }
        if let Some(comment) = &self.comment {
            detail.comment = comment.clone();
        }
        if let Some(quantity) = self.quantity {
            detail.quantity = quantity;
        }
    }
}

// --- Output Schemas ---

/// OrderTotal
///
/// Output of GET /orders/{id}/order_total: the live sum of non-cancelled line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct OrderTotal {
    pub order_id: i64,
    pub total_price: f64,
}

/// Confirmation body returned by every delete endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}
