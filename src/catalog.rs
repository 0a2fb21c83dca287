//! Menu catalog: categories and the menus filed under them.

use crate::{
    error::AppError,
    models::{
        Category, CreateCategoryRequest, CreateMenuRequest, Menu, UpdateCategoryRequest,
        UpdateMenuRequest,
    },
    repository::Repository,
};

// --- Categories ---

async fn ensure_category_name_free(
    repo: &dyn Repository,
    name: &str,
    owner: Option<i64>,
) -> Result<(), AppError> {
    match repo.get_category_by_name(name).await? {
        Some(existing) if Some(existing.id) != owner => Err(AppError::Validation(
            "A category with this name already exists.".to_string(),
        )),
        _ => Ok(()),
    }
}

pub async fn create_category(
    repo: &dyn Repository,
    req: CreateCategoryRequest,
) -> Result<Category, AppError> {
    req.validate()?;
    ensure_category_name_free(repo, &req.name, None).await?;
    Ok(repo.create_category(&req.name).await?)
}

pub async fn update_category(
    repo: &dyn Repository,
    id: i64,
    req: UpdateCategoryRequest,
) -> Result<Option<Category>, AppError> {
    req.validate()?;

    let Some(mut category) = repo.get_category(id).await? else {
        return Ok(None);
    };
    if let Some(name) = &req.name {
        ensure_category_name_free(repo, name, Some(id)).await?;
    }

    req.apply(&mut category);
    Ok(repo.update_category(&category).await?)
}

/// Restricted while menus are filed under the category.
pub async fn delete_category(repo: &dyn Repository, id: i64) -> Result<bool, AppError> {
    if repo.get_category(id).await?.is_none() {
        return Ok(false);
    }
    let menus = repo.count_menus_in_category(id).await?;
    if menus > 0 {
        return Err(AppError::Conflict(format!(
            "The category still holds {menus} menu(s) and cannot be deleted."
        )));
    }
    Ok(repo.delete_category(id).await?)
}

// --- Menus ---

async fn ensure_menu_name_free(
    repo: &dyn Repository,
    name: &str,
    owner: Option<i64>,
) -> Result<(), AppError> {
    match repo.get_menu_by_name(name).await? {
        Some(existing) if Some(existing.id) != owner => Err(AppError::Validation(
            "A menu with this name already exists.".to_string(),
        )),
        _ => Ok(()),
    }
}

async fn ensure_category_exists(repo: &dyn Repository, category_id: i64) -> Result<(), AppError> {
    if repo.get_category(category_id).await?.is_none() {
        return Err(AppError::Validation(format!(
            "Category {category_id} does not exist."
        )));
    }
    Ok(())
}

/// create_menu
///
/// Menu names are unique. A referenced category must exist.
pub async fn create_menu(repo: &dyn Repository, req: CreateMenuRequest) -> Result<Menu, AppError> {
    req.validate()?;
    ensure_menu_name_free(repo, &req.name, None).await?;
    if let Some(category_id) = req.category_id {
        ensure_category_exists(repo, category_id).await?;
    }

    let menu = repo.create_menu(req.into()).await?;
    tracing::info!(menu_id = menu.id, name = %menu.name, "menu created");
    Ok(menu)
}

pub async fn update_menu(
    repo: &dyn Repository,
    id: i64,
    req: UpdateMenuRequest,
) -> Result<Option<Menu>, AppError> {
    req.validate()?;

    let Some(mut menu) = repo.get_menu(id).await? else {
        return Ok(None);
    };
    if let Some(name) = &req.name {
        ensure_menu_name_free(repo, name, Some(id)).await?;
    }
    if let Some(category_id) = req.category_id {
        ensure_category_exists(repo, category_id).await?;
    }

    req.apply(&mut menu);
    Ok(repo.update_menu(&menu).await?)
}

/// Restricted while line items reference the menu.
pub async fn delete_menu(repo: &dyn Repository, id: i64) -> Result<bool, AppError> {
    if repo.get_menu(id).await?.is_none() {
        return Ok(false);
    }
    if repo.count_details_for_menu(id).await? > 0 {
        return Err(AppError::Conflict(
            "The menu is referenced by order line items and cannot be deleted.".to_string(),
        ));
    }
    Ok(repo.delete_menu(id).await?)
}
