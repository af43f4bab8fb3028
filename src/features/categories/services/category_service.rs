use std::collections::HashMap;

use sqlx::PgPool;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CategoryTreeDto, CategoryWithCountDto, CreateCategoryDto,
    UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CATEGORY_COLUMNS};
use crate::features::categories::services::CategoryTree;
use crate::shared::slug::slugify;
use crate::shared::validation::SLUG_REGEX;

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load every category (active or not) into a tree snapshot
    pub async fn load_tree(&self) -> Result<CategoryTree> {
        let sql = format!(
            "SELECT {} FROM categories ORDER BY display_order, name",
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(CategoryTree::new(categories))
    }

    /// List all active categories (flat list)
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let tree = self.load_tree().await?;
        Ok(tree.active().map(CategoryResponseDto::from).collect())
    }

    /// List all active categories as tree structure
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let tree = self.load_tree().await?;
        let active: Vec<Category> = tree.active().cloned().collect();
        Ok(CategoryTreeDto::build_tree(&active))
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let sql = format!(
            "SELECT {} FROM categories WHERE slug = $1 AND is_active = TRUE",
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category by slug: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// Resolve a category reference (slug or numeric id) to the ids of its
    /// active subtree
    pub async fn resolve_subtree(&self, reference: &str) -> Result<Vec<i64>> {
        let tree = self.load_tree().await?;
        tree.find(reference)
            .map(|c| tree.subtree_ids(c.id))
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", reference)))
    }

    /// Active categories ranked by active listings across their subtree
    pub async fn top_by_listing_count(&self, limit: usize) -> Result<Vec<CategoryWithCountDto>> {
        let tree = self.load_tree().await?;

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT category_id, COUNT(*)
            FROM listings
            WHERE status = 'active'
            GROUP BY category_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count listings per category: {:?}", e);
            AppError::Database(e)
        })?;
        let direct: HashMap<i64, i64> = rows.into_iter().collect();

        Ok(tree
            .subtree_counts(&direct)
            .into_iter()
            .take(limit)
            .map(|(category, count)| CategoryWithCountDto {
                category: category.into(),
                active_listings_count: count,
            })
            .collect())
    }

    /// Create a category. The slug is derived from the name when not given.
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let slug = match dto.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slugify(&dto.name),
        };
        if !SLUG_REGEX.is_match(&slug) {
            return Err(AppError::Validation(format!(
                "slug: '{}' must be lowercase letters, digits and single hyphens",
                slug
            )));
        }

        if let Some(parent_id) = dto.parent_id {
            self.ensure_exists(parent_id).await?;
        }

        let sql = format!(
            r#"
            INSERT INTO categories (parent_id, name, slug, description, icon, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(dto.parent_id)
            .bind(dto.name.trim())
            .bind(&slug)
            .bind(&dto.description)
            .bind(&dto.icon)
            .bind(dto.display_order)
            .bind(dto.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("Category slug '{}' already exists", slug))
                } else {
                    tracing::error!("Failed to create category: {:?}", e);
                    AppError::Database(e)
                }
            })?;

        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category.into())
    }

    /// Update a category. Re-parenting is refused when it would close a loop.
    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let mut tx = self.pool.begin().await?;

        // lock the table rows so two concurrent moves cannot build a cycle together
        let sql = format!("SELECT {} FROM categories FOR UPDATE", CATEGORY_COLUMNS);
        let all = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&mut *tx)
            .await?;
        let tree = CategoryTree::new(all);

        let current = tree
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        let parent_id = match dto.parent_id {
            None => current.parent_id,
            Some(None) => None,
            Some(Some(parent_id)) => {
                if tree.get(parent_id).is_none() {
                    return Err(AppError::NotFound(format!(
                        "Parent category {} not found",
                        parent_id
                    )));
                }
                if tree.would_create_cycle(id, parent_id) {
                    return Err(AppError::Validation(format!(
                        "parent_id: category {} cannot be moved under {}",
                        id, parent_id
                    )));
                }
                Some(parent_id)
            }
        };

        let sql = format!(
            r#"
            UPDATE categories
            SET parent_id = $2, name = $3, description = $4, icon = $5,
                display_order = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(parent_id)
            .bind(dto.name.as_deref().map(str::trim).unwrap_or(current.name.as_str()))
            .bind(dto.description.or(current.description))
            .bind(dto.icon.or(current.icon))
            .bind(dto.display_order.unwrap_or(current.display_order))
            .bind(dto.is_active.unwrap_or(current.is_active))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(category_id = id, "Category updated");
        Ok(category.into())
    }

    async fn ensure_exists(&self, id: i64) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Parent category {} not found", id)))
        }
    }
}
