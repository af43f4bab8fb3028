use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::Category;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            icon: c.icon,
            display_order: c.display_order,
            is_active: c.is_active,
        }
    }
}

impl From<&Category> for CategoryResponseDto {
    fn from(c: &Category) -> Self {
        c.clone().into()
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from flat list of categories.
    ///
    /// Roots are categories without a parent, or whose parent is missing from
    /// the list (e.g. deactivated), so no active category is dropped.
    pub fn build_tree(categories: &[Category]) -> Vec<CategoryTreeDto> {
        let present = |id: i64| categories.iter().any(|c| c.id == id);

        categories
            .iter()
            .filter(|c| c.parent_id.is_none_or(|p| !present(p)))
            .map(|root| Self::build_node(root, categories, &mut vec![root.id]))
            .collect()
    }

    fn build_node(category: &Category, all: &[Category], path: &mut Vec<i64>) -> CategoryTreeDto {
        let mut children = Vec::new();
        for child in all.iter().filter(|c| c.parent_id == Some(category.id)) {
            if path.contains(&child.id) {
                continue;
            }
            path.push(child.id);
            children.push(Self::build_node(child, all, path));
            path.pop();
        }

        CategoryTreeDto {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            display_order: category.display_order,
            children,
        }
    }
}

/// Category with the number of active listings in its subtree
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryWithCountDto {
    #[serde(flatten)]
    pub category: CategoryResponseDto,
    pub active_listings_count: i64,
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Derived from `name` when omitted
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    pub parent_id: Option<i64>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Request DTO for updating a category; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// `null` moves the category to the root; absent keeps the current parent
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<i64>>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Distinguishes an explicit `null` from an absent field
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(id: i64, parent_id: Option<i64>, name: &str) -> Category {
        Category {
            id,
            parent_id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            icon: None,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_tree_nests_children() {
        let categories = vec![
            category(1, None, "Electronice"),
            category(2, Some(1), "Telefoane"),
            category(3, Some(2), "Android"),
            category(4, None, "Auto"),
        ];
        let tree = CategoryTreeDto::build_tree(&categories);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children[0].name, "Telefoane");
        assert_eq!(tree[0].children[0].children[0].name, "Android");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_orphans_become_roots() {
        // parent 9 was filtered out (inactive)
        let categories = vec![category(2, Some(9), "Orphan")];
        let tree = CategoryTreeDto::build_tree(&categories);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 2);
    }

    #[test]
    fn test_update_dto_parent_null_vs_absent() {
        let absent: UpdateCategoryDto = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let cleared: UpdateCategoryDto = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(cleared.parent_id, Some(None));

        let moved: UpdateCategoryDto = serde_json::from_str(r#"{"parent_id":4}"#).unwrap();
        assert_eq!(moved.parent_id, Some(Some(4)));
    }

    #[test]
    fn test_create_dto_validation() {
        let dto: CreateCategoryDto = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(dto.validate().is_err());

        let dto: CreateCategoryDto = serde_json::from_str(r#"{"name":"Auto & Moto"}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.is_active);
    }
}
