use crate::db::operations::catalog::{self, Category};
use crate::db::DatabaseProxy;
use crate::services::AdminError;

pub fn validate_level(value: &str) -> Result<String, AdminError> {
    let normalized = value.trim().to_ascii_uppercase();
    match normalized.as_str() {
        "BEGINNER" | "INTERMEDIATE" | "ADVANCED" => Ok(normalized),
        _ => Err(AdminError::Validation(
            "level must be BEGINNER, INTERMEDIATE or ADVANCED".to_string(),
        )),
    }
}

/// Which category takes over the featured slot: lowest sort order, oldest
/// creation date breaking ties.
pub fn next_featured(remaining: &[Category]) -> Option<&Category> {
    remaining
        .iter()
        .min_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.created_at.cmp(&b.created_at))
        })
}

/// Deletes a category. When the deleted category was the featured one, the
/// next available category is promoted; with no categories left the featured
/// slot stays empty. Returns the promoted category, if any.
pub async fn delete_category(
    proxy: &DatabaseProxy,
    category_id: &str,
) -> Result<Option<Category>, AdminError> {
    let Some(existing) = catalog::get_category(proxy, category_id).await? else {
        return Err(AdminError::NotFound("category not found".to_string()));
    };

    catalog::delete_category(proxy, category_id).await?;

    if !existing.is_featured {
        return Ok(None);
    }

    let remaining = catalog::all_categories(proxy).await?;
    let Some(promoted) = next_featured(&remaining).cloned() else {
        return Ok(None);
    };

    catalog::mark_featured(proxy, &promoted.id).await?;
    tracing::info!(category_id = %promoted.id, "promoted category to featured");
    Ok(Some(promoted))
}

/// Makes a category the single featured one.
pub async fn feature_category(
    proxy: &DatabaseProxy,
    category_id: &str,
) -> Result<Category, AdminError> {
    let Some(_) = catalog::get_category(proxy, category_id).await? else {
        return Err(AdminError::NotFound("category not found".to_string()));
    };

    catalog::clear_featured(proxy).await?;
    catalog::mark_featured(proxy, category_id).await?;

    let Some(updated) = catalog::get_category(proxy, category_id).await? else {
        return Err(AdminError::NotFound("category not found".to_string()));
    };
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, sort_order: i32, created_at: &str, featured: bool) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_string(),
            slug: id.to_string(),
            description: None,
            icon_url: None,
            color: None,
            is_featured: featured,
            sort_order,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn promotion_prefers_lowest_sort_order() {
        let remaining = vec![
            category("b", 2, "2024-01-01T00:00:00.000Z", false),
            category("a", 1, "2024-06-01T00:00:00.000Z", false),
        ];
        assert_eq!(next_featured(&remaining).unwrap().id, "a");
    }

    #[test]
    fn promotion_breaks_ties_by_creation_date() {
        let remaining = vec![
            category("newer", 1, "2024-06-01T00:00:00.000Z", false),
            category("older", 1, "2024-01-01T00:00:00.000Z", false),
        ];
        assert_eq!(next_featured(&remaining).unwrap().id, "older");
    }

    #[test]
    fn promotion_with_nothing_left_clears_the_slot() {
        assert!(next_featured(&[]).is_none());
    }

    #[test]
    fn level_validation_normalizes_case() {
        assert_eq!(validate_level(" beginner ").unwrap(), "BEGINNER");
        assert!(validate_level("expert").is_err());
    }
}
