use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::Category;
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, CategoryRepository};

const NAME_MAX_LEN: usize = 50;
const DESCRIPTION_MAX_LEN: usize = 200;
const DUPLICATE_NAME: &str = "Category name already exists";

#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update of a category. An empty description clears it.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// Create a category. A clashing name fails; the existing one is kept.
    pub async fn create(&self, draft: CategoryDraft) -> Result<Category, DomainError> {
        let name = validate_name(&draft.name)?;
        let description = validate_description(draft.description)?;

        let category = self
            .categories
            .insert(Category::new(name, description))
            .await
            .map_err(duplicate_name)?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, DomainError> {
        let mut category = self.get(id).await?;

        if let Some(name) = patch.name {
            category.rename(validate_name(&name)?);
        }
        if let Some(description) = patch.description {
            category.description = validate_description(Some(description))?;
        }
        category.updated_at = Utc::now();

        self.categories
            .update(category)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("Category", id),
                other => duplicate_name(other),
            })
    }

    /// Posts filed under a deleted category keep the dangling reference and
    /// display without a category.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.categories.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Category", id),
            other => other.into(),
        })
    }
}

fn duplicate_name(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(_) => DomainError::Duplicate(DUPLICATE_NAME.to_string()),
        other => other.into(),
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Please provide a category name"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "Category name cannot be more than {NAME_MAX_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_description(description: Option<String>) -> Result<Option<String>, DomainError> {
    match description.map(|d| d.trim().to_string()) {
        Some(d) if d.is_empty() => Ok(None),
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => Err(DomainError::Validation(
            format!("Description cannot be more than {DESCRIPTION_MAX_LEN} characters"),
        )),
        other => Ok(other),
    }
}
