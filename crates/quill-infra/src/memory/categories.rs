use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::Category;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository};

/// In-memory category store; names and slugs are unique.
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    store: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(existing: &Category, candidate: &Category) -> Option<RepoError> {
    if existing.id == candidate.id {
        None
    } else if existing.name == candidate.name {
        Some(RepoError::Constraint("categories_name_key".to_string()))
    } else if existing.slug == candidate.slug {
        Some(RepoError::Constraint("categories_slug_key".to_string()))
    } else {
        None
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&category.id) {
            return Err(RepoError::Constraint("categories_pkey".to_string()));
        }
        if let Some(err) = store.values().find_map(|c| clashes(c, &category)) {
            return Err(err);
        }
        store.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        if let Some(err) = store.values().find_map(|c| clashes(c, &category)) {
            return Err(err);
        }
        store.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> = self.store.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }
}
