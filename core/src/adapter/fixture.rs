use async_trait::async_trait;

use super::{refine, DataSource};
use crate::error::FetchError;
use crate::state::{Entity, Filters};

/// Serves a fixed catalog. Each source owns its copy of the records.
#[derive(Debug, Clone)]
pub struct FixtureSource<E> {
    name: String,
    items: Vec<E>,
}

impl<E: Entity> FixtureSource<E> {
    pub fn new(name: impl Into<String>, items: Vec<E>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }
}

#[async_trait]
impl<E: Entity> DataSource<E> for FixtureSource<E> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        filters: &Filters<E::FilterKey>,
    ) -> Result<Vec<E>, FetchError> {
        Ok(refine(self.items.clone(), query, filters))
    }

    async fn get_by_id(&self, id: &E::Id) -> Result<Option<E>, FetchError> {
        Ok(self.items.iter().find(|it| it.id() == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::test_fixtures::*;

    #[tokio::test]
    async fn search_applies_query_and_filters() {
        let source = FixtureSource::new("fruits", basket(6));
        let mut filters = Filters::new();
        filters.insert(FruitFilter::Color, "red".to_string());
        let hits = source.search("fruit-4", &filters).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 4);
    }

    #[tokio::test]
    async fn empty_result_is_ok() {
        let source = FixtureSource::new("fruits", basket(3));
        let hits = source.search("durian", &Filters::new()).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn get_by_id_miss_is_none() {
        let source = FixtureSource::new("fruits", basket(3));
        assert_eq!(source.get_by_id(&2).await.unwrap().unwrap().id, 2);
        assert!(source.get_by_id(&20).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn instances_do_not_share_records() {
        let a = FixtureSource::new("a", basket(2));
        let mut b = a.clone();
        b.items[0].name = "changed".into();
        assert_eq!(a.items()[0].name, "fruit-1");
    }
}
