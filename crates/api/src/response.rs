//! Response envelope for the paginated history endpoints.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use steamwatch_db::search::SearchPage;

/// `{ "total_count", "page", "per_page", "<key>": [...] }`.
///
/// The item key names the collection (`players`, `player_events`,
/// `audit_logs`).
#[derive(Debug)]
pub struct PageResponse<T> {
    key: &'static str,
    page: SearchPage<T>,
}

impl<T> PageResponse<T> {
    pub fn new(key: &'static str, page: SearchPage<T>) -> Self {
        Self { key, page }
    }
}

impl<T: Serialize> Serialize for PageResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("total_count", &self.page.total_count)?;
        map.serialize_entry("page", &self.page.page)?;
        map.serialize_entry("per_page", &self.page.per_page)?;
        map.serialize_entry(self.key, &self.page.items)?;
        map.end()
    }
}
