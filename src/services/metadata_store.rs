use crate::models::Category;
use crate::services::atomic_write::write_atomic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Corrupt metadata document {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },

    #[error("The default category cannot be hidden")]
    ReservedCategory,
}

/// Image name -> category name. Images in the default category are absent.
type CategoryDoc = BTreeMap<String, String>;
/// Set of category names (vault members, or explicitly created categories).
type NameSetDoc = BTreeSet<String>;

/// Category assignments, hidden categories and created categories, kept as
/// three JSON documents.
///
/// Each mutation is a read-modify-write of one document under a single
/// mutex, committed by atomic rename.
pub struct MetadataStore {
    categories_path: PathBuf,
    vault_path: PathBuf,
    names_path: PathBuf,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    pub fn new(
        categories_path: impl Into<PathBuf>,
        vault_path: impl Into<PathBuf>,
        names_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            categories_path: categories_path.into(),
            vault_path: vault_path.into(),
            names_path: names_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store with the standard document names under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join("categories.json"),
            dir.join("vault.json"),
            dir.join("category_names.json"),
        )
    }

    pub fn get_category(&self, image: &str) -> Result<Category, StoreError> {
        let doc: CategoryDoc = read_doc(&self.categories_path)?;
        Ok(doc.get(image).map(|raw| stored_category(raw)).unwrap_or_default())
    }

    /// Assign `image` to `category`. Assigning `Default` removes the entry.
    pub fn set_category(&self, image: &str, category: &Category) -> Result<(), StoreError> {
        self.update(&self.categories_path, |doc: &mut CategoryDoc| match category {
            Category::Default => doc.remove(image).is_some(),
            Category::Named(name) => doc.insert(image.to_string(), name.clone()).as_ref() != Some(name),
        })?;
        tracing::debug!(image, category = %category, "Category assigned");
        Ok(())
    }

    pub fn remove_image(&self, image: &str) -> Result<(), StoreError> {
        self.update(&self.categories_path, |doc: &mut CategoryDoc| {
            doc.remove(image).is_some()
        })
    }

    /// Register a category that has no images yet.
    pub fn create_category(&self, category: &Category) -> Result<(), StoreError> {
        let Category::Named(name) = category else {
            return Ok(());
        };
        self.update(&self.names_path, |doc: &mut NameSetDoc| doc.insert(name.clone()))?;
        tracing::info!(category = %name, "Category created");
        Ok(())
    }

    /// Drop `category` everywhere: its image assignments revert to default,
    /// and it leaves the created set and the vault.
    pub fn delete_category(&self, category: &Category) -> Result<(), StoreError> {
        let Category::Named(name) = category else {
            return Ok(());
        };

        let _guard = self.lock();
        let mut assignments: CategoryDoc = read_doc(&self.categories_path)?;
        let before = assignments.len();
        assignments.retain(|_, value| value.trim() != name.as_str());
        if assignments.len() != before {
            write_doc(&self.categories_path, &assignments)?;
        }

        for path in [&self.names_path, &self.vault_path] {
            let mut names: NameSetDoc = read_doc(path)?;
            if names.remove(name) {
                write_doc(path, &names)?;
            }
        }

        tracing::info!(
            category = %name,
            reassigned = before - assignments.len(),
            "Category deleted"
        );
        Ok(())
    }

    pub fn hide_category(&self, category: &Category) -> Result<(), StoreError> {
        let Category::Named(name) = category else {
            return Err(StoreError::ReservedCategory);
        };
        self.update(&self.vault_path, |doc: &mut NameSetDoc| doc.insert(name.clone()))?;
        tracing::info!(category = %name, "Category hidden");
        Ok(())
    }

    pub fn unhide_category(&self, category: &Category) -> Result<(), StoreError> {
        let Category::Named(name) = category else {
            return Ok(());
        };
        self.update(&self.vault_path, |doc: &mut NameSetDoc| doc.remove(name))?;
        tracing::info!(category = %name, "Category unhidden");
        Ok(())
    }

    pub fn hidden_categories(&self) -> Result<BTreeSet<Category>, StoreError> {
        let doc: NameSetDoc = read_doc(&self.vault_path)?;
        Ok(doc
            .iter()
            .map(|raw| stored_category(raw))
            .filter(|c| !c.is_default())
            .collect())
    }

    pub fn is_hidden(&self, category: &Category) -> Result<bool, StoreError> {
        if category.is_default() {
            return Ok(false);
        }
        Ok(self.hidden_categories()?.contains(category))
    }

    /// Every known category, sorted by name. Hidden ones are left out unless
    /// `unlocked`.
    pub fn list_categories(&self, unlocked: bool) -> Result<Vec<Category>, StoreError> {
        let assignments: CategoryDoc = read_doc(&self.categories_path)?;
        let created: NameSetDoc = read_doc(&self.names_path)?;

        let mut all: BTreeSet<Category> = assignments
            .values()
            .chain(created.iter())
            .map(|raw| stored_category(raw))
            .collect();
        all.insert(Category::Default);

        if !unlocked {
            let hidden = self.hidden_categories()?;
            all.retain(|c| !hidden.contains(c));
        }
        Ok(all.into_iter().collect())
    }

    /// Snapshot of all explicit assignments.
    pub fn category_map(&self) -> Result<BTreeMap<String, Category>, StoreError> {
        let doc: CategoryDoc = read_doc(&self.categories_path)?;
        Ok(doc
            .into_iter()
            .map(|(image, raw)| {
                let category = stored_category(&raw);
                (image, category)
            })
            .collect())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read, mutate and commit one document. `apply` returns whether it
    /// changed anything; unchanged documents are not rewritten.
    fn update<T, F>(&self, path: &Path, apply: F) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> bool,
    {
        let _guard = self.lock();
        let mut doc: T = read_doc(path)?;
        if apply(&mut doc) {
            write_doc(path, &doc)?;
        }
        Ok(())
    }
}

/// Interpret a stored category value. Values that would not parse as a
/// category name fall back to default.
fn stored_category(raw: &str) -> Category {
    Category::parse(raw).unwrap_or_else(|_| {
        tracing::warn!(value = raw, "Ignoring invalid stored category");
        Category::Default
    })
}

fn read_doc<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_doc<T: Serialize>(path: &Path, doc: &T) -> Result<(), StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut serializer)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    buf.push(b'\n');

    write_atomic(path, &buf).map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn named(name: &str) -> Category {
        Category::Named(name.to_string())
    }

    fn store() -> (TempDir, MetadataStore) {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::in_dir(dir.path());
        (dir, store)
    }

    #[test]
    fn test_missing_documents_read_as_empty() {
        let (_dir, store) = store();
        assert_eq!(store.get_category("anything").unwrap(), Category::Default);
        assert!(store.hidden_categories().unwrap().is_empty());
        assert_eq!(store.list_categories(false).unwrap(), vec![Category::Default]);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let (_dir, store) = store();

        store.set_category("beach", &named("travel")).unwrap();
        assert_eq!(store.get_category("beach").unwrap(), named("travel"));

        store.set_category("beach", &Category::Default).unwrap();
        assert_eq!(store.get_category("beach").unwrap(), Category::Default);
        assert!(store.category_map().unwrap().is_empty());
    }

    #[test]
    fn test_default_never_persisted() {
        let (dir, store) = store();
        store.set_category("a", &named("x")).unwrap();
        store.set_category("a", &Category::Default).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("categories.json")).unwrap();
        assert!(!raw.contains("default"));
    }

    #[test]
    fn test_document_format() {
        let (dir, store) = store();
        store.set_category("beach", &named("travel")).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("categories.json")).unwrap();
        assert_eq!(raw, "{\n    \"beach\": \"travel\"\n}\n");
    }

    #[test]
    fn test_remove_image_is_idempotent() {
        let (_dir, store) = store();
        store.set_category("a", &named("x")).unwrap();

        store.remove_image("a").unwrap();
        store.remove_image("a").unwrap();
        assert_eq!(store.get_category("a").unwrap(), Category::Default);
    }

    #[test]
    fn test_delete_category_reverts_only_its_images() {
        let (_dir, store) = store();
        store.set_category("a", &named("X")).unwrap();
        store.set_category("b", &named("X")).unwrap();
        store.set_category("c", &named("Y")).unwrap();

        store.delete_category(&named("X")).unwrap();

        assert_eq!(store.get_category("a").unwrap(), Category::Default);
        assert_eq!(store.get_category("b").unwrap(), Category::Default);
        assert_eq!(store.get_category("c").unwrap(), named("Y"));
        assert_eq!(
            store.list_categories(true).unwrap(),
            vec![named("Y"), Category::Default]
        );
    }

    #[test]
    fn test_delete_category_clears_created_and_vault() {
        let (_dir, store) = store();
        store.create_category(&named("secret")).unwrap();
        store.hide_category(&named("secret")).unwrap();

        store.delete_category(&named("secret")).unwrap();

        assert!(!store.is_hidden(&named("secret")).unwrap());
        assert_eq!(store.list_categories(true).unwrap(), vec![Category::Default]);
    }

    #[test]
    fn test_delete_default_is_noop() {
        let (_dir, store) = store();
        store.set_category("a", &named("X")).unwrap();
        store.delete_category(&Category::Default).unwrap();
        assert_eq!(store.get_category("a").unwrap(), named("X"));
    }

    #[test]
    fn test_created_category_listed_without_images() {
        let (_dir, store) = store();
        store.create_category(&named("empty")).unwrap();
        store.create_category(&Category::Default).unwrap();

        assert_eq!(
            store.list_categories(false).unwrap(),
            vec![Category::Default, named("empty")]
        );
    }

    #[test]
    fn test_hide_default_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.hide_category(&Category::Default),
            Err(StoreError::ReservedCategory)
        ));
        store.unhide_category(&Category::Default).unwrap();
    }

    #[test]
    fn test_hide_unhide_idempotent() {
        let (_dir, store) = store();
        store.hide_category(&named("private")).unwrap();
        store.hide_category(&named("private")).unwrap();
        assert_eq!(store.hidden_categories().unwrap().len(), 1);
        assert!(store.is_hidden(&named("private")).unwrap());

        store.unhide_category(&named("private")).unwrap();
        store.unhide_category(&named("private")).unwrap();
        assert!(!store.is_hidden(&named("private")).unwrap());
    }

    #[test]
    fn test_list_categories_respects_vault() {
        let (_dir, store) = store();
        store.set_category("a", &named("private")).unwrap();
        store.set_category("b", &named("public")).unwrap();
        store.hide_category(&named("private")).unwrap();

        assert_eq!(
            store.list_categories(false).unwrap(),
            vec![Category::Default, named("public")]
        );
        assert_eq!(
            store.list_categories(true).unwrap(),
            vec![Category::Default, named("private"), named("public")]
        );
    }

    #[test]
    fn test_corrupt_document_is_error() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("categories.json"), "{not json").unwrap();

        assert!(matches!(
            store.get_category("a"),
            Err(StoreError::Parse { .. })
        ));
        assert!(store.set_category("a", &named("x")).is_err());

        let raw = std::fs::read_to_string(dir.path().join("categories.json")).unwrap();
        assert_eq!(raw, "{not json");
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let (_dir, store) = store();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .set_category(&format!("img{i}"), &named("bulk"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.category_map().unwrap().len(), 16);
    }

    #[test]
    fn test_legacy_default_value_reads_as_default() {
        let (dir, store) = store();
        std::fs::write(
            dir.path().join("categories.json"),
            r#"{"a": "default", "b": "trips"}"#,
        )
        .unwrap();

        assert_eq!(store.get_category("a").unwrap(), Category::Default);
        assert_eq!(
            store.list_categories(false).unwrap(),
            vec![Category::Default, named("trips")]
        );
    }
}
