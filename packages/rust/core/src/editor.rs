//! Editable key/value table over the stored form data.
//!
//! [`EntryTable`] is the in-memory model behind the entries screen: rows may
//! hold blank or duplicate keys while being edited. [`EntryTable::to_form_data`]
//! collapses them into a [`FormData`] when saving. [`Editor`] ties a table to
//! a [`FormDataStore`] and saves after every change.

use formfill_shared::{FormData, FormFillError, Result};
use tracing::{debug, instrument};

use crate::store::FormDataStore;

/// One editable row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryRow {
    pub key: String,
    pub value: String,
}

impl EntryRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty()
    }

    /// Only rows with both a key and a value are saved.
    pub fn is_complete(&self) -> bool {
        !self.is_blank() && !self.value.trim().is_empty()
    }
}

/// Rows in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTable {
    rows: Vec<EntryRow>,
}

impl EntryTable {
    /// One row per entry; a single blank row when `data` is empty.
    pub fn from_form_data(data: &FormData) -> Self {
        let mut rows: Vec<EntryRow> = data.iter().map(|(k, v)| EntryRow::new(k, v)).collect();
        if rows.is_empty() {
            rows.push(EntryRow::default());
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[EntryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first row whose key is `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.key == key)
    }

    /// Append a blank row and return its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(EntryRow::default());
        self.rows.len() - 1
    }

    pub fn set_key(&mut self, index: usize, key: impl Into<String>) -> Result<()> {
        self.row_mut(index)?.key = key.into();
        Ok(())
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.row_mut(index)?.value = value.into();
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Result<EntryRow> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    /// Collapse the rows into form data.
    ///
    /// Keys and values are trimmed and incomplete rows skipped. When two rows
    /// share a key the later value wins and the entry keeps the first row's
    /// position.
    pub fn to_form_data(&self) -> FormData {
        let mut data = FormData::new();
        for row in self.rows.iter().filter(|row| row.is_complete()) {
            data.insert(row.key.trim(), row.value.trim());
        }
        data
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut EntryRow> {
        self.check_index(index)?;
        Ok(&mut self.rows[index])
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(FormFillError::validation(format!(
                "row {index} out of range (table has {} rows)",
                self.rows.len()
            )))
        }
    }
}

/// An [`EntryTable`] bound to a store. Every edit is saved immediately.
pub struct Editor<S> {
    store: S,
    table: EntryTable,
}

impl<S: FormDataStore> Editor<S> {
    /// Load the stored data into a fresh table.
    pub async fn open(store: S) -> Result<Self> {
        let data = store.load().await?;
        debug!(entries = data.len(), "editor opened");
        Ok(Self {
            store,
            table: EntryTable::from_form_data(&data),
        })
    }

    pub fn table(&self) -> &EntryTable {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a blank row. Incomplete rows are not persisted, so nothing is saved.
    pub fn add_row(&mut self) -> usize {
        self.table.add_row()
    }

    pub async fn set_key(&mut self, index: usize, key: impl Into<String>) -> Result<FormData> {
        self.table.set_key(index, key)?;
        self.save().await
    }

    pub async fn set_value(&mut self, index: usize, value: impl Into<String>) -> Result<FormData> {
        self.table.set_value(index, value)?;
        self.save().await
    }

    pub async fn remove_row(&mut self, index: usize) -> Result<FormData> {
        self.table.remove_row(index)?;
        self.save().await
    }

    /// Persist the table and return what was written.
    #[instrument(skip(self))]
    pub async fn save(&mut self) -> Result<FormData> {
        let data = self.table.to_form_data();
        self.store.save(&data).await?;
        debug!(entries = data.len(), "editor saved");
        Ok(data)
    }

    /// Replace the table with the stored data, e.g. after an import.
    pub async fn reload(&mut self) -> Result<()> {
        let data = self.store.load().await?;
        self.table = EntryTable::from_form_data(&data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_csv;
    use crate::store::MemoryStore;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_data_gives_one_blank_row() {
        let table = EntryTable::from_form_data(&FormData::new());
        assert_eq!(table.rows(), &[EntryRow::default()]);
        assert!(table.to_form_data().is_empty());
    }

    #[test]
    fn rows_follow_entry_order() {
        let table = EntryTable::from_form_data(&data(&[("Zip", "06000"), ("City", "Ankara")]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], EntryRow::new("Zip", "06000"));
        assert_eq!(table.position("City"), Some(1));
        assert_eq!(table.position("Name"), None);
    }

    #[test]
    fn incomplete_rows_are_dropped_and_cells_trimmed() {
        let mut table = EntryTable::from_form_data(&data(&[("Name", "Ayse")]));
        let no_key = table.add_row();
        table.set_value(no_key, "orphan").unwrap();
        let no_value = table.add_row();
        table.set_key(no_value, "Phone").unwrap();
        table.set_value(no_value, "   ").unwrap();
        let spaced = table.add_row();
        table.set_key(spaced, "  City ").unwrap();
        table.set_value(spaced, " Ankara\t").unwrap();

        assert_eq!(
            table.to_form_data(),
            data(&[("Name", "Ayse"), ("City", "Ankara")])
        );
    }

    #[test]
    fn duplicate_keys_last_value_wins() {
        let mut table = EntryTable::from_form_data(&data(&[("Name", "Ayse"), ("City", "Ankara")]));
        let row = table.add_row();
        table.set_key(row, "Name").unwrap();
        table.set_value(row, "John").unwrap();

        let saved = table.to_form_data();
        assert_eq!(saved.keys().collect::<Vec<_>>(), vec!["Name", "City"]);
        assert_eq!(saved.get("Name"), Some("John"));
    }

    #[test]
    fn out_of_range_rows_are_rejected() {
        let mut table = EntryTable::from_form_data(&FormData::new());
        assert!(matches!(
            table.set_key(3, "x"),
            Err(FormFillError::Validation { .. })
        ));
        assert!(table.remove_row(1).is_err());
        assert_eq!(table.remove_row(0).unwrap(), EntryRow::default());
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn edits_are_saved_immediately() {
        let store = MemoryStore::new();
        let mut editor = Editor::open(&store).await.unwrap();
        assert_eq!(editor.table().len(), 1);

        let saved = editor.set_key(0, "Name").await.unwrap();
        assert!(saved.is_empty());
        editor.set_value(0, "Ayse").await.unwrap();
        assert_eq!(store.load().await.unwrap(), data(&[("Name", "Ayse")]));

        let row = editor.add_row();
        editor.set_key(row, "City").await.unwrap();
        let saved = editor.set_value(row, "Ankara").await.unwrap();
        assert_eq!(saved.len(), 2);

        editor.remove_row(0).await.unwrap();
        assert_eq!(store.load().await.unwrap(), data(&[("City", "Ankara")]));
    }

    #[tokio::test]
    async fn reload_picks_up_imports() {
        let store = MemoryStore::with_data(&data(&[("Name", "Ayse")])).unwrap();
        let mut editor = Editor::open(&store).await.unwrap();

        let outcome = import_csv(editor.store(), "Email,ayse@x.com", false).await;
        assert!(outcome.success);

        editor.reload().await.unwrap();
        assert_eq!(editor.table().position("Email"), Some(1));
    }
}
