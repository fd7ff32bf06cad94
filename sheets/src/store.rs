//! [`TicketStore`] over one worksheet

use crate::client::SheetsClient;
use ticket_assist_core::store::{StoreError, TicketStore};
use ticket_assist_core::ticket::Record;

/// Ticket table stored in a worksheet
#[derive(Clone, Debug)]
pub struct SheetsTicketStore {
    client: SheetsClient,
    sheet: String,
}

impl SheetsTicketStore {
    /// Store backed by worksheet `sheet` (e.g. `Sheet1`)
    #[must_use]
    pub fn new(client: SheetsClient, sheet: impl Into<String>) -> Self {
        Self {
            client,
            sheet: sheet.into(),
        }
    }

    fn range(&self, cells: &str) -> String {
        if cells.is_empty() {
            self.sheet.clone()
        } else {
            format!("{}!{cells}", self.sheet)
        }
    }
}

impl TicketStore for SheetsTicketStore {
    async fn header(&self) -> Result<Vec<String>, StoreError> {
        let rows = self.client.get_values(&self.range("1:1")).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn records(&self) -> Result<Vec<Record>, StoreError> {
        let rows = self.client.get_values(&self.range("")).await?;
        let mut rows = rows.into_iter();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };

        let records: Vec<Record> = rows
            .map(|row| {
                header
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect();
        tracing::debug!(sheet = %self.sheet, records = records.len(), "Read ticket rows");
        Ok(records)
    }

    async fn append_row(&self, values: Vec<String>) -> Result<(), StoreError> {
        self.client
            .append_values(&self.range("A1"), &[values])
            .await?;
        Ok(())
    }

    async fn update_row(&self, row: usize, values: Vec<String>) -> Result<(), StoreError> {
        self.client
            .update_values(&self.range(&format!("A{row}")), &[values])
            .await?;
        Ok(())
    }

    async fn update_cell(&self, row: usize, column: usize, value: String) -> Result<(), StoreError> {
        let letter = column_letter(column)
            .ok_or_else(|| StoreError::Malformed("column 0 is not addressable".to_string()))?;
        self.client
            .update_values(&self.range(&format!("{letter}{row}")), &[vec![value]])
            .await?;
        Ok(())
    }
}

/// A1-notation letters for a 1-based column number
///
/// ```
/// use ticket_assist_sheets::column_letter;
///
/// assert_eq!(column_letter(1).as_deref(), Some("A"));
/// assert_eq!(column_letter(28).as_deref(), Some("AB"));
/// assert_eq!(column_letter(0), None);
/// ```
#[must_use]
pub fn column_letter(column: usize) -> Option<String> {
    if column == 0 {
        return None;
    }
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).ok()?));
        n = (n - 1) / 26;
    }
    Some(letters.into_iter().rev().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(6).as_deref(), Some("F"));
        assert_eq!(column_letter(26).as_deref(), Some("Z"));
        assert_eq!(column_letter(27).as_deref(), Some("AA"));
        assert_eq!(column_letter(702).as_deref(), Some("ZZ"));
        assert_eq!(column_letter(703).as_deref(), Some("AAA"));
    }
}
