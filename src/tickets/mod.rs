pub mod fit;
pub mod trend;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::dates;

/// Column holding the ticket number.
const ID_COLUMN: &str = "Id";
/// The ticket date sits in the second column of the log.
const DATE_COLUMN_POS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketRecord {
    pub id: u64,
    pub date: DateTime<Utc>,
}

/// Read the ticket log, sorted by date. The file is never written back.
pub fn load_tickets(path: &Path) -> Result<Vec<TicketRecord>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open ticket log {}", path.display()))?;
    read_tickets(file).with_context(|| format!("Failed to read ticket log {}", path.display()))
}

pub fn read_tickets<R: Read>(reader: R) -> Result<Vec<TicketRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().context("ticket log has no header row")?.clone();
    let id_pos = headers
        .iter()
        .position(|h| h == ID_COLUMN)
        .ok_or_else(|| anyhow!("ticket log has no {:?} column", ID_COLUMN))?;
    if headers.len() <= DATE_COLUMN_POS || id_pos == DATE_COLUMN_POS {
        return Err(anyhow!("ticket log has no date column"));
    }

    let mut tickets = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("malformed ticket row {}", i + 1))?;
        let id = record
            .get(id_pos)
            .unwrap_or_default()
            .parse::<u64>()
            .with_context(|| format!("bad ticket id in row {}", i + 1))?;
        let date = dates::parse_timestamp(record.get(DATE_COLUMN_POS).unwrap_or_default())
            .with_context(|| format!("bad ticket date in row {}", i + 1))?;
        tickets.push(TicketRecord { id, date });
    }

    tickets.sort_by_key(|t| t.date);
    Ok(tickets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tickets_sorted() {
        let log = "Id,Date,Subject\n\
                   1203,2021-03-02,EtherCAT\n\
                   1198,2021-02-27,License\n\
                   1210,2021-03-05 14:00:00,Motion\n";
        let tickets = read_tickets(log.as_bytes()).unwrap();
        let ids: Vec<u64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1198, 1203, 1210]);
    }

    #[test]
    fn test_read_tickets_requires_id_column() {
        let log = "Ticket,Date\n1,2021-01-01\n";
        assert!(read_tickets(log.as_bytes()).is_err());
    }

    #[test]
    fn test_read_tickets_bad_date() {
        let log = "Id,Date\n1,someday\n";
        assert!(read_tickets(log.as_bytes()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_tickets(&dir.path().join("support-ch.txt")).is_err());
    }
}
