//! CSV export.
//!
//! Every export goes through [`CsvTable`], so quoting is uniform: a field is
//! quoted when it holds a comma, a double quote or a line break, and embedded
//! quotes are doubled.

use std::path::Path;

use chrono::NaiveDate;
use log::info;
use thiserror::Error;

use crate::models::{Attendee, AuditLogEntry, Event, SafetyAlert};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn to_csv_string(&self) -> Result<String, ExportError> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(false)
            .from_writer(Vec::new());

        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| ExportError::Csv(e.into_error().into()))?;
        String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))
    }

    /// Write the table to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let body = self.to_csv_string()?;
        std::fs::write(path, body).map_err(|source| ExportError::Write {
            path: path.display().to_string(),
            source,
        })?;
        info!("exported {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

const NOT_AVAILABLE: &str = "N/A";

pub fn attendees_csv(attendees: &[Attendee]) -> CsvTable {
    let mut table = CsvTable::new(&["Name", "Email", "Phone", "RSVP Status", "Tickets"]);
    for a in attendees {
        table.push(vec![
            a.name.clone(),
            a.email.clone(),
            a.phone.clone().unwrap_or_default(),
            a.rsvp_status.as_str().to_string(),
            a.ticket_count.to_string(),
        ]);
    }
    table
}

pub fn alerts_csv(alerts: &[SafetyAlert]) -> CsvTable {
    let mut table = CsvTable::new(&[
        "ID", "User", "Email", "Phone", "Event", "Type", "Status", "Location", "Time",
    ]);
    for a in alerts {
        table.push(vec![
            a.id.clone(),
            a.user_name.clone(),
            a.user_email.clone(),
            a.user_phone.clone().unwrap_or_default(),
            a.event_name.clone().unwrap_or_else(|| NOT_AVAILABLE.into()),
            a.type_label().to_string(),
            a.priority().label().to_string(),
            a.address.clone().unwrap_or_else(|| NOT_AVAILABLE.into()),
            a.created_at.to_rfc3339(),
        ]);
    }
    table
}

pub fn events_csv(events: &[Event]) -> CsvTable {
    let mut table = CsvTable::new(&[
        "ID",
        "Name",
        "Date",
        "Location",
        "Category",
        "Ticket Price",
        "Views",
        "RSVPs",
    ]);
    for e in events {
        table.push(vec![
            e.id.clone(),
            e.name.clone(),
            e.date.clone(),
            e.location.clone(),
            e.category.clone(),
            format!("{:.2}", e.ticket_price),
            e.views.to_string(),
            e.rsvps.to_string(),
        ]);
    }
    table
}

pub fn audit_logs_csv(entries: &[AuditLogEntry]) -> CsvTable {
    let mut table = CsvTable::new(&["Timestamp", "User", "Action", "Resource", "IP"]);
    for e in entries {
        table.push(vec![
            e.timestamp.to_rfc3339(),
            e.user.clone(),
            e.action.clone(),
            e.resource.clone(),
            e.ip.clone().unwrap_or_else(|| NOT_AVAILABLE.into()),
        ]);
    }
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind<'a> {
    SafetyAlerts,
    Attendees { event: &'a str },
    Events,
    AuditLogs,
}

/// Default download name for an export made on `date`.
pub fn export_file_name(kind: ExportKind<'_>, date: NaiveDate) -> String {
    let day = date.format("%Y-%m-%d");
    match kind {
        ExportKind::SafetyAlerts => format!("safety-alerts-{day}.csv"),
        ExportKind::Attendees { event } => {
            let event = if event.trim().is_empty() { "event" } else { event };
            format!("attendees-{}.csv", sanitize(event))
        }
        ExportKind::Events => format!("events-export-{day}.csv"),
        ExportKind::AuditLogs => format!("audit-logs-{day}.csv"),
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::RsvpStatus;
    use crate::models::safety::fixtures::{alert, emergency};

    fn attendee(name: &str, email: &str, phone: Option<&str>) -> Attendee {
        Attendee {
            id: String::new(),
            name: name.into(),
            email: email.into(),
            phone: phone.map(str::to_string),
            rsvp_status: RsvpStatus::Going,
            ticket_count: 2,
        }
    }

    #[test]
    fn quotes_only_where_needed() {
        let table = attendees_csv(&[
            attendee("Doe, Jane", "jane@x.com", None),
            attendee("Kwame \"KK\" Mensah", "kk@x.com", Some("+233 20 000 0000")),
            attendee("Line\nBreak", "lb@x.com", None),
        ]);
        let csv = table.to_csv_string().expect("csv");
        assert_eq!(
            csv,
            "Name,Email,Phone,RSVP Status,Tickets\n\
             \"Doe, Jane\",jane@x.com,,going,2\n\
             \"Kwame \"\"KK\"\" Mensah\",kk@x.com,+233 20 000 0000,going,2\n\
             \"Line\nBreak\",lb@x.com,,going,2\n"
        );
    }

    #[test]
    fn alert_rows_fall_back_to_not_available() {
        let mut a = emergency("a1", 0);
        a.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let mut located = alert("a2", 0);
        located.address = Some("Osu, Accra".into());
        located.is_high_alert = true;

        let table = alerts_csv(&[a, located]);
        assert_eq!(table.header.len(), 9);
        assert_eq!(
            table.rows[0],
            vec![
                "a1",
                "User a1",
                "a1@example.com",
                "",
                "N/A",
                "EMERGENCY",
                "EMERGENCY",
                "N/A",
                "2025-06-01T10:00:00+00:00",
            ]
        );
        assert_eq!(table.rows[1][5], "check-in");
        assert_eq!(table.rows[1][6], "HIGH_ALERT");

        let csv = table.to_csv_string().expect("csv");
        assert!(csv.contains("\"Osu, Accra\""));
    }

    #[test]
    fn events_and_audit_headers() {
        let events = events_csv(&[Event {
            id: "e1".into(),
            name: "Chale Wote".into(),
            ticket_price: 15.5,
            views: 3,
            ..Default::default()
        }]);
        assert_eq!(events.rows[0][5], "15.50");

        let audit = audit_logs_csv(&[AuditLogEntry {
            id: "l1".into(),
            action: "DELETE_EVENT".into(),
            user: "admin@eventa.com".into(),
            resource: "event:e1".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            ip: None,
        }]);
        let csv = audit.to_csv_string().expect("csv");
        assert!(csv.starts_with("Timestamp,User,Action,Resource,IP\n"));
        assert!(csv.ends_with(",N/A\n"));
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.csv");
        events_csv(&[]).write_to(&path).expect("write");
        let body = std::fs::read_to_string(&path).expect("read");
        assert_eq!(body, "ID,Name,Date,Location,Category,Ticket Price,Views,RSVPs\n");
    }

    #[test]
    fn file_names() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(
            export_file_name(ExportKind::SafetyAlerts, day),
            "safety-alerts-2025-03-09.csv"
        );
        assert_eq!(
            export_file_name(ExportKind::Attendees { event: "Afro/Nation" }, day),
            "attendees-Afro_Nation.csv"
        );
        assert_eq!(
            export_file_name(ExportKind::Attendees { event: "" }, day),
            "attendees-event.csv"
        );
    }
}
