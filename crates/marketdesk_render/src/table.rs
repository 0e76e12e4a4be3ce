use crate::html::escape;
use marketdesk_engine::{classify_all, Classification, SnapshotFields};
use marketdesk_shared_models::{LevelName, LevelSet, Status};
use prettytable::{format, Cell, Row, Table};
use std::fmt::Write;

const FIELD_HEADERS: [&str; 8] = ["Index", "Expiry", "LTP", "ATM", "Straddle", "Net OI", "VIX", "Net DEX"];

/// One index line of the status table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub symbol: String,
    pub snapshot: SnapshotFields,
    pub levels: [(LevelName, Classification); 8],
}

impl StatusRow {
    /// Classifies every level against the LTP of the latest snapshot line.
    pub fn new(symbol: &str, lines: &[String], levels: &LevelSet) -> Self {
        let snapshot = SnapshotFields::from_latest(lines);
        let levels = classify_all(levels, snapshot.ltp);

        Self {
            symbol: symbol.to_string(),
            snapshot,
            levels,
        }
    }

    pub fn ltp(&self) -> f64 {
        self.snapshot.ltp
    }

    pub fn status(&self, name: LevelName) -> Status {
        self.levels
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c.status)
            .unwrap_or(Status::Unknown)
    }

    fn field_cells(&self) -> [String; 8] {
        let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        let s = &self.snapshot;

        [
            self.symbol.clone(),
            s.expiry.clone().unwrap_or_else(|| "-".to_string()),
            s.ltp.to_string(),
            opt(s.atm),
            opt(s.straddle),
            opt(s.net_oi),
            opt(s.vix),
            s.net_dex.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTable {
    pub rows: Vec<StatusRow>,
}

impl StatusTable {
    pub fn new(rows: Vec<StatusRow>) -> Self {
        Self { rows }
    }

    pub fn headers() -> Vec<&'static str> {
        FIELD_HEADERS
            .into_iter()
            .chain(LevelName::ALL.iter().map(|l| l.code()))
            .collect()
    }

    pub fn row(&self, symbol: &str) -> Option<&StatusRow> {
        self.rows.iter().find(|r| r.symbol == symbol)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<table class=\"status-table\">\n<thead><tr>");
        for header in Self::headers() {
            let _ = write!(out, "<th>{header}</th>");
        }
        out.push_str("</tr></thead>\n<tbody>\n");

        for row in &self.rows {
            out.push_str("<tr>");
            for (i, cell) in row.field_cells().iter().enumerate() {
                if i == 0 {
                    let _ = write!(out, "<td><b>{}</b></td>", escape(cell));
                } else {
                    let _ = write!(out, "<td>{}</td>", escape(cell));
                }
            }
            for (_, classification) in &row.levels {
                let _ = write!(
                    out,
                    "<td class=\"{}\">{}</td>",
                    classification.style_tag,
                    classification.status.cell_text()
                );
            }
            out.push_str("</tr>\n");
        }

        out.push_str("</tbody>\n</table>\n");
        out
    }

    /// The same table for a terminal, above in green and below in red.
    pub fn to_console(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(Row::new(
            Self::headers()
                .into_iter()
                .map(|h| Cell::new(h).style_spec("b"))
                .collect(),
        ));

        for row in &self.rows {
            let mut cells: Vec<Cell> = row.field_cells().iter().map(|c| Cell::new(c)).collect();
            cells.extend(row.levels.iter().map(|(_, c)| {
                let cell = Cell::new(c.status.cell_text());
                match c.status {
                    Status::Above => cell.style_spec("Fg"),
                    Status::Below => cell.style_spec("Fr"),
                    Status::Unknown => cell,
                }
            }));
            table.add_row(Row::new(cells));
        }

        table
    }
}
