use crate::chart::{ChartKind, DualAxisChart};
use crate::html::escape;
use crate::svg::{render_legend, render_svg};
use crate::table::StatusTable;
use std::fmt::Write;

pub const LAST_UPDATED_ID: &str = "lastUpdated";
pub const DATA_TABLE_ID: &str = "dataTable";

const STYLE: &str = "body { font-family: Arial, sans-serif; margin: 16px; color: #111; }
table.status-table { border-collapse: collapse; margin-bottom: 16px; }
table.status-table th, table.status-table td { border: 1px solid #ccc; padding: 4px 8px; text-align: center; }
.above { background-color: #c8f7c5; color: #0a6b06; font-weight: bold; }
.below { background-color: #f7c5c5; color: #8b0000; font-weight: bold; }
.charts { display: flex; flex-wrap: wrap; gap: 16px; }
.chart { border: 1px solid #ddd; padding: 8px; }
";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RegionContent {
    #[default]
    Empty,
    Text(String),
    Table(StatusTable),
    Chart(Box<DualAxisChart>),
}

/// A named slot of the dashboard page.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    pub content: RegionContent,
}

impl Region {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: RegionContent::Empty,
        }
    }

    pub fn clear(&mut self) {
        self.content = RegionContent::Empty;
    }

    fn to_html(&self) -> String {
        let id = escape(&self.id);
        match &self.content {
            RegionContent::Empty => format!("<div id=\"{id}\"></div>\n"),
            RegionContent::Text(text) => format!("<div id=\"{id}\">{}</div>\n", escape(text)),
            RegionContent::Table(table) => format!("<div id=\"{id}\">\n{}</div>\n", table.to_html()),
            RegionContent::Chart(chart) => format!(
                "<div id=\"{id}\" class=\"chart\">\n{}{}\n</div>\n",
                render_svg(chart),
                render_legend(chart)
            ),
        }
    }
}

/// The dashboard document: an ordered set of regions addressed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    regions: Vec<Region>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            regions: Vec::new(),
        }
    }

    pub fn with_region(mut self, id: impl Into<String>) -> Self {
        self.add_region(id);
        self
    }

    /// Adds an empty region unless one with the same id exists.
    pub fn add_region(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.region(&id).is_none() {
            self.regions.push(Region::new(id));
        }
    }

    /// The standard layout: update stamp, status table, then both charts of each index.
    pub fn dashboard<S: AsRef<str>>(title: impl Into<String>, symbols: &[S]) -> Self {
        let mut page = Self::new(title).with_region(LAST_UPDATED_ID).with_region(DATA_TABLE_ID);
        for symbol in symbols {
            for kind in ChartKind::ALL {
                page.add_region(kind.container_id(symbol.as_ref()));
            }
        }
        page
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn region_mut(&mut self, id: &str) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    pub fn chart(&self, id: &str) -> Option<&DualAxisChart> {
        match &self.region(id)?.content {
            RegionContent::Chart(chart) => Some(&**chart),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&StatusTable> {
        match &self.region(DATA_TABLE_ID)?.content {
            RegionContent::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn set_last_updated(&mut self, stamp: &str) -> bool {
        self.set_content(LAST_UPDATED_ID, RegionContent::Text(format!("Last updated: {stamp}")))
    }

    pub fn set_table(&mut self, table: StatusTable) -> bool {
        self.set_content(DATA_TABLE_ID, RegionContent::Table(table))
    }

    fn set_content(&mut self, id: &str, content: RegionContent) -> bool {
        match self.region_mut(id) {
            Some(region) => {
                region.content = content;
                true
            }
            None => {
                tracing::warn!(region = id, "page has no such region");
                false
            }
        }
    }

    /// Full HTML document. A non-zero `refresh_secs` makes the browser reload the file.
    pub fn to_html(&self, refresh_secs: u64) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        if refresh_secs > 0 {
            let _ = writeln!(out, "<meta http-equiv=\"refresh\" content=\"{refresh_secs}\">");
        }
        let _ = writeln!(out, "<title>{}</title>", escape(&self.title));
        let _ = writeln!(out, "<style>\n{STYLE}</style>\n</head>\n<body>");
        let _ = writeln!(out, "<h2>{}</h2>", escape(&self.title));

        let (charts, others): (Vec<&Region>, Vec<&Region>) = self
            .regions
            .iter()
            .partition(|r| r.id.starts_with("chart_"));
        for region in others {
            out.push_str(&region.to_html());
        }
        out.push_str("<div class=\"charts\">\n");
        for region in charts {
            out.push_str(&region.to_html());
        }
        out.push_str("</div>\n</body>\n</html>\n");
        out
    }
}
