use crate::core::value::Value;
use crate::utils::text::cell_text;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

/// Formatter for table output
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: Option<usize>) -> Self {
        if width.is_some() {
            self.max_width = width;
        }
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Widest a value cell may get, leaving room for the index and kind columns
    fn value_width(&self) -> usize {
        self.max_width.unwrap_or(80).saturating_sub(24).max(10)
    }

    fn new_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(u16::try_from(width).unwrap_or(u16::MAX));
        }

        let header: Vec<Cell> = headers
            .iter()
            .map(|title| {
                let cell = Cell::new(title);
                if self.use_colors {
                    cell.add_attribute(Attribute::Bold).fg(Color::Cyan)
                } else {
                    cell
                }
            })
            .collect();
        table.set_header(header);
        table
    }

    /// One row per leaf: position, kind and value
    pub fn render_leaves(&self, leaves: &[Value]) -> String {
        let mut table = self.new_table(&["#", "Kind", "Value"]);
        let width = self.value_width();
        for (index, leaf) in leaves.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index),
                Cell::new(leaf.kind_name()),
                Cell::new(cell_text(&leaf.make_str(), width)),
            ]);
        }
        table.to_string()
    }

    /// One row per input number with its running total
    pub fn render_running_totals(&self, rows: &[(String, String)]) -> String {
        let mut table = self.new_table(&["#", "Value", "Total"]);
        for (index, (value, total)) in rows.iter().enumerate() {
            let total_cell = Cell::new(total);
            let total_cell = if self.use_colors {
                total_cell.fg(Color::Green)
            } else {
                total_cell
            };
            table.add_row(vec![Cell::new(index), Cell::new(value), total_cell]);
        }
        table.to_string()
    }

    /// Name/answer pairs, e.g. predicate results
    pub fn render_pairs(&self, pairs: &[(&str, String)]) -> String {
        let mut table = self.new_table(&["Check", "Result"]);
        let width = self.value_width();
        for (name, result) in pairs {
            table.add_row(vec![Cell::new(name), Cell::new(cell_text(result, width))]);
        }
        table.to_string()
    }
}
