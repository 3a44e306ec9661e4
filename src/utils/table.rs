/// Column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A plain-text table for terminal output
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers, all columns left-aligned
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let aligns = vec![Align::Left; headers.len()];
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            aligns,
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Set the alignment of one column
    pub fn align(mut self, col: usize, align: Align) -> Self {
        if let Some(a) = self.aligns.get_mut(col) {
            *a = align;
        }
        self
    }

    /// Add a row to the table. Extra cells beyond the header count are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, col) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(col.chars().count());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render header, separator and rows, one line each
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.render_row(&self.headers));
        lines.push(self.render_separator());
        for row in &self.rows {
            lines.push(self.render_row(row));
        }
        lines.join("\n")
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = self
            .col_widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let col = row.get(i).map(String::as_str).unwrap_or("");
                let pad = width.saturating_sub(col.chars().count());
                match self.aligns[i] {
                    Align::Left => format!("{}{}", col, " ".repeat(pad)),
                    Align::Right => format!("{}{}", " ".repeat(pad), col),
                }
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(vec!["#", "Name", "Price"]).align(2, Align::Right);
        table.add_row(vec!["1".into(), "Bitcoin".into(), "$65,000.00".into()]);
        table.add_row(vec!["2".into(), "Ether".into(), "$3.10".into()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "# | Name    |      Price");
        assert_eq!(lines[1], "--+---------+-----------");
        assert_eq!(lines[2], "1 | Bitcoin | $65,000.00");
        assert_eq!(lines[3], "2 | Ether   |      $3.10");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(vec!["A", "B"]);
        table.add_row(vec!["x".into()]);
        assert_eq!(table.render().lines().last(), Some("x |"));
    }
}
