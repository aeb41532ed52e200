use crate::cli::output;

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

/// Plain-text table sized to its content, shrunk to fit a width budget.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

const PADDING: usize = 1;
const MIN_COLUMN: usize = 4;

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            columns: headers
                .iter()
                .map(|header| TableColumn {
                    header: header.to_string(),
                    alignment: Alignment::Left,
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Right-aligns the given column (amounts, counts).
    pub fn align_right(mut self, idx: usize) -> Self {
        if let Some(column) = self.columns.get_mut(idx) {
            column.alignment = Alignment::Right;
        }
        self
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Natural content width of each column.
    pub fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .fold(column.header.chars().count(), usize::max)
            })
            .collect()
    }

    /// Shrinks the widest columns until the table fits `max_width`.
    pub fn fit_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths = self.compute_widths();
        while total_width(&widths) > max_width {
            let Some((idx, widest)) = widths
                .iter()
                .copied()
                .enumerate()
                .max_by_key(|(_, width)| *width)
            else {
                break;
            };
            if widest <= MIN_COLUMN {
                break;
            }
            widths[idx] = widest - 1;
        }
        widths
    }

    pub fn render(&self) -> String {
        self.render_within(usize::MAX)
    }

    pub fn render_within(&self, max_width: usize) -> String {
        let widths = self.fit_widths(max_width);
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![self.render_row(&header, &widths), rule(&widths)];
        lines.extend(self.rows.iter().map(|row| self.render_row(row, &widths)));
        lines.join("\n")
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        self.columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let text = row.get(idx).map(String::as_str).unwrap_or("");
                render_cell(text, *width, column.alignment)
            })
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    }
}

fn total_width(widths: &[usize]) -> usize {
    widths.iter().map(|w| w + PADDING * 2).sum::<usize>() + widths.len().saturating_sub(1)
}

fn truncate(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if width <= 1 {
        return "…".chars().take(width).collect();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

fn render_cell(text: &str, width: usize, alignment: Alignment) -> String {
    let fitted = truncate(text, width);
    let gap = width.saturating_sub(fitted.chars().count());
    let pad = " ".repeat(PADDING);
    match alignment {
        Alignment::Left => format!("{pad}{fitted}{}{pad}", " ".repeat(gap)),
        Alignment::Right => format!("{pad}{}{fitted}{pad}", " ".repeat(gap)),
    }
}

fn rule(widths: &[usize]) -> String {
    let ch = if output::plain_mode() {
        '-'
    } else {
        '─'
    };
    ch.to_string().repeat(total_width(widths))
}
