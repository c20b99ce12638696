use std::fmt::{self, Display};
use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

pub fn display_table<Row: TableDisplay>(rows: &[Row], mut output: impl Write) -> io::Result<()> {
    let column_count = Row::columns();
    let mut column_widths = (0..column_count)
        .map(|column_index| Row::column_name(column_index).width())
        .collect::<Vec<_>>();

    for row in rows {
        for (column_index, width) in column_widths.iter_mut().enumerate() {
            *width = (*width).max(row.item(column_index).width());
        }
    }

    output_row(&mut output, column_count, |column_index| {
        Padded(Row::column_name(column_index), column_widths[column_index])
    })?;
    output_row(&mut output, column_count, |column_index| {
        Divider(column_widths[column_index])
    })?;
    for row in rows {
        output_row(&mut output, column_count, |column_index| {
            Padded(row.item(column_index), column_widths[column_index])
        })?;
    }

    Ok(())
}

pub trait TableDisplay {
    fn columns() -> usize;
    fn column_name(column_index: usize) -> &'static str;
    fn item(&self, column_index: usize) -> &str;
}

fn output_row<F, D>(mut output: impl Write, column_count: usize, get_column_display: F) -> io::Result<()>
where
    D: Display,
    F: Fn(usize) -> D,
{
    for column_index in 0..column_count {
        if column_index > 0 {
            write!(&mut output, "  ")?;
        }
        write!(&mut output, "{}", get_column_display(column_index))?;
    }
    writeln!(&mut output)?;
    Ok(())
}

struct Divider(usize);

impl Display for Divider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            write!(f, "─")?;
        }
        Ok(())
    }
}

struct Padded<'a>(&'a str, usize);

impl Display for Padded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let padding = self.1.saturating_sub(self.0.width());
        write!(f, "{}{:padding$}", self.0, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row([&'static str; 2]);

    impl TableDisplay for Row {
        fn columns() -> usize {
            2
        }

        fn column_name(column_index: usize) -> &'static str {
            ["Class", "Count"][column_index]
        }

        fn item(&self, column_index: usize) -> &str {
            self.0[column_index]
        }
    }

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let rows = [Row(["uppercase", "3"]), Row(["digits", "12"])];
        let mut out = Vec::new();
        display_table(&rows, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Class      Count");
        assert_eq!(lines[1], "─────────  ─────");
        assert_eq!(lines[2], "uppercase  3    ");
        assert_eq!(lines[3], "digits     12   ");
    }
}
