use crate::exporters::csv::CsvExportResult;
use crate::transaction::Transaction;
use chrono::{Local, TimeZone};
use csv::QuoteStyle;
use serde::Serialize;
use std::io;

/// One exported row. Columns appear in field order.
#[derive(Serialize)]
struct ExportRow {
    #[serde(rename = "Date")]
    date: String,

    #[serde(rename = "Description")]
    description: String,

    #[serde(rename = "Type")]
    kind: String,

    #[serde(rename = "Amount")]
    amount: String,

    #[serde(rename = "Balance")]
    balance: String,
}

/// Quotes `description` unconditionally, doubling embedded quotes.
fn quote(description: &str) -> String {
    format!("\"{}\"", description.replace('"', "\"\""))
}

/// Writes transactions as `Date,Description,Type,Amount,Balance` rows.
///
/// Dates are calendar dates (`M/D/YYYY`) in the writer's time zone. Descriptions are always
/// double-quoted. Amounts and balances have exactly two fractional digits.
pub struct CsvWriter<W, Tz = Local>
where
    W: io::Write,
    Tz: TimeZone,
{
    writer: csv::Writer<W>,
    zone: Tz,
}

impl<W> CsvWriter<W, Local>
where
    W: io::Write,
{
    pub fn new(writer: W) -> Self {
        Self::with_zone(writer, Local)
    }
}

impl<W, Tz> CsvWriter<W, Tz>
where
    W: io::Write,
    Tz: TimeZone,
{
    pub fn with_zone(writer: W, zone: Tz) -> Self {
        let writer = csv::WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);
        Self { writer, zone }
    }

    pub fn serialize<'a, I>(&mut self, transactions: I) -> CsvExportResult<()>
    where
        I: Iterator<Item=&'a Transaction>,
    {
        let mut empty = true;
        for transaction in transactions {
            empty = false;
            let date = transaction.date().with_timezone(&self.zone).date_naive();
            self.writer.serialize(ExportRow {
                date: date.format("%-m/%-d/%Y").to_string(),
                description: quote(transaction.description()),
                kind: transaction.kind().to_string(),
                amount: format!("{:.2}", transaction.amount()),
                balance: format!("{:.2}", transaction.balance_after()),
            })?;
        }
        if empty {
            self.writer.write_record(["Date", "Description", "Type", "Amount", "Balance"])?;
        }
        Ok(self.writer.flush()?)
    }
}
