/// Codec for the glossary file: CSV, UTF-8 with a byte-order mark so the
/// file opens cleanly in spreadsheet tools.
use thiserror::Error;

use super::{join_links, split_links, GlossaryRecord};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Column layout of the persisted file. `chinese` and `english` are
/// required; the remaining columns default to empty when absent so older
/// files (written before the editor columns existed) still load.
const COLUMNS: [&str; 7] = [
    "chinese",
    "english",
    "status",
    "source",
    "links",
    "edited",
    "last_modified",
];

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("glossary csv is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("glossary csv could not be parsed: {0}")]
    Parse(#[from] csv::Error),
}

pub fn decode_table(bytes: &[u8]) -> Result<Vec<GlossaryRecord>, CodecError> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(body);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|header| header.trim() == name);
    let chinese = column("chinese").ok_or(CodecError::MissingColumn("chinese"))?;
    let english = column("english").ok_or(CodecError::MissingColumn("english"))?;
    let status = column("status");
    let source = column("source");
    let links = column("links");
    let edited = column("edited");
    let last_modified = column("last_modified");

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cell = |pos: Option<usize>| {
            pos.and_then(|pos| record.get(pos)).unwrap_or("").to_string()
        };
        rows.push(GlossaryRecord {
            source_term: cell(Some(chinese)),
            target_term: cell(Some(english)),
            status: cell(status),
            source: cell(source),
            links: split_links(&cell(links)),
            edited: parse_edited(&cell(edited)),
            last_modified: cell(last_modified),
        });
    }
    Ok(rows)
}

pub fn encode_table(rows: &[GlossaryRecord]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record(COLUMNS)?;
        for row in rows {
            let links = join_links(&row.links);
            writer.write_record([
                row.source_term.as_str(),
                row.target_term.as_str(),
                row.status.as_str(),
                row.source.as_str(),
                links.as_str(),
                if row.edited { "true" } else { "false" },
                row.last_modified.as_str(),
            ])?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(out)
}

fn parse_edited(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
