use std::io::Write;

use anyhow::{Context, bail};
use keyflake::{
    Cursor, Filter, KeysetPaginator, PageRequest, PageSize, RecordId, SortDirection, Value,
    page::{ID_FIELD, JsonRecord, MemoryCollection},
};
use tracing::{debug, info};

pub struct PageArgs<'a> {
    pub sort_field: &'a str,
    pub direction: SortDirection,
    pub cursor: Option<&'a Cursor>,
    pub last_id: Option<RecordId>,
    pub conditions: &'a [String],
    pub size: PageSize,
}

/// Parses a `field=value` condition into an equality filter.
///
/// Values are read as an integer, then a float, then a boolean, and
/// otherwise kept as text. Conditions on the identifier field parse the
/// value as an identifier.
fn parse_condition(raw: &str) -> anyhow::Result<Filter> {
    let Some((field, value)) = raw.split_once('=') else {
        bail!("condition {raw:?} is not of the form field=value");
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("condition {raw:?} names no field");
    }

    let value = if field == ID_FIELD {
        Value::Id(value.parse().with_context(|| format!("condition {raw:?}"))?)
    } else if let Ok(v) = value.parse::<i64>() {
        Value::Integer(v)
    } else if let Ok(v) = value.parse::<f64>() {
        Value::Float(v)
    } else if let Ok(v) = value.parse::<bool>() {
        Value::Bool(v)
    } else {
        Value::Text(value.to_owned())
    };
    Ok(Filter::eq(field, value))
}

pub fn run<W: Write>(text: &str, args: &PageArgs<'_>, out: &mut W) -> anyhow::Result<()> {
    let rows: Vec<JsonRecord> =
        serde_json::from_str(text).context("expected a JSON array of objects")?;
    let collection = MemoryCollection::from(rows);
    debug!(rows = collection.len(), "loaded collection");

    let filter = args
        .conditions
        .iter()
        .map(|raw| parse_condition(raw))
        .try_fold(Filter::All, |acc, f| f.map(|f| acc.and(f)))?;

    let paginator = KeysetPaginator::new(args.sort_field, args.direction);
    let cursor = match (args.cursor, args.last_id) {
        (Some(cursor), _) => Some(cursor.clone()),
        (None, Some(id)) => Some(paginator.cursor_from_last_id(&collection, id)?),
        (None, None) => None,
    };

    let request = PageRequest {
        filter,
        cursor,
        size: args.size,
    };
    let page = paginator.paginate(&collection, &request)?;
    info!(
        rows = page.len(),
        has_more = page.has_more,
        sort_field = args.sort_field,
        "served page"
    );

    serde_json::to_writer_pretty(&mut *out, &page)?;
    writeln!(out)?;
    Ok(())
}
