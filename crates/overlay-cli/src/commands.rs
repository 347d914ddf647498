use anyhow::anyhow;
use colored::Colorize;
use overlay_query::SqlDialect;
use overlay_resolver::{
    Header, ObjectsResolver, QuerySpec, RenderedRow, ResolverConfig, TableFactory, TemplateFilter,
};
use overlay_store::Store;
use overlay_types::{Principal, Value};
use tracing::info;

use crate::cli::*;
use crate::fixture::Fixture;

/// Principal used when `--user` is not given. Holds no restrictions.
const DEFAULT_USER: &str = "cli";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    match cli.command {
        Command::List(args) => cmd_list(args, config, cli.format),
        Command::Sql(args) => cmd_sql(args, config),
        Command::Categories => cmd_categories(config, cli.format),
    }
}

fn cmd_list(args: ListArgs, config: ResolverConfig, format: OutputFormat) -> anyhow::Result<()> {
    let fixture = Fixture::load(&args.data)?;
    let store = fixture.store(config.dialect)?;
    let factory = TableFactory::new(config);
    let (resolver, spec) = prepare(&factory, &store, &fixture, &args.listing)?;

    if format == OutputFormat::Json {
        let rows = resolver.fetch(&store, &spec)?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let headers = resolver.headers(&spec)?;
    let rows = resolver.render(&store, &spec)?;
    info!(category = %resolver.meta().name, rows = rows.len(), "listing rendered");
    if let Some(branch) = spec.branch {
        println!("Branch {}", branch.short_id().yellow());
    }
    if rows.is_empty() {
        println!("No {} objects.", resolver.meta().name);
        return Ok(());
    }

    let cells = layout(&headers, &rows);
    let widths = column_widths(&cells);
    println!("{}", pad(&cells[0], &widths).bold());
    for (line, row) in cells[1..].iter().zip(&rows) {
        let text = format!("{}  {}", pad(line, &widths), row.link.to_string().dimmed());
        if row.disabled {
            println!("{}", text.dimmed());
        } else if row.classes.iter().any(|c| c == "deployment-endpoint") {
            println!("{}", text.green());
        } else {
            println!("{text}");
        }
    }
    Ok(())
}

fn cmd_sql(args: SqlArgs, config: ResolverConfig) -> anyhow::Result<()> {
    let dialect = args.dialect.unwrap_or(config.dialect);
    let fixture = match &args.data {
        Some(path) => Fixture::load(path)?,
        None => Fixture::default(),
    };
    let store = fixture.store(dialect)?;
    let factory = TableFactory::new(config);
    let (resolver, spec) = prepare(&factory, &store, &fixture, &args.listing)?;

    if args.inline {
        println!("{}", resolver.sql_inline(&store, &spec, dialect)?);
        return Ok(());
    }
    let rendered = resolver.sql(&store, &spec, dialect)?;
    println!("{}", rendered.sql);
    for (i, param) in rendered.params.iter().enumerate() {
        println!(
            "  {} {}",
            dialect.placeholder(i + 1).cyan(),
            describe_param(param, dialect)
        );
    }
    Ok(())
}

fn cmd_categories(config: ResolverConfig, format: OutputFormat) -> anyhow::Result<()> {
    let categories = TableFactory::new(config).categories();
    if format == OutputFormat::Json {
        let list: Vec<_> = categories
            .iter()
            .map(|(name, specialized)| serde_json::json!({ "name": name, "specialized": specialized }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    for (name, specialized) in categories {
        let kind = if specialized {
            "specialized".green()
        } else {
            "generic".dimmed()
        };
        println!("  {:<20} {}", name.bold(), kind);
    }
    Ok(())
}

/// Resolver and query for a listing request.
fn prepare(
    factory: &TableFactory,
    store: &dyn Store,
    fixture: &Fixture,
    args: &ListingArgs,
) -> anyhow::Result<(ObjectsResolver, QuerySpec)> {
    let mut resolver = factory.create(&args.category, store)?;
    let principal = match &args.user {
        Some(name) => fixture
            .principal(name)
            .cloned()
            .ok_or_else(|| anyhow!("unknown user '{name}'"))?,
        None => Principal::new(DEFAULT_USER),
    };
    resolver
        .set_principal(principal)
        .filter_object_type(args.object_type);

    let mut spec = QuerySpec::new(&resolver.meta().name);
    if let Some(branch) = args.branch {
        spec = spec.with_branch(branch);
    }
    if let Some(search) = &args.search {
        spec = spec.with_search(search.as_str());
    }
    if let Some(name) = &args.template {
        let id = resolver
            .find_template(store, name)?
            .ok_or_else(|| anyhow!("no {} template named '{name}'", resolver.meta().name))?;
        spec = spec.with_template(TemplateFilter::new(id, args.inherit));
    }
    if !args.columns.is_empty() {
        spec = spec.with_columns(args.columns.iter().cloned());
    }
    Ok((resolver, spec))
}

/// Header row followed by one row of cells per object.
fn layout(headers: &[Header], rows: &[RenderedRow]) -> Vec<Vec<String>> {
    let mut cells = vec![headers.iter().map(|h| h.title.clone()).collect::<Vec<_>>()];
    for row in rows {
        let mut line = vec![row.label.clone()];
        line.extend(row.columns.iter().map(|(_, v)| display_value(v)));
        cells.push(line);
    }
    cells
}

fn column_widths(cells: &[Vec<String>]) -> Vec<usize> {
    let mut widths = Vec::new();
    for line in cells {
        for (i, cell) in line.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) if *w < len => *w = len,
                Some(_) => {}
                None => widths.push(len),
            }
        }
    }
    widths
}

fn pad(line: &[String], widths: &[usize]) -> String {
    line.iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn display_value(value: &Value) -> String {
    if value.is_null() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn describe_param(value: &Value, dialect: SqlDialect) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Text(s) => format!("'{s}'"),
        Value::Bytes(b) => dialect.quote_binary(b),
    }
}
