//! queryable: parse a URL query string against a field policy and print the
//! resulting filters as JSON or SQL.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use queryable::sql::{SelectQuery, is_valid_sql_identifier, postgres, sqlite};
use queryable::{AllowedFieldSet, Normalizer, ParseResult, QueryParser, SnakeCase, Verbatim, log};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "queryable")]
#[command(about = "Turn a URL query string into whitelisted filter and sort operations")]
#[command(version)]
struct Cli {
    /// Query string, e.g. "age>=18&name=*son&order_by=name,desc"
    query: String,

    /// TOML policy file with [fields] and [limits]
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Allow a field (repeatable, comma-separated)
    #[arg(short = 'a', long = "allow", value_delimiter = ',')]
    allow: Vec<String>,

    /// Allow every field not hidden
    #[arg(long = "all")]
    all: bool,

    /// Hide a field (repeatable, comma-separated)
    #[arg(long = "hide", value_delimiter = ',')]
    hide: Vec<String>,

    /// Treat the query as URL-encoded and decode it first
    #[arg(short = 'e', long = "encoded")]
    encoded: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Json)]
    format: Format,

    /// SQL dialect for --format sql
    #[arg(short = 'd', long = "dialect", value_enum, default_value_t = DialectArg::Postgres)]
    dialect: DialectArg,

    /// Table name for --format sql
    #[arg(short = 't', long = "table", default_value = "items")]
    table: String,

    /// Key normalization
    #[arg(short = 'n', long = "normalize", value_enum, default_value_t = Normalize::Snake)]
    normalize: Normalize,

    /// Suppress log records on stderr
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Sql,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Sqlite,
}

#[derive(Clone, Copy, ValueEnum)]
enum Normalize {
    Snake,
    None,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    log::set_enabled(!cli.quiet);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    println!("{}", execute(&cli, config)?);
    Ok(())
}

fn execute(cli: &Cli, config: Config) -> Result<String> {
    let limits = config.limits();
    let fields = merge_fields(config.fields, cli);

    let result = match cli.normalize {
        Normalize::Snake => {
            run(&QueryParser::with_normalizer(fields, SnakeCase).limits(limits), cli)
        },
        Normalize::None => {
            run(&QueryParser::with_normalizer(fields, Verbatim).limits(limits), cli)
        },
    };

    render(&result, cli)
}

/// Command-line flags extend the policy file; `--hide` always wins.
fn merge_fields(mut fields: AllowedFieldSet, cli: &Cli) -> AllowedFieldSet {
    if cli.all {
        fields.allow_all();
    }
    for field in cli.allow.iter().filter(|f| !f.is_empty()) {
        fields.add(field.as_str());
    }
    for field in cli.hide.iter().filter(|f| !f.is_empty()) {
        fields.hide(field.as_str());
    }
    fields
}

fn run<N: Normalizer>(parser: &QueryParser<N>, cli: &Cli) -> ParseResult {
    if cli.encoded {
        parser.parse_encoded(Some(&cli.query))
    } else {
        parser.parse(&cli.query)
    }
}

fn render(result: &ParseResult, cli: &Cli) -> Result<String> {
    match cli.format {
        Format::Json => {
            serde_json::to_string_pretty(result).context("failed to serialize descriptors")
        },
        Format::Sql => {
            if !is_valid_sql_identifier(&cli.table) {
                bail!("invalid table name '{}'", cli.table);
            }
            match cli.dialect {
                DialectArg::Postgres => render_sql(result, postgres(&cli.table)),
                DialectArg::Sqlite => render_sql(result, sqlite(&cli.table)),
            }
        },
    }
}

fn render_sql<D: queryable::sql::Dialect>(
    result: &ParseResult,
    select: SelectQuery<D>,
) -> Result<String> {
    let query = result.apply_to(select).build();
    let params = serde_json::to_string(&query.params).context("failed to serialize parameters")?;
    Ok(format!("{}\n-- params: {params}", query.sql))
}
