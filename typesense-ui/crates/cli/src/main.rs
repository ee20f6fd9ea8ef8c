use anyhow::{Context, Result, anyhow, bail};
use browser::{BrowserState, FilterValue, NumericRange, Session};
use clap::{Parser, Subcommand, ValueEnum};
use client::{HttpSearchService, SearchService};
use console::{Term, style};
use core_types::config::{
    AppConfig, ConnectionConfig, Protocol, clear_connection, config_path, load_config,
    save_connection,
};
use core_types::{CollectionSchema, SearchParams};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use query::{default_columns, filter::parse_number};
use std::path::PathBuf;
use std::time::Duration;

mod logging;
mod render;

/// Terminal front-end for a Typesense server.
#[derive(Parser, Debug)]
#[command(
    name = "typesense-ui",
    version,
    about = "Browse and manage Typesense collections from the terminal"
)]
struct Cli {
    /// Config file (defaults to $TYPESENSE_UI_CONFIG, then ./typesense-ui.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Test a connection and save it to the config file.
    Connect {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long, value_enum)]
        protocol: Option<ProtocolArg>,
        /// Admin API key.
        #[arg(long, env = "TYPESENSE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Connection timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Forget the saved connection.
    Disconnect,
    /// List collections.
    Collections {
        /// Case-insensitive substring filter on collection names.
        #[arg(short, long)]
        filter: Option<String>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete a collection and all its documents.
    DeleteCollection {
        name: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Search documents in a collection.
    Browse {
        collection: String,
        /// Query text; empty or `*` matches everything.
        #[arg(short, long, default_value = "*")]
        query: String,
        /// Exact-match filter, `field=value`. Repeatable.
        #[arg(long = "filter", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
        /// Lower bound for a numeric field, `field=n`. Repeatable.
        #[arg(long = "min", value_name = "FIELD=N")]
        mins: Vec<String>,
        /// Upper bound for a numeric field, `field=n`. Repeatable.
        #[arg(long = "max", value_name = "FIELD=N")]
        maxes: Vec<String>,
        /// Sort column; repeating the same field flips it to ascending.
        #[arg(long = "sort", value_name = "FIELD")]
        sorts: Vec<String>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show (or delete) one document.
    Doc {
        collection: String,
        id: String,
        #[arg(long)]
        delete: bool,
        /// Skip the confirmation prompt when deleting.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProtocolArg {
    Http,
    Https,
}

impl From<ProtocolArg> for Protocol {
    fn from(p: ProtocolArg) -> Self {
        match p {
            ProtocolArg::Http => Self::Http,
            ProtocolArg::Https => Self::Https,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    let _guard = logging::init_tracing(&cfg.logging, cli.verbose)?;
    let path = config_path(cli.config.as_deref());

    match cli.command {
        Commands::Connect {
            host,
            port,
            protocol,
            api_key,
            timeout,
        } => {
            let mut conn = cfg.connection.clone().unwrap_or_default();
            if let Some(host) = host {
                conn.host = host;
            }
            if let Some(port) = port {
                conn.port = port;
            }
            if let Some(protocol) = protocol {
                conn.protocol = protocol.into();
            }
            if let Some(api_key) = api_key {
                conn.api_key = api_key;
            }
            if let Some(timeout) = timeout {
                conn.connection_timeout_seconds = timeout;
            }
            if conn.api_key.is_empty() {
                bail!("an API key is required (--api-key or TYPESENSE_API_KEY)");
            }

            let pb = spinner(false, format!("Connecting to {}", conn.base_url()));
            let session = Session::connect(&conn).await;
            pb.finish_and_clear();
            let session = session.context("connection test failed")?;

            save_connection(&path, &conn)?;
            println!(
                "{} {} ({} collections)",
                style("Connected to").green(),
                conn.base_url(),
                session.collections().len()
            );
            println!("{}", style(format!("Saved to {}", path.display())).dim());
            session.disconnect();
        }
        Commands::Disconnect => {
            clear_connection(&path)?;
            println!("{}", style("Saved connection removed.").green());
        }
        Commands::Collections { filter, json } => {
            let session = open_session(&cfg, json).await?;
            let shown = session.filter_collections(filter.as_deref().unwrap_or_default());
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else if shown.is_empty() {
                println!("{}", style("No collections.").yellow());
            } else {
                println!("{}", style("Collections:").green());
                for line in render::collection_lines(&shown) {
                    println!("  {line}");
                }
            }
        }
        Commands::DeleteCollection { name, yes } => {
            let mut session = open_session(&cfg, false).await?;
            if !yes && !confirm(&format!("Delete collection '{name}' and all its documents?"))? {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
            session.delete_collection(&name).await?;
            println!(
                "{} {} ({} collections left)",
                style("Deleted").green(),
                name,
                session.collections().len()
            );
        }
        Commands::Browse {
            collection,
            query,
            filters,
            mins,
            maxes,
            sorts,
            page,
            json,
        } => {
            let conn = saved_connection(&cfg)?;
            let service = HttpSearchService::new(conn)?;
            let actions = BrowseActions {
                query,
                filters: parse_assignments(&filters)?,
                ranges: group_ranges(&parse_assignments(&mins)?, &parse_assignments(&maxes)?)?,
                sorts,
                page,
            };
            let outcome = run_browse(&service, &collection, actions, json).await?;
            print_browse(&collection, &outcome, json)?;
        }
        Commands::Doc {
            collection,
            id,
            delete,
            yes,
        } => {
            let mut session = open_session(&cfg, false).await?;
            let doc = session.get_document(&collection, &id).await?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            if delete {
                if !yes && !confirm(&format!("Delete document '{id}' from '{collection}'?"))? {
                    println!("{}", style("Aborted.").yellow());
                    return Ok(());
                }
                session.delete_document(&collection, &id).await?;
                println!("{} {}", style("Deleted document").green(), id);
            }
        }
    }
    Ok(())
}

/// Browser inputs collected from the command line, applied in order.
struct BrowseActions {
    query: String,
    filters: Vec<(String, String)>,
    ranges: IndexMap<String, NumericRange>,
    sorts: Vec<String>,
    page: u32,
}

/// What a browse run settled on: the state after the final search and the
/// request that produced it.
struct BrowseOutcome {
    state: BrowserState,
    schema: CollectionSchema,
    params: SearchParams,
}

/// Load the schema, replay every action, then run only the final search.
///
/// Each action supersedes the previous ticket, so the intermediate searches
/// are never sent.
async fn run_browse<S>(
    service: &S,
    collection: &str,
    actions: BrowseActions,
    quiet: bool,
) -> Result<BrowseOutcome>
where
    S: SearchService + ?Sized,
{
    let mut state = BrowserState::new();
    let load = state
        .select_collection(Some(collection))
        .context("no schema load was issued")?;

    let pb = spinner(quiet, format!("Loading {collection}"));
    let loaded = load.execute(service).await;
    pb.finish_and_clear();
    let mut ticket = state.complete_load(load.seq, loaded);
    if let Some(err) = state.error() {
        return Err(anyhow!(err.clone()));
    }
    let schema = state.schema().cloned().context("schema not loaded")?;

    ticket = state.set_search_query(actions.query).or(ticket);
    for (field, raw) in &actions.filters {
        // Unknown fields fall through as text and are dropped by the state.
        let value = schema.field(field).map_or_else(
            || FilterValue::text(raw.as_str()),
            |f| FilterValue::from_input(&f.field_type, raw),
        );
        ticket = state.handle_filter_change(field, value).or(ticket);
    }
    for (field, range) in actions.ranges {
        ticket = state.handle_filter_change(&field, range).or(ticket);
    }
    for field in &actions.sorts {
        ticket = state.toggle_sort(field).or(ticket);
    }
    if actions.page > 1 {
        ticket = state.set_current_page(actions.page).or(ticket);
    }
    let ticket = ticket.context("no search was issued")?;

    let pb = spinner(quiet, "Searching".to_string());
    let result = ticket.execute(service).await;
    pb.finish_and_clear();
    state.complete_search(ticket.seq, result);
    if let Some(err) = state.error() {
        return Err(anyhow!(err.clone()));
    }

    Ok(BrowseOutcome {
        state,
        schema,
        params: ticket.params,
    })
}

fn print_browse(collection: &str, outcome: &BrowseOutcome, json: bool) -> Result<()> {
    let state = &outcome.state;
    let took_ms = state.response().map_or(0, |r| r.search_time_ms);
    let window = state.page_window().context("search returned no response")?;

    if json {
        let out = serde_json::json!({
            "collection": collection,
            "params": outcome.params,
            "found": window.found,
            "page": window.page,
            "total_pages": window.total_pages,
            "search_time_ms": took_ms,
            "documents": state.documents(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if state.documents().is_empty() {
        println!("{}", style(render::page_summary(&window, took_ms)).yellow());
        return Ok(());
    }
    let columns = default_columns(&outcome.schema);
    let mut lines = render::document_table(&columns, state.documents()).into_iter();
    if let Some(header) = lines.next() {
        println!("{}", style(header).bold());
    }
    for line in lines {
        println!("{line}");
    }
    println!("{}", style(render::page_summary(&window, took_ms)).dim());
    Ok(())
}

async fn open_session(cfg: &AppConfig, quiet: bool) -> Result<Session<HttpSearchService>> {
    let conn = saved_connection(cfg)?;
    let pb = spinner(quiet, format!("Connecting to {}", conn.base_url()));
    let session = Session::connect(conn).await;
    pb.finish_and_clear();
    session.with_context(|| format!("could not reach {}", conn.base_url()))
}

fn saved_connection(cfg: &AppConfig) -> Result<&ConnectionConfig> {
    cfg.connection
        .as_ref()
        .context("no saved connection; run `typesense-ui connect` or set TYPESENSE_API_KEY")
}

fn spinner(hidden: bool, message: String) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn confirm(prompt: &str) -> Result<bool> {
    let term = Term::stderr();
    term.write_str(&format!("{prompt} [y/N] "))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Split `field=value` arguments.
fn parse_assignments(args: &[String]) -> Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| {
            let (field, value) = arg
                .split_once('=')
                .with_context(|| format!("expected FIELD=VALUE, got '{arg}'"))?;
            let field = field.trim();
            if field.is_empty() {
                bail!("missing field name in '{arg}'");
            }
            Ok((field.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Merge `--min`/`--max` pairs into one range per field, in first-seen order.
fn group_ranges(
    mins: &[(String, String)],
    maxes: &[(String, String)],
) -> Result<IndexMap<String, NumericRange>> {
    let mut out: IndexMap<String, NumericRange> = IndexMap::new();
    for (field, raw) in mins {
        let n = parse_number(raw)
            .with_context(|| format!("--min {field}: '{raw}' is not a number"))?;
        out.entry(field.clone()).or_default().min = Some(n);
    }
    for (field, raw) in maxes {
        let n = parse_number(raw)
            .with_context(|| format!("--max {field}: '{raw}' is not a number"))?;
        out.entry(field.clone()).or_default().max = Some(n);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::CommandFactory;
    use client::ServiceError;
    use core_types::{Document, Field, SearchHit, SearchResponse};
    use serde_json::json;
    use std::sync::Mutex;

    /// One `books` collection holding 60 documents; records every search.
    #[derive(Default)]
    struct Books {
        searches: Mutex<Vec<SearchParams>>,
    }

    impl Books {
        fn schema() -> CollectionSchema {
            let mut schema = CollectionSchema::new(
                "books",
                vec![
                    Field::new("title", "string"),
                    Field::new("year", "int32"),
                    Field::new("pages", "int32"),
                ],
            );
            schema.default_sorting_field = Some("year".into());
            schema
        }
    }

    #[async_trait]
    impl SearchService for Books {
        async fn list_collections(&self) -> Result<Vec<CollectionSchema>, ServiceError> {
            Ok(vec![Self::schema()])
        }

        async fn fetch_collection_schema(
            &self,
            name: &str,
        ) -> Result<CollectionSchema, ServiceError> {
            if name == "books" {
                Ok(Self::schema())
            } else {
                Err(ServiceError::NotFound(format!("No collection with name `{name}` found.")))
            }
        }

        async fn delete_collection(&self, _: &str) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn search(
            &self,
            _: &str,
            params: &SearchParams,
        ) -> Result<SearchResponse, ServiceError> {
            self.searches.lock().unwrap().push(params.clone());
            let start = (params.page - 1) * params.per_page;
            let hits = (start..60.min(start + params.per_page))
                .map(|i| {
                    let doc = json!({ "id": (i + 1).to_string(), "title": format!("Book {i}") });
                    SearchHit::new(doc.as_object().cloned().unwrap())
                })
                .collect();
            Ok(SearchResponse {
                hits,
                found: 60,
                out_of: 60,
                page: params.page,
                search_time_ms: 2,
            })
        }

        async fn get_document(&self, _: &str, _: &str) -> Result<Document, ServiceError> {
            Err(ServiceError::NotFound("Could not find a document".into()))
        }

        async fn delete_document(&self, _: &str, _: &str) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    fn actions(page: u32) -> BrowseActions {
        BrowseActions {
            query: "*".into(),
            filters: Vec::new(),
            ranges: IndexMap::new(),
            sorts: Vec::new(),
            page,
        }
    }

    #[tokio::test]
    async fn browse_sends_only_the_final_search() {
        let service = Books::default();
        let mins = parse_assignments(&["pages=100".to_string()]).unwrap();
        let outcome = run_browse(
            &service,
            "books",
            BrowseActions {
                query: "dune".into(),
                filters: parse_assignments(&["year=1965".to_string()]).unwrap(),
                ranges: group_ranges(&mins, &[]).unwrap(),
                sorts: vec!["year".into()],
                page: 2,
            },
            true,
        )
        .await
        .unwrap();

        let searches = service.searches.lock().unwrap().clone();
        assert_eq!(searches.len(), 1);
        let params = &searches[0];
        assert_eq!(params.q, "dune");
        assert_eq!(params.filter_by.as_deref(), Some("year:=1965 && pages:>=100"));
        assert_eq!(params.sort_by.as_deref(), Some("year:asc"));
        assert_eq!(params.page, 2);
        assert_eq!(&outcome.params, params);

        assert_eq!(outcome.state.current_page(), 2);
        assert_eq!(outcome.state.documents()[0]["id"], "26");
        print_browse("books", &outcome, true).unwrap();
    }

    #[tokio::test]
    async fn browse_past_last_page_renders_an_empty_window() {
        let service = Books::default();
        let outcome = run_browse(&service, "books", actions(5), true).await.unwrap();

        assert!(outcome.state.documents().is_empty());
        let window = outcome.state.page_window().unwrap();
        assert!(window.is_past_end());
        assert_eq!(
            render::page_summary(&window, 2),
            "Page 5 is past the last page (3) | 60 found | 2 ms"
        );
        print_browse("books", &outcome, false).unwrap();
    }

    #[tokio::test]
    async fn browse_unknown_collection_fails_without_searching() {
        let service = Books::default();
        let Err(err) = run_browse(&service, "films", actions(1), true).await else {
            panic!("unknown collection should fail");
        };
        assert_eq!(err.to_string(), "No collection with name `films` found.");
        assert!(service.searches.lock().unwrap().is_empty());
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn browse_args_parse() {
        let cli = Cli::parse_from([
            "typesense-ui",
            "browse",
            "books",
            "-q",
            "dune",
            "--filter",
            "author=Frank Herbert",
            "--min",
            "year=1960",
            "--sort",
            "year",
            "--sort",
            "year",
            "--page",
            "2",
        ]);
        let Commands::Browse {
            collection,
            query,
            filters,
            mins,
            sorts,
            page,
            json,
            ..
        } = cli.command
        else {
            panic!("expected browse");
        };
        assert_eq!(collection, "books");
        assert_eq!(query, "dune");
        assert_eq!(filters, ["author=Frank Herbert"]);
        assert_eq!(mins, ["year=1960"]);
        assert_eq!(sorts, ["year", "year"]);
        assert_eq!(page, 2);
        assert!(!json);
    }

    #[test]
    fn assignments_split_on_first_equals() {
        let parsed = parse_assignments(&["q= a=b ".to_string()]).unwrap();
        assert_eq!(parsed, [("q".to_string(), "a=b".to_string())]);
        assert!(parse_assignments(&["novalue".to_string()]).is_err());
        assert!(parse_assignments(&["=x".to_string()]).is_err());
    }

    #[test]
    fn ranges_merge_per_field() {
        let mins = parse_assignments(&["count=5".to_string(), "price=1.5".to_string()]).unwrap();
        let maxes = parse_assignments(&["count=10".to_string()]).unwrap();
        let ranges = group_ranges(&mins, &maxes).unwrap();

        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges.get_index(0).map(|(f, _)| f.as_str()), Some("count"));
        assert_eq!(
            FilterValue::from(ranges["count"].clone()),
            FilterValue::range(Some(5), Some(10))
        );
        assert_eq!(ranges["price"].max, None);
    }

    #[test]
    fn non_numeric_bound_is_rejected() {
        let mins = parse_assignments(&["count=lots".to_string()]).unwrap();
        assert!(group_ranges(&mins, &[]).is_err());
    }
}
