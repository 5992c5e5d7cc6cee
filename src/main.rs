//! CLI presentation adapter: loads an index, runs the pure query function,
//! and renders the three buckets as plain rows.

use anyhow::bail;
use clap::Parser;
use rapidfuzz::distance::jaro_winkler;
use symdex::cli::{Cli, Commands};
use symdex::{Entity, ItemKind, SearchHit, SearchIndex, SearchOptions, Searcher};

fn main() -> symdex::Result<()> {
    symdex::tracing::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            query,
            index,
            unit,
            current_unit,
            limit,
        } => {
            let query = query.trim();
            if query.is_empty() {
                bail!("empty query");
            }
            let index = SearchIndex::load(&index)?;
            if let Some(unit) = &unit
                && !index.has_unit(unit)
            {
                bail!("{}", unknown_unit_message(&index, unit));
            }
            let options = SearchOptions {
                filter_unit: unit.as_deref(),
                current_unit: current_unit.as_deref(),
            };
            let results = Searcher::new(&index).search(query, &options);
            print_bucket("In Names", &results.names, &index, limit);
            print_bucket("In Parameters", &results.in_args, &index, limit);
            print_bucket("In Return Types", &results.returned, &index, limit);
        }
        Commands::Units { index } => {
            let index = SearchIndex::load(&index)?;
            for (_, entity) in index.entities() {
                if entity.kind == ItemKind::ExternCrate {
                    let summary = entity.desc.lines().next().unwrap_or("");
                    println!("{}  {}", entity.name, summary);
                }
            }
        }
    }
    Ok(())
}

/// "Did you mean" message for an unknown unit filter, closest names first.
fn unknown_unit_message(index: &SearchIndex, unit: &str) -> String {
    let mut scored: Vec<(f64, &str)> = index
        .unit_names()
        .map(|name| (jaro_winkler::similarity(unit.chars(), name.chars()), name))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    match scored.first() {
        Some((_, best)) => format!("unit '{}' is not in the index; did you mean '{}'?", unit, best),
        None => format!("unit '{}' is not in the index (the index is empty)", unit),
    }
}

fn print_bucket(title: &str, hits: &[SearchHit], index: &SearchIndex, limit: usize) {
    println!("{} ({})", title, hits.len());
    for hit in hits.iter().take(limit) {
        let entity = index.entity(hit.id);
        let summary = entity.desc.lines().next().unwrap_or("");
        match &hit.alias {
            Some(alias) => println!(
                "  {} {}{}  [alias: {}]  {}",
                entity.kind.name(),
                display_path(entity),
                entity.name,
                alias,
                summary
            ),
            None => println!(
                "  {} {}{}  {}",
                entity.kind.name(),
                display_path(entity),
                entity.name,
                summary
            ),
        }
    }
    println!();
}

/// Breadcrumb prefix for one entity: modules show their own path, primitive
/// and keyword pages none, members show path plus parent.
fn display_path(entity: &Entity) -> String {
    match entity.kind {
        ItemKind::Module => format!("{}::", entity.path),
        ItemKind::Primitive | ItemKind::Keyword | ItemKind::ExternCrate => String::new(),
        _ => match &entity.parent {
            Some(parent) if parent.kind == ItemKind::Primitive => format!("{}::", parent.name),
            Some(parent) => format!("{}::{}::", entity.path, parent.name),
            None => format!("{}::", entity.path),
        },
    }
}
