use std::collections::BTreeSet;
use std::env;
use std::fs;

use directory::{creators_from_json, format_followers, CreatorSummary};
use discovery::{apply, ExploreFilters, FollowerRange};
use mapview::cluster;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "list" => cmd_list(args),
        "map" => cmd_map(args),
        _ => Err(usage()),
    }
}

struct Query {
    path: String,
    filters: ExploreFilters,
    exclude: Option<String>,
    search: String,
}

fn parse_query(args: Vec<String>) -> Result<Query, String> {
    if args.is_empty() {
        return Err(usage());
    }

    let path = args[0].clone();
    let mut niches: BTreeSet<String> = BTreeSet::new();
    let mut location = String::new();
    let mut follower_range = FollowerRange::Any;
    let mut open_to_collab_only = false;
    let mut search = String::new();
    // The signed-in viewer never sees themself in discovery; the id comes
    // from the environment unless overridden on the command line.
    let mut exclude = env::var("EXPLORER_VIEWER_ID").ok();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--niche" => {
                i += 1;
                let value = args.get(i).ok_or("--niche requires a value")?;
                niches.insert(value.clone());
            }
            "--location" => {
                i += 1;
                location = args.get(i).ok_or("--location requires a value")?.clone();
            }
            "--followers" => {
                i += 1;
                let value = args.get(i).ok_or("--followers requires a value")?;
                follower_range = FollowerRange::parse_label(value)
                    .ok_or_else(|| format!("unknown follower bracket: {value}"))?;
            }
            "--collab-only" => {
                open_to_collab_only = true;
            }
            "--search" => {
                i += 1;
                search = args.get(i).ok_or("--search requires a value")?.clone();
            }
            "--exclude" => {
                i += 1;
                exclude = Some(args.get(i).ok_or("--exclude requires a value")?.clone());
            }
            s => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    Ok(Query {
        path,
        filters: ExploreFilters {
            niches,
            location,
            follower_range,
            open_to_collab_only,
        },
        exclude,
        search,
    })
}

fn load_creators(path: &str) -> Result<Vec<CreatorSummary>, String> {
    let payload = fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
    creators_from_json(&payload).map_err(|e| e.to_string())
}

fn cmd_list(args: Vec<String>) -> Result<(), String> {
    let query = parse_query(args)?;
    let creators = load_creators(&query.path)?;
    info!("loaded {} creators from {}", creators.len(), query.path);

    let visible = apply(
        &creators,
        &query.filters,
        query.exclude.as_deref(),
        &query.search,
    );

    if visible.is_empty() {
        println!("no creators match the current filters");
        return Ok(());
    }

    for creator in &visible {
        let niche = if creator.niche.is_empty() {
            "-"
        } else {
            &creator.niche
        };
        let collab = if creator.open_to_collab {
            "  [open to collab]"
        } else {
            ""
        };
        println!(
            "{:<24} {:<14} {:>8}  {}{}",
            creator.name,
            niche,
            format_followers(creator.followers),
            creator.location,
            collab
        );
    }
    println!("\n{} of {} creators match", visible.len(), creators.len());
    Ok(())
}

fn cmd_map(args: Vec<String>) -> Result<(), String> {
    let query = parse_query(args)?;
    let creators = load_creators(&query.path)?;

    let visible = apply(
        &creators,
        &query.filters,
        query.exclude.as_deref(),
        &query.search,
    );
    let clusters = cluster::build(&visible);

    let mapped: usize = clusters.values().map(|c| c.size()).sum();
    for (key, cluster) in &clusters {
        println!("{key}  x{}", cluster.size());
        for member in cluster.members() {
            println!(
                "    {} ({}, {})",
                member.name,
                if member.niche.is_empty() { "-" } else { &member.niche },
                format_followers(member.followers)
            );
        }
    }

    println!(
        "\n{} markers, {} creators mapped, {} without a mappable location",
        clusters.len(),
        mapped,
        visible.len() - mapped
    );
    Ok(())
}

fn usage() -> String {
    [
        "usage: explorer <command> <creators.json> [flags]",
        "",
        "commands:",
        "  list    print the filtered creator list",
        "  map     print the clustered map markers for the filtered set",
        "",
        "flags:",
        "  --niche NAME        restrict to a niche (repeatable, OR semantics)",
        "  --location TEXT     location label substring, case-insensitive",
        "  --followers BRACKET one of: any, <10k, 10k-100k, 100k-1m, >1m",
        "  --collab-only       only creators open to collaborate",
        "  --search TEXT       free-text search over name, niche and location",
        "  --exclude ID        hide one creator id (default: $EXPLORER_VIEWER_ID)",
    ]
    .join("\n")
}
