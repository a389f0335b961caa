mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tiddlyparse_config::Config;
use tiddlyparse_engine::{FieldFilter, TiddlerStore, Wiki, parse};

use cli::{Cli, Commands, GetArgs, SearchArgs, SetArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let path = wiki_path(cli.wiki)?;
    log::debug!("Using wiki {}", path.display());
    let wiki = parse(&path).with_context(|| format!("Failed to read wiki {}", path.display()))?;

    match cli.command {
        Commands::Info => info(&wiki),
        Commands::List => list(&wiki),
        Commands::Get(args) => get(&wiki, args)?,
        Commands::Set(args) => set(wiki, args)?,
        Commands::Search(args) => search(&wiki, args),
    }
    Ok(())
}

/// `--wiki` / `TIDDLYPARSE_WIKI` first, then the config file.
fn wiki_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    let resolved = Config::resolve_wiki(arg).context("Failed to load config file")?;
    match resolved {
        Some(path) => Ok(path),
        None => bail!(
            "No wiki given. Pass --wiki, set TIDDLYPARSE_WIKI, or set default_wiki in {}",
            Config::config_path().display()
        ),
    }
}

fn info(wiki: &Wiki) {
    println!("path: {}", wiki.path().display());
    println!("format: {}", wiki.fileformat());
    println!("tiddlers: {}", wiki.len());
}

fn list(wiki: &Wiki) {
    for tiddler in wiki.iter() {
        println!("{}", tiddler.title());
    }
}

fn get(wiki: &Wiki, args: GetArgs) -> Result<()> {
    let tiddler = wiki.tiddler(&args.title)?;
    match args.field {
        Some(field) => println!("{}", tiddler.get(&field)),
        None => {
            for (name, value) in tiddler.fields() {
                println!("{name}: {value}");
            }
        }
    }
    Ok(())
}

fn set(mut wiki: Wiki, args: SetArgs) -> Result<()> {
    let mut tiddler = wiki.get_or_create(&args.title);
    tiddler.set(&args.name, args.value)?;
    if !tiddler.is_dirty() {
        log::info!("{:?} already has that {}; not saving", args.title, args.name);
        return Ok(());
    }
    wiki.add(tiddler);
    wiki.save()
        .with_context(|| format!("Failed to save {}", wiki.path().display()))?;
    log::info!("Set {} on {:?}", args.name, args.title);
    Ok(())
}

fn search(wiki: &Wiki, args: SearchArgs) {
    let filters: Vec<FieldFilter> = args
        .has
        .into_iter()
        .map(FieldFilter::present)
        .chain(
            args.eq
                .into_iter()
                .map(|(field, value)| FieldFilter::eq(field, value)),
        )
        .collect();

    for tiddler in wiki.search(&filters) {
        println!("{}", tiddler.title());
    }
}
