//! Command line arguments for the `tiddlyparse` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and edit the tiddlers of a single-file TiddlyWiki
#[derive(Parser, Debug)]
#[command(name = "tiddlyparse")]
#[command(version)]
pub struct Cli {
    /// Wiki file; defaults to `default_wiki` from the config file
    #[arg(short, long, global = true, env = "TIDDLYPARSE_WIKI")]
    pub wiki: Option<PathBuf>,

    /// Log more (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the store format and number of tiddlers
    Info,
    /// List tiddler titles in store order
    List,
    /// Print the fields of a tiddler
    Get(GetArgs),
    /// Set a field, creating the tiddler if needed, and save the wiki
    Set(SetArgs),
    /// List titles of tiddlers matching every filter
    Search(SearchArgs),
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    pub title: String,

    /// Print only this field's value
    #[arg(short, long)]
    pub field: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    pub title: String,
    pub name: String,
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Field must have a non-empty value
    #[arg(long = "has", value_name = "FIELD")]
    pub has: Vec<String>,

    /// Field must equal VALUE exactly
    #[arg(long = "eq", value_name = "FIELD=VALUE", value_parser = parse_field_value)]
    pub eq: Vec<(String, String)>,
}

fn parse_field_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got {arg:?}"))
}
