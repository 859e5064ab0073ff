use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "hmc-inventory")]
#[command(about = "Ansible dynamic inventory of Power HMC logical partitions")]
pub struct Cli {
    /// List all logical partitions and their groups (default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print the variables of a single partition
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,

    /// Additional configuration file, read after the default locations
    #[arg(short, long, env = "HMCINV_INI_PATH", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short, long, default_value = "json", value_parser = ["json", "yaml"])]
    pub format: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub enum Mode<'a> {
    List,
    Host(&'a str),
}

impl Cli {
    pub fn mode(&self) -> Mode<'_> {
        match &self.host {
            Some(name) => Mode::Host(name),
            None => Mode::List,
        }
    }
}
