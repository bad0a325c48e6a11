pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Publish shared Google Docs folders as websites", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/quire/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the mirrored sites
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Host served for requests to localhost
    #[arg(long, global = true)]
    pub default_host: Option<String>,

    /// Maximum number of concurrent document downloads
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Command line flags win over the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(host) = &self.default_host {
            config.default_host = host.clone();
        }
        if let Some(workers) = self.workers {
            config.sync.workers = workers;
        }
        if let Commands::Serve { port: Some(port) } = self.command {
            config.server.port = port;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror every folder shared with the service account
    Sync,
    /// Mirror one shared folder by name
    Publish {
        /// Name of the shared folder (the site's host name)
        folder: String,
    },
    /// Show a document's title, images and where it is published
    Inspect {
        /// Google Doc id
        doc_id: String,
    },
    /// List the pages of mirrored sites
    List {
        /// Only list this host
        #[arg(long)]
        host: Option<String>,
    },
    /// Serve the mirrored sites over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}
