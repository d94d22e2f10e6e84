// CLI command definitions

use super::catalog::CatalogCommands;
use super::cluster::ClusterCommands;
use super::config::ConfigCommands;
use super::{menu, App};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "k1space",
    version,
    about = "Configuration manager for kubefirst clusters",
    long_about = "Creates, stores and provisions kubefirst cluster configurations across cloud providers. \
                  Run without a subcommand for the interactive menu."
)]
pub struct CliArgs {
    /// k1space home directory (overrides K1SPACE_HOME, default ~/.ssot/k1space)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create, list, show and delete configurations
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Provision or deprovision a cluster from a configuration
    #[command(subcommand)]
    Cluster(ClusterCommands),

    /// Refresh or inspect the cloud regions and node types catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),
}

impl CliArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let app = App::load(self.home.clone())?;
        tracing::debug!("Using k1space home {}", app.config.home.display());

        match &self.command {
            Some(Commands::Config(cmd)) => cmd.execute(&app).await,
            Some(Commands::Cluster(cmd)) => cmd.execute(&app).await,
            Some(Commands::Catalog(cmd)) => cmd.execute(&app).await,
            None => menu::run(&app).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::config::ConfigCommands;

    #[test]
    fn test_parse_create_with_flags() {
        let args = CliArgs::parse_from([
            "k1space",
            "config",
            "create",
            "--provider",
            "civo",
            "-r",
            "lon1",
            "-F",
            "cluster-name=demo",
            "-Fnode-type=g4s.kube.small",
        ]);
        let Some(Commands::Config(ConfigCommands::Create(cmd))) = args.command else {
            panic!("expected config create");
        };
        assert_eq!(cmd.provider.as_deref(), Some("civo"));
        assert_eq!(cmd.region.as_deref(), Some("lon1"));
        assert_eq!(cmd.flags, ["cluster-name=demo", "node-type=g4s.kube.small"]);
    }

    #[test]
    fn test_no_subcommand_opens_menu() {
        let args = CliArgs::parse_from(["k1space", "--home", "/tmp/k1"]);
        assert!(args.command.is_none());
        assert_eq!(args.home, Some(PathBuf::from("/tmp/k1")));
    }

    #[test]
    fn test_parse_delete_all() {
        let args = CliArgs::parse_from(["k1space", "config", "delete-all", "--yes"]);
        assert!(matches!(
            args.command,
            Some(Commands::Config(ConfigCommands::DeleteAll(ref cmd))) if cmd.yes
        ));
    }
}
