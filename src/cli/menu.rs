//! Interactive menu shown when k1space runs without a subcommand.

use super::catalog::{CatalogShowCommand, RefreshCommand};
use super::cluster::{DeprovisionCommand, ProvisionCommand};
use super::config::{
    CreateCommand, DeleteAllCommand, DeleteCommand, ListCommand, ShowCommand,
};
use super::display::StatusIcon;
use super::App;
use crate::shared::K1Error;
use colored::Colorize;

const MAIN_MENU: &[&str] = &["Config", "Cluster", "Catalog", "Exit"];
const CONFIG_MENU: &[&str] = &[
    "Create Config",
    "List Configs",
    "Show Config",
    "Delete Config",
    "Delete All Configs",
    "Back",
];
const CLUSTER_MENU: &[&str] = &["Provision", "Deprovision", "Back"];
const CATALOG_MENU: &[&str] = &["Refresh Catalog", "Show Catalog", "Back"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    CreateConfig,
    ListConfigs,
    ShowConfig,
    DeleteConfig,
    DeleteAllConfigs,
    Provision,
    Deprovision,
    RefreshCatalog,
    ShowCatalog,
}

/// Runs the menu loop until the user exits. Failed actions are reported and
/// the loop continues; prompt failures end it.
pub async fn run(app: &App) -> anyhow::Result<()> {
    loop {
        let Some(action) = next_action(app)? else {
            return Ok(());
        };

        if let Err(e) = perform(app, action).await {
            if matches!(e.downcast_ref::<K1Error>(), Some(K1Error::Prompt(_))) {
                return Err(e);
            }
            println!("{} {:#}", StatusIcon::ERROR.red(), e);
        }
    }
}

/// Walks the main menu and a submenu. `None` when the user exits.
pub fn next_action(app: &App) -> anyhow::Result<Option<MenuAction>> {
    loop {
        let main = select(app, "k1space", MAIN_MENU)?;
        let action = match main {
            Some(0) => match select(app, "Config", CONFIG_MENU)? {
                Some(0) => MenuAction::CreateConfig,
                Some(1) => MenuAction::ListConfigs,
                Some(2) => MenuAction::ShowConfig,
                Some(3) => MenuAction::DeleteConfig,
                Some(4) => MenuAction::DeleteAllConfigs,
                _ => continue,
            },
            Some(1) => match select(app, "Cluster", CLUSTER_MENU)? {
                Some(0) => MenuAction::Provision,
                Some(1) => MenuAction::Deprovision,
                _ => continue,
            },
            Some(2) => match select(app, "Catalog", CATALOG_MENU)? {
                Some(0) => MenuAction::RefreshCatalog,
                Some(1) => MenuAction::ShowCatalog,
                _ => continue,
            },
            _ => return Ok(None),
        };
        return Ok(Some(action));
    }
}

async fn perform(app: &App, action: MenuAction) -> anyhow::Result<()> {
    match action {
        MenuAction::CreateConfig => CreateCommand::default().execute(app).await,
        MenuAction::ListConfigs => ListCommand::default().execute(app),
        MenuAction::ShowConfig => ShowCommand::default().execute(app),
        MenuAction::DeleteConfig => DeleteCommand::default().execute(app),
        MenuAction::DeleteAllConfigs => DeleteAllCommand::default().execute(app),
        MenuAction::Provision => ProvisionCommand::default().execute(app).await,
        MenuAction::Deprovision => DeprovisionCommand::default().execute(app).await,
        MenuAction::RefreshCatalog => RefreshCommand::default().execute(app).await,
        MenuAction::ShowCatalog => CatalogShowCommand::default().execute(app),
    }
}

fn select(app: &App, prompt: &str, items: &[&str]) -> Result<Option<usize>, K1Error> {
    let items: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    app.prompter.select(prompt, &items, 0)
}
