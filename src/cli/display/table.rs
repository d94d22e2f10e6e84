//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::builder::BuildSummary;
use crate::domain::config::{ConfigurationKey, ConfigurationRecord, NodeTypeDescriptor};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::path::Path;

/// Configuration information for list display
#[derive(Debug, Clone)]
pub struct ConfigInfo {
    pub key: ConfigurationKey,
    pub cluster_name: String,
    pub flags_set: usize,
    pub flags_total: usize,
    pub files_present: usize,
    pub files_total: usize,
}

impl ConfigInfo {
    pub fn from_record(key: &ConfigurationKey, record: &ConfigurationRecord) -> Self {
        Self {
            key: key.clone(),
            cluster_name: record.flags.get("cluster-name").cloned().unwrap_or_default(),
            flags_set: record.flags.values().filter(|v| !v.is_empty()).count(),
            flags_total: record.flags.len(),
            files_present: record.files.iter().filter(|f| Path::new(f).exists()).count(),
            files_total: record.files.len(),
        }
    }
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render configurations as a formatted table
    pub fn render_configs_list(&self, configs: &[ConfigInfo]) -> String {
        if configs.is_empty() {
            return "No configurations found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("KEY").set_alignment(CellAlignment::Left),
                Cell::new("PROVIDER").set_alignment(CellAlignment::Left),
                Cell::new("REGION").set_alignment(CellAlignment::Left),
                Cell::new("PREFIX").set_alignment(CellAlignment::Left),
                Cell::new("CLUSTER").set_alignment(CellAlignment::Left),
                Cell::new("FLAGS").set_alignment(CellAlignment::Center),
                Cell::new("ARTIFACTS").set_alignment(CellAlignment::Center),
            ]);

        for config in configs {
            let icon = StatusIcon::get_artifact_icon(config.files_present, config.files_total);
            let status = StatusIcon::get_status_text(config.files_present, config.files_total);
            let color = self
                .theme
                .get_artifact_color(config.files_present, config.files_total);

            table.add_row(vec![
                Cell::new(config.key.encode()),
                Cell::new(config.key.provider()),
                Cell::new(config.key.region()),
                Cell::new(config.key.prefix()),
                Cell::new(&config.cluster_name).fg(self.theme.get_value_color(&config.cluster_name)),
                Cell::new(format!("{}/{}", config.flags_set, config.flags_total))
                    .set_alignment(CellAlignment::Center),
                Cell::new(format!("{} {}", icon, status)).fg(color),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ k1space Configurations {} ─╮\n",
            format!("[{} configs]", configs.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Artifacts present  {} Partial  {} Missing (recreate the config)\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::WARNING.yellow(),
            StatusIcon::ERROR.red()
        ));

        output
    }

    /// Render one configuration's artifacts and flags
    pub fn render_config_detail(&self, key: &ConfigurationKey, record: &ConfigurationRecord) -> String {
        let mut files = Table::new();
        files
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![Cell::new("FILE"), Cell::new("STATUS")]);
        for file in &record.files {
            let (icon, color) = if Path::new(file).exists() {
                (StatusIcon::SUCCESS, self.theme.success)
            } else {
                (StatusIcon::ERROR, self.theme.error)
            };
            files.add_row(vec![Cell::new(file), Cell::new(icon).fg(color)]);
        }

        let mut flags = Table::new();
        flags
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![Cell::new("FLAG"), Cell::new("VALUE")]);
        for (name, value) in &record.flags {
            let shown = if value.is_empty() { "<unset>" } else { value.as_str() };
            flags.add_row(vec![
                Cell::new(name),
                Cell::new(shown).fg(self.theme.get_value_color(value)),
            ]);
        }

        format!(
            "📦 Configuration {}\n\n{}\n{}\n",
            key.encode().bold(),
            files,
            flags
        )
    }

    /// Render a provider's cached regions and node types
    pub fn render_catalog(
        &self,
        provider: &str,
        regions: &[String],
        node_types: &[NodeTypeDescriptor],
    ) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("NODE TYPE"),
                Cell::new("CPU").set_alignment(CellAlignment::Right),
                Cell::new("RAM (MB)").set_alignment(CellAlignment::Right),
                Cell::new("DISK (GB)").set_alignment(CellAlignment::Right),
            ]);
        for node_type in node_types {
            let color = if node_type.cpu_cores == 0 && node_type.ram_megabytes == 0 {
                Color::DarkGrey
            } else {
                Color::Reset
            };
            table.add_row(vec![
                Cell::new(&node_type.name).fg(color),
                Cell::new(node_type.cpu_cores).set_alignment(CellAlignment::Right),
                Cell::new(node_type.ram_megabytes).set_alignment(CellAlignment::Right),
                Cell::new(node_type.disk_gigabytes).set_alignment(CellAlignment::Right),
            ]);
        }

        let regions_line = if regions.is_empty() {
            "<none cached>".bright_black().to_string()
        } else {
            regions.join(", ")
        };

        let mut output = format!(
            "╭─ {} {} ─╮\nRegions: {}\n",
            provider.bold(),
            format!("[{} regions, {} node types]", regions.len(), node_types.len()).bright_black(),
            regions_line
        );
        if !node_types.is_empty() {
            output.push_str(&table.to_string());
            output.push('\n');
        }
        output
    }

    /// Render the result of a completed builder run
    pub fn render_summary(&self, summary: &BuildSummary) -> String {
        let mut output = format!(
            "{} Configuration {} saved\n",
            StatusIcon::SUCCESS.green(),
            summary.key.encode().bold()
        );
        for file in &summary.record.files {
            output.push_str(&format!("  {}\n", file));
        }
        if let Some(init) = summary.init_script() {
            output.push_str(&format!(
                "\nProvision with: {} (or k1space cluster provision {})\n",
                format!("bash {}", init.display()).cyan(),
                summary.key.encode()
            ));
        }
        output
    }
}
