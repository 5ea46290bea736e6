//! Output formatting for run reports and stored products (table, JSON, markdown, CSV).

use crate::commands::run::RunReport;
use crate::config::OutputFormat;
use crate::shop::models::StoredProduct;

/// Formats command output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the outcome of a pipeline run.
    pub fn format_report(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Markdown => [
                format!("- **Status:** {}", report.status),
                format!("- **Scraped:** {}", report.scraped_records_count),
                format!("- **New:** {}", report.new_records_count),
                format!("- **Updated:** {}", report.updated_records_count),
                format!("- **Unchanged:** {}", report.skipped_records_count),
            ]
            .join("\n"),
            OutputFormat::Csv => format!(
                "status,scraped,new,updated,unchanged\n{},{},{},{},{}",
                report.status,
                report.scraped_records_count,
                report.new_records_count,
                report.updated_records_count,
                report.skipped_records_count
            ),
            OutputFormat::Table => [
                format!("Status:    {}", report.status),
                format!("Scraped:   {}", report.scraped_records_count),
                format!("New:       {}", report.new_records_count),
                format!("Updated:   {}", report.updated_records_count),
                format!("Unchanged: {}", report.skipped_records_count),
            ]
            .join("\n"),
        }
    }

    /// Formats stored products.
    pub fn format_products(&self, products: &[StoredProduct]) -> String {
        if products.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No products stored.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(products).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => self.table_products(products),
            OutputFormat::Markdown => self.markdown_products(products),
            OutputFormat::Csv => self.csv_products(products),
        }
    }

    fn table_products(&self, products: &[StoredProduct]) -> String {
        let id_width = 6;
        let price_width = 12;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!("{:<id_width$}  {:<price_width$}  {:<title_width$}  {}", "ID", "Price", "Title", "Image"));
        lines.push(format!("{:-<id_width$}  {:-<price_width$}  {:-<title_width$}  {:-<5}", "", "", "", ""));

        for product in products {
            lines.push(format!(
                "{:<id_width$}  {:>price_width$.2}  {:<title_width$}  {}",
                product.id,
                product.price,
                truncate(&product.title, title_width),
                product.image_ref
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", products.len()));

        lines.join("\n")
    }

    fn markdown_products(&self, products: &[StoredProduct]) -> String {
        let mut lines = Vec::new();

        lines.push("| ID | Price | Title | Image |".to_string());
        lines.push("|----|-------|-------|-------|".to_string());

        for product in products {
            lines.push(format!(
                "| {} | {:.2} | {} | {} |",
                product.id,
                product.price,
                truncate(&product.title, 40).replace('|', "\\|"),
                product.image_ref
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products stored*", products.len()));

        lines.join("\n")
    }

    fn csv_header(&self) -> String {
        "id,title,price,image_path".to_string()
    }

    fn csv_products(&self, products: &[StoredProduct]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for product in products {
            lines.push(format!(
                "{},{},{},{}",
                product.id,
                Self::csv_escape(&product.title),
                product.price,
                Self::csv_escape(&product.image_ref)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens to at most `max` characters, ending in "..." when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
