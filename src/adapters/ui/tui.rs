//! Implements InputPort. Inquire-based main menu.
//!
//! Holds the session: the last query result, the pending decision, and the
//! delivery selectors. Actions run one at a time.

use crate::adapters::persistence::import_csv;
use crate::adapters::ui::preview::{render_preview, render_table};
use crate::adapters::ui::progress::spinner;
use crate::domain::{DeliveryDecision, DeliveryMode, DomainError, Table};
use crate::ports::{DataStorePort, InputPort};
use crate::usecases::{DeliveryService, QueryService, RecipientResolver, ResolveRequest};
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, InquireError, Select, Text};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Rows printed after a query.
const RESULT_ROWS: usize = 50;

/// Applies the prompt theme globally.
pub fn apply_theme() {
    let mut config = RenderConfig::default();
    config.prompt_prefix = Styled::new("?").with_fg(Color::LightCyan);
    config.answered_prompt_prefix = Styled::new(">").with_fg(Color::DarkCyan);
    config.highlighted_option_prefix = Styled::new("->").with_fg(Color::LightMagenta);
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    RunQuery,
    DeliveryOptions,
    Preview,
    Send,
    Describe,
    Import,
    Exit,
}

const MENU: [MenuItem; 7] = [
    MenuItem::RunQuery,
    MenuItem::DeliveryOptions,
    MenuItem::Preview,
    MenuItem::Send,
    MenuItem::Describe,
    MenuItem::Import,
    MenuItem::Exit,
];

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuItem::RunQuery => "Run HR query",
            MenuItem::DeliveryOptions => "Delivery mode & selectors",
            MenuItem::Preview => "Preview recipients (AI decision)",
            MenuItem::Send => "Confirm & send report",
            MenuItem::Describe => "Show table description",
            MenuItem::Import => "Import CSV dataset",
            MenuItem::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// State carried between menu actions.
#[derive(Debug, Default)]
struct Session {
    last_table: Option<Table>,
    pending: Option<DeliveryDecision>,
    delivery_mode: Option<String>,
    email_column: Option<String>,
    department: Option<String>,
}

/// `Ok(None)` when the user pressed Esc.
fn answer<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    queries: Arc<QueryService>,
    resolver: Arc<RecipientResolver>,
    delivery: Arc<DeliveryService>,
    store: Arc<dyn DataStorePort>,
    session: Mutex<Session>,
}

impl TuiInputPort {
    pub fn new(
        queries: Arc<QueryService>,
        resolver: Arc<RecipientResolver>,
        delivery: Arc<DeliveryService>,
        store: Arc<dyn DataStorePort>,
    ) -> Self {
        Self {
            queries,
            resolver,
            delivery,
            store,
            session: Mutex::new(Session::default()),
        }
    }

    async fn run_query(&self) -> Result<(), DomainError> {
        let Some(prompt) = answer(Text::new("Enter your HR question:").prompt())? else {
            return Ok(());
        };
        if prompt.trim().is_empty() {
            println!("Nothing to run.");
            return Ok(());
        }
        let pb = spinner("Generating SQL and querying...");
        let table = self.queries.run(&prompt).await;
        pb.finish_and_clear();

        match table.error_message() {
            Some(msg) => println!("Query failed: {}", msg),
            None => println!("{}", render_table(&table, RESULT_ROWS)),
        }
        self.session.lock().await.last_table = Some(table);
        Ok(())
    }

    async fn choose_delivery(&self) -> Result<(), DomainError> {
        let modes = vec![DeliveryMode::INDIRECT_LABEL, DeliveryMode::DIRECT_LABEL];
        let Some(mode) = answer(Select::new("Delivery mode:", modes).prompt())? else {
            return Ok(());
        };

        if DeliveryMode::parse(mode) == Some(DeliveryMode::Direct) {
            let mut session = self.session.lock().await;
            session.delivery_mode = Some(mode.to_string());
            session.email_column = None;
            session.department = None;
            println!("Direct mode: put the addresses in the preview instruction.");
            return Ok(());
        }

        let email_columns = self.queries.email_columns();
        let email_column = if email_columns.is_empty() {
            answer(Text::new("Email column:").prompt())?
        } else {
            answer(Select::new("Email column:", email_columns).prompt())?
        };
        let Some(email_column) = email_column else {
            return Ok(());
        };

        let pb = spinner("Loading departments...");
        let departments = self.queries.department_choices().await;
        pb.finish_and_clear();
        let department = if departments.is_empty() {
            answer(Text::new("Department:").prompt())?
        } else {
            answer(Select::new("Department:", departments).prompt())?
        };
        let Some(department) = department else {
            return Ok(());
        };

        info!(email_column = %email_column, department = %department, "indirect selectors set");
        let mut session = self.session.lock().await;
        session.delivery_mode = Some(mode.to_string());
        session.email_column = Some(email_column);
        session.department = Some(department);
        Ok(())
    }

    async fn preview(&self) -> Result<(), DomainError> {
        let Some(instruction) = answer(
            Text::new("Instruction (addresses or follow-up, may be empty):").prompt(),
        )?
        else {
            return Ok(());
        };
        let schema_text = self.queries.schema().ddl_text();

        let mut session = self.session.lock().await;
        let pb = spinner("Resolving recipients...");
        let decision = self
            .resolver
            .resolve(ResolveRequest {
                instruction: &instruction,
                table_schema: &schema_text,
                table: session.last_table.as_ref(),
                delivery_mode: session.delivery_mode.as_deref(),
                email_column: session.email_column.as_deref(),
                department: session.department.as_deref(),
            })
            .await;
        pb.finish_and_clear();

        println!("{}", render_preview(&decision));
        session.pending = Some(decision);
        Ok(())
    }

    async fn send(&self) -> Result<(), DomainError> {
        let session = self.session.lock().await;
        if let Some(decision) = session.pending.as_ref().filter(|d| d.action.is_sendable()) {
            let question = format!(
                "Send the report to {} recipient(s)?",
                decision.recipients.len()
            );
            let confirmed = answer(Confirm::new(&question).with_default(false).prompt())?;
            if confirmed != Some(true) {
                println!("Cancelled.");
                return Ok(());
            }
        }

        let pb = spinner("Rendering report and sending...");
        let status = self
            .delivery
            .confirm_and_send(session.pending.as_ref(), session.last_table.as_ref())
            .await;
        pb.finish_and_clear();
        println!("{}", status.message());
        Ok(())
    }

    fn describe(&self) {
        let table = self.queries.schema().description_table();
        println!("{}", render_table(&table, usize::MAX));
    }

    async fn import(&self) -> Result<(), DomainError> {
        let Some(path) = answer(Text::new("Path to HR CSV file:").prompt())? else {
            return Ok(());
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(());
        }
        let table_name = self.queries.schema().table_name.clone();
        let pb = spinner("Importing dataset...");
        let result = import_csv(self.store.as_ref(), Path::new(path), &table_name).await;
        pb.finish_and_clear();
        match result {
            Ok(rows) => println!("Imported {} row(s) into {}.", rows, table_name),
            Err(e) => println!("Import failed: {}", e),
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = match Select::new("What next?", MENU.to_vec()).prompt() {
                Ok(choice) => choice,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    break;
                }
                Err(e) => return Err(DomainError::Ui(e.to_string())),
            };
            match choice {
                MenuItem::RunQuery => self.run_query().await?,
                MenuItem::DeliveryOptions => self.choose_delivery().await?,
                MenuItem::Preview => self.preview().await?,
                MenuItem::Send => self.send().await?,
                MenuItem::Describe => self.describe(),
                MenuItem::Import => self.import().await?,
                MenuItem::Exit => break,
            }
        }
        info!("session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels_unique() {
        let labels: std::collections::HashSet<String> = MENU.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels.len(), MENU.len());
        assert_eq!(MENU.last(), Some(&MenuItem::Exit));
    }

    #[test]
    fn test_answer_maps_cancel() {
        let r: Result<String, InquireError> = Err(InquireError::OperationCanceled);
        assert_eq!(answer(r).unwrap(), None);
        let r: Result<String, InquireError> = Err(InquireError::OperationInterrupted);
        assert!(matches!(answer(r), Err(DomainError::Ui(_))));
    }
}
